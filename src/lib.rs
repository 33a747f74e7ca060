//! blockpad: the state core of a block-structured page editor.
//!
//! A workspace holds one or more pages; each page holds an ordered list of
//! typed blocks (paragraphs, headings, list items, quotes, code, images and
//! videos). This crate provides:
//!
//! - **Core primitives** - typed ids, the clock seam, and the page-scoped
//!   ordering routines that keep block ranks dense
//! - **Document store** - [`Editor`] commands over an [`EditorState`]
//!   snapshot, the serializable [`EditOp`] reducer, and edit buffers
//! - **Presentation store** - sidebar, theme and block menu state in [`UiState`]
//! - **Configuration** - [`EditorConfig`] for initial workspace contents
//!
//! # Quick Start
//!
//! ```rust
//! use blockpad::{BlockType, Editor};
//!
//! let mut editor = Editor::new();
//! let id = editor.add_block(BlockType::Heading1, None).unwrap();
//! editor.set_active_block(Some(id)).unwrap();
//!
//! let blocks = editor.current_page_blocks();
//! assert_eq!(blocks.last().map(|b| b.id), Some(id));
//! ```
//!
//! # Features
//!
//! - `cli` - Builds the `blockpad` script runner (pulls in `tracing-subscriber`)

// Ids, clock, ordering
pub mod core;

// Document model and store
pub mod doc;

// Presentation state
pub mod ui;

// Workspace configuration
pub mod config;

// Re-export core types
pub use core::{BlockId, Clock, ManualClock, PageId, SystemClock};

// Re-export doc types
pub use doc::{
    Applied, Block, BlockKind, BlockPatch, BlockType, EditError, EditOp, Editor, EditorState,
    HeadingLevel, HeadingLevelError, InvariantViolation, Page, PagePatch, Result,
};

// Re-export the edit buffer
pub use doc::buffer::EditBuffer;

// Re-export ui types
pub use ui::{BlockMenu, MenuPosition, Theme, UiState, turn_block_into};

// Re-export config types
pub use config::{ConfigError, EditorConfig};
