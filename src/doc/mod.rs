//! Page and block document model, and the store that edits it.
//!
//! [`EditorState`] is a plain snapshot: pages in collection order, every
//! block of every page in one flat collection, the current page and the
//! focused block. [`Editor`] owns a state and is the only writer; each
//! command either applies completely or fails without touching the state.

use crate::config::EditorConfig;
use crate::core::order::{self, Ranked};
use crate::core::{BlockId, Clock, PageId, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use unicode_segmentation::UnicodeSegmentation;

pub mod buffer;
pub mod ops;

pub use ops::{Applied, EditOp};

/// Result type for store commands.
pub type Result<T> = std::result::Result<T, EditError>;

/// Section heading depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("heading level {0} out of range 1..=3")]
pub struct HeadingLevelError(pub u8);

impl TryFrom<u8> for HeadingLevel {
    type Error = HeadingLevelError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::H1),
            2 => Ok(Self::H2),
            3 => Ok(Self::H3),
            other => Err(HeadingLevelError(other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level as u8
    }
}

/// What a block is, together with the metadata only that kind carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading {
        level: HeadingLevel,
    },
    BulletedList,
    NumberedList,
    Quote,
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Video {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading { level } => match level {
                HeadingLevel::H1 => BlockType::Heading1,
                HeadingLevel::H2 => BlockType::Heading2,
                HeadingLevel::H3 => BlockType::Heading3,
            },
            BlockKind::BulletedList => BlockType::BulletedList,
            BlockKind::NumberedList => BlockType::NumberedList,
            BlockKind::Quote => BlockType::Quote,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Video { .. } => BlockType::Video,
        }
    }

    /// Media URL for image and video blocks.
    pub fn url(&self) -> Option<&str> {
        match self {
            BlockKind::Image { url } | BlockKind::Video { url } => url.as_deref(),
            _ => None,
        }
    }

    pub fn heading_level(&self) -> Option<HeadingLevel> {
        match self {
            BlockKind::Heading { level } => Some(*level),
            _ => None,
        }
    }
}

/// The closed set of block types, without metadata.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockType {
    #[strum(to_string = "paragraph", serialize = "text")]
    Paragraph,
    #[serde(rename = "heading1")]
    #[strum(to_string = "heading1", serialize = "h1", serialize = "heading")]
    Heading1,
    #[serde(rename = "heading2")]
    #[strum(to_string = "heading2", serialize = "h2")]
    Heading2,
    #[serde(rename = "heading3")]
    #[strum(to_string = "heading3", serialize = "h3")]
    Heading3,
    BulletedList,
    NumberedList,
    Quote,
    Code,
    Image,
    Video,
}

impl BlockType {
    /// Every type, in menu order.
    pub fn all() -> impl Iterator<Item = BlockType> {
        Self::iter()
    }

    /// Kind with empty metadata for a freshly created or converted block.
    pub fn default_kind(self) -> BlockKind {
        match self {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading1 => BlockKind::Heading {
                level: HeadingLevel::H1,
            },
            BlockType::Heading2 => BlockKind::Heading {
                level: HeadingLevel::H2,
            },
            BlockType::Heading3 => BlockKind::Heading {
                level: HeadingLevel::H3,
            },
            BlockType::BulletedList => BlockKind::BulletedList,
            BlockType::NumberedList => BlockKind::NumberedList,
            BlockType::Quote => BlockKind::Quote,
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::Image => BlockKind::Image { url: None },
            BlockType::Video => BlockKind::Video { url: None },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockType::Paragraph => "Text",
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Heading3 => "Heading 3",
            BlockType::BulletedList => "Bulleted list",
            BlockType::NumberedList => "Numbered list",
            BlockType::Quote => "Quote",
            BlockType::Code => "Code",
            BlockType::Image => "Image",
            BlockType::Video => "Video",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BlockType::Paragraph => "Just start writing with plain text.",
            BlockType::Heading1 => "Big section heading.",
            BlockType::Heading2 => "Medium section heading.",
            BlockType::Heading3 => "Small section heading.",
            BlockType::BulletedList => "Create a simple bulleted list.",
            BlockType::NumberedList => "Create a list with numbering.",
            BlockType::Quote => "Capture a quote.",
            BlockType::Code => "Capture a code snippet.",
            BlockType::Image => "Embed an image from a URL.",
            BlockType::Video => "Embed a video from a URL.",
        }
    }

    /// Whether the type holds text the user types into, as opposed to media.
    pub fn is_textual(self) -> bool {
        !matches!(self, BlockType::Image | BlockType::Video)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub page_id: PageId,
    pub order: usize,
    pub kind: BlockKind,
    pub content: String,
}

impl Block {
    fn new(page_id: PageId, kind: BlockKind, order: usize) -> Self {
        Self {
            id: BlockId::new(),
            page_id,
            order,
            kind,
            content: String::new(),
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Content cut to at most `max` graphemes, with an ellipsis when cut.
    pub fn preview(&self, max: usize) -> String {
        let mut graphemes = self.content.graphemes(true);
        let head: String = graphemes.by_ref().take(max).collect();
        if graphemes.next().is_some() {
            format!("{head}…")
        } else {
            head
        }
    }
}

impl Ranked for Block {
    type Group = PageId;

    fn group(&self) -> &PageId {
        &self.page_id
    }

    fn rank(&self) -> usize {
        self.order
    }

    fn set_rank(&mut self, rank: usize) {
        self.order = rank;
    }
}

/// Fields of a block that `update_block` may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockKind>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            kind: None,
        }
    }

    pub fn kind(kind: BlockKind) -> Self {
        Self {
            content: None,
            kind: Some(kind),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.kind.is_none()
    }

    fn apply_to(self, block: &mut Block) {
        if let Some(content) = self.content {
            block.content = content;
        }
        if let Some(kind) = self.kind {
            block.kind = kind;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a page that `update_page` may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PagePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),
    #[error("page not found: {0}")]
    PageNotFound(PageId),
    #[error("no current page")]
    NoCurrentPage,
    #[error("refusing to delete the last page {0}")]
    LastPage(PageId),
    #[error("index {index} out of range for page with {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("block ids do not match the blocks of page {0}")]
    InvalidPermutation(PageId),
}

/// A broken structural invariant found by [`EditorState::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("workspace has no pages")]
    NoPages,
    #[error("no current page is set")]
    NoCurrentPage,
    #[error("current page {0} does not exist")]
    DanglingCurrentPage(PageId),
    #[error("focused block {0} does not exist")]
    DanglingActiveBlock(BlockId),
    #[error("page id {0} appears more than once")]
    DuplicatePage(PageId),
    #[error("block id {0} appears more than once")]
    DuplicateBlock(BlockId),
    #[error("block {block} belongs to missing page {page}")]
    OrphanBlock { block: BlockId, page: PageId },
    #[error("page {page} has non-dense block order {orders:?}")]
    OrderNotDense { page: PageId, orders: Vec<usize> },
}

/// A snapshot of every page and block plus the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    pages: Vec<Page>,
    blocks: Vec<Block>,
    current_page: Option<PageId>,
    active_block: Option<BlockId>,
}

impl EditorState {
    /// One page, optionally seeded with a welcome paragraph.
    pub fn initial(config: &EditorConfig, now: DateTime<Utc>) -> Self {
        let page = Page {
            id: PageId::new(),
            title: config.initial_page_title.clone(),
            created_at: now,
            updated_at: now,
        };
        let blocks = config
            .welcome_text
            .iter()
            .map(|text| {
                let mut block = Block::new(page.id, BlockKind::Paragraph, 0);
                block.content = text.clone();
                block
            })
            .collect();
        Self {
            current_page: Some(page.id),
            pages: vec![page],
            blocks,
            active_block: None,
        }
    }

    /// Assemble a state from parts. Nothing is checked here; see
    /// [`EditorState::check_invariants`] and [`Editor::from_state`].
    pub fn from_parts(
        pages: Vec<Page>,
        blocks: Vec<Block>,
        current_page: Option<PageId>,
        active_block: Option<BlockId>,
    ) -> Self {
        Self {
            pages,
            blocks,
            current_page,
            active_block,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Every block in storage order. Storage order is not page order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn current_page_id(&self) -> Option<PageId> {
        self.current_page
    }

    pub fn active_block_id(&self) -> Option<BlockId> {
        self.active_block
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    /// A page's blocks sorted by `order`.
    pub fn page_blocks(&self, page: PageId) -> Vec<&Block> {
        order::sorted_positions(&self.blocks, &page)
            .into_iter()
            .map(|idx| &self.blocks[idx])
            .collect()
    }

    /// The current page's blocks sorted by `order`; empty without a current page.
    pub fn current_page_blocks(&self) -> Vec<&Block> {
        match self.current_page {
            Some(page) => self.page_blocks(page),
            None => Vec::new(),
        }
    }

    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        if self.pages.is_empty() {
            return Err(InvariantViolation::NoPages);
        }

        let mut page_ids = BTreeSet::new();
        for page in &self.pages {
            if !page_ids.insert(page.id) {
                return Err(InvariantViolation::DuplicatePage(page.id));
            }
        }

        match self.current_page {
            None => return Err(InvariantViolation::NoCurrentPage),
            Some(id) if !page_ids.contains(&id) => {
                return Err(InvariantViolation::DanglingCurrentPage(id));
            }
            Some(_) => {}
        }

        let mut block_ids = BTreeSet::new();
        let mut orders: BTreeMap<PageId, Vec<usize>> = BTreeMap::new();
        for block in &self.blocks {
            if !block_ids.insert(block.id) {
                return Err(InvariantViolation::DuplicateBlock(block.id));
            }
            if !page_ids.contains(&block.page_id) {
                return Err(InvariantViolation::OrphanBlock {
                    block: block.id,
                    page: block.page_id,
                });
            }
            orders.entry(block.page_id).or_default().push(block.order);
        }

        if let Some(id) = self.active_block
            && !block_ids.contains(&id)
        {
            return Err(InvariantViolation::DanglingActiveBlock(id));
        }

        for (page, mut page_orders) in orders {
            page_orders.sort_unstable();
            let dense = page_orders
                .iter()
                .enumerate()
                .all(|(idx, &order)| idx == order);
            if !dense {
                return Err(InvariantViolation::OrderNotDense {
                    page,
                    orders: page_orders,
                });
            }
        }

        Ok(())
    }
}

/// The document store: sole owner and writer of an [`EditorState`].
#[derive(Debug, Clone)]
pub struct Editor<C = SystemClock> {
    state: EditorState,
    config: EditorConfig,
    clock: C,
}

impl Editor<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for Editor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Editor<C> {
    pub fn with_clock(config: EditorConfig, clock: C) -> Self {
        let state = EditorState::initial(&config, clock.now());
        Self {
            state,
            config,
            clock,
        }
    }

    /// Adopt an existing snapshot, refusing one that breaks an invariant.
    pub fn from_state(
        state: EditorState,
        config: EditorConfig,
        clock: C,
    ) -> std::result::Result<Self, InvariantViolation> {
        state.check_invariants()?;
        Ok(Self {
            state,
            config,
            clock,
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pages(&self) -> &[Page] {
        self.state.pages()
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.state.page(id)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.state.current_page.and_then(|id| self.state.page(id))
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.state.block(id)
    }

    pub fn active_block(&self) -> Option<&Block> {
        self.state.active_block.and_then(|id| self.state.block(id))
    }

    pub fn page_blocks(&self, page: PageId) -> Vec<&Block> {
        self.state.page_blocks(page)
    }

    pub fn current_page_blocks(&self) -> Vec<&Block> {
        self.state.current_page_blocks()
    }

    fn current_page_id(&self) -> Result<PageId> {
        self.state.current_page.ok_or(EditError::NoCurrentPage)
    }

    fn block_index(&self, id: BlockId) -> Result<usize> {
        self.state
            .blocks
            .iter()
            .position(|block| block.id == id)
            .ok_or(EditError::BlockNotFound(id))
    }

    fn page_index(&self, id: PageId) -> Result<usize> {
        self.state
            .pages
            .iter()
            .position(|page| page.id == id)
            .ok_or(EditError::PageNotFound(id))
    }

    /// Insert a new empty block of `block_type` into the current page.
    ///
    /// Without `index` (or with one past the end) the block is appended;
    /// otherwise it takes position `index` and later blocks shift down.
    pub fn add_block(&mut self, block_type: BlockType, index: Option<usize>) -> Result<BlockId> {
        let page = self.current_page_id()?;
        Ok(self.insert_block(page, block_type, index))
    }

    pub(crate) fn insert_block(
        &mut self,
        page: PageId,
        block_type: BlockType,
        index: Option<usize>,
    ) -> BlockId {
        let (slot, rank) = order::insertion_slot(&self.state.blocks, &page, index);
        let block = Block::new(page, block_type.default_kind(), rank);
        let id = block.id;
        self.state.blocks.insert(slot, block);
        order::reindex(&mut self.state.blocks, &page);
        tracing::debug!(block = %id, %page, %block_type, order = rank, "block added");
        id
    }

    /// Merge `patch` into a block. Order and page membership never change.
    pub fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> Result<()> {
        let idx = self.block_index(id)?;
        patch.apply_to(&mut self.state.blocks[idx]);
        tracing::debug!(block = %id, "block updated");
        Ok(())
    }

    /// Turn a block into another type, keeping its content and position.
    ///
    /// Converting to the type a block already has keeps its metadata.
    pub fn change_block_type(&mut self, id: BlockId, block_type: BlockType) -> Result<()> {
        let idx = self.block_index(id)?;
        let block = &mut self.state.blocks[idx];
        if block.block_type() != block_type {
            block.kind = block_type.default_kind();
        }
        tracing::debug!(block = %id, %block_type, "block type changed");
        Ok(())
    }

    /// Remove a block and close the gap it leaves in its page.
    pub fn delete_block(&mut self, id: BlockId) -> Result<()> {
        let idx = self.block_index(id)?;
        let removed = self.state.blocks.remove(idx);
        order::reindex(&mut self.state.blocks, &removed.page_id);
        if self.state.active_block == Some(id) {
            self.state.active_block = None;
        }
        tracing::debug!(block = %id, page = %removed.page_id, "block deleted");
        Ok(())
    }

    /// Move the block at logical position `from` of the current page to `to`.
    ///
    /// `to` past the end moves the block last.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<()> {
        let page = self.current_page_id()?;
        if order::move_within(&mut self.state.blocks, &page, from, to).is_none() {
            let len = order::sorted_positions(&self.state.blocks, &page).len();
            return Err(EditError::IndexOutOfRange { index: from, len });
        }
        tracing::debug!(%page, from, to, "block moved");
        Ok(())
    }

    /// Replace the current page's sequence with `ids`, which must name every
    /// block of the page exactly once.
    pub fn reorder_blocks(&mut self, ids: &[BlockId]) -> Result<()> {
        let page = self.current_page_id()?;
        let current = order::sorted_positions(&self.state.blocks, &page);
        if ids.len() != current.len() {
            return Err(EditError::InvalidPermutation(page));
        }

        let by_id: BTreeMap<BlockId, usize> = current
            .iter()
            .map(|&idx| (self.state.blocks[idx].id, idx))
            .collect();
        let mut seen = BTreeSet::new();
        let mut positions = Vec::with_capacity(ids.len());
        for id in ids {
            match by_id.get(id) {
                Some(&idx) if seen.insert(*id) => positions.push(idx),
                _ => return Err(EditError::InvalidPermutation(page)),
            }
        }

        order::assign_sequence(&mut self.state.blocks, &positions);
        tracing::debug!(%page, blocks = ids.len(), "blocks reordered");
        Ok(())
    }

    /// Set or clear the focused block.
    pub fn set_active_block(&mut self, id: Option<BlockId>) -> Result<()> {
        if let Some(id) = id {
            self.block_index(id)?;
        }
        self.state.active_block = id;
        Ok(())
    }

    /// Create a page and make it current. `None` uses the configured default title.
    pub fn add_page(&mut self, title: Option<&str>) -> PageId {
        let now = self.clock.now();
        let page = Page {
            id: PageId::new(),
            title: title
                .map(str::to_string)
                .unwrap_or_else(|| self.config.default_page_title.clone()),
            created_at: now,
            updated_at: now,
        };
        let id = page.id;
        self.state.pages.push(page);
        self.state.current_page = Some(id);
        self.state.active_block = None;
        tracing::debug!(page = %id, "page added");
        id
    }

    /// Merge `patch` into a page and refresh its update timestamp.
    pub fn update_page(&mut self, id: PageId, patch: PagePatch) -> Result<()> {
        let idx = self.page_index(id)?;
        let now = self.clock.now();
        let page = &mut self.state.pages[idx];
        if let Some(title) = patch.title {
            page.title = title;
        }
        page.updated_at = now;
        tracing::debug!(page = %id, "page updated");
        Ok(())
    }

    /// Remove a page and all of its blocks. The last page cannot be removed.
    ///
    /// When the current page is removed, the first remaining page becomes
    /// current and focus is cleared.
    pub fn delete_page(&mut self, id: PageId) -> Result<()> {
        let idx = self.page_index(id)?;
        if self.state.pages.len() <= 1 {
            tracing::debug!(page = %id, "refusing to delete last page");
            return Err(EditError::LastPage(id));
        }

        self.state.pages.remove(idx);
        self.state.blocks.retain(|block| block.page_id != id);

        if let Some(active) = self.state.active_block
            && self.state.block(active).is_none()
        {
            self.state.active_block = None;
        }
        if self.state.current_page == Some(id) {
            self.state.current_page = self.state.pages.first().map(|page| page.id);
            self.state.active_block = None;
        }
        tracing::debug!(page = %id, "page deleted");
        Ok(())
    }

    /// Switch the current page. Focus is always cleared.
    pub fn set_current_page(&mut self, id: PageId) -> Result<()> {
        self.page_index(id)?;
        self.state.current_page = Some(id);
        self.state.active_block = None;
        tracing::debug!(page = %id, "current page set");
        Ok(())
    }
}
