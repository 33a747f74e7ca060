//! Presentation state: sidebar, theme and the block "turn into" menu.
//!
//! Nothing here is document data. The only link to the document store is
//! [`turn_block_into`], which applies a menu choice to the menu's target.

use crate::core::{BlockId, Clock};
use crate::doc::{BlockType, Editor, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MenuPosition {
    pub x: f64,
    pub y: f64,
}

/// An open block menu. A closed menu is simply `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockMenu {
    pub position: MenuPosition,
    pub target: BlockId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    sidebar_open: bool,
    theme: Theme,
    block_menu: Option<BlockMenu>,
    selected_block: Option<BlockId>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            theme: Theme::default(),
            block_menu: None,
            selected_block: None,
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn block_menu(&self) -> Option<&BlockMenu> {
        self.block_menu.as_ref()
    }

    pub fn selected_block(&self) -> Option<BlockId> {
        self.selected_block
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Open the menu at `(x, y)` for `block` and select that block.
    ///
    /// The block is not checked against the document store.
    pub fn show_block_menu_at(&mut self, x: f64, y: f64, block: BlockId) {
        self.block_menu = Some(BlockMenu {
            position: MenuPosition { x, y },
            target: block,
        });
        self.selected_block = Some(block);
    }

    /// Close the menu and drop the selection.
    pub fn hide_block_menu(&mut self) {
        self.block_menu = None;
        self.selected_block = None;
    }

    pub fn set_selected_block(&mut self, block: Option<BlockId>) {
        self.selected_block = block;
    }
}

/// Apply a "turn into" choice to the open menu's target, then close the menu.
///
/// Returns the converted block, or `None` when no menu was open. The menu
/// closes even when the target no longer exists.
pub fn turn_block_into<C: Clock>(
    ui: &mut UiState,
    editor: &mut Editor<C>,
    block_type: BlockType,
) -> Result<Option<BlockId>> {
    let Some(menu) = ui.block_menu else {
        return Ok(None);
    };
    ui.hide_block_menu();
    editor.change_block_type(menu.target, block_type)?;
    Ok(Some(menu.target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::core::ManualClock;
    use crate::doc::EditError;

    #[test]
    fn test_defaults() {
        let ui = UiState::new();
        assert!(ui.sidebar_open());
        assert_eq!(ui.theme(), Theme::Light);
        assert!(ui.block_menu().is_none());
        assert!(ui.selected_block().is_none());
    }

    #[test]
    fn test_toggles_flip_back_and_forth() {
        let mut ui = UiState::new();
        ui.toggle_sidebar();
        ui.toggle_theme();
        assert!(!ui.sidebar_open());
        assert_eq!(ui.theme(), Theme::Dark);
        ui.toggle_sidebar();
        ui.toggle_theme();
        assert!(ui.sidebar_open());
        assert_eq!(ui.theme(), Theme::Light);
    }

    #[test]
    fn test_show_and_hide_menu() {
        let mut ui = UiState::new();
        let block = BlockId::new();
        ui.show_block_menu_at(12.0, 40.5, block);
        let menu = ui.block_menu().unwrap();
        assert_eq!(menu.target, block);
        assert_eq!(menu.position, MenuPosition { x: 12.0, y: 40.5 });
        assert_eq!(ui.selected_block(), Some(block));

        ui.hide_block_menu();
        assert!(ui.block_menu().is_none());
        assert!(ui.selected_block().is_none());
    }

    #[test]
    fn test_turn_block_into_converts_target() {
        let mut editor = Editor::with_clock(EditorConfig::blank(), ManualClock::default());
        let block = editor.add_block(BlockType::Paragraph, None).unwrap();
        let mut ui = UiState::new();
        ui.show_block_menu_at(0.0, 0.0, block);

        let converted = turn_block_into(&mut ui, &mut editor, BlockType::Quote).unwrap();
        assert_eq!(converted, Some(block));
        assert_eq!(editor.block(block).unwrap().block_type(), BlockType::Quote);
        assert!(ui.block_menu().is_none());
    }

    #[test]
    fn test_turn_block_into_without_menu_is_noop() {
        let mut editor = Editor::with_clock(EditorConfig::blank(), ManualClock::default());
        let mut ui = UiState::new();
        assert_eq!(
            turn_block_into(&mut ui, &mut editor, BlockType::Code),
            Ok(None)
        );
    }

    #[test]
    fn test_turn_block_into_stale_target_still_closes_menu() {
        let mut editor = Editor::with_clock(EditorConfig::blank(), ManualClock::default());
        let mut ui = UiState::new();
        let stale = BlockId::new();
        ui.show_block_menu_at(1.0, 2.0, stale);
        assert_eq!(
            turn_block_into(&mut ui, &mut editor, BlockType::Code),
            Err(EditError::BlockNotFound(stale))
        );
        assert!(ui.block_menu().is_none());
    }
}
