//! Transient edit text for one block.
//!
//! An editing widget keeps its own copy of a block's content while the user
//! types and only writes back to the store on commit.

use super::{Block, BlockPatch, BlockType, EditError, Editor, Result};
use crate::core::{BlockId, Clock};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    block_id: BlockId,
    original: String,
    text: String,
}

impl EditBuffer {
    pub fn begin(block: &Block) -> Self {
        Self {
            block_id: block.id,
            original: block.content.clone(),
            text: block.content.clone(),
        }
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Caret position at the end of the text, in graphemes.
    pub fn end_caret(&self) -> usize {
        self.text.graphemes(true).count()
    }

    pub fn is_dirty(&self) -> bool {
        self.text != self.original
    }

    /// Drop local edits.
    pub fn cancel(&mut self) {
        self.text.clone_from(&self.original);
    }

    /// Write the text back if it changed. Returns whether the store was touched.
    pub fn commit<C: Clock>(&mut self, editor: &mut Editor<C>) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        editor.update_block(self.block_id, BlockPatch::content(self.text.clone()))?;
        self.original.clone_from(&self.text);
        Ok(true)
    }

    /// Commit, then open a new paragraph directly below the edited block.
    pub fn commit_and_continue<C: Clock>(&mut self, editor: &mut Editor<C>) -> Result<BlockId> {
        self.commit(editor)?;
        let block = editor
            .block(self.block_id)
            .ok_or(EditError::BlockNotFound(self.block_id))?;
        let (page, next) = (block.page_id, block.order + 1);
        Ok(editor.insert_block(page, BlockType::Paragraph, Some(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::core::ManualClock;

    fn editor_with_block(content: &str) -> (Editor<ManualClock>, BlockId) {
        let mut editor = Editor::with_clock(EditorConfig::blank(), ManualClock::default());
        let id = editor.add_block(BlockType::Paragraph, None).unwrap();
        editor.update_block(id, BlockPatch::content(content)).unwrap();
        (editor, id)
    }

    #[test]
    fn test_commit_skips_clean_buffer() {
        let (mut editor, id) = editor_with_block("hello");
        let mut buffer = EditBuffer::begin(editor.block(id).unwrap());
        assert!(!buffer.commit(&mut editor).unwrap());
    }

    #[test]
    fn test_commit_writes_dirty_text_once() {
        let (mut editor, id) = editor_with_block("hello");
        let mut buffer = EditBuffer::begin(editor.block(id).unwrap());
        buffer.push_str(" world");
        assert!(buffer.is_dirty());
        assert!(buffer.commit(&mut editor).unwrap());
        assert_eq!(editor.block(id).unwrap().content, "hello world");
        assert!(!buffer.is_dirty());
        assert!(!buffer.commit(&mut editor).unwrap());
    }

    #[test]
    fn test_cancel_restores_original() {
        let (editor, id) = editor_with_block("keep me");
        let mut buffer = EditBuffer::begin(editor.block(id).unwrap());
        buffer.set_text("scratch");
        buffer.cancel();
        assert_eq!(buffer.text(), "keep me");
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_commit_and_continue_inserts_below() {
        let (mut editor, first) = editor_with_block("one");
        let last = editor.add_block(BlockType::Paragraph, None).unwrap();
        let mut buffer = EditBuffer::begin(editor.block(first).unwrap());
        buffer.set_text("one!");

        let next = buffer.commit_and_continue(&mut editor).unwrap();
        let ids: Vec<_> = editor.current_page_blocks().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first, next, last]);
        assert_eq!(editor.block(first).unwrap().content, "one!");
        assert_eq!(editor.block(next).unwrap().content, "");
    }

    #[test]
    fn test_commit_after_block_deleted_fails() {
        let (mut editor, id) = editor_with_block("gone");
        let mut buffer = EditBuffer::begin(editor.block(id).unwrap());
        editor.delete_block(id).unwrap();
        buffer.set_text("too late");
        assert_eq!(
            buffer.commit(&mut editor),
            Err(EditError::BlockNotFound(id))
        );
    }

    #[test]
    fn test_end_caret_counts_graphemes() {
        let (editor, id) = editor_with_block("a\u{301}b");
        let buffer = EditBuffer::begin(editor.block(id).unwrap());
        assert_eq!(buffer.end_caret(), 2);
    }
}
