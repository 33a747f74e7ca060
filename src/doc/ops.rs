//! Store commands as values.
//!
//! Every [`Editor`] command has an [`EditOp`] counterpart so that a sequence
//! of edits can be recorded, scripted or replayed through one entry point.

use super::{BlockKind, BlockPatch, BlockType, Editor, PagePatch, Result};
use crate::core::{BlockId, Clock, PageId};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "op", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditOp {
    AddBlock {
        block_type: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    UpdateBlock {
        id: BlockId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<BlockKind>,
    },
    ChangeBlockType {
        id: BlockId,
        block_type: BlockType,
    },
    DeleteBlock {
        id: BlockId,
    },
    MoveBlock {
        from: usize,
        to: usize,
    },
    ReorderBlocks {
        ids: Vec<BlockId>,
    },
    SetActiveBlock {
        #[serde(default)]
        id: Option<BlockId>,
    },
    AddPage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    UpdatePage {
        id: PageId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    DeletePage {
        id: PageId,
    },
    SetCurrentPage {
        id: PageId,
    },
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// What a successfully dispatched op produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "applied", content = "id", rename_all = "snake_case")]
pub enum Applied {
    BlockAdded(BlockId),
    PageAdded(PageId),
    Done,
}

impl<C: Clock> Editor<C> {
    /// Apply one op. On error the state is unchanged.
    pub fn dispatch(&mut self, op: EditOp) -> Result<Applied> {
        let name = op.name();
        let result = match op {
            EditOp::AddBlock { block_type, index } => {
                self.add_block(block_type, index).map(Applied::BlockAdded)
            }
            EditOp::UpdateBlock { id, content, kind } => self
                .update_block(id, BlockPatch { content, kind })
                .map(|()| Applied::Done),
            EditOp::ChangeBlockType { id, block_type } => self
                .change_block_type(id, block_type)
                .map(|()| Applied::Done),
            EditOp::DeleteBlock { id } => self.delete_block(id).map(|()| Applied::Done),
            EditOp::MoveBlock { from, to } => self.move_block(from, to).map(|()| Applied::Done),
            EditOp::ReorderBlocks { ids } => self.reorder_blocks(&ids).map(|()| Applied::Done),
            EditOp::SetActiveBlock { id } => self.set_active_block(id).map(|()| Applied::Done),
            EditOp::AddPage { title } => Ok(Applied::PageAdded(self.add_page(title.as_deref()))),
            EditOp::UpdatePage { id, title } => self
                .update_page(id, PagePatch { title })
                .map(|()| Applied::Done),
            EditOp::DeletePage { id } => self.delete_page(id).map(|()| Applied::Done),
            EditOp::SetCurrentPage { id } => self.set_current_page(id).map(|()| Applied::Done),
        };
        if let Err(err) = &result {
            tracing::debug!(op = name, %err, "op rejected");
        }
        result
    }

    /// Apply ops in order, stopping at the first rejection.
    pub fn dispatch_all(&mut self, ops: impl IntoIterator<Item = EditOp>) -> Result<Vec<Applied>> {
        ops.into_iter().map(|op| self.dispatch(op)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::core::ManualClock;
    use crate::doc::EditError;

    fn blank() -> Editor<ManualClock> {
        Editor::with_clock(EditorConfig::blank(), ManualClock::default())
    }

    #[test]
    fn test_dispatch_reports_created_ids() {
        let mut editor = blank();
        let Applied::BlockAdded(id) = editor
            .dispatch(EditOp::AddBlock {
                block_type: BlockType::Quote,
                index: None,
            })
            .unwrap()
        else {
            panic!("expected a block id");
        };
        assert_eq!(editor.block(id).unwrap().block_type(), BlockType::Quote);

        let Applied::PageAdded(page) = editor.dispatch(EditOp::AddPage { title: None }).unwrap()
        else {
            panic!("expected a page id");
        };
        assert_eq!(editor.current_page().unwrap().id, page);
    }

    #[test]
    fn test_dispatch_all_stops_at_first_error() {
        let mut editor = blank();
        let missing = BlockId::new();
        let result = editor.dispatch_all(vec![
            EditOp::AddBlock {
                block_type: BlockType::Paragraph,
                index: None,
            },
            EditOp::DeleteBlock { id: missing },
            EditOp::AddBlock {
                block_type: BlockType::Paragraph,
                index: None,
            },
        ]);
        assert_eq!(result, Err(EditError::BlockNotFound(missing)));
        assert_eq!(editor.current_page_blocks().len(), 1);
    }

    #[test]
    fn test_op_json_shape() {
        let op: EditOp = serde_json::from_value(serde_json::json!({
            "op": "add_block",
            "block_type": "heading2",
            "index": 0
        }))
        .unwrap();
        assert_eq!(
            op,
            EditOp::AddBlock {
                block_type: BlockType::Heading2,
                index: Some(0)
            }
        );
        assert_eq!(op.name(), "add_block");

        let op: EditOp =
            serde_json::from_value(serde_json::json!({"op": "set_active_block"})).unwrap();
        assert_eq!(op, EditOp::SetActiveBlock { id: None });
    }

    #[test]
    fn test_update_block_op_carries_kind() {
        let mut editor = blank();
        let id = editor.add_block(BlockType::Image, None).unwrap();
        let op: EditOp = serde_json::from_value(serde_json::json!({
            "op": "update_block",
            "id": id,
            "kind": {"type": "image", "url": "https://example.com/a.png"}
        }))
        .unwrap();
        editor.dispatch(op).unwrap();
        assert_eq!(
            editor.block(id).unwrap().kind.url(),
            Some("https://example.com/a.png")
        );
    }
}
