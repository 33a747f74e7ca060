use blockpad::{Applied, EditOp, Editor, EditorConfig, ManualClock};
use blockpad_naive_oracle::Workspace;
use proptest::prelude::*;

use op_specs::{op_specs, realize};

/// Mirror an op the store accepted or rejected into the oracle. Returns
/// whether the oracle accepted it.
fn mirror(oracle: &mut Workspace, op: &EditOp, applied: Option<Applied>, default_title: &str) -> bool {
    match op {
        EditOp::AddBlock { index, .. } => match applied {
            Some(Applied::BlockAdded(id)) => oracle.add_block(id, *index),
            _ => false,
        },
        EditOp::UpdateBlock { id, content, .. } => match content {
            Some(content) => oracle.update_block(*id, content),
            None => oracle.content(*id).is_some(),
        },
        EditOp::ChangeBlockType { id, .. } => oracle.content(*id).is_some(),
        EditOp::DeleteBlock { id } => oracle.delete_block(*id),
        EditOp::MoveBlock { from, to } => oracle.move_block(*from, *to),
        EditOp::ReorderBlocks { ids } => {
            let current = oracle
                .current_page()
                .map(|page| oracle.page_sequence(page))
                .unwrap_or_default();
            let mut sorted_ids = ids.clone();
            let mut sorted_current = current.clone();
            sorted_ids.sort();
            sorted_current.sort();
            if sorted_ids != sorted_current {
                return false;
            }
            // A reorder is a sequence of moves in the oracle.
            for (target, id) in ids.iter().enumerate() {
                let Some(page) = oracle.current_page() else {
                    return false;
                };
                let Some(from) = oracle.page_sequence(page).iter().position(|b| b == id) else {
                    return false;
                };
                oracle.move_block(from, target);
            }
            true
        }
        EditOp::SetActiveBlock { id } => oracle.set_active_block(*id),
        EditOp::AddPage { title } => match applied {
            Some(Applied::PageAdded(id)) => {
                oracle.add_page(id, title.as_deref().unwrap_or(default_title));
                true
            }
            _ => false,
        },
        EditOp::UpdatePage { id, .. } => oracle.page_title(*id).is_some(),
        EditOp::DeletePage { id } => oracle.delete_page(*id),
        EditOp::SetCurrentPage { id } => oracle.set_current_page(*id),
    }
}

fn assert_same(editor: &Editor<ManualClock>, oracle: &Workspace) -> Result<(), TestCaseError> {
    let pages: Vec<_> = editor.pages().iter().map(|p| p.id).collect();
    prop_assert_eq!(&pages, &oracle.page_ids());
    prop_assert_eq!(editor.current_page().map(|p| p.id), oracle.current_page());
    prop_assert_eq!(editor.state().active_block_id(), oracle.active_block());
    for page in pages {
        let ids: Vec<_> = editor.page_blocks(page).iter().map(|b| b.id).collect();
        prop_assert_eq!(&ids, &oracle.page_sequence(page));
        for id in ids {
            let content = editor.block(id).map(|b| b.content.as_str());
            prop_assert_eq!(content, oracle.content(id));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]
    #[test]
    fn differential_against_naive_oracle(specs in op_specs()) {
        let config = EditorConfig::blank();
        let default_title = config.default_page_title.clone();
        let mut editor = Editor::with_clock(config, ManualClock::default());
        let first = editor.pages()[0].id;
        let mut oracle = Workspace::new(first, &editor.pages()[0].title);

        for spec in &specs {
            let op = realize(spec, &editor);
            let result = editor.dispatch(op.clone());
            let accepted = mirror(&mut oracle, &op, result.as_ref().ok().copied(), &default_title);
            prop_assert_eq!(result.is_ok(), accepted, "op {:?} disagreed: {:?}", op, result);
            assert_same(&editor, &oracle)?;
        }
    }
}
