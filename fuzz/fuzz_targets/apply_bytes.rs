#![no_main]

use blockpad::{BlockType, EditorConfig, Editor, ManualClock};
use libfuzzer_sys::fuzz_target;

// Each 3-byte chunk is one command: selector, then two operands.
fuzz_target!(|data: &[u8]| {
    let mut editor = Editor::with_clock(EditorConfig::default(), ManualClock::default());
    for chunk in data.chunks(3) {
        if chunk.len() < 3 {
            break;
        }
        let (a, b) = (chunk[1] as usize, chunk[2] as usize);
        let block = {
            let blocks = editor.state().blocks();
            (!blocks.is_empty()).then(|| blocks[a % blocks.len()].id)
        };
        let page = {
            let pages = editor.pages();
            pages[a % pages.len()].id
        };
        let block_type = BlockType::all().nth(b % 10).unwrap_or(BlockType::Paragraph);
        let _ = match chunk[0] % 9 {
            0 => editor.add_block(block_type, (b < 200).then_some(b % 16)).map(|_| ()),
            1 => match block {
                Some(id) => editor.delete_block(id),
                None => Ok(()),
            },
            2 => editor.move_block(a % 16, b % 16),
            3 => match block {
                Some(id) => editor.change_block_type(id, block_type),
                None => Ok(()),
            },
            4 => editor.set_active_block(block),
            5 => {
                editor.add_page(None);
                Ok(())
            }
            6 => editor.delete_page(page),
            7 => editor.set_current_page(page),
            _ => {
                let ids: Vec<_> = editor.current_page_blocks().iter().rev().map(|b| b.id).collect();
                editor.reorder_blocks(&ids)
            }
        };
        assert!(editor.state().check_invariants().is_ok());
    }
});
