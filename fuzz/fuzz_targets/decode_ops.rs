#![no_main]

use blockpad::{EditOp, Editor, EditorConfig, ManualClock};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(ops) = serde_json::from_slice::<Vec<EditOp>>(data) else {
        return;
    };
    let mut editor = Editor::with_clock(EditorConfig::default(), ManualClock::default());
    for op in ops {
        let _ = editor.dispatch(op);
        assert!(editor.state().check_invariants().is_ok());
    }
});
