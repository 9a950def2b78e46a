#![no_main]

use guidepost_core::event::{KeyCode, KeyEvent};
use guidepost_core::keyboard::{KeyboardNavigation, NavCommand, NavKeys};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }
    let disabled = NavKeys::from_bits_truncate(data[0]);
    let numeric = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    let policy = KeyboardNavigation::disable(disabled);

    // Decoding must never panic.
    let by_code = KeyEvent::new(KeyCode::from_key_code(numeric));
    let name = std::str::from_utf8(&data[5..]).ok();
    let by_name = name.map(|name| KeyEvent::new(KeyCode::from_dom_key(name)));

    // Config key names resolve to exactly one key.
    if let Some(key) = name.and_then(NavKeys::from_key_name) {
        assert_eq!(key.bits().count_ones(), 1);
    }

    for event in std::iter::once(by_code).chain(by_name) {
        // A disabled key never yields its command.
        match policy.command_for(&event) {
            Some(NavCommand::Close) => assert!(policy.is_enabled(NavKeys::ESC)),
            Some(NavCommand::Previous) => assert!(policy.is_enabled(NavKeys::LEFT)),
            Some(NavCommand::Next) => assert!(policy.is_enabled(NavKeys::RIGHT)),
            None => {}
        }
    }
});
