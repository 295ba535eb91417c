//! Adapter from winit keyboard events to the engine's [`KeyEvent`]
//!
//! winit reports the logical key and the physical key position; the physical
//! key's variant names line up with DOM `code` strings, apart from the
//! Super/Meta naming. The legacy numeric code comes from the key table.

use std::time::Instant;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey, PhysicalKey};

use super::event::{KeyEvent, RawInput};
use super::key_table::KeyTable;

/// Convert winit key data to a [`KeyEvent`]
///
/// Returns None for keys winit could not identify at all.
pub fn key_event_from_winit(
    table: &KeyTable,
    logical_key: &Key,
    physical_key: PhysicalKey,
    repeat: bool,
    time: Instant,
) -> Option<KeyEvent> {
    let code = physical_code(physical_key);
    let key = match logical_key {
        Key::Character(s) => s.to_string(),
        Key::Named(named) => named_key_value(*named),
        Key::Dead(_) => "Dead".to_string(),
        // Keep the event if at least the position is known
        Key::Unidentified(_) if code.is_some() => "Unidentified".to_string(),
        Key::Unidentified(_) => return None,
    };

    let code = code.unwrap_or_else(|| "Unidentified".to_string());
    let key_code = table.numeric_code_for_physical(&code).unwrap_or(0);

    Some(KeyEvent::new(key, key_code, code, time).with_repeat(repeat))
}

/// Map a window event to engine input; None for events the registry ignores
pub fn raw_input_from_window_event(
    table: &KeyTable,
    event: &WindowEvent,
    time: Instant,
) -> Option<RawInput> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let key_event = key_event_from_winit(
                table,
                &event.logical_key,
                event.physical_key,
                event.repeat,
                time,
            )?;
            Some(match event.state {
                ElementState::Pressed => RawInput::KeyDown(key_event),
                ElementState::Released => RawInput::KeyUp(key_event),
            })
        }
        WindowEvent::Focused(false) => Some(RawInput::Blur),
        _ => None,
    }
}

fn physical_code(physical_key: PhysicalKey) -> Option<String> {
    match physical_key {
        PhysicalKey::Code(code) => {
            let name = format!("{:?}", code);
            Some(match name.as_str() {
                "SuperLeft" => "MetaLeft".to_string(),
                "SuperRight" => "MetaRight".to_string(),
                _ => name,
            })
        }
        PhysicalKey::Unidentified(_) => None,
    }
}

fn named_key_value(named: NamedKey) -> String {
    match named {
        NamedKey::Space => " ".to_string(),
        NamedKey::Super | NamedKey::Meta => "Meta".to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::event::{EventType, KeyRepr};
    use winit::keyboard::{KeyCode as WinitKeyCode, NativeKeyCode};

    fn convert(logical: Key, physical: PhysicalKey) -> Option<KeyEvent> {
        key_event_from_winit(&KeyTable::native(), &logical, physical, false, Instant::now())
    }

    #[test]
    fn test_character_key() {
        let event = convert(
            Key::Character("s".into()),
            PhysicalKey::Code(WinitKeyCode::KeyS),
        )
        .expect("should map");
        assert_eq!(event.key, "s");
        assert_eq!(event.code, "KeyS");
        assert_eq!(event.key_code, 83);
        assert!(!event.repeat);
    }

    #[test]
    fn test_shifted_character_keeps_case() {
        let event = convert(
            Key::Character("S".into()),
            PhysicalKey::Code(WinitKeyCode::KeyS),
        )
        .expect("should map");
        assert_eq!(event.key, "S");
        assert_eq!(event.key_code, 83);
    }

    #[test]
    fn test_named_keys() {
        let enter = convert(
            Key::Named(NamedKey::Enter),
            PhysicalKey::Code(WinitKeyCode::Enter),
        )
        .expect("should map");
        assert_eq!(enter.key, "Enter");
        assert_eq!(enter.key_code, 13);

        let space = convert(
            Key::Named(NamedKey::Space),
            PhysicalKey::Code(WinitKeyCode::Space),
        )
        .expect("should map");
        assert_eq!(space.key, " ");
        assert_eq!(space.key_code, 32);

        let up = convert(
            Key::Named(NamedKey::ArrowUp),
            PhysicalKey::Code(WinitKeyCode::ArrowUp),
        )
        .expect("should map");
        assert_eq!(up.repr(EventType::PhysicalCode), KeyRepr::name("ArrowUp"));
        assert_eq!(up.key_code, 38);
    }

    #[test]
    fn test_super_maps_to_meta() {
        let event = convert(
            Key::Named(NamedKey::Super),
            PhysicalKey::Code(WinitKeyCode::SuperLeft),
        )
        .expect("should map");
        assert!(event.is_meta());
        assert_eq!(event.code, "MetaLeft");
        assert_eq!(event.key_code, 91);
    }

    #[test]
    fn test_plus_character_is_aliased() {
        let event = convert(
            Key::Character("+".into()),
            PhysicalKey::Code(WinitKeyCode::Equal),
        )
        .expect("should map");
        assert_eq!(event.repr(EventType::Key), KeyRepr::name("equal"));
        assert_eq!(event.key_code, 187);
    }

    #[test]
    fn test_fully_unidentified_key_is_dropped() {
        let event = convert(
            Key::Unidentified(winit::keyboard::NativeKey::Unidentified),
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
        );
        assert!(event.is_none());
    }

    #[test]
    fn test_repeat_flag_carried() {
        let event = key_event_from_winit(
            &KeyTable::native(),
            &Key::Character("a".into()),
            PhysicalKey::Code(WinitKeyCode::KeyA),
            true,
            Instant::now(),
        )
        .expect("should map");
        assert!(event.repeat);
    }

    #[test]
    fn test_focus_lost_is_blur() {
        let table = KeyTable::native();
        let now = Instant::now();
        assert_eq!(
            raw_input_from_window_event(&table, &WindowEvent::Focused(false), now),
            Some(RawInput::Blur)
        );
        assert_eq!(
            raw_input_from_window_event(&table, &WindowEvent::Focused(true), now),
            None
        );
    }
}
