use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps platform keycodes into these variants where possible.
/// For unsupported keys, `Key::Unknown(u32)` carries the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

impl Key {
    /// Character produced by this key without modifiers, if any.
    ///
    /// Letters map to lowercase; used by character-keyed bindings.
    pub fn as_char(self) -> Option<char> {
        const LETTERS: [Key; 26] = [
            Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
            Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
            Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        ];
        const DIGITS: [Key; 10] = [
            Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
            Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
        ];

        if self == Key::Space {
            return Some(' ');
        }
        if let Some(i) = LETTERS.iter().position(|k| *k == self) {
            return Some((b'a' + i as u8) as char);
        }
        DIGITS
            .iter()
            .position(|k| *k == self)
            .map(|i| (b'0' + i as u8) as char)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// Stable platform code when available (e.g. scancode).
        code: u32,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_lowercase_chars() {
        assert_eq!(Key::A.as_char(), Some('a'));
        assert_eq!(Key::W.as_char(), Some('w'));
        assert_eq!(Key::Z.as_char(), Some('z'));
    }

    #[test]
    fn digits_and_space() {
        assert_eq!(Key::Digit0.as_char(), Some('0'));
        assert_eq!(Key::Digit7.as_char(), Some('7'));
        assert_eq!(Key::Space.as_char(), Some(' '));
    }

    #[test]
    fn control_keys_have_no_char() {
        assert_eq!(Key::Escape.as_char(), None);
        assert_eq!(Key::Shift.as_char(), None);
        assert_eq!(Key::Unknown(42).as_char(), None);
    }
}
