use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Modifiers};

/// Current keyboard and focus state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    ///
    /// Returns `false` for a key event that does not change the held set
    /// (auto-repeat presses, releases of keys never seen going down).
    pub fn apply_event(&mut self, ev: &InputEvent) -> bool {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
                true
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Key-ups are not delivered to an unfocused window.
                    self.keys_down.clear();
                }
                true
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => self.keys_down.insert(*key),
                    KeyState::Released => self.keys_down.remove(key),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat: false,
        }
    }

    #[test]
    fn tracks_held_keys() {
        let mut s = InputState::default();
        assert!(s.apply_event(&key(Key::W, KeyState::Pressed)));
        assert!(s.keys_down.contains(&Key::W));
        assert!(s.apply_event(&key(Key::W, KeyState::Released)));
        assert!(!s.keys_down.contains(&Key::W));
    }

    #[test]
    fn repeat_press_does_not_change_state() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::A, KeyState::Pressed));
        assert!(!s.apply_event(&key(Key::A, KeyState::Pressed)));
        assert!(!s.apply_event(&key(Key::D, KeyState::Released)));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Focused(true));
        s.apply_event(&key(Key::Q, KeyState::Pressed));
        s.apply_event(&key(Key::E, KeyState::Pressed));

        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.focused);
        assert!(s.keys_down.is_empty());
    }

    #[test]
    fn key_events_update_modifiers() {
        let mut s = InputState::default();
        let shift = Modifiers { shift: true, ..Default::default() };
        s.apply_event(&InputEvent::Key {
            key: Key::S,
            state: KeyState::Pressed,
            modifiers: shift,
            code: 0,
            repeat: false,
        });
        assert!(s.modifiers.any());
    }
}
