use glam::Vec3;

/// One entry of the key table: which rate axis a key drives and in which direction.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Binding {
    key: char,
    axis: usize,
    sign: f32,
    active: bool,
}

const fn bind(key: char, axis: usize, sign: f32) -> Binding {
    Binding { key, axis, sign, active: false }
}

/// Keyboard-driven angular rate.
///
/// Axes are camera-relative: 0 pitch, 1 yaw, 2 roll. Each held key adds its
/// sign to its axis; releasing subtracts it again. A key already held ignores
/// further presses (OS key-repeat), and a key not held ignores releases.
#[derive(Debug, Clone)]
pub struct ManualControls {
    bindings: [Binding; 6],
    rate: Vec3,
}

impl Default for ManualControls {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualControls {
    pub fn new() -> Self {
        Self {
            bindings: [
                bind('w', 0, 1.0),
                bind('s', 0, -1.0),
                bind('a', 1, 1.0),
                bind('d', 1, -1.0),
                bind('q', 2, -1.0),
                bind('e', 2, 1.0),
            ],
            rate: Vec3::ZERO,
        }
    }

    /// Current rate vector in units per second.
    #[inline]
    pub fn rate(&self) -> Vec3 {
        self.rate
    }

    /// Whether `key` is one of the rotation keys.
    pub fn is_mapped(&self, key: char) -> bool {
        self.binding_index(key).is_some()
    }

    /// Handles a key-down. Returns `true` if the rate changed.
    pub fn key_down(&mut self, key: char) -> bool {
        let Some(i) = self.binding_index(key) else { return false };
        let b = &mut self.bindings[i];
        if b.active {
            return false;
        }
        b.active = true;
        self.rate[b.axis] += b.sign;
        true
    }

    /// Handles a key-up. Returns `true` if the rate changed.
    pub fn key_up(&mut self, key: char) -> bool {
        let Some(i) = self.binding_index(key) else { return false };
        let b = &mut self.bindings[i];
        if !b.active {
            return false;
        }
        b.active = false;
        self.rate[b.axis] -= b.sign;
        true
    }

    /// Releases every held key, e.g. after the window loses focus and the
    /// matching key-up events will never arrive.
    pub fn release_all(&mut self) {
        let held: Vec<char> = self
            .bindings
            .iter()
            .filter(|b| b.active)
            .map(|b| b.key)
            .collect();
        for key in held {
            self.key_up(key);
        }
    }

    fn binding_index(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        self.bindings.iter().position(|b| b.key == key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn starts_at_rest() {
        assert_eq!(ManualControls::new().rate(), Vec3::ZERO);
    }

    #[test]
    fn key_down_adds_sign_to_axis() {
        let mut c = ManualControls::new();
        assert!(c.key_down('a'));
        assert_eq!(c.rate(), Vec3::new(0.0, 1.0, 0.0));
        assert!(c.key_down('w'));
        assert!(c.key_down('q'));
        assert_eq!(c.rate(), Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn key_up_subtracts_again() {
        let mut c = ManualControls::new();
        c.key_down('e');
        assert!(c.key_up('e'));
        assert_eq!(c.rate(), Vec3::ZERO);
    }

    #[test]
    fn repeated_key_down_is_ignored() {
        let mut c = ManualControls::new();
        assert!(c.key_down('s'));
        assert!(!c.key_down('s'));
        assert!(!c.key_down('s'));
        assert_eq!(c.rate(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn key_up_without_down_is_ignored() {
        let mut c = ManualControls::new();
        assert!(!c.key_up('d'));
        assert_eq!(c.rate(), Vec3::ZERO);
    }

    #[test]
    fn opposing_yaw_keys_cancel() {
        let mut c = ManualControls::new();
        c.key_down('a');
        c.key_down('d');
        assert_eq!(c.rate().y, 0.0);
        assert_eq!(c.rate(), Vec3::ZERO);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut c = ManualControls::new();
        assert!(!c.key_down('x'));
        assert!(!c.key_up('x'));
        assert!(!c.is_mapped('z'));
        assert_eq!(c.rate(), Vec3::ZERO);
    }

    #[test]
    fn uppercase_maps_like_lowercase() {
        let mut c = ManualControls::new();
        assert!(c.key_down('W'));
        assert!(c.key_up('w'));
        assert_eq!(c.rate(), Vec3::ZERO);
    }

    #[test]
    fn release_all_returns_to_rest() {
        let mut c = ManualControls::new();
        for k in ['w', 'a', 'e', 'd'] {
            c.key_down(k);
        }
        c.release_all();
        assert_eq!(c.rate(), Vec3::ZERO);
        // Keys are no longer active, so a late key-up changes nothing.
        assert!(!c.key_up('w'));
    }

    #[test]
    fn replay_matches_signed_sum_of_effective_events() {
        // Mixed sequence with key-repeat noise and stray releases.
        let events = [
            ('w', true),
            ('w', true),
            ('a', true),
            ('x', true),
            ('a', true),
            ('d', true),
            ('w', false),
            ('w', false),
            ('q', false),
            ('q', true),
            ('e', true),
            ('a', false),
            ('e', true),
            ('s', true),
        ];

        let mut c = ManualControls::new();
        let table: Vec<Binding> = c.bindings.to_vec();
        let mut held = HashSet::new();
        let mut expected = Vec3::ZERO;

        for (key, down) in events {
            if down {
                c.key_down(key);
            } else {
                c.key_up(key);
            }

            let Some(binding) = table.iter().find(|b| b.key == key) else {
                continue;
            };
            if down && held.insert(key) {
                expected[binding.axis] += binding.sign;
            } else if !down && held.remove(&key) {
                expected[binding.axis] -= binding.sign;
            }
        }

        assert_eq!(c.rate(), expected);
        assert_eq!(expected, Vec3::new(-1.0, -1.0, 0.0));
    }
}
