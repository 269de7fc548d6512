// Copyright 2018 Ian Johnson

// This file is part of Ocho.

// Ocho is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Ocho is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Ocho.  If not, see <http://www.gnu.org/licenses/>.

//! Input handling for the Chip-8 interpreter.
//!
//! The interpreter never polls the host for input; the host writes the
//! sixteen key states into `State` (usually once per frame) and the key
//! instructions read whatever snapshot is present.  All the instruction
//! steps within a frame therefore observe the same key state, which keeps
//! the key-wait instruction from tearing mid-frame.

use std::default::Default;

use num::traits::FromPrimitive;

/// The number of keys on the Chip-8 controller.
const N_KEYS: usize = 16;

enum_from_primitive! {
/// The keys on the Chip-8 controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    K0 = 0,
    K1,
    K2,
    K3,
    K4,
    K5,
    K6,
    K7,
    K8,
    K9,
    KA,
    KB,
    KC,
    KD,
    KE,
    KF
}
}

impl Key {
    /// Returns the key corresponding to the lowest four bits of the given
    /// byte.
    pub fn from_byte(b: u8) -> Key {
        Key::from_u8(b % N_KEYS as u8).unwrap()
    }
}

/// Represents the state of the input device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    /// The key states (`true` means "pressed").
    keys: [bool; N_KEYS],
}

impl State {
    /// Returns a new input state with all keys unpressed.
    pub fn new() -> Self {
        State::default()
    }

    /// Releases all keys.
    pub fn clear(&mut self) {
        self.keys = [false; N_KEYS];
    }

    /// Returns the lowest-numbered key that is currently pressed.
    pub fn first_pressed(&self) -> Option<Key> {
        self.keys
            .iter()
            .position(|&pressed| pressed)
            .map(|i| Key::from_usize(i).unwrap())
    }

    /// Returns whether the given key is pressed.
    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys[key as usize]
    }

    /// Presses the given key.
    pub fn press(&mut self, key: Key) {
        self.set_key(key, true);
    }

    /// Releases the given key.
    pub fn release(&mut self, key: Key) {
        self.set_key(key, false);
    }

    /// Sets the state of the given key.
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.keys[key as usize] = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, State};

    /// Tests the mapping from bytes to keys.
    #[test]
    fn key_from_byte() {
        assert_eq!(Key::from_byte(0x0), Key::K0);
        assert_eq!(Key::from_byte(0x7), Key::K7);
        assert_eq!(Key::from_byte(0xF), Key::KF);
        // Only the low nibble matters.
        assert_eq!(Key::from_byte(0x10), Key::K0);
        assert_eq!(Key::from_byte(0xAB), Key::KB);
    }

    /// Tests pressing and releasing keys.
    #[test]
    fn press_release() {
        let mut state = State::new();

        assert!(!state.is_pressed(Key::K4));
        state.press(Key::K4);
        assert!(state.is_pressed(Key::K4));
        state.release(Key::K4);
        assert!(!state.is_pressed(Key::K4));

        state.set_key(Key::KA, true);
        state.set_key(Key::K2, true);
        state.clear();
        assert_eq!(state, State::new());
    }

    /// Tests that `first_pressed` finds the lowest pressed key and does not
    /// change any key state.
    #[test]
    fn first_pressed() {
        let mut state = State::new();

        assert_eq!(state.first_pressed(), None);
        state.press(Key::KC);
        state.press(Key::K5);
        assert_eq!(state.first_pressed(), Some(Key::K5));
        assert_eq!(state.first_pressed(), Some(Key::K5));
        assert!(state.is_pressed(Key::KC));
    }
}
