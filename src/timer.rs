/*
 * Copyright 2018 Ian Johnson
 *
 * This is free software, distributed under the MIT license.  A copy of the
 * license can be found in the LICENSE file in the project root, or at
 * https://opensource.org/licenses/MIT.
 */

//! The delay and sound timers.
//!
//! The two timers count down independently of instruction execution: the
//! host calls `tick` at its own 60 Hz frame rate, however many instructions
//! it runs in between.  Keeping the timers free of any internal clock is
//! what makes the interpreter deterministic and directly testable.

use std::default::Default;

/// The delay and sound timers of a Chip-8 machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    /// The delay timer (`DT`).
    delay: u8,
    /// The sound timer (`ST`).
    sound: u8,
}

impl Timers {
    /// Returns a new pair of timers, both at zero.
    pub fn new() -> Self {
        Timers::default()
    }

    /// Decrements both timers by one, stopping at zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Returns the value of the delay timer.
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Sets the value of the delay timer.
    pub fn set_delay(&mut self, val: u8) {
        self.delay = val;
    }

    /// Returns the value of the sound timer.
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Sets the value of the sound timer.
    pub fn set_sound(&mut self, val: u8) {
        self.sound = val;
    }

    /// Returns whether the buzzer should currently be sounding.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

#[cfg(test)]
mod tests {
    use super::Timers;

    /// Tests that ticking decrements both timers independently.
    #[test]
    fn tick() {
        let mut timers = Timers::new();
        timers.set_delay(3);
        timers.set_sound(1);

        timers.tick();
        assert_eq!(timers.delay(), 2);
        assert_eq!(timers.sound(), 0);

        timers.tick();
        assert_eq!(timers.delay(), 1);
        assert_eq!(timers.sound(), 0);
    }

    /// Tests that the timers stop at zero rather than wrapping.
    #[test]
    fn tick_floors_at_zero() {
        let mut timers = Timers::new();
        timers.set_delay(1);

        for _ in 0..1000 {
            timers.tick();
        }
        assert_eq!(timers.delay(), 0);
        assert_eq!(timers.sound(), 0);
    }

    /// Tests the sound activity flag.
    #[test]
    fn sound_active() {
        let mut timers = Timers::new();
        assert!(!timers.sound_active());

        timers.set_sound(2);
        assert!(timers.sound_active());
        timers.tick();
        assert!(timers.sound_active());
        timers.tick();
        assert!(!timers.sound_active());
    }
}
