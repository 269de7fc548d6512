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

//! The Chip-8 display buffer.
//!
//! The display is a 64×32 grid of monochrome pixels, stored row by row in a
//! flat array (pixel `(x, y)` lives at index `y * WIDTH + x`).  The only two
//! operations that ever change it are a full clear and the XOR sprite draw;
//! the draw reports whether it erased any pixel that was previously set,
//! which the interpreter records in `VF` as the collision flag.

use std::default::Default;

/// The width of the display, in pixels.
pub const WIDTH: usize = 64;
/// The height of the display, in pixels.
pub const HEIGHT: usize = 32;

/// The height of a font sprite, in bytes (one byte per row).
pub const FONT_HEIGHT: usize = 5;

/// The built-in hex digit sprites.
pub const FONT_SPRITES: [[u8; FONT_HEIGHT]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0],
    [0x20, 0x60, 0x20, 0x20, 0x70],
    [0xF0, 0x10, 0xF0, 0x80, 0xF0],
    [0xF0, 0x10, 0xF0, 0x10, 0xF0],
    [0x90, 0x90, 0xF0, 0x10, 0x10],
    [0xF0, 0x80, 0xF0, 0x10, 0xF0],
    [0xF0, 0x80, 0xF0, 0x90, 0xF0],
    [0xF0, 0x10, 0x20, 0x40, 0x40],
    [0xF0, 0x90, 0xF0, 0x90, 0xF0],
    [0xF0, 0x90, 0xF0, 0x10, 0xF0],
    [0xF0, 0x90, 0xF0, 0x90, 0x90],
    [0xE0, 0x90, 0xE0, 0x90, 0xE0],
    [0xF0, 0x80, 0x80, 0x80, 0xF0],
    [0xE0, 0x90, 0x90, 0x90, 0xE0],
    [0xF0, 0x80, 0xF0, 0x80, 0xF0],
    [0xF0, 0x80, 0xF0, 0x80, 0x80],
];

/// A Chip-8 display buffer.
pub struct Buffer {
    /// The underlying pixel data, row by row.
    data: [bool; WIDTH * HEIGHT],
}

impl Buffer {
    /// Returns a new display buffer with all pixels clear.
    pub fn new() -> Self {
        Buffer {
            data: [false; WIDTH * HEIGHT],
        }
    }

    /// Clears the display.
    pub fn clear(&mut self) {
        for pixel in self.data.iter_mut() {
            *pixel = false;
        }
    }

    /// Returns a reference to the underlying pixel data.
    pub fn data(&self) -> &[bool; WIDTH * HEIGHT] {
        &self.data
    }

    /// Returns the state of the pixel at the given coordinates.
    ///
    /// Panics if the coordinates are outside the display; callers index with
    /// already-wrapped coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.data[index(x, y)]
    }

    /// Draws the given sprite with its origin at the given position,
    /// XOR-ing each set sprite bit into the display.
    ///
    /// Sprite rows are bytes, most significant bit leftmost.  Both the
    /// origin and every drawn pixel wrap around the display edges.  Returns
    /// whether any pixel was flipped from on to off (a collision).
    pub fn draw_sprite(&mut self, sprite: &[u8], x: usize, y: usize) -> bool {
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            for col in 0..8 {
                if byte & (0x80 >> col) != 0 {
                    if self.toggle((x + col) % WIDTH, (y + row) % HEIGHT) {
                        collision = true;
                    }
                }
            }
        }

        collision
    }

    /// Flips the on/off state of the given pixel, returning whether it was
    /// flipped off from the on state.
    fn toggle(&mut self, x: usize, y: usize) -> bool {
        let idx = index(x, y);
        let old = self.data[idx];
        self.data[idx] = !old;

        old
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::new()
    }
}

/// Maps display coordinates to an index into the flat pixel array.
fn index(x: usize, y: usize) -> usize {
    y * WIDTH + x
}

#[cfg(test)]
mod tests {
    use super::{Buffer, FONT_SPRITES, HEIGHT, WIDTH};

    /// Returns whether the 8-wide region with its top-left corner at
    /// `(x, y)` matches the given sprite rows exactly.
    fn region_matches(buffer: &Buffer, sprite: &[u8], x: usize, y: usize) -> bool {
        sprite.iter().enumerate().all(|(row, byte)| {
            (0..8).all(|col| {
                let expected = byte & (0x80 >> col) != 0;
                buffer.pixel((x + col) % WIDTH, (y + row) % HEIGHT) == expected
            })
        })
    }

    /// Tests the flat layout of the pixel data.
    #[test]
    fn data_layout() {
        let mut buffer = Buffer::new();
        buffer.draw_sprite(&[0x80], 5, 3);

        assert!(buffer.pixel(5, 3));
        assert!(buffer.data()[3 * WIDTH + 5]);
        assert_eq!(buffer.data().iter().filter(|&&p| p).count(), 1);
    }

    /// Tests a simple draw with no wrapping or collision.
    #[test]
    fn draw_simple() {
        let mut buffer = Buffer::new();
        let glyph = &FONT_SPRITES[0];

        assert!(!buffer.draw_sprite(glyph, 0, 0));
        assert!(region_matches(&buffer, glyph, 0, 0));
    }

    /// Tests that drawing wraps around the display edges per pixel.
    #[test]
    fn draw_wraps() {
        let mut buffer = Buffer::new();
        buffer.draw_sprite(&[0xFF, 0xFF], WIDTH - 4, HEIGHT - 1);

        // Each row splits across the right edge; the second row wraps to the
        // top of the display.
        for &y in [HEIGHT - 1, 0].iter() {
            for x in 0..WIDTH {
                let expected = x >= WIDTH - 4 || x < 4;
                assert_eq!(buffer.pixel(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    /// Tests that a sprite drawn at unwrapped coordinates lands at the
    /// wrapped position.
    #[test]
    fn draw_origin_wraps() {
        let mut a = Buffer::new();
        let mut b = Buffer::new();

        a.draw_sprite(&FONT_SPRITES[7], 3, 10);
        b.draw_sprite(&FONT_SPRITES[7], 3 + WIDTH, 10 + 3 * HEIGHT);

        assert_eq!(a.data()[..], b.data()[..]);
    }

    /// Tests that drawing the same sprite twice erases it and reports the
    /// collision on the second draw only.
    #[test]
    fn draw_self_inverse() {
        let mut buffer = Buffer::new();
        let glyph = &FONT_SPRITES[0xA];

        assert!(!buffer.draw_sprite(glyph, 20, 12));
        assert!(buffer.draw_sprite(glyph, 20, 12));
        assert!(buffer.data().iter().all(|&p| !p));
    }

    /// Tests that any single erased pixel is reported as a collision.
    #[test]
    fn draw_collision() {
        let mut buffer = Buffer::new();

        // Two sprites overlapping in exactly one pixel.
        assert!(!buffer.draw_sprite(&[0x01], 0, 0));
        assert!(buffer.draw_sprite(&[0xFF], 7, 0));
        assert!(!buffer.pixel(7, 0));
        // The overlap erased (7, 0) but the rest of the second sprite was
        // drawn normally.
        for x in 8..15 {
            assert!(buffer.pixel(x, 0), "pixel ({}, 0)", x);
        }
    }

    /// Tests the clear operation.
    #[test]
    fn clear() {
        let mut buffer = Buffer::new();
        buffer.draw_sprite(&[0xFF; 15], 30, 8);
        buffer.clear();

        assert!(buffer.data().iter().all(|&p| !p));
    }
}
