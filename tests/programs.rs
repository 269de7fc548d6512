/*
 * Copyright 2018 Ian Johnson
 *
 * This is free software, distributed under the MIT license.  A copy of the
 * license can be found in the LICENSE file in the project root, or at
 * https://opensource.org/licenses/MIT.
 */

//! Tests running small programs through the public interpreter interface.

extern crate ocho;

use ocho::display::FONT_SPRITES;
use ocho::input::Key;
use ocho::{Interpreter, Options};

/// Returns an interpreter with the given program loaded and ready to run.
fn with_program(program: &[u8]) -> Interpreter {
    let mut interpreter = Interpreter::with_options(Options::testing());
    interpreter.load_bytes(program).unwrap();
    interpreter
}

#[test]
fn load_register() {
    use ocho::Register::*;

    // LD V0, 0x0A
    let mut interpreter = with_program(&[0x60, 0x0A]);
    interpreter.step().unwrap();

    assert_eq!(interpreter.register(V0), 10);
    assert_eq!(interpreter.pc(), 514);
}

#[test]
fn draw_font_glyph() {
    use ocho::Register::*;

    // LD V1, 0x04; LD F, V1; DRW V0, V0, 5
    let mut interpreter = with_program(&[0x61, 0x04, 0xF1, 0x29, 0xD0, 0x05]);
    for _ in 0..3 {
        interpreter.step().unwrap();
    }

    assert_eq!(interpreter.i().addr(), 20);
    assert_eq!(interpreter.register(VF), 0);
    for row in 0..5 {
        for col in 0..8 {
            let expected = FONT_SPRITES[0x4][row] & (0x80 >> col) != 0;
            assert_eq!(
                interpreter.display().pixel(col, row),
                expected,
                "pixel ({}, {})",
                col,
                row
            );
        }
    }
}

#[test]
fn subroutine_call_and_return() {
    use ocho::Register::*;

    let mut interpreter = with_program(&[
        0x22, 0x06, // 0x200: CALL 0x206
        0x60, 0x2A, // 0x202: LD V0, 0x2A
        0x12, 0x04, // 0x204: JP 0x204
        0x61, 0x07, // 0x206: LD V1, 0x07
        0x00, 0xEE, // 0x208: RET
    ]);
    for _ in 0..4 {
        interpreter.step().unwrap();
    }

    assert_eq!(interpreter.register(V0), 0x2A);
    assert_eq!(interpreter.register(V1), 0x07);
    assert_eq!(interpreter.pc(), 0x204);
}

#[test]
fn wait_for_key() {
    use ocho::Register::*;

    // LD V2, K
    let mut interpreter = with_program(&[0xF2, 0x0A]);
    for _ in 0..5 {
        interpreter.step().unwrap();
        assert_eq!(interpreter.pc(), 0x200);
    }

    interpreter.input_mut().press(Key::K7);
    interpreter.step().unwrap();
    assert_eq!(interpreter.register(V2), 0x7);
    assert_eq!(interpreter.pc(), 0x202);
}

#[test]
fn bcd_store_and_load() {
    use ocho::Register::*;

    // LD V0, 0xFE; LD I, 0x300; LD B, V0; LD V2, [I]
    let mut interpreter = with_program(&[0x60, 0xFE, 0xA3, 0x00, 0xF0, 0x33, 0xF2, 0x65]);
    for _ in 0..4 {
        interpreter.step().unwrap();
    }

    assert_eq!(&interpreter.mem()[0x300..0x303], &[2, 5, 4][..]);
    assert_eq!(interpreter.register(V0), 2);
    assert_eq!(interpreter.register(V1), 5);
    assert_eq!(interpreter.register(V2), 4);
}

#[test]
fn sound_timer_runs_down() {
    // LD V0, 0x03; LD ST, V0
    let mut interpreter = with_program(&[0x60, 0x03, 0xF0, 0x18]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert!(interpreter.sound_active());

    for _ in 0..3 {
        assert!(interpreter.sound_active());
        interpreter.tick_timers();
    }
    assert!(!interpreter.sound_active());
}
