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

//! The Chip-8 interpreter.
//!
//! The main focus of this module is the `Interpreter` struct, which contains
//! the state of a Chip-8 machine and provides the main interface to be used
//! by the front-end.  The interpreter never drives itself: the host calls
//! `step` to execute single instructions and `tick_timers` at 60 Hz to move
//! the delay and sound timers, so any instruction rate can be had by varying
//! the number of steps per frame.  A frame of a typical front-end looks like
//!
//! 1. write the current key states into `input_mut`,
//! 2. call `tick_timers`,
//! 3. call `step` some number of times,
//! 4. present `display` and sound the buzzer if `sound_active`.
//!
//! Given the same program, options and inputs, execution is fully
//! deterministic; the only source of randomness is the `RND` instruction,
//! whose generator can be seeded through `Options`.

use std::default::Default;
use std::io::Read;
use std::num::Wrapping;
use std::u8;

use failure::Error;
use rand::{self, Rng, SeedableRng, XorShiftRng};

use MEM_SIZE;
use PROG_START;
use PROG_SIZE;
use Register;
use display::{self, FONT_HEIGHT, FONT_SPRITES};
use input::{self, Key};
use instruction::{Address, Instruction, Opcode};
use timer::Timers;

/// The location at which to put the font sprites.
const FONT_START: usize = 0x0;

/// The maximum nesting depth of the call stack.
pub const STACK_DEPTH: usize = 16;

/// An error resulting from a bad `RET` instruction.
#[derive(Debug, Fail)]
#[fail(display = "no subroutine to return from")]
pub struct NotInSubroutineError;

/// An error resulting from a `CALL` past the maximum nesting depth.
#[derive(Debug, Fail)]
#[fail(display = "call stack exceeded the maximum depth of {}", _0)]
pub struct CallStackOverflowError(pub usize);

/// An error resulting from an input program being too large.
#[derive(Debug, Fail)]
#[fail(display = "input program is too large ({} bytes)", _0)]
pub struct ProgramTooLargeError(pub usize);

/// Options for the interpreter.
pub struct Options {
    /// Whether stack faults (a `CALL` past the maximum nesting depth or a
    /// `RET` outside any subroutine) are hard errors rather than ignored
    /// instructions (default `true` in debug builds and `false` otherwise).
    pub strict_stack: bool,
    /// The seed for the random number generator, or `None` to seed it from
    /// the operating system (default `None`).
    pub rng_seed: Option<[u32; 4]>,
}

impl Options {
    /// Returns the default set of options.
    pub fn new() -> Self {
        Options {
            strict_stack: cfg!(debug_assertions),
            rng_seed: None,
        }
    }

    /// Returns a set of options useful for testing (strict stack checking
    /// and a fixed random seed).
    pub fn testing() -> Self {
        Options {
            strict_stack: true,
            rng_seed: Some([1, 2, 3, 4]),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::new()
    }
}

/// A Chip-8 interpreter.
///
/// This struct contains the entire state of a Chip-8 machine and provides
/// all the expected methods for interacting with it, such as stepping
/// through execution and inspecting the internal state.
pub struct Interpreter {
    /// The internal memory.
    mem: [u8; MEM_SIZE],
    /// The display buffer.
    display: display::Buffer,
    /// The input state.
    input: input::State,
    /// The general-purpose registers `V0`-`VF`.
    regs: [Wrapping<u8>; 16],
    /// The special register `I`.
    reg_i: Address,
    /// The delay and sound timers.
    timers: Timers,
    /// The program counter.
    ///
    /// This is a plain `u16` rather than an `Address` because it can validly
    /// point past the end of memory (after falling off the end, or after a
    /// `JP V0` with a large offset); `step` refuses to fetch there, which is
    /// how the machine halts.
    pc: u16,
    /// The call stack (for returning from subroutines).
    call_stack: Vec<u16>,

    /// Whether stack faults are hard errors.
    strict_stack: bool,
    /// The random number generator backing `RND`.
    rng: XorShiftRng,
}

impl Interpreter {
    /// Returns a new interpreter with the default options.
    pub fn new() -> Self {
        Interpreter::with_options(Options::default())
    }

    /// Returns a new interpreter using the given options.
    pub fn with_options(options: Options) -> Self {
        let mut interpreter = Interpreter {
            mem: [0; MEM_SIZE],
            display: display::Buffer::new(),
            input: input::State::new(),
            regs: [Wrapping(0); 16],
            reg_i: Address::from_u16(0).unwrap(),
            timers: Timers::new(),
            pc: PROG_START as u16,
            call_stack: Vec::with_capacity(STACK_DEPTH),

            strict_stack: options.strict_stack,
            rng: match options.rng_seed {
                Some(seed) => XorShiftRng::from_seed(seed),
                None => rand::weak_rng(),
            },
        };
        interpreter.install_font();

        interpreter
    }

    /// Loads program data from the specified source.
    ///
    /// The interpreter is reset first, so the new program starts on a clean
    /// machine.  If the program turns out to be too large to fit in memory,
    /// the interpreter is left untouched.
    pub fn load_program<R: Read>(&mut self, input: &mut R) -> Result<(), Error> {
        let mut program = Vec::new();
        input.read_to_end(&mut program)?;
        self.load_bytes(&program)
    }

    /// Loads a program from a byte slice.
    ///
    /// The semantics are the same as those of `load_program`.
    pub fn load_bytes(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > PROG_SIZE {
            return Err(ProgramTooLargeError(program.len()).into());
        }
        self.reset();
        self.mem[PROG_START..PROG_START + program.len()].copy_from_slice(program);
        info!("loaded {}-byte program", program.len());

        Ok(())
    }

    /// Returns a reference to the display buffer.
    pub fn display(&self) -> &display::Buffer {
        &self.display
    }

    /// Returns a reference to the input state.
    pub fn input(&self) -> &input::State {
        &self.input
    }

    /// Returns a mutable reference to the input state.
    pub fn input_mut(&mut self) -> &mut input::State {
        &mut self.input
    }

    /// Returns a reference to the internal memory.
    pub fn mem(&self) -> &[u8; MEM_SIZE] {
        &self.mem
    }

    /// Returns the value of register `I`.
    pub fn i(&self) -> Address {
        self.reg_i
    }

    /// Sets the value of register `I`.
    pub fn set_i(&mut self, val: Address) {
        self.reg_i = val;
    }

    /// Returns the value of the delay timer.
    pub fn dt(&self) -> u8 {
        self.timers.delay()
    }

    /// Sets the value of the delay timer.
    pub fn set_dt(&mut self, val: u8) {
        self.timers.set_delay(val);
    }

    /// Returns the value of the sound timer.
    pub fn st(&self) -> u8 {
        self.timers.sound()
    }

    /// Sets the value of the sound timer.
    pub fn set_st(&mut self, val: u8) {
        self.timers.set_sound(val);
    }

    /// Ticks the delay and sound timers down once.
    ///
    /// The host should call this at 60 Hz, independently of how many
    /// instruction steps it runs per frame.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// Returns whether the buzzer should currently be sounding.
    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// Returns the value in the given register.
    pub fn register(&self, reg: Register) -> u8 {
        self.regs[reg as usize].0
    }

    /// Sets the given register to the given value.
    pub fn set_register(&mut self, reg: Register, val: u8) {
        self.regs[reg as usize].0 = val
    }

    /// Returns the value of the program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the opcode at the program counter, or `None` if the program
    /// counter has run off the end of memory.
    pub fn current_opcode(&self) -> Option<Opcode> {
        let pc = self.pc as usize;
        if pc + 1 < MEM_SIZE {
            Some(Opcode::from_bytes(self.mem[pc], self.mem[pc + 1]))
        } else {
            None
        }
    }

    /// Returns the instruction at the program counter, or `None` if the
    /// program counter has run off the end of memory or the opcode there
    /// does not encode an instruction.
    pub fn current_instruction(&self) -> Option<Instruction> {
        self.current_opcode().and_then(Instruction::from_opcode)
    }

    /// Performs a single execution step.
    ///
    /// This fetches the opcode at the program counter, advances the program
    /// counter past it and then executes it.  Opcodes that do not encode any
    /// instruction are stepped over without effect, since programs sometimes
    /// keep sprite data or padding in executable regions.  Once the program
    /// counter has run off the end of memory the machine is halted, and
    /// `step` does nothing.
    pub fn step(&mut self) -> Result<(), Error> {
        let opcode = match self.current_opcode() {
            Some(opcode) => opcode,
            None => return Ok(()),
        };
        let fetched_from = self.pc;
        self.pc += 2;

        match Instruction::from_opcode(opcode) {
            Some(ins) => {
                trace!("{:#05X}: {}", fetched_from, ins);
                self.execute(ins)
            }
            None => {
                debug!("{:#05X}: stepping over unknown opcode {}", fetched_from, opcode);
                Ok(())
            }
        }
    }

    /// Executes the given instruction in the current interpreter context.
    ///
    /// The interpreter behaves as if the instruction had just been fetched:
    /// the program counter already points at the following instruction, so
    /// the skip instructions advance it by another two bytes and the jump
    /// instructions overwrite it.
    pub fn execute(&mut self, ins: Instruction) -> Result<(), Error> {
        use self::Instruction::*;

        match ins {
            Cls => self.display.clear(),
            Ret => match self.call_stack.pop() {
                Some(ret) => self.pc = ret,
                None => {
                    if self.strict_stack {
                        return Err(NotInSubroutineError.into());
                    }
                    warn!("no subroutine to return from; ignoring {}", ins);
                }
            },
            Jp(addr) => self.pc = addr.addr() as u16,
            Call(addr) => {
                if self.call_stack.len() < STACK_DEPTH {
                    self.call_stack.push(self.pc);
                    self.pc = addr.addr() as u16;
                } else if self.strict_stack {
                    return Err(CallStackOverflowError(STACK_DEPTH).into());
                } else {
                    warn!("call stack is full; ignoring {}", ins);
                }
            }
            SeByte(reg, b) => if self.register(reg) == b {
                self.pc += 2;
            },
            SneByte(reg, b) => if self.register(reg) != b {
                self.pc += 2;
            },
            SeReg(reg1, reg2) => if self.register(reg1) == self.register(reg2) {
                self.pc += 2;
            },
            LdByte(reg, b) => self.set_register(reg, b),
            AddByte(reg, b) => {
                // `ADD Vx, byte` wraps without touching the carry flag.
                self.regs[reg as usize] += Wrapping(b);
            }
            LdReg(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.set_register(reg1, r2);
            }
            Or(reg1, reg2) => {
                let r1 = self.register(reg1);
                let r2 = self.register(reg2);
                self.set_register(reg1, r1 | r2);
            }
            And(reg1, reg2) => {
                let r1 = self.register(reg1);
                let r2 = self.register(reg2);
                self.set_register(reg1, r1 & r2);
            }
            Xor(reg1, reg2) => {
                let r1 = self.register(reg1);
                let r2 = self.register(reg2);
                self.set_register(reg1, r1 ^ r2);
            }
            AddReg(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.add(reg1, r2);
            }
            Sub(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.sub(reg1, r2);
            }
            Shr(reg) => self.shr(reg),
            Subn(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.subn(reg1, r2);
            }
            Shl(reg) => self.shl(reg),
            SneReg(reg1, reg2) => if self.register(reg1) != self.register(reg2) {
                self.pc += 2;
            },
            LdI(addr) => self.reg_i = addr,
            JpV0(addr) => {
                // The sum is not reduced modulo the memory size; a target
                // past the end of memory halts the machine at the next
                // fetch.
                self.pc = addr.addr() as u16 + self.register(Register::V0) as u16;
            }
            Rnd(reg, b) => {
                let random: u8 = self.rng.gen();
                self.set_register(reg, random & b);
            }
            Drw(reg1, reg2, n) => self.drw(reg1, reg2, n),
            Skp(reg) => if self.input.is_pressed(Key::from_byte(self.register(reg))) {
                self.pc += 2;
            },
            Sknp(reg) => if !self.input.is_pressed(Key::from_byte(self.register(reg))) {
                self.pc += 2;
            },
            LdRegDt(reg) => {
                let dt = self.dt();
                self.set_register(reg, dt);
            }
            LdKey(reg) => match self.input.first_pressed() {
                Some(key) => self.set_register(reg, key as u8),
                // Rewind so the wait repeats on the next step; the host
                // loop keeps running (and ticking timers) in the meantime.
                None => self.pc -= 2,
            },
            LdDtReg(reg) => {
                let r = self.register(reg);
                self.set_dt(r);
            }
            LdSt(reg) => {
                let r = self.register(reg);
                self.set_st(r);
            }
            AddI(reg) => {
                let offset = self.register(reg) as usize;
                self.reg_i = self.reg_i.wrapping_add(offset);
            }
            LdF(reg) => {
                let r = self.register(reg) as usize;
                self.reg_i = Address::from_usize(FONT_START + FONT_HEIGHT * r).unwrap();
            }
            LdB(reg) => self.ld_b(reg),
            LdDerefIReg(reg) => self.ld_deref_i_reg(reg),
            LdRegDerefI(reg) => self.ld_reg_deref_i(reg),
        }

        Ok(())
    }

    /// Returns the interpreter to its power-on state, with the font sprites
    /// installed and all other memory cleared.
    fn reset(&mut self) {
        self.mem = [0; MEM_SIZE];
        self.install_font();
        self.display.clear();
        self.input.clear();
        self.regs = [Wrapping(0); 16];
        self.reg_i = Address::from_u16(0).unwrap();
        self.timers = Timers::new();
        self.pc = PROG_START as u16;
        self.call_stack.clear();
    }

    /// Copies the font sprites into memory.
    fn install_font(&mut self) {
        for (i, sprite) in FONT_SPRITES.iter().enumerate() {
            let start = FONT_START + i * FONT_HEIGHT;
            self.mem[start..start + sprite.len()].copy_from_slice(sprite);
        }
    }

    /// Adds the given byte to the given register, setting `VF` to 1 on carry
    /// or 0 otherwise.
    fn add(&mut self, reg: Register, val: u8) {
        let carry = val > u8::MAX - self.register(reg);
        self.regs[reg as usize] += Wrapping(val);
        self.set_register(Register::VF, carry as u8);
    }

    /// Subtracts the given byte from the given register, setting `VF` to 0
    /// on borrow or 1 otherwise.
    fn sub(&mut self, reg: Register, val: u8) {
        let borrow = val > self.register(reg);
        self.regs[reg as usize] -= Wrapping(val);
        self.set_register(Register::VF, !borrow as u8);
    }

    /// Sets `reg` to `val - reg`, setting `VF` to 0 on borrow or 1
    /// otherwise.
    fn subn(&mut self, reg: Register, val: u8) {
        let borrow = self.register(reg) > val;
        self.regs[reg as usize] = Wrapping(val) - self.regs[reg as usize];
        self.set_register(Register::VF, !borrow as u8);
    }

    /// Shifts the given register left by one bit, setting `VF` to the bit
    /// shifted out.
    fn shl(&mut self, reg: Register) {
        let old = self.register(reg) >> 7;
        let r = self.register(reg);
        self.set_register(reg, r << 1);
        self.set_register(Register::VF, old);
    }

    /// Shifts the given register right by one bit, setting `VF` to the bit
    /// shifted out.
    fn shr(&mut self, reg: Register) {
        let old = self.register(reg) & 1;
        let r = self.register(reg);
        self.set_register(reg, r >> 1);
        self.set_register(Register::VF, old);
    }

    /// Implements the `DRW` operation.
    fn drw(&mut self, reg1: Register, reg2: Register, n: u8) {
        let x = self.register(reg1) as usize;
        let y = self.register(reg2) as usize;

        // The sprite rows are gathered up front because reads through `I`
        // wrap around the end of memory.
        let mut rows = [0u8; 15];
        for row in 0..n as usize {
            rows[row] = self.mem[self.reg_i.wrapping_add(row).addr()];
        }

        let collision = self.display.draw_sprite(&rows[..n as usize], x, y);
        self.set_register(Register::VF, collision as u8);
    }

    /// Implements the `LD B, Vx` operation.
    fn ld_b(&mut self, reg: Register) {
        let val = self.register(reg);
        let addr = self.i();

        self.mem[addr.addr()] = val / 100;
        self.mem[addr.wrapping_add(1).addr()] = val % 100 / 10;
        self.mem[addr.wrapping_add(2).addr()] = val % 10;
    }

    /// Implements the `LD [I], Vx` operation, storing `V0` through `Vx`
    /// inclusive.
    fn ld_deref_i_reg(&mut self, reg: Register) {
        for offset in 0..=reg as usize {
            self.mem[self.reg_i.wrapping_add(offset).addr()] = self.regs[offset].0;
        }
    }

    /// Implements the `LD Vx, [I]` operation, loading `V0` through `Vx`
    /// inclusive.
    fn ld_reg_deref_i(&mut self, reg: Register) {
        for offset in 0..=reg as usize {
            self.regs[offset] = Wrapping(self.mem[self.reg_i.wrapping_add(offset).addr()]);
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
