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

//! Chip-8 instructions and opcodes.
//!
//! This module provides the basic types and functions for working with Chip-8
//! instructions and opcodes, including (most notably) the translation of
//! opcodes to the internal `Instruction` type.  The design of this module is
//! intended to make higher-level components, like the interpreter, as simple
//! and understandable as possible: operand extraction and address bounds are
//! dealt with here, so that the interpreter never has to pick apart a raw
//! `u16` or double-check a register index.
//!
//! Opcode patterns which do not correspond to any Chip-8 instruction are not
//! an error at this level: `Instruction::from_opcode` returns `None` for
//! them, and the interpreter treats such opcodes as no-ops.  Rejecting them
//! loudly would break real programs, which sometimes carry sprite data or
//! padding in executable regions.

use std::fmt;

use num::FromPrimitive;

use MEM_SIZE;

/// An error resulting from an out-of-bounds address.
#[derive(Debug, Fail, PartialEq, Eq)]
#[fail(display = "address out of bounds: {:#05X}", _0)]
pub struct AddressOutOfBoundsError(pub usize);

enum_from_primitive! {
/// A Chip-8 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    V0 = 0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    VF,
}
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", *self)
    }
}

/// A Chip-8 opcode.
///
/// Having this as a wrapper around an ordinary `u16` allows for some nice
/// helper methods to be implemented, which make decoding opcodes much easier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Returns the opcode formed from the given two bytes, high byte first.
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode((high as u16) << 8 | low as u16)
    }

    /// Returns the `Vx` register corresponding to this opcode.
    ///
    /// This does not guarantee that the result is actually meaningful.
    fn vx(&self) -> Register {
        Register::from_u16((self.0 & 0x0F00) >> 8).unwrap()
    }

    /// Returns the `Vy` register corresponding to this opcode.
    ///
    /// This does not guarantee that the result is actually meaningful.
    fn vy(&self) -> Register {
        Register::from_u16((self.0 & 0x00F0) >> 4).unwrap()
    }

    /// Returns the `nibble` corresponding to this opcode.
    ///
    /// This does not guarantee that the result is actually meaningful.
    fn nibble(&self) -> u8 {
        self.0 as u8 & 0xF
    }

    /// Returns the `byte` corresponding to this opcode.
    ///
    /// This does not guarantee that the result is actually meaningful.
    fn byte(&self) -> u8 {
        self.0 as u8
    }

    /// Returns the `addr` corresponding to this opcode.
    ///
    /// The address operand is only 12 bits wide, so it is always in bounds.
    fn addr(&self) -> Address {
        Address::from_u16(self.0 & 0x0FFF).unwrap()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:04X}", self.0)
    }
}

/// An address pointing to a Chip-8 memory location.
///
/// All addresses must be within the addressable range (the 12-bit space of
/// 0-4095); this condition is guaranteed to hold for any instance of this
/// type.  Address arithmetic performed during execution (index register
/// increments, sprite row reads and the register/BCD store instructions)
/// wraps around the address space, which `wrapping_add` implements.
///
/// # Examples
///
/// Addresses must be within the proper bounds:
///
/// ```
/// use ocho::Address;
///
/// let addr = Address::from_u16(0x204).unwrap();
/// assert_eq!(addr.addr(), 0x204);
/// assert!(Address::from_u16(0x1000).is_err());
/// ```
///
/// Arithmetic wraps modulo the memory size:
///
/// ```
/// use ocho::Address;
///
/// let addr = Address::from_u16(0xFFF).unwrap();
/// assert_eq!(addr.wrapping_add(2).addr(), 0x001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(usize);

impl Address {
    /// Verifies whether the given `u16` address value is valid, returning the
    /// corresponding `Address` if it is.
    pub fn from_u16(addr: u16) -> Result<Self, AddressOutOfBoundsError> {
        Address::from_usize(addr as usize)
    }

    /// Verifies whether the given `usize` address is valid, returning the
    /// corresponding `Address` if it is.
    pub fn from_usize(addr: usize) -> Result<Self, AddressOutOfBoundsError> {
        if addr >= MEM_SIZE {
            Err(AddressOutOfBoundsError(addr))
        } else {
            Ok(Address(addr))
        }
    }

    /// Returns the value of the address.
    pub fn addr(&self) -> usize {
        self.0
    }

    /// Returns the address offset by `rhs`, wrapping around the address
    /// space.
    pub fn wrapping_add(self, rhs: usize) -> Self {
        Address((self.0 + rhs) % MEM_SIZE)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#05X}", self.0)
    }
}

/// A Chip-8 instruction.
///
/// This is an internal representation used to make working with instructions
/// easier; if this type were not present, then opcodes would have to be
/// deciphered every time an instruction is used, which would quickly become
/// inconvenient.
///
/// # Examples
///
/// Instructions can be created from opcodes:
///
/// ```
/// use ocho::{Instruction, Opcode, Register};
///
/// let instr = Instruction::from_opcode(Opcode(0x7510));
/// assert_eq!(instr, Some(Instruction::AddByte(Register::V5, 0x10)));
/// ```
///
/// Opcodes with no corresponding instruction translate to `None`:
///
/// ```
/// use ocho::{Instruction, Opcode};
///
/// assert_eq!(Instruction::from_opcode(Opcode(0x00FD)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `CLS` (`00E0`).
    Cls,
    /// `RET` (`00EE`).
    Ret,
    /// `JP addr` (`1nnn`).
    Jp(Address),
    /// `CALL addr` (`2nnn`).
    Call(Address),
    /// `SE Vx, byte` (`3xkk`).
    SeByte(Register, u8),
    /// `SNE Vx, byte` (`4xkk`).
    SneByte(Register, u8),
    /// `SE Vx, Vy` (`5xy0`).
    SeReg(Register, Register),
    /// `LD Vx, byte` (`6xkk`).
    LdByte(Register, u8),
    /// `ADD Vx, byte` (`7xkk`).
    AddByte(Register, u8),
    /// `LD Vx, Vy` (`8xy0`).
    LdReg(Register, Register),
    /// `OR Vx, Vy` (`8xy1`).
    Or(Register, Register),
    /// `AND Vx, Vy` (`8xy2`).
    And(Register, Register),
    /// `XOR Vx, Vy` (`8xy3`).
    Xor(Register, Register),
    /// `ADD Vx, Vy` (`8xy4`).
    AddReg(Register, Register),
    /// `SUB Vx, Vy` (`8xy5`).
    Sub(Register, Register),
    /// `SHR Vx` (`8xy6`).
    Shr(Register),
    /// `SUBN Vx, Vy` (`8xy7`).
    Subn(Register, Register),
    /// `SHL Vx` (`8xyE`).
    Shl(Register),
    /// `SNE Vx, Vy` (`9xy0`).
    SneReg(Register, Register),
    /// `LD I, addr` (`Annn`).
    LdI(Address),
    /// `JP V0, addr` (`Bnnn`).
    JpV0(Address),
    /// `RND Vx, byte` (`Cxkk`).
    Rnd(Register, u8),
    /// `DRW Vx, Vy, nibble` (`Dxyn`).
    Drw(Register, Register, u8),
    /// `SKP Vx` (`Ex9E`).
    Skp(Register),
    /// `SKNP Vx` (`ExA1`).
    Sknp(Register),
    /// `LD Vx, DT` (`Fx07`).
    LdRegDt(Register),
    /// `LD Vx, K` (`Fx0A`).
    LdKey(Register),
    /// `LD DT, Vx` (`Fx15`).
    LdDtReg(Register),
    /// `LD ST, Vx` (`Fx18`).
    LdSt(Register),
    /// `ADD I, Vx` (`Fx1E`).
    AddI(Register),
    /// `LD F, Vx` (`Fx29`).
    LdF(Register),
    /// `LD B, Vx` (`Fx33`).
    LdB(Register),
    /// `LD [I], Vx` (`Fx55`).
    LdDerefIReg(Register),
    /// `LD Vx, [I]` (`Fx65`).
    LdRegDerefI(Register),
}

impl Instruction {
    /// Returns the instruction corresponding to the given opcode, or `None`
    /// if the opcode does not encode any Chip-8 instruction.
    ///
    /// Opcodes in classes 5 and 9 decode as `SE Vx, Vy` and `SNE Vx, Vy`
    /// regardless of the low nibble, and the shift instructions `8xy6` and
    /// `8xyE` operate on `Vx` alone; the unused operand bits are accepted
    /// and ignored.
    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        use self::Instruction::*;

        Some(match (opcode.0 & 0xF000) >> 12 {
            0x0 => match opcode.0 & 0x0FFF {
                0x0E0 => Cls,
                0x0EE => Ret,
                _ => return None,
            },
            0x1 => Jp(opcode.addr()),
            0x2 => Call(opcode.addr()),
            0x3 => SeByte(opcode.vx(), opcode.byte()),
            0x4 => SneByte(opcode.vx(), opcode.byte()),
            0x5 => SeReg(opcode.vx(), opcode.vy()),
            0x6 => LdByte(opcode.vx(), opcode.byte()),
            0x7 => AddByte(opcode.vx(), opcode.byte()),
            0x8 => match opcode.0 & 0xF {
                0x0 => LdReg(opcode.vx(), opcode.vy()),
                0x1 => Or(opcode.vx(), opcode.vy()),
                0x2 => And(opcode.vx(), opcode.vy()),
                0x3 => Xor(opcode.vx(), opcode.vy()),
                0x4 => AddReg(opcode.vx(), opcode.vy()),
                0x5 => Sub(opcode.vx(), opcode.vy()),
                0x6 => Shr(opcode.vx()),
                0x7 => Subn(opcode.vx(), opcode.vy()),
                0xE => Shl(opcode.vx()),
                _ => return None,
            },
            0x9 => SneReg(opcode.vx(), opcode.vy()),
            0xA => LdI(opcode.addr()),
            0xB => JpV0(opcode.addr()),
            0xC => Rnd(opcode.vx(), opcode.byte()),
            0xD => Drw(opcode.vx(), opcode.vy(), opcode.nibble()),
            0xE => match opcode.0 & 0xFF {
                0x9E => Skp(opcode.vx()),
                0xA1 => Sknp(opcode.vx()),
                _ => return None,
            },
            0xF => match opcode.0 & 0xFF {
                0x07 => LdRegDt(opcode.vx()),
                0x0A => LdKey(opcode.vx()),
                0x15 => LdDtReg(opcode.vx()),
                0x18 => LdSt(opcode.vx()),
                0x1E => AddI(opcode.vx()),
                0x29 => LdF(opcode.vx()),
                0x33 => LdB(opcode.vx()),
                0x55 => LdDerefIReg(opcode.vx()),
                0x65 => LdRegDerefI(opcode.vx()),
                _ => return None,
            },
            _ => unreachable!("4-bit quantity didn't match 0-15"),
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(addr) => write!(f, "JP {}", addr),
            Call(addr) => write!(f, "CALL {}", addr),
            SeByte(reg, b) => write!(f, "SE {}, #{:02X}", reg, b),
            SneByte(reg, b) => write!(f, "SNE {}, #{:02X}", reg, b),
            SeReg(reg1, reg2) => write!(f, "SE {}, {}", reg1, reg2),
            LdByte(reg, b) => write!(f, "LD {}, #{:02X}", reg, b),
            AddByte(reg, b) => write!(f, "ADD {}, #{:02X}", reg, b),
            LdReg(reg1, reg2) => write!(f, "LD {}, {}", reg1, reg2),
            Or(reg1, reg2) => write!(f, "OR {}, {}", reg1, reg2),
            And(reg1, reg2) => write!(f, "AND {}, {}", reg1, reg2),
            Xor(reg1, reg2) => write!(f, "XOR {}, {}", reg1, reg2),
            AddReg(reg1, reg2) => write!(f, "ADD {}, {}", reg1, reg2),
            Sub(reg1, reg2) => write!(f, "SUB {}, {}", reg1, reg2),
            Shr(reg) => write!(f, "SHR {}", reg),
            Subn(reg1, reg2) => write!(f, "SUBN {}, {}", reg1, reg2),
            Shl(reg) => write!(f, "SHL {}", reg),
            SneReg(reg1, reg2) => write!(f, "SNE {}, {}", reg1, reg2),
            LdI(addr) => write!(f, "LD I, {}", addr),
            JpV0(addr) => write!(f, "JP V0, {}", addr),
            Rnd(reg, b) => write!(f, "RND {}, #{:02X}", reg, b),
            Drw(reg1, reg2, n) => write!(f, "DRW {}, {}, {}", reg1, reg2, n),
            Skp(reg) => write!(f, "SKP {}", reg),
            Sknp(reg) => write!(f, "SKNP {}", reg),
            LdRegDt(reg) => write!(f, "LD {}, DT", reg),
            LdKey(reg) => write!(f, "LD {}, K", reg),
            LdDtReg(reg) => write!(f, "LD DT, {}", reg),
            LdSt(reg) => write!(f, "LD ST, {}", reg),
            AddI(reg) => write!(f, "ADD I, {}", reg),
            LdF(reg) => write!(f, "LD F, {}", reg),
            LdB(reg) => write!(f, "LD B, {}", reg),
            LdDerefIReg(reg) => write!(f, "LD [I], {}", reg),
            LdRegDerefI(reg) => write!(f, "LD {}, [I]", reg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Address, Instruction, Opcode};

    /// Tests the operand extraction and translation of valid opcodes.
    #[test]
    fn decode_valid() {
        use super::Instruction::*;
        use super::Register::*;

        let addr = |n| Address::from_u16(n).unwrap();
        // Test cases, in the format (opcode, instruction).
        let cases = [
            (0x00E0, Cls),
            (0x00EE, Ret),
            (0x1234, Jp(addr(0x234))),
            (0x2FFE, Call(addr(0xFFE))),
            (0x3A42, SeByte(VA, 0x42)),
            (0x4B00, SneByte(VB, 0x00)),
            (0x5120, SeReg(V1, V2)),
            (0x512F, SeReg(V1, V2)),
            (0x6CFF, LdByte(VC, 0xFF)),
            (0x7801, AddByte(V8, 0x01)),
            (0x8120, LdReg(V1, V2)),
            (0x8341, Or(V3, V4)),
            (0x8562, And(V5, V6)),
            (0x8783, Xor(V7, V8)),
            (0x89A4, AddReg(V9, VA)),
            (0x8BC5, Sub(VB, VC)),
            (0x8D06, Shr(VD)),
            (0x8DE6, Shr(VD)),
            (0x8EF7, Subn(VE, VF)),
            (0x800E, Shl(V0)),
            (0x871E, Shl(V7)),
            (0x9340, SneReg(V3, V4)),
            (0x9341, SneReg(V3, V4)),
            (0xA123, LdI(addr(0x123))),
            (0xB456, JpV0(addr(0x456))),
            (0xC77F, Rnd(V7, 0x7F)),
            (0xD125, Drw(V1, V2, 5)),
            (0xE09E, Skp(V0)),
            (0xEFA1, Sknp(VF)),
            (0xF207, LdRegDt(V2)),
            (0xF30A, LdKey(V3)),
            (0xF415, LdDtReg(V4)),
            (0xF518, LdSt(V5)),
            (0xF61E, AddI(V6)),
            (0xF729, LdF(V7)),
            (0xF833, LdB(V8)),
            (0xF955, LdDerefIReg(V9)),
            (0xFA65, LdRegDerefI(VA)),
        ];

        for &(opcode, ref instr) in cases.iter() {
            assert_eq!(
                Instruction::from_opcode(Opcode(opcode)).as_ref(),
                Some(instr),
                "opcode {:#06X}",
                opcode
            );
        }
    }

    /// Tests that unrecognized opcodes translate to `None`.
    #[test]
    fn decode_unknown() {
        // A sampling of patterns with no Chip-8 meaning, including the
        // Super-Chip extension opcodes, which this machine does not
        // implement.
        let cases = [
            0x0000, 0x0123, 0x00C4, 0x00FB, 0x00FC, 0x00FD, 0x00FE, 0x00FF, 0x01E0, 0x01EE,
            0x8128, 0x8129, 0x812D, 0x812F, 0xE000, 0xE19F, 0xE2A0, 0xF000, 0xF101, 0xF230,
            0xF356, 0xF475, 0xF585, 0xF6FF,
        ];

        for &opcode in cases.iter() {
            assert_eq!(
                Instruction::from_opcode(Opcode(opcode)),
                None,
                "opcode {:#06X}",
                opcode
            );
        }
    }

    /// Tests the address bounds checks and wrapping arithmetic.
    #[test]
    fn address_bounds() {
        assert!(Address::from_usize(0xFFF).is_ok());
        assert!(Address::from_usize(0x1000).is_err());
        assert!(Address::from_u16(0xFFFF).is_err());

        let addr = Address::from_u16(0xFFE).unwrap();
        assert_eq!(addr.wrapping_add(1).addr(), 0xFFF);
        assert_eq!(addr.wrapping_add(2).addr(), 0x000);
        assert_eq!(addr.wrapping_add(5).addr(), 0x003);
    }

    /// Tests the `Display` implementation for instructions.
    #[test]
    fn display() {
        let cases = [
            (0x00E0, "CLS"),
            (0x1234, "JP 0x234"),
            (0x3A42, "SE VA, #42"),
            (0x8126, "SHR V1"),
            (0xD125, "DRW V1, V2, 5"),
            (0xF30A, "LD V3, K"),
            (0xF955, "LD [I], V9"),
        ];

        for &(opcode, repr) in cases.iter() {
            let instr = Instruction::from_opcode(Opcode(opcode)).unwrap();
            assert_eq!(format!("{}", instr), repr, "opcode {:#06X}", opcode);
        }
    }
}
