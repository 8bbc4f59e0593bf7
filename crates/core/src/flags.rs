//! Condition flags and condition-code decoding.
//!
//! The 8080 keeps five independent condition flags. They travel as a packed
//! byte only across PUSH PSW / POP PSW, using a fixed layout with three
//! constant bits; everywhere else they are plain booleans.

use serde::{Deserialize, Serialize};

use crate::alu;

// PSW bit layout: S Z 0 AC 0 P 1 CY (bit 7 .. bit 0)
const PSW_CARRY: u8 = 1 << 0;
const PSW_ALWAYS_SET: u8 = 1 << 1;
const PSW_PARITY: u8 = 1 << 2;
const PSW_AUX_CARRY: u8 = 1 << 4;
const PSW_ZERO: u8 = 1 << 6;
const PSW_SIGN: u8 = 1 << 7;

/// The five 8080 condition flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Result byte was zero.
    pub zero: bool,
    /// Bit 7 of the result was set.
    pub sign: bool,
    /// Result had an even number of set bits.
    pub parity: bool,
    /// Unsigned overflow out of bit 7, or a borrow for subtract-class ops.
    pub carry: bool,
    /// Carry out of bit 3. Consumed only by DAA.
    pub aux_carry: bool,
}

impl Flags {
    /// Pack the flags into a processor status word byte.
    pub fn to_psw(self) -> u8 {
        let mut psw = PSW_ALWAYS_SET;
        if self.carry {
            psw |= PSW_CARRY;
        }
        if self.parity {
            psw |= PSW_PARITY;
        }
        if self.aux_carry {
            psw |= PSW_AUX_CARRY;
        }
        if self.zero {
            psw |= PSW_ZERO;
        }
        if self.sign {
            psw |= PSW_SIGN;
        }
        psw
    }

    /// Unpack a processor status word byte. The three constant bits are
    /// ignored on the way in, so any byte round-trips to a canonical PSW.
    pub fn from_psw(psw: u8) -> Self {
        Flags {
            zero: psw & PSW_ZERO != 0,
            sign: psw & PSW_SIGN != 0,
            parity: psw & PSW_PARITY != 0,
            carry: psw & PSW_CARRY != 0,
            aux_carry: psw & PSW_AUX_CARRY != 0,
        }
    }

    /// Recompute zero/sign/parity from a result byte, leaving carry and
    /// aux-carry alone.
    pub fn set_zsp(&mut self, value: u8) {
        self.zero = value == 0;
        self.sign = value & 0x80 != 0;
        self.parity = alu::parity(value);
    }
}

/// Condition codes tested by conditional jump/call/return, in opcode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    /// Decode the condition from bits 5:3 of a conditional opcode
    /// (JMP/CALL/RET groups all share this encoding).
    pub fn decode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }

    /// Whether the condition holds under the given flags.
    pub fn holds(self, flags: &Flags) -> bool {
        match self {
            Condition::NotZero => !flags.zero,
            Condition::Zero => flags.zero,
            Condition::NoCarry => !flags.carry,
            Condition::Carry => flags.carry,
            Condition::ParityOdd => !flags.parity,
            Condition::ParityEven => flags.parity,
            Condition::Plus => !flags.sign,
            Condition::Minus => flags.sign,
        }
    }
}
