//! The 8080 register file.
//!
//! Seven 8-bit general registers plus the two 16-bit pointers. The BC/DE/HL
//! pair accessors are views over the 8-bit halves; there is no separate
//! 16-bit storage to drift out of sync. All width overflow wraps, matching
//! hardware register truncation.

use serde::{Deserialize, Serialize};

/// General registers and pointers. Field order follows the PUSH/POP pair
/// encoding (B:C, D:E, H:L).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// BC register pair view.
    pub fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }

    /// DE register pair view.
    pub fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }

    /// HL register pair view. Doubles as the memory operand pointer for the
    /// `M` register encoding.
    pub fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }

    /// Advance PC by `count` bytes, wrapping modulo 65536.
    pub fn advance_pc(&mut self, count: u16) {
        self.pc = self.pc.wrapping_add(count);
    }
}
