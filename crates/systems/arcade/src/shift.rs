//! External 16-bit shift register.
//!
//! The arcade board pairs the 8080 with a discrete shift register that the
//! game uses to rotate sprite bitmaps, since the CPU has no barrel shifter.
//! It hangs off three I/O ports:
//!
//! - Port 2 (write): set the 3-bit read offset.
//! - Port 4 (write): shift a byte in. The previous high byte drops down to
//!   the low byte and the written value becomes the new high byte.
//! - Port 3 (read): an 8-bit window into the 16-bit value, selected by the
//!   offset. Offset 0 reads the high byte, offset 7 reads almost all the
//!   way down to the low byte.
//!
//! All other ports read as 0 and ignore writes.

use emu8080_core::IoBus;
use serde::{Deserialize, Serialize};

/// Write port selecting the read offset.
pub const PORT_OFFSET: u8 = 2;
/// Read port exposing the shifted window.
pub const PORT_RESULT: u8 = 3;
/// Write port feeding bytes into the register.
pub const PORT_DATA: u8 = 4;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRegister {
    /// Low byte of the 16-bit value (the older write).
    shift0: u8,
    /// High byte (the most recent write).
    shift1: u8,
    /// Read offset, 0..=7.
    offset: u8,
}

impl ShiftRegister {
    pub fn new() -> Self {
        Self::default()
    }

    fn value(&self) -> u16 {
        u16::from(self.shift1) << 8 | u16::from(self.shift0)
    }
}

impl IoBus for ShiftRegister {
    fn port_read(&mut self, port: u8) -> u8 {
        match port {
            PORT_RESULT => (self.value() >> (8 - self.offset)) as u8,
            _ => 0,
        }
    }

    fn port_write(&mut self, port: u8, value: u8) {
        match port {
            PORT_OFFSET => self.offset = value & 0x07,
            PORT_DATA => {
                self.shift0 = self.shift1;
                self.shift1 = value;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_sequence() {
        let mut shift = ShiftRegister::new();
        shift.port_write(PORT_DATA, 0xAA);
        shift.port_write(PORT_DATA, 0x55);
        shift.port_write(PORT_OFFSET, 0);
        assert_eq!(shift.port_read(PORT_RESULT), 0x55);
    }

    #[test]
    fn test_offset_window() {
        let mut shift = ShiftRegister::new();
        shift.port_write(PORT_DATA, 0xAA);
        shift.port_write(PORT_DATA, 0x55);
        // Value is 0x55AA. Offset n exposes bits 15-n..=8-n.
        shift.port_write(PORT_OFFSET, 2);
        assert_eq!(shift.port_read(PORT_RESULT), 0x56);
        shift.port_write(PORT_OFFSET, 7);
        assert_eq!(shift.port_read(PORT_RESULT), 0xD5);
    }

    #[test]
    fn test_offset_masked_to_three_bits() {
        let mut shift = ShiftRegister::new();
        shift.port_write(PORT_DATA, 0x01);
        shift.port_write(PORT_DATA, 0x80);
        shift.port_write(PORT_OFFSET, 0xFF);
        // 0xFF masks down to offset 7, exposing bits 8..=1 of 0x8001.
        assert_eq!(shift.port_read(PORT_RESULT), 0x00);
    }

    #[test]
    fn test_second_write_displaces_low_byte() {
        let mut shift = ShiftRegister::new();
        shift.port_write(PORT_DATA, 0x11);
        shift.port_write(PORT_DATA, 0x22);
        shift.port_write(PORT_DATA, 0x33);
        // 0x11 has been shifted out entirely.
        shift.port_write(PORT_OFFSET, 0);
        assert_eq!(shift.port_read(PORT_RESULT), 0x33);
        shift.port_write(PORT_OFFSET, 7);
        assert_eq!(shift.port_read(PORT_RESULT), 0x91);
    }

    #[test]
    fn test_unmapped_ports() {
        let mut shift = ShiftRegister::new();
        shift.port_write(PORT_DATA, 0xFF);
        shift.port_write(0x10, 0xEE);
        assert_eq!(shift.port_read(0x10), 0);
        assert_eq!(shift.port_read(PORT_DATA), 0);
        // Stray writes must not disturb the register.
        shift.port_write(PORT_OFFSET, 0);
        assert_eq!(shift.port_read(PORT_RESULT), 0xFF);
    }
}
