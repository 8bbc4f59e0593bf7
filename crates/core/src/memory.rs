//! Flat guest memory, sized to the loaded image.
//!
//! Every access is bounds-checked against the image size fixed at load time.
//! An out-of-range address is reported as a [`Fault`] instead of clamping or
//! panicking; real programs for this hardware never reference unmapped space
//! intentionally, so hitting one means the run is unrecoverable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Out-of-range access fault. Carries the offending address and the image
/// size so callers can report where the run went off the rails.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("address {addr:#06x} is outside the {size:#x}-byte loaded image")]
pub struct Fault {
    pub addr: u16,
    pub size: usize,
}

/// Byte-addressable memory. Fixed size, no resizing after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Wrap a loaded image. The image length becomes the memory size for the
    /// lifetime of the run.
    pub fn new(image: Vec<u8>) -> Self {
        Memory { bytes: image }
    }

    /// Size of the loaded image in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn index(&self, addr: u16) -> Result<usize, Fault> {
        let index = addr as usize;
        if index < self.bytes.len() {
            Ok(index)
        } else {
            Err(Fault {
                addr,
                size: self.bytes.len(),
            })
        }
    }

    pub fn read(&self, addr: u16) -> Result<u8, Fault> {
        Ok(self.bytes[self.index(addr)?])
    }

    pub fn write(&mut self, addr: u16, val: u8) -> Result<(), Fault> {
        let index = self.index(addr)?;
        self.bytes[index] = val;
        Ok(())
    }

    /// Read a little-endian 16-bit word.
    pub fn read_word(&self, addr: u16) -> Result<u16, Fault> {
        let lo = self.read(addr)? as u16;
        let hi = self.read(addr.wrapping_add(1))? as u16;
        Ok(hi << 8 | lo)
    }

    /// Write a little-endian 16-bit word.
    pub fn write_word(&mut self, addr: u16, val: u16) -> Result<(), Fault> {
        self.write(addr, val as u8)?;
        self.write(addr.wrapping_add(1), (val >> 8) as u8)
    }

    /// Non-faulting read for snapshot consumers (disassembly, memory dumps).
    pub fn get(&self, addr: u16) -> Option<u8> {
        self.bytes.get(addr as usize).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Replace the full contents, e.g. when restoring a save state. The new
    /// image may differ in size; the memory adopts it wholesale.
    pub fn restore(&mut self, image: Vec<u8>) {
        self.bytes = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_in_range() {
        let mut mem = Memory::new(vec![0; 0x100]);
        mem.write(0x00FF, 0xAB).unwrap();
        assert_eq!(mem.read(0x00FF).unwrap(), 0xAB);
    }

    #[test]
    fn test_out_of_range_faults() {
        let mut mem = Memory::new(vec![0; 0x100]);
        assert_eq!(
            mem.read(0x0100),
            Err(Fault {
                addr: 0x0100,
                size: 0x100
            })
        );
        assert!(mem.write(0xFFFF, 1).is_err());
        // a failed write must not touch anything
        assert_eq!(mem.as_slice(), &[0u8; 0x100][..]);
    }

    #[test]
    fn test_word_access_is_little_endian() {
        let mut mem = Memory::new(vec![0; 0x10]);
        mem.write_word(0x0004, 0x1234).unwrap();
        assert_eq!(mem.read(0x0004).unwrap(), 0x34);
        assert_eq!(mem.read(0x0005).unwrap(), 0x12);
        assert_eq!(mem.read_word(0x0004).unwrap(), 0x1234);
    }

    #[test]
    fn test_word_read_faults_when_second_byte_out_of_range() {
        let mem = Memory::new(vec![0; 0x10]);
        let fault = mem.read_word(0x000F).unwrap_err();
        assert_eq!(fault.addr, 0x0010);
    }

    #[test]
    fn test_get_is_total() {
        let mem = Memory::new(vec![7; 4]);
        assert_eq!(mem.get(3), Some(7));
        assert_eq!(mem.get(4), None);
    }
}
