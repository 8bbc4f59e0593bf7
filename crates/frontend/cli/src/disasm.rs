//! Table driven disassembler over the shared opcode metadata.
//!
//! Every line carries the address, the raw bytes, and the decoded text:
//!
//! ```text
//! 0004  c2 04 00  JNZ $0004
//! ```
//!
//! Immediates render as `#$nn`/`#$nnnn`, addresses as `$nnnn`. A multi-byte
//! instruction whose operand bytes run past the end of the image degrades to
//! a `.db` line for the opcode byte alone.

use emu8080_core::{Operand, OPCODES};

/// Decode one instruction. Returns the formatted line and the number of
/// bytes consumed, or `None` when `addr` is outside the image.
pub fn at(memory: &[u8], addr: u16) -> Option<(String, u16)> {
    let start = addr as usize;
    let opcode = *memory.get(start)?;
    let desc = &OPCODES[opcode as usize];
    let size = desc.size as usize;
    if memory.len() - start < size {
        let line = format!("{:04x}  {:<8}  .db ${:02x}", addr, format!("{opcode:02x}"), opcode);
        return Some((line, 1));
    }
    let raw = memory[start..start + size]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    let text = match desc.operand {
        Operand::None => desc.mnemonic.to_string(),
        Operand::Imm8 => {
            format!("{}{}#${:02x}", desc.mnemonic, separator(desc.mnemonic), memory[start + 1])
        }
        Operand::Imm16 => {
            let word = u16::from(memory[start + 2]) << 8 | u16::from(memory[start + 1]);
            format!("{}{}#${:04x}", desc.mnemonic, separator(desc.mnemonic), word)
        }
        Operand::Addr => {
            let word = u16::from(memory[start + 2]) << 8 | u16::from(memory[start + 1]);
            format!("{}{}${:04x}", desc.mnemonic, separator(desc.mnemonic), word)
        }
    };
    Some((format!("{addr:04x}  {raw:<8}  {text}"), size as u16))
}

// Mnemonics with a register baked in ("MVI B") take their operand after a
// comma; bare ones ("ADI") after a space.
fn separator(mnemonic: &str) -> &'static str {
    if mnemonic.contains(' ') {
        ","
    } else {
        " "
    }
}

/// Disassemble the whole image from `origin` to the end.
pub fn listing(memory: &[u8], origin: u16) -> String {
    let mut out = String::new();
    let mut addr = origin;
    while let Some((line, size)) = at(memory, addr) {
        out.push_str(&line);
        out.push('\n');
        match addr.checked_add(size) {
            Some(next) => addr = next,
            None => break,
        }
    }
    out
}

/// Disassemble up to `count` instructions starting at `addr`.
pub fn window(memory: &[u8], addr: u16, count: usize) -> String {
    let mut out = String::new();
    let mut addr = addr;
    for _ in 0..count {
        let Some((line, size)) = at(memory, addr) else {
            break;
        };
        out.push_str(&line);
        out.push('\n');
        match addr.checked_add(size) {
            Some(next) => addr = next,
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_opcode() {
        let (line, size) = at(&[0x00], 0).unwrap();
        assert_eq!(line, "0000  00        NOP");
        assert_eq!(size, 1);
    }

    #[test]
    fn test_immediate_with_register() {
        let (line, size) = at(&[0x06, 0x42], 0).unwrap();
        assert_eq!(line, "0000  06 42     MVI B,#$42");
        assert_eq!(size, 2);
    }

    #[test]
    fn test_bare_immediate() {
        let (line, _) = at(&[0xC6, 0x05], 0).unwrap();
        assert_eq!(line, "0000  c6 05     ADI #$05");
    }

    #[test]
    fn test_pair_immediate() {
        let (line, size) = at(&[0x21, 0x34, 0x12], 0).unwrap();
        assert_eq!(line, "0000  21 34 12  LXI H,#$1234");
        assert_eq!(size, 3);
    }

    #[test]
    fn test_jump_address() {
        let mem = [0x00, 0xC2, 0x04, 0x00];
        let (line, _) = at(&mem, 1).unwrap();
        assert_eq!(line, "0001  c2 04 00  JNZ $0004");
    }

    #[test]
    fn test_truncated_operand_renders_db() {
        let (line, size) = at(&[0xC3], 0).unwrap();
        assert_eq!(line, "0000  c3        .db $c3");
        assert_eq!(size, 1);
    }

    #[test]
    fn test_out_of_image() {
        assert!(at(&[0x00], 1).is_none());
    }

    #[test]
    fn test_listing_walks_sizes() {
        let mem = [0x3E, 0x42, 0x76];
        let lines: Vec<String> = listing(&mem, 0).lines().map(String::from).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0000  3e 42     MVI A,#$42");
        assert_eq!(lines[1], "0002  76        HLT");
    }

    #[test]
    fn test_window_respects_count() {
        let mem = [0x00, 0x00, 0x00, 0x00];
        assert_eq!(window(&mem, 0, 2).lines().count(), 2);
    }
}
