//! Static opcode metadata: the 256-entry dispatch table.
//!
//! One entry per opcode byte carrying the mnemonic, the total encoded length
//! (1, 2, or 3 bytes — documented, never computed), the base cycle count,
//! and how the trailing bytes should be rendered. The executor's PC movement
//! for non-branching opcodes must agree with `size`; conditional CALL/RET
//! add a taken-path penalty on top of `cycles`. The disassembler is driven
//! entirely by this table.
//!
//! The 8080 has no undefined opcodes in the error sense: the unused bytes
//! (0x08/0x10/../0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD) all execute as NOP and
//! are listed that way here.

/// Rendering class for an instruction's trailing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No trailing bytes.
    None,
    /// One immediate data byte.
    Imm8,
    /// Little-endian 16-bit immediate (register-pair load).
    Imm16,
    /// Little-endian 16-bit address.
    Addr,
}

/// Static description of a single opcode.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mnemonic: &'static str,
    /// Total encoded length in bytes, opcode byte included.
    pub size: u8,
    /// Base T-state count; the untaken count for conditional CALL/RET.
    pub cycles: u8,
    pub operand: Operand,
}

const fn op(mnemonic: &'static str, size: u8, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        size,
        cycles,
        operand: Operand::None,
    }
}

const fn imm8(mnemonic: &'static str, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        size: 2,
        cycles,
        operand: Operand::Imm8,
    }
}

const fn imm16(mnemonic: &'static str, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        size: 3,
        cycles,
        operand: Operand::Imm16,
    }
}

const fn addr(mnemonic: &'static str, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        size: 3,
        cycles,
        operand: Operand::Addr,
    }
}

/// The dispatch table, indexed by opcode byte.
pub static OPCODES: [Opcode; 256] = [
    op("NOP", 1, 4),        // 0x00
    imm16("LXI B", 10),     // 0x01
    op("STAX B", 1, 7),     // 0x02
    op("INX B", 1, 5),      // 0x03
    op("INR B", 1, 5),      // 0x04
    op("DCR B", 1, 5),      // 0x05
    imm8("MVI B", 7),       // 0x06
    op("RLC", 1, 4),        // 0x07
    op("NOP", 1, 4),        // 0x08 (alias)
    op("DAD B", 1, 10),     // 0x09
    op("LDAX B", 1, 7),     // 0x0A
    op("DCX B", 1, 5),      // 0x0B
    op("INR C", 1, 5),      // 0x0C
    op("DCR C", 1, 5),      // 0x0D
    imm8("MVI C", 7),       // 0x0E
    op("RRC", 1, 4),        // 0x0F
    op("NOP", 1, 4),        // 0x10 (alias)
    imm16("LXI D", 10),     // 0x11
    op("STAX D", 1, 7),     // 0x12
    op("INX D", 1, 5),      // 0x13
    op("INR D", 1, 5),      // 0x14
    op("DCR D", 1, 5),      // 0x15
    imm8("MVI D", 7),       // 0x16
    op("RAL", 1, 4),        // 0x17
    op("NOP", 1, 4),        // 0x18 (alias)
    op("DAD D", 1, 10),     // 0x19
    op("LDAX D", 1, 7),     // 0x1A
    op("DCX D", 1, 5),      // 0x1B
    op("INR E", 1, 5),      // 0x1C
    op("DCR E", 1, 5),      // 0x1D
    imm8("MVI E", 7),       // 0x1E
    op("RAR", 1, 4),        // 0x1F
    op("NOP", 1, 4),        // 0x20 (alias)
    imm16("LXI H", 10),     // 0x21
    addr("SHLD", 16),       // 0x22
    op("INX H", 1, 5),      // 0x23
    op("INR H", 1, 5),      // 0x24
    op("DCR H", 1, 5),      // 0x25
    imm8("MVI H", 7),       // 0x26
    op("DAA", 1, 4),        // 0x27
    op("NOP", 1, 4),        // 0x28 (alias)
    op("DAD H", 1, 10),     // 0x29
    addr("LHLD", 16),       // 0x2A
    op("DCX H", 1, 5),      // 0x2B
    op("INR L", 1, 5),      // 0x2C
    op("DCR L", 1, 5),      // 0x2D
    imm8("MVI L", 7),       // 0x2E
    op("CMA", 1, 4),        // 0x2F
    op("NOP", 1, 4),        // 0x30 (alias)
    imm16("LXI SP", 10),    // 0x31
    addr("STA", 13),        // 0x32
    op("INX SP", 1, 5),     // 0x33
    op("INR M", 1, 10),     // 0x34
    op("DCR M", 1, 10),     // 0x35
    imm8("MVI M", 10),      // 0x36
    op("STC", 1, 4),        // 0x37
    op("NOP", 1, 4),        // 0x38 (alias)
    op("DAD SP", 1, 10),    // 0x39
    addr("LDA", 13),        // 0x3A
    op("DCX SP", 1, 5),     // 0x3B
    op("INR A", 1, 5),      // 0x3C
    op("DCR A", 1, 5),      // 0x3D
    imm8("MVI A", 7),       // 0x3E
    op("CMC", 1, 4),        // 0x3F
    op("MOV B,B", 1, 5),    // 0x40
    op("MOV B,C", 1, 5),    // 0x41
    op("MOV B,D", 1, 5),    // 0x42
    op("MOV B,E", 1, 5),    // 0x43
    op("MOV B,H", 1, 5),    // 0x44
    op("MOV B,L", 1, 5),    // 0x45
    op("MOV B,M", 1, 7),    // 0x46
    op("MOV B,A", 1, 5),    // 0x47
    op("MOV C,B", 1, 5),    // 0x48
    op("MOV C,C", 1, 5),    // 0x49
    op("MOV C,D", 1, 5),    // 0x4A
    op("MOV C,E", 1, 5),    // 0x4B
    op("MOV C,H", 1, 5),    // 0x4C
    op("MOV C,L", 1, 5),    // 0x4D
    op("MOV C,M", 1, 7),    // 0x4E
    op("MOV C,A", 1, 5),    // 0x4F
    op("MOV D,B", 1, 5),    // 0x50
    op("MOV D,C", 1, 5),    // 0x51
    op("MOV D,D", 1, 5),    // 0x52
    op("MOV D,E", 1, 5),    // 0x53
    op("MOV D,H", 1, 5),    // 0x54
    op("MOV D,L", 1, 5),    // 0x55
    op("MOV D,M", 1, 7),    // 0x56
    op("MOV D,A", 1, 5),    // 0x57
    op("MOV E,B", 1, 5),    // 0x58
    op("MOV E,C", 1, 5),    // 0x59
    op("MOV E,D", 1, 5),    // 0x5A
    op("MOV E,E", 1, 5),    // 0x5B
    op("MOV E,H", 1, 5),    // 0x5C
    op("MOV E,L", 1, 5),    // 0x5D
    op("MOV E,M", 1, 7),    // 0x5E
    op("MOV E,A", 1, 5),    // 0x5F
    op("MOV H,B", 1, 5),    // 0x60
    op("MOV H,C", 1, 5),    // 0x61
    op("MOV H,D", 1, 5),    // 0x62
    op("MOV H,E", 1, 5),    // 0x63
    op("MOV H,H", 1, 5),    // 0x64
    op("MOV H,L", 1, 5),    // 0x65
    op("MOV H,M", 1, 7),    // 0x66
    op("MOV H,A", 1, 5),    // 0x67
    op("MOV L,B", 1, 5),    // 0x68
    op("MOV L,C", 1, 5),    // 0x69
    op("MOV L,D", 1, 5),    // 0x6A
    op("MOV L,E", 1, 5),    // 0x6B
    op("MOV L,H", 1, 5),    // 0x6C
    op("MOV L,L", 1, 5),    // 0x6D
    op("MOV L,M", 1, 7),    // 0x6E
    op("MOV L,A", 1, 5),    // 0x6F
    op("MOV M,B", 1, 7),    // 0x70
    op("MOV M,C", 1, 7),    // 0x71
    op("MOV M,D", 1, 7),    // 0x72
    op("MOV M,E", 1, 7),    // 0x73
    op("MOV M,H", 1, 7),    // 0x74
    op("MOV M,L", 1, 7),    // 0x75
    op("HLT", 1, 7),        // 0x76
    op("MOV M,A", 1, 7),    // 0x77
    op("MOV A,B", 1, 5),    // 0x78
    op("MOV A,C", 1, 5),    // 0x79
    op("MOV A,D", 1, 5),    // 0x7A
    op("MOV A,E", 1, 5),    // 0x7B
    op("MOV A,H", 1, 5),    // 0x7C
    op("MOV A,L", 1, 5),    // 0x7D
    op("MOV A,M", 1, 7),    // 0x7E
    op("MOV A,A", 1, 5),    // 0x7F
    op("ADD B", 1, 4),      // 0x80
    op("ADD C", 1, 4),      // 0x81
    op("ADD D", 1, 4),      // 0x82
    op("ADD E", 1, 4),      // 0x83
    op("ADD H", 1, 4),      // 0x84
    op("ADD L", 1, 4),      // 0x85
    op("ADD M", 1, 7),      // 0x86
    op("ADD A", 1, 4),      // 0x87
    op("ADC B", 1, 4),      // 0x88
    op("ADC C", 1, 4),      // 0x89
    op("ADC D", 1, 4),      // 0x8A
    op("ADC E", 1, 4),      // 0x8B
    op("ADC H", 1, 4),      // 0x8C
    op("ADC L", 1, 4),      // 0x8D
    op("ADC M", 1, 7),      // 0x8E
    op("ADC A", 1, 4),      // 0x8F
    op("SUB B", 1, 4),      // 0x90
    op("SUB C", 1, 4),      // 0x91
    op("SUB D", 1, 4),      // 0x92
    op("SUB E", 1, 4),      // 0x93
    op("SUB H", 1, 4),      // 0x94
    op("SUB L", 1, 4),      // 0x95
    op("SUB M", 1, 7),      // 0x96
    op("SUB A", 1, 4),      // 0x97
    op("SBB B", 1, 4),      // 0x98
    op("SBB C", 1, 4),      // 0x99
    op("SBB D", 1, 4),      // 0x9A
    op("SBB E", 1, 4),      // 0x9B
    op("SBB H", 1, 4),      // 0x9C
    op("SBB L", 1, 4),      // 0x9D
    op("SBB M", 1, 7),      // 0x9E
    op("SBB A", 1, 4),      // 0x9F
    op("ANA B", 1, 4),      // 0xA0
    op("ANA C", 1, 4),      // 0xA1
    op("ANA D", 1, 4),      // 0xA2
    op("ANA E", 1, 4),      // 0xA3
    op("ANA H", 1, 4),      // 0xA4
    op("ANA L", 1, 4),      // 0xA5
    op("ANA M", 1, 7),      // 0xA6
    op("ANA A", 1, 4),      // 0xA7
    op("XRA B", 1, 4),      // 0xA8
    op("XRA C", 1, 4),      // 0xA9
    op("XRA D", 1, 4),      // 0xAA
    op("XRA E", 1, 4),      // 0xAB
    op("XRA H", 1, 4),      // 0xAC
    op("XRA L", 1, 4),      // 0xAD
    op("XRA M", 1, 7),      // 0xAE
    op("XRA A", 1, 4),      // 0xAF
    op("ORA B", 1, 4),      // 0xB0
    op("ORA C", 1, 4),      // 0xB1
    op("ORA D", 1, 4),      // 0xB2
    op("ORA E", 1, 4),      // 0xB3
    op("ORA H", 1, 4),      // 0xB4
    op("ORA L", 1, 4),      // 0xB5
    op("ORA M", 1, 7),      // 0xB6
    op("ORA A", 1, 4),      // 0xB7
    op("CMP B", 1, 4),      // 0xB8
    op("CMP C", 1, 4),      // 0xB9
    op("CMP D", 1, 4),      // 0xBA
    op("CMP E", 1, 4),      // 0xBB
    op("CMP H", 1, 4),      // 0xBC
    op("CMP L", 1, 4),      // 0xBD
    op("CMP M", 1, 7),      // 0xBE
    op("CMP A", 1, 4),      // 0xBF
    op("RNZ", 1, 5),        // 0xC0
    op("POP B", 1, 10),     // 0xC1
    addr("JNZ", 10),        // 0xC2
    addr("JMP", 10),        // 0xC3
    addr("CNZ", 11),        // 0xC4
    op("PUSH B", 1, 11),    // 0xC5
    imm8("ADI", 7),         // 0xC6
    op("RST 0", 1, 11),     // 0xC7
    op("RZ", 1, 5),         // 0xC8
    op("RET", 1, 10),       // 0xC9
    addr("JZ", 10),         // 0xCA
    op("NOP", 1, 4),        // 0xCB (alias)
    addr("CZ", 11),         // 0xCC
    addr("CALL", 17),       // 0xCD
    imm8("ACI", 7),         // 0xCE
    op("RST 1", 1, 11),     // 0xCF
    op("RNC", 1, 5),        // 0xD0
    op("POP D", 1, 10),     // 0xD1
    addr("JNC", 10),        // 0xD2
    imm8("OUT", 10),        // 0xD3
    addr("CNC", 11),        // 0xD4
    op("PUSH D", 1, 11),    // 0xD5
    imm8("SUI", 7),         // 0xD6
    op("RST 2", 1, 11),     // 0xD7
    op("RC", 1, 5),         // 0xD8
    op("NOP", 1, 4),        // 0xD9 (alias)
    addr("JC", 10),         // 0xDA
    imm8("IN", 10),         // 0xDB
    addr("CC", 11),         // 0xDC
    op("NOP", 1, 4),        // 0xDD (alias)
    imm8("SBI", 7),         // 0xDE
    op("RST 3", 1, 11),     // 0xDF
    op("RPO", 1, 5),        // 0xE0
    op("POP H", 1, 10),     // 0xE1
    addr("JPO", 10),        // 0xE2
    op("XTHL", 1, 18),      // 0xE3
    addr("CPO", 11),        // 0xE4
    op("PUSH H", 1, 11),    // 0xE5
    imm8("ANI", 7),         // 0xE6
    op("RST 4", 1, 11),     // 0xE7
    op("RPE", 1, 5),        // 0xE8
    op("PCHL", 1, 5),       // 0xE9
    addr("JPE", 10),        // 0xEA
    op("XCHG", 1, 4),       // 0xEB
    addr("CPE", 11),        // 0xEC
    op("NOP", 1, 4),        // 0xED (alias)
    imm8("XRI", 7),         // 0xEE
    op("RST 5", 1, 11),     // 0xEF
    op("RP", 1, 5),         // 0xF0
    op("POP PSW", 1, 10),   // 0xF1
    addr("JP", 10),         // 0xF2
    op("DI", 1, 4),         // 0xF3
    addr("CP", 11),         // 0xF4
    op("PUSH PSW", 1, 11),  // 0xF5
    imm8("ORI", 7),         // 0xF6
    op("RST 6", 1, 11),     // 0xF7
    op("RM", 1, 5),         // 0xF8
    op("SPHL", 1, 5),       // 0xF9
    addr("JM", 10),         // 0xFA
    op("EI", 1, 4),         // 0xFB
    addr("CM", 11),         // 0xFC
    op("NOP", 1, 4),        // 0xFD (alias)
    imm8("CPI", 7),         // 0xFE
    op("RST 7", 1, 11),     // 0xFF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_kind_agrees_with_size() {
        for (i, entry) in OPCODES.iter().enumerate() {
            let expected = match entry.operand {
                Operand::None => 1,
                Operand::Imm8 => 2,
                Operand::Imm16 | Operand::Addr => 3,
            };
            assert_eq!(entry.size, expected, "opcode {i:#04x}");
        }
    }

    #[test]
    fn test_all_cycle_counts_nonzero() {
        for (i, entry) in OPCODES.iter().enumerate() {
            assert!(entry.cycles >= 4, "opcode {i:#04x}");
        }
    }

    #[test]
    fn test_nop_aliases() {
        let aliases = [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD];
        for opcode in aliases {
            assert_eq!(OPCODES[opcode].mnemonic, "NOP", "opcode {opcode:#04x}");
            assert_eq!(OPCODES[opcode].size, 1);
        }
        let nops = OPCODES.iter().filter(|o| o.mnemonic == "NOP").count();
        assert_eq!(nops, 1 + aliases.len());
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(OPCODES[0xC3].mnemonic, "JMP");
        assert_eq!(OPCODES[0xC3].size, 3);
        assert_eq!(OPCODES[0x76].mnemonic, "HLT");
        assert_eq!(OPCODES[0x36].size, 2);
        assert_eq!(OPCODES[0xCD].cycles, 17);
        assert_eq!(OPCODES[0xE3].cycles, 18);
        assert_eq!(OPCODES[0xDB].mnemonic, "IN");
        assert_eq!(OPCODES[0xD3].mnemonic, "OUT");
    }

    #[test]
    fn test_mov_block_shape() {
        for opcode in 0x40..=0x7F {
            let entry = &OPCODES[opcode];
            if opcode == 0x76 {
                assert_eq!(entry.mnemonic, "HLT");
                continue;
            }
            assert!(entry.mnemonic.starts_with("MOV "), "opcode {opcode:#04x}");
            assert_eq!(entry.size, 1);
            // memory operand costs the extra bus access
            let touches_m = entry.mnemonic.contains('M');
            assert_eq!(entry.cycles, if touches_m { 7 } else { 5 });
        }
    }

    #[test]
    fn test_rst_vectors_are_uniform() {
        for n in 0..8usize {
            let entry = &OPCODES[0xC7 + n * 8];
            assert_eq!(entry.size, 1);
            assert_eq!(entry.cycles, 11);
            assert_eq!(entry.mnemonic, format!("RST {n}"));
        }
    }
}
