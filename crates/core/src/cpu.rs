//! Intel 8080 CPU core.
//!
//! Fetch-decode-execute over the loaded image. The dispatcher is a grouped
//! match keyed on the opcode's bit fields (the 8080 encodes its register and
//! condition selectors in fixed positions), with per-opcode length and cycle
//! data coming from the [`OPCODES`] table. All memory traffic is
//! bounds-checked and faults surface from `step()`; the core never exits the
//! process or panics on a bad program.
//!
//! Interrupts are reduced to the EI/DI enable latch. Nothing ever delivers
//! an interrupt, so the latch is observable state and nothing more.

use crate::alu;
use crate::flags::{Condition, Flags};
use crate::memory::{Fault, Memory};
use crate::opcode::OPCODES;
use crate::registers::Registers;

/// Port bus seen by the IN/OUT instructions. Devices hang off this trait;
/// ports nothing claims read as 0.
pub trait IoBus {
    fn port_read(&mut self, port: u8) -> u8 {
        let _ = port;
        0
    }

    fn port_write(&mut self, port: u8, value: u8) {
        let _ = (port, value);
    }
}

/// Dispatcher state reported by `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// Terminal: a HLT was executed. Further steps are no-ops.
    Halted,
}

/// 8080 CPU state plus its memory and port bus.
#[derive(Debug)]
pub struct Cpu<B: IoBus> {
    pub regs: Registers,
    pub flags: Flags,
    pub memory: Memory,
    pub io: B,
    pub halted: bool,
    /// EI/DI latch; tracked, never delivered.
    pub inte: bool,
    /// Accumulated T-states, for reporting only.
    pub cycles: u64,
}

impl<B: IoBus> Cpu<B> {
    pub fn new(memory: Memory, io: B) -> Self {
        Cpu {
            regs: Registers::default(),
            flags: Flags::default(),
            memory,
            io,
            halted: false,
            inte: false,
            cycles: 0,
        }
    }

    /// Clear registers, flags, and the halt/interrupt latches. Memory and
    /// port devices are left alone; callers that need a pristine image
    /// reload it themselves.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.flags = Flags::default();
        self.halted = false;
        self.inte = false;
        self.cycles = 0;
    }

    /// True once the CPU has halted or PC has walked past the end of the
    /// loaded image.
    pub fn is_done(&self) -> bool {
        self.halted || self.regs.pc as usize >= self.memory.size()
    }

    /// Execute exactly one instruction.
    ///
    /// Returns the dispatcher state after the instruction, or the fault if
    /// the fetch or any effective address fell outside the image. Stepping
    /// a halted CPU returns `Halted` without touching any state.
    pub fn step(&mut self) -> Result<State, Fault> {
        if self.halted {
            return Ok(State::Halted);
        }
        let opcode = self.fetch_byte()?;
        let penalty = self.execute(opcode)?;
        self.cycles += OPCODES[opcode as usize].cycles as u64 + penalty as u64;
        Ok(if self.halted {
            State::Halted
        } else {
            State::Running
        })
    }

    fn fetch_byte(&mut self) -> Result<u8, Fault> {
        let val = self.memory.read(self.regs.pc)?;
        self.regs.advance_pc(1);
        Ok(val)
    }

    fn fetch_word(&mut self) -> Result<u16, Fault> {
        let lo = self.fetch_byte()? as u16;
        let hi = self.fetch_byte()? as u16;
        Ok(hi << 8 | lo)
    }

    /// Stack push: high byte at SP-1, low byte at SP-2, SP moves down by 2.
    fn push_word(&mut self, val: u16) -> Result<(), Fault> {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, (val >> 8) as u8)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, val as u8)?;
        Ok(())
    }

    /// Stack pop: low byte at SP, high byte at SP+1, SP moves up by 2.
    fn pop_word(&mut self) -> Result<u16, Fault> {
        let lo = self.memory.read(self.regs.sp)? as u16;
        let hi = self.memory.read(self.regs.sp.wrapping_add(1))? as u16;
        self.regs.sp = self.regs.sp.wrapping_add(2);
        Ok(hi << 8 | lo)
    }

    /// Read the register selected by a 3-bit field; code 6 is the memory
    /// operand at HL.
    fn read_reg(&self, code: u8) -> Result<u8, Fault> {
        Ok(match code {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => self.memory.read(self.regs.hl())?,
            _ => self.regs.a,
        })
    }

    fn write_reg(&mut self, code: u8, val: u8) -> Result<(), Fault> {
        match code {
            0 => self.regs.b = val,
            1 => self.regs.c = val,
            2 => self.regs.d = val,
            3 => self.regs.e = val,
            4 => self.regs.h = val,
            5 => self.regs.l = val,
            6 => self.memory.write(self.regs.hl(), val)?,
            _ => self.regs.a = val,
        }
        Ok(())
    }

    /// Register pair selected by bits 5:4 (BC, DE, HL, SP).
    fn read_pair(&self, sel: u8) -> u16 {
        match sel {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    fn write_pair(&mut self, sel: u8, val: u16) {
        match sel {
            0 => self.regs.set_bc(val),
            1 => self.regs.set_de(val),
            2 => self.regs.set_hl(val),
            _ => self.regs.sp = val,
        }
    }

    /// ALU group selected by bits 5:3 (ADD, ADC, SUB, SBB, ANA, XRA, ORA,
    /// CMP); shared by the register block and the immediate forms.
    fn alu_acc(&mut self, group: u8, operand: u8) {
        let a = self.regs.a;
        let carry = self.flags.carry;
        let (result, flags) = match group {
            0 => alu::add(a, operand, false),
            1 => alu::add(a, operand, carry),
            2 => alu::sub(a, operand, false),
            3 => alu::sub(a, operand, carry),
            4 => alu::and(a, operand),
            5 => alu::xor(a, operand),
            6 => alu::or(a, operand),
            _ => (a, alu::compare(a, operand)),
        };
        self.regs.a = result;
        self.flags = flags;
    }

    /// Operand bytes are consumed whether or not the jump is taken.
    fn jump_if(&mut self, cond: bool) -> Result<(), Fault> {
        let target = self.fetch_word()?;
        if cond {
            self.regs.pc = target;
        }
        Ok(())
    }

    /// Return address is the byte after the 3-byte instruction.
    fn call_if(&mut self, cond: bool) -> Result<(), Fault> {
        let target = self.fetch_word()?;
        if cond {
            self.push_word(self.regs.pc)?;
            self.regs.pc = target;
        }
        Ok(())
    }

    /// A false condition leaves PC alone: RET is a 1-byte instruction, so
    /// only the opcode fetch has moved it.
    fn ret_if(&mut self, cond: bool) -> Result<(), Fault> {
        if cond {
            self.regs.pc = self.pop_word()?;
        }
        Ok(())
    }

    /// Execute one decoded opcode. PC has already moved past the opcode
    /// byte. Returns the taken-path cycle penalty to add on top of the
    /// table's base count.
    fn execute(&mut self, opcode: u8) -> Result<u32, Fault> {
        match opcode {
            // NOP, documented and aliases alike, falls through to the
            // catch-all at the bottom.

            // LXI rp, d16
            0x01 | 0x11 | 0x21 | 0x31 => {
                let val = self.fetch_word()?;
                self.write_pair(opcode >> 4, val);
                Ok(0)
            }

            // STAX / LDAX through BC or DE
            0x02 | 0x12 => {
                let addr = self.read_pair(opcode >> 4);
                self.memory.write(addr, self.regs.a)?;
                Ok(0)
            }
            0x0A | 0x1A => {
                let addr = self.read_pair(opcode >> 4);
                self.regs.a = self.memory.read(addr)?;
                Ok(0)
            }

            // INX / DCX: 16-bit, no flags
            0x03 | 0x13 | 0x23 | 0x33 => {
                let sel = opcode >> 4;
                self.write_pair(sel, self.read_pair(sel).wrapping_add(1));
                Ok(0)
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let sel = opcode >> 4;
                self.write_pair(sel, self.read_pair(sel).wrapping_sub(1));
                Ok(0)
            }

            // INR / DCR: all flags but carry
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let code = (opcode >> 3) & 0x07;
                let (result, flags) = alu::inr(self.read_reg(code)?, self.flags.carry);
                self.write_reg(code, result)?;
                self.flags = flags;
                Ok(0)
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let code = (opcode >> 3) & 0x07;
                let (result, flags) = alu::dcr(self.read_reg(code)?, self.flags.carry);
                self.write_reg(code, result)?;
                self.flags = flags;
                Ok(0)
            }

            // MVI r, d8
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let val = self.fetch_byte()?;
                self.write_reg((opcode >> 3) & 0x07, val)?;
                Ok(0)
            }

            // Rotates touch only carry
            0x07 => {
                self.flags.carry = self.regs.a & 0x80 != 0;
                self.regs.a = self.regs.a.rotate_left(1);
                Ok(0)
            }
            0x0F => {
                self.flags.carry = self.regs.a & 0x01 != 0;
                self.regs.a = self.regs.a.rotate_right(1);
                Ok(0)
            }
            0x17 => {
                let carry_out = self.regs.a & 0x80 != 0;
                self.regs.a = self.regs.a << 1 | self.flags.carry as u8;
                self.flags.carry = carry_out;
                Ok(0)
            }
            0x1F => {
                let carry_out = self.regs.a & 0x01 != 0;
                self.regs.a = self.regs.a >> 1 | (self.flags.carry as u8) << 7;
                self.flags.carry = carry_out;
                Ok(0)
            }

            // DAD rp: 16-bit add into HL, carry only
            0x09 | 0x19 | 0x29 | 0x39 => {
                let (hl, carry) = alu::dad(self.regs.hl(), self.read_pair(opcode >> 4));
                self.regs.set_hl(hl);
                self.flags.carry = carry;
                Ok(0)
            }

            // SHLD / LHLD / STA / LDA direct
            0x22 => {
                let addr = self.fetch_word()?;
                self.memory.write_word(addr, self.regs.hl())?;
                Ok(0)
            }
            0x2A => {
                let addr = self.fetch_word()?;
                let val = self.memory.read_word(addr)?;
                self.regs.set_hl(val);
                Ok(0)
            }
            0x32 => {
                let addr = self.fetch_word()?;
                self.memory.write(addr, self.regs.a)?;
                Ok(0)
            }
            0x3A => {
                let addr = self.fetch_word()?;
                self.regs.a = self.memory.read(addr)?;
                Ok(0)
            }

            // DAA / CMA / STC / CMC
            0x27 => {
                let (result, flags) = alu::daa(self.regs.a, self.flags.carry, self.flags.aux_carry);
                self.regs.a = result;
                self.flags = flags;
                Ok(0)
            }
            0x2F => {
                self.regs.a = !self.regs.a;
                Ok(0)
            }
            0x37 => {
                self.flags.carry = true;
                Ok(0)
            }
            0x3F => {
                self.flags.carry = !self.flags.carry;
                Ok(0)
            }

            // HLT sits in the middle of the MOV block
            0x76 => {
                self.halted = true;
                Ok(0)
            }

            // MOV d, s
            0x40..=0x7F => {
                let val = self.read_reg(opcode & 0x07)?;
                self.write_reg((opcode >> 3) & 0x07, val)?;
                Ok(0)
            }

            // ALU register block
            0x80..=0xBF => {
                let operand = self.read_reg(opcode & 0x07)?;
                self.alu_acc((opcode >> 3) & 0x07, operand);
                Ok(0)
            }

            // ALU immediate forms reuse the same group decode
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let operand = self.fetch_byte()?;
                self.alu_acc((opcode >> 3) & 0x07, operand);
                Ok(0)
            }

            // Conditional and unconditional returns
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                let taken = Condition::decode(opcode).holds(&self.flags);
                self.ret_if(taken)?;
                Ok(if taken { 6 } else { 0 })
            }
            0xC9 => {
                self.ret_if(true)?;
                Ok(0)
            }

            // Conditional and unconditional jumps
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let taken = Condition::decode(opcode).holds(&self.flags);
                self.jump_if(taken)?;
                Ok(0)
            }
            0xC3 => {
                self.jump_if(true)?;
                Ok(0)
            }

            // Conditional and unconditional calls
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let taken = Condition::decode(opcode).holds(&self.flags);
                self.call_if(taken)?;
                Ok(if taken { 6 } else { 0 })
            }
            0xCD => {
                self.call_if(true)?;
                Ok(0)
            }

            // RST n: one-byte call to n*8
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.push_word(self.regs.pc)?;
                self.regs.pc = ((opcode >> 3) & 0x07) as u16 * 8;
                Ok(0)
            }

            // PUSH / POP register pairs
            0xC5 | 0xD5 | 0xE5 => {
                let val = self.read_pair((opcode >> 4) & 0x03);
                self.push_word(val)?;
                Ok(0)
            }
            0xC1 | 0xD1 | 0xE1 => {
                let val = self.pop_word()?;
                self.write_pair((opcode >> 4) & 0x03, val);
                Ok(0)
            }

            // PUSH / POP PSW: accumulator high, packed flags low
            0xF5 => {
                let val = (self.regs.a as u16) << 8 | self.flags.to_psw() as u16;
                self.push_word(val)?;
                Ok(0)
            }
            0xF1 => {
                let val = self.pop_word()?;
                self.regs.a = (val >> 8) as u8;
                self.flags = Flags::from_psw(val as u8);
                Ok(0)
            }

            // XTHL: swap HL with the stack top, SP unchanged
            0xE3 => {
                let stacked = self.memory.read_word(self.regs.sp)?;
                self.memory.write_word(self.regs.sp, self.regs.hl())?;
                self.regs.set_hl(stacked);
                Ok(0)
            }

            // PCHL / SPHL / XCHG
            0xE9 => {
                self.regs.pc = self.regs.hl();
                Ok(0)
            }
            0xF9 => {
                self.regs.sp = self.regs.hl();
                Ok(0)
            }
            0xEB => {
                let de = self.regs.de();
                let hl = self.regs.hl();
                self.regs.set_de(hl);
                self.regs.set_hl(de);
                Ok(0)
            }

            // IN / OUT through the port bus
            0xDB => {
                let port = self.fetch_byte()?;
                self.regs.a = self.io.port_read(port);
                Ok(0)
            }
            0xD3 => {
                let port = self.fetch_byte()?;
                self.io.port_write(port, self.regs.a);
                Ok(0)
            }

            // EI / DI
            0xFB => {
                self.inte = true;
                Ok(0)
            }
            0xF3 => {
                self.inte = false;
                Ok(0)
            }

            // NOP and its aliases
            _ => Ok(0),
        }
    }
}
