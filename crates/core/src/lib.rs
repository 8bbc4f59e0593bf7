//! Intel 8080 emulator core.
//!
//! The CPU core and nothing else: register file, condition flags, pure ALU,
//! bounds-checked memory, the 256-entry opcode metadata table, and the
//! fetch-decode-execute state machine. File loading, the port peripherals,
//! and all human-facing output live in the crates built on top of this one.
//!
//! The core owns its memory for the lifetime of a run and reaches I/O ports
//! only through the [`IoBus`] trait, so the machine crate decides what OUT
//! and IN actually talk to.

pub mod alu;
pub mod cpu;
pub mod flags;
pub mod memory;
pub mod opcode;
pub mod registers;

pub use cpu::{Cpu, IoBus, State};
pub use flags::{Condition, Flags};
pub use memory::{Fault, Memory};
pub use opcode::{Opcode, Operand, OPCODES};
pub use registers::Registers;
