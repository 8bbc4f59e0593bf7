//! Arcade machine built around the 8080 core.
//!
//! Ties the CPU to the external sprite shift register, loads program images
//! under the supported conventions, and drives bounded execution. The whole
//! machine serializes to a versioned JSON save state.

pub mod rom;
pub mod shift;

use emu8080_core::{Cpu, Fault, Flags, Memory, Registers, State};
use serde_json::Value;
use thiserror::Error;

pub use rom::{ImageError, LoadFormat, STACK_TOP};
pub use shift::ShiftRegister;

/// Save state schema version.
const STATE_VERSION: u64 = 1;
/// Save state system tag.
const STATE_SYSTEM: &str = "arcade8080";

#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("save state is for {system:?} version {version}, not this machine")]
    IncompatibleState { system: String, version: u64 },
    #[error("malformed save state: {0}")]
    MalformedState(#[from] serde_json::Error),
}

/// Why a bounded run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The CPU executed HLT.
    Halted,
    /// PC walked past the end of the loaded image.
    RanOffEnd,
    /// The step budget ran out first.
    OutOfSteps,
}

pub struct Machine {
    cpu: Cpu<ShiftRegister>,
    entry: u16,
    steps: u64,
}

impl Machine {
    /// Build a machine from file contents. The encoding is autodetected and
    /// the image placed per `format`, with `org` overriding its origin.
    pub fn load(data: &[u8], format: LoadFormat, org: Option<u16>) -> Result<Self, ImageError> {
        let bytes = rom::decode(data)?;
        let (image, entry) = rom::build(&bytes, format, org)?;
        Ok(Self::from_image(image, entry))
    }

    /// Build a machine from an already placed memory image.
    pub fn from_image(image: Vec<u8>, entry: u16) -> Self {
        let mut machine = Machine {
            cpu: Cpu::new(Memory::new(image), ShiftRegister::new()),
            entry,
            steps: 0,
        };
        machine.reset();
        machine
    }

    /// Put the machine back at its entry point with a fresh stack and shift
    /// register. Memory keeps any modifications the program made.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.regs.pc = self.entry;
        self.cpu.regs.sp = STACK_TOP;
        self.cpu.io = ShiftRegister::new();
        self.steps = 0;
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<State, Fault> {
        let was_halted = self.cpu.halted;
        let state = self.cpu.step()?;
        if !was_halted {
            self.steps += 1;
        }
        Ok(state)
    }

    /// Run until HLT, until PC leaves the image, or for at most `max_steps`
    /// instructions, whichever comes first.
    pub fn run(&mut self, max_steps: u64) -> Result<RunOutcome, Fault> {
        for _ in 0..max_steps {
            if self.is_done() {
                break;
            }
            self.step()?;
        }
        Ok(if self.cpu.halted {
            RunOutcome::Halted
        } else if self.is_done() {
            RunOutcome::RanOffEnd
        } else {
            RunOutcome::OutOfSteps
        })
    }

    pub fn is_done(&self) -> bool {
        self.cpu.is_done()
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn flags(&self) -> &Flags {
        &self.cpu.flags
    }

    pub fn memory(&self) -> &Memory {
        &self.cpu.memory
    }

    pub fn shift(&self) -> &ShiftRegister {
        &self.cpu.io
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.cpu.inte
    }

    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Instructions executed since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn entry(&self) -> u16 {
        self.entry
    }

    /// Serialize the full machine state.
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "version": STATE_VERSION,
            "system": STATE_SYSTEM,
            "entry": self.entry,
            "steps": self.steps,
            "cycles": self.cpu.cycles,
            "halted": self.cpu.halted,
            "inte": self.cpu.inte,
            "registers": self.cpu.regs,
            "flags": self.cpu.flags,
            "shift": self.cpu.io,
            "memory": self.cpu.memory.as_slice(),
        })
    }

    /// Restore a state produced by [`save_state`](Self::save_state).
    pub fn load_state(&mut self, state: &Value) -> Result<(), MachineError> {
        let version = state["version"].as_u64().unwrap_or(0);
        let system = state["system"].as_str().unwrap_or("");
        if version != STATE_VERSION || system != STATE_SYSTEM {
            return Err(MachineError::IncompatibleState {
                system: system.to_string(),
                version,
            });
        }
        let registers: Registers = serde_json::from_value(state["registers"].clone())?;
        let flags: Flags = serde_json::from_value(state["flags"].clone())?;
        let shift: ShiftRegister = serde_json::from_value(state["shift"].clone())?;
        let memory: Vec<u8> = serde_json::from_value(state["memory"].clone())?;
        self.entry = state["entry"].as_u64().unwrap_or(0) as u16;
        self.steps = state["steps"].as_u64().unwrap_or(0);
        self.cpu.cycles = state["cycles"].as_u64().unwrap_or(0);
        self.cpu.halted = state["halted"].as_bool().unwrap_or(false);
        self.cpu.inte = state["inte"].as_bool().unwrap_or(false);
        self.cpu.regs = registers;
        self.cpu.flags = flags;
        self.cpu.io = shift;
        self.cpu.memory.restore(memory);
        log::debug!("restored save state at pc {:#06x}", self.cpu.regs.pc);
        Ok(())
    }
}
