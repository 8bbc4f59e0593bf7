use anyhow::{anyhow, Result};
use clap::Parser;
use emu8080_arcade::{LoadFormat, Machine};
use std::fs;
use std::fs::File;
use std::io::{self, Write};

mod disasm;

#[derive(Parser)]
struct Args {
    /// Path to the program image (raw binary or ASCII hex)
    rom: String,

    /// Load convention: "raw", "com" or "diag"
    #[arg(long, default_value = "raw")]
    format: String,

    /// Override the load origin (hex, e.g. 0x0100)
    #[arg(long)]
    org: Option<String>,

    /// Stop after this many instructions
    #[arg(long, default_value_t = 50_000_000)]
    max_steps: u64,

    /// Print each instruction before executing it
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Drop into the interactive monitor instead of running to completion
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Print a disassembly listing of the image and exit
    #[arg(long, default_value_t = false)]
    disassemble: bool,

    /// Write the final machine state to this file as JSON
    #[arg(long)]
    save_state: Option<String>,

    /// Restore a machine state from this file before running
    #[arg(long)]
    load_state: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let format: LoadFormat = args.format.parse()?;
    let org = args.org.as_deref().map(parse_addr).transpose()?;
    let data = fs::read(&args.rom)?;

    if args.disassemble {
        let bytes = emu8080_arcade::rom::decode(&data)?;
        let origin = org.unwrap_or_else(|| format.origin());
        print!("{}", disasm::listing(&bytes, origin));
        return Ok(());
    }

    let mut machine = Machine::load(&data, format, org)?;
    log::info!(
        "loaded {} byte image, entry {:#06x}",
        machine.memory().size(),
        machine.entry()
    );

    if let Some(path) = args.load_state.as_deref() {
        let state = serde_json::from_str(&fs::read_to_string(path)?)?;
        machine.load_state(&state)?;
    }

    if args.interactive {
        monitor(&mut machine, args.max_steps)?;
    } else {
        batch(&mut machine, &args)?;
    }

    if let Some(path) = args.save_state.as_deref() {
        write_state(&machine, path)?;
    }

    Ok(())
}

fn batch(machine: &mut Machine, args: &Args) -> Result<()> {
    let result = if args.trace {
        run_traced(machine, args.max_steps)
    } else {
        machine.run(args.max_steps)
    };
    match result {
        Ok(outcome) => {
            println!("{}", outcome_text(outcome, machine));
            println!("{}", status_line(machine));
            Ok(())
        }
        Err(fault) => {
            println!("{}", status_line(machine));
            Err(fault.into())
        }
    }
}

fn run_traced(
    machine: &mut Machine,
    max_steps: u64,
) -> Result<emu8080_arcade::RunOutcome, emu8080_core::Fault> {
    use emu8080_arcade::RunOutcome;
    for _ in 0..max_steps {
        if machine.is_done() {
            break;
        }
        let line = disasm::at(machine.memory().as_slice(), machine.registers().pc)
            .map(|(line, _)| line)
            .unwrap_or_default();
        machine.step()?;
        println!("{:<34}{}", line, status_line(machine));
    }
    Ok(if machine.halted() {
        RunOutcome::Halted
    } else if machine.is_done() {
        RunOutcome::RanOffEnd
    } else {
        RunOutcome::OutOfSteps
    })
}

const HELP: &str = "\
s [n]         step n instructions (default 1)
c             continue until HLT or end of image
r             print registers
d [addr [n]]  disassemble n instructions (default 10) from addr (default PC)
m addr [n]    dump n bytes of memory (default 64)
save <path>   write a save state
load <path>   restore a save state
q             quit
addresses are hex, counts decimal
";

fn monitor(machine: &mut Machine, max_steps: u64) -> Result<()> {
    println!("{}", status_line(machine));
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        match exec(machine, cmd, &mut parts, max_steps) {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => println!("error: {err:#}"),
        }
    }
    Ok(())
}

fn exec(
    machine: &mut Machine,
    cmd: &str,
    parts: &mut std::str::SplitWhitespace,
    max_steps: u64,
) -> Result<bool> {
    match cmd {
        "q" | "quit" => return Ok(true),
        "h" | "?" | "help" => print!("{HELP}"),
        "s" | "step" => {
            let n: u64 = match parts.next() {
                Some(t) => t.parse()?,
                None => 1,
            };
            for _ in 0..n {
                if machine.is_done() {
                    println!("machine is done");
                    break;
                }
                if let Some((line, _)) =
                    disasm::at(machine.memory().as_slice(), machine.registers().pc)
                {
                    println!("{line}");
                }
                machine.step()?;
            }
            println!("{}", status_line(machine));
        }
        "c" | "continue" => {
            let outcome = machine.run(max_steps)?;
            println!("{}", outcome_text(outcome, machine));
            println!("{}", status_line(machine));
        }
        "r" | "regs" => println!("{}", status_line(machine)),
        "d" | "dis" => {
            let addr = match parts.next() {
                Some(t) => parse_addr(t)?,
                None => machine.registers().pc,
            };
            let n: usize = match parts.next() {
                Some(t) => t.parse()?,
                None => 10,
            };
            print!("{}", disasm::window(machine.memory().as_slice(), addr, n));
        }
        "m" | "mem" => {
            let addr = parse_addr(parts.next().ok_or_else(|| anyhow!("usage: m addr [n]"))?)?;
            let n: u16 = match parts.next() {
                Some(t) => t.parse()?,
                None => 64,
            };
            print!("{}", hex_dump(machine.memory().as_slice(), addr, n));
        }
        "save" => {
            let path = parts.next().ok_or_else(|| anyhow!("usage: save <path>"))?;
            write_state(machine, path)?;
            println!("saved {path}");
        }
        "load" => {
            let path = parts.next().ok_or_else(|| anyhow!("usage: load <path>"))?;
            let state = serde_json::from_str(&fs::read_to_string(path)?)?;
            machine.load_state(&state)?;
            println!("{}", status_line(machine));
        }
        other => println!("unknown command {other:?}, h for help"),
    }
    Ok(false)
}

fn write_state(machine: &Machine, path: &str) -> Result<()> {
    let mut f = File::create(path)?;
    write!(f, "{}", serde_json::to_string_pretty(&machine.save_state())?)?;
    Ok(())
}

fn outcome_text(outcome: emu8080_arcade::RunOutcome, machine: &Machine) -> String {
    use emu8080_arcade::RunOutcome;
    let what = match outcome {
        RunOutcome::Halted => "HLT",
        RunOutcome::RanOffEnd => "end of image",
        RunOutcome::OutOfSteps => "step budget exhausted",
    };
    format!(
        "stopped: {} after {} instructions, {} cycles",
        what,
        machine.steps(),
        machine.cycles()
    )
}

fn status_line(machine: &Machine) -> String {
    let r = machine.registers();
    let f = machine.flags();
    format!(
        "A={:02x} BC={:04x} DE={:04x} HL={:04x} SP={:04x} PC={:04x}  Z={} S={} P={} CY={} AC={}",
        r.a,
        r.bc(),
        r.de(),
        r.hl(),
        r.sp,
        r.pc,
        f.zero as u8,
        f.sign as u8,
        f.parity as u8,
        f.carry as u8,
        f.aux_carry as u8
    )
}

fn parse_addr(s: &str) -> Result<u16> {
    let t = s.trim_start_matches("0x").trim_start_matches("0X");
    Ok(u16::from_str_radix(t, 16)?)
}

fn hex_dump(memory: &[u8], addr: u16, count: u16) -> String {
    let start = (addr as usize).min(memory.len());
    let end = start.saturating_add(count as usize).min(memory.len());
    let mut out = String::new();
    for (i, chunk) in memory[start..end].chunks(16).enumerate() {
        out.push_str(&format!("{:04x} ", start + i * 16));
        for b in chunk {
            out.push_str(&format!(" {b:02x}"));
        }
        out.push('\n');
    }
    out
}
