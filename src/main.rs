//! Command-line driver: load a hex program file into memory, run the core
//! for a fixed cycle budget (or until BRK), then dump the registers through
//! the sink.

use std::fs;
use std::io::{self, Write};

use clap::{App, Arg};

use tick6502::cpu::Cpu;
use tick6502::loader::parse_program;
use tick6502::memory::{IoSink, Memory};

/// Program used when no path is given on the command line.
const FALLBACK_PROGRAM: &str = "demos/countdown.hex";

/// How many clock ticks the core runs before the driver gives up.
const CYCLE_BUDGET: u64 = 10_000;

/// Sink that prints one record per line to stdout.
struct StdoutSink;

impl IoSink for StdoutSink {
    fn record(&mut self, record: &str) {
        println!("{}", record);
        let _ = io::stdout().flush();
    }
}

fn main() {
    let matches = App::new("tick6502")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cycle-stepped 6502 emulator with memory-mapped output ports")
        .arg(
            Arg::with_name("program")
                .value_name("PROGRAM")
                .help("Hex program file (whitespace-separated bytes, # comments)")
                .index(1),
        )
        .get_matches();

    let path = matches.value_of("program").unwrap_or(FALLBACK_PROGRAM);

    let mut cpu = Cpu::new(Memory::new(StdoutSink));

    match fs::read_to_string(path) {
        Ok(text) => {
            let (bytes, errors) = parse_program(&text);
            for error in &errors {
                eprintln!("warning: {}: {}", path, error);
            }
            eprintln!("loaded {} bytes from {}", bytes.len(), path);
            cpu.memory_mut().load(&bytes);
        }
        Err(error) => {
            // Memory stays zeroed, so the BRK at 0x0000 halts immediately.
            eprintln!("warning: cannot read {}: {}", path, error);
        }
    }

    cpu.reset();
    let ticks = cpu.run(CYCLE_BUDGET);

    let dump = format!(
        "A={:#04x} X={:#04x} Y={:#04x} S={:#04x} P={:#04x} PC={:#06x} ({} ticks, {})",
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.sp(),
        cpu.status().bits(),
        cpu.pc(),
        ticks,
        if cpu.halted() { "halted" } else { "budget exhausted" },
    );
    cpu.memory_mut().sink_mut().record(&dump);
}
