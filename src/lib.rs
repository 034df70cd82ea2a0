//! # Cycle-stepped 6502 Emulator Core
//!
//! A clock-tick-driven emulator of the MOS 6502: a fetch/decode/execute
//! state machine over 64 KiB of memory, a five-register file, a pure ALU and
//! a table-driven control decoder. Four memory-mapped output ports emit
//! formatted records to a host-provided sink.
//!
//! ## Quick start
//!
//! ```rust
//! use tick6502::cpu::Cpu;
//! use tick6502::memory::{BufferSink, Memory};
//!
//! // LDA #$2A ; STA $FF01 ; BRK  — print 0x2a on the hex port and halt
//! let mut memory = Memory::new(BufferSink::new());
//! memory.load(&[0xA9, 0x2A, 0x8D, 0x01, 0xFF, 0x00]);
//!
//! let mut cpu = Cpu::new(memory);
//! cpu.run(10_000);
//!
//! assert!(cpu.halted());
//! assert_eq!(cpu.memory().sink().records(), ["0x2a"]);
//! ```
//!
//! ## Architecture
//!
//! Dependencies flow leaves-first:
//!
//! - [`memory`] — 64 KiB array plus output-port side effects on write
//! - [`registers`] — A, X, Y, S, P storage and flag-mutation primitives
//! - [`alu`] — pure 8-bit arithmetic/logic with flag outputs
//! - [`decoder`] — opcode to control-signal bundle, as a seeded 256-entry
//!   table instead of a 256-arm match
//! - [`cpu`] — the per-tick sequencer that owns everything above
//!
//! One [`cpu::Cpu::tick`] call is one edge of the logical clock. Memory has
//! one tick of read latency (the address asserted on tick N is readable on
//! tick N+1), which is what the sequencer's WAIT states model.
//!
//! [`loader`] parses the textual program format the driver feeds in: hex
//! byte tokens with `#` comments, loaded from address 0x0000.

pub mod addressing;
pub mod alu;
pub mod cpu;
pub mod decoder;
pub mod loader;
pub mod memory;
pub mod registers;

pub use addressing::AddressingMode;
pub use cpu::Cpu;
pub use decoder::ControlDecoder;
pub use memory::{BufferSink, IoSink, Memory};
pub use registers::{Register, RegisterFile, Status};
