//! # Sequencer
//!
//! The per-tick state machine that couples the control decoder, the ALU, the
//! register file and memory. One call to [`Cpu::tick`] is one edge of the
//! logical clock and advances the machine by exactly one state.
//!
//! ## State machine
//!
//! ```text
//! FETCH ─► WAIT_INSTRUCTION ─► DECODE ─┬─► EXECUTE                  (implied)
//!                                      ├─► WAIT_OPERAND ─► EXECUTE  (immediate,
//!                                      │                             relative,
//!                                      │                             stack pull)
//!                                      └─► FETCH_ADDR_LOW ─► PROCESS_ADDR_LOW
//!                                            │        (zero page: to WAIT_OPERAND)
//!                                            ▼
//!                                          FETCH_ADDR_HIGH ─► PROCESS_ADDR_HIGH
//!                                            │       (absolute: to WAIT_OPERAND)
//!                                            ▼
//!                                          FETCH_INDIRECT_HIGH ─► PROCESS_INDIRECT_HIGH
//!                                                                  ─► WAIT_OPERAND
//! EXECUTE ─► WAIT_ALU ─► FETCH   (when the ALU participates)
//! EXECUTE ─► FETCH              (otherwise)
//! ```
//!
//! Memory is synchronous with one tick of latency: the address asserted on
//! tick N is readable as `mem_r_data` on tick N+1. The WAIT states exist to
//! model that latency; `tick` latches `mem_r_data` from the currently
//! asserted address before running the state logic.
//!
//! ## Shadow accumulator
//!
//! A register-file write and its propagation back to the ALU's `a` input do
//! not settle within the tick that issues them, so the sequencer keeps a
//! shadow copy of A, updated simultaneously with every write to A, and feeds
//! the shadow to the ALU. Back-to-back arithmetic on A depends on this.

use crate::addressing::AddressingMode;
use crate::alu::{self, AluOp};
use crate::decoder::{ControlDecoder, Controls};
use crate::memory::{IoSink, Memory};
use crate::registers::{Register, RegisterFile, Status};

/// Sequencer state, one variant per tick-consuming step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fetch,
    WaitInstruction,
    Decode,
    WaitOperand,
    FetchAddrLow,
    ProcessAddrLow,
    FetchAddrHigh,
    ProcessAddrHigh,
    FetchIndirectHigh,
    ProcessIndirectHigh,
    Execute,
    WaitAlu,
}

/// The CPU core: sequencer state plus exclusive ownership of memory and the
/// register file.
///
/// # Examples
///
/// ```
/// use tick6502::cpu::Cpu;
/// use tick6502::memory::{BufferSink, Memory};
///
/// let mut memory = Memory::new(BufferSink::new());
/// memory.load(&[0xA9, 0x42, 0x00]); // LDA #$42 ; BRK
///
/// let mut cpu = Cpu::new(memory);
/// cpu.run(100);
///
/// assert_eq!(cpu.a(), 0x42);
/// assert!(cpu.halted());
/// ```
pub struct Cpu<S: IoSink> {
    memory: Memory<S>,
    regs: RegisterFile,
    decoder: ControlDecoder,

    state: State,
    pc: u16,
    ir: u8,
    /// Decoded control bundle for the current IR.
    controls: Controls,
    /// Last operand byte fetched through the bus.
    operand: u8,
    effective_addr: u16,
    /// Low half of an indirect pointer while the high half is in flight.
    pointer_low: u8,
    /// Shadow copy of A presented to the ALU.
    shadow_a: u8,

    /// Address currently asserted on the memory bus.
    mem_addr: u16,
    /// Data the bus presented at the top of this tick.
    mem_r_data: u8,

    // ALU inputs latched during EXECUTE for the WAIT_ALU settle tick.
    alu_a: u8,
    alu_b: u8,
    alu_carry_in: bool,

    halted: bool,
    ticks: u64,
}

impl<S: IoSink> Cpu<S> {
    /// Creates a CPU in the reset state owning `memory`.
    pub fn new(memory: Memory<S>) -> Self {
        let decoder = ControlDecoder::new();
        let controls = *decoder.decode(0x00);
        Self {
            memory,
            regs: RegisterFile::new(),
            decoder,
            state: State::Fetch,
            pc: 0x0000,
            ir: 0x00,
            controls,
            operand: 0x00,
            effective_addr: 0x0000,
            pointer_low: 0x00,
            shadow_a: 0x00,
            mem_addr: 0x0000,
            mem_r_data: 0x00,
            alu_a: 0,
            alu_b: 0,
            alu_carry_in: false,
            halted: false,
            ticks: 0,
        }
    }

    /// Synchronous reset: PC to 0x0000 (no vector fetch), IR cleared, state
    /// machine back to FETCH, register file to its reset values. Memory is
    /// untouched; the loader owns its contents.
    pub fn reset(&mut self) {
        self.state = State::Fetch;
        self.pc = 0x0000;
        self.ir = 0x00;
        self.controls = *self.decoder.decode(0x00);
        self.operand = 0x00;
        self.effective_addr = 0x0000;
        self.pointer_low = 0x00;
        self.shadow_a = 0x00;
        self.mem_addr = 0x0000;
        self.mem_r_data = 0x00;
        self.halted = false;
        self.regs.reset();
    }

    /// Advances the state machine by one clock tick. A no-op once halted.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }
        self.ticks += 1;

        // Synchronous RAM: present the data for the address asserted on the
        // previous tick before any state logic runs.
        self.mem_r_data = self.memory.read(self.mem_addr);

        match self.state {
            State::Fetch => {
                self.mem_addr = self.pc;
                self.state = State::WaitInstruction;
            }
            State::WaitInstruction => self.state = State::Decode,
            State::Decode => self.decode(),
            State::WaitOperand => self.state = State::Execute,
            State::FetchAddrLow => self.state = State::ProcessAddrLow,
            State::ProcessAddrLow => self.process_addr_low(),
            State::FetchAddrHigh => self.state = State::ProcessAddrHigh,
            State::ProcessAddrHigh => self.process_addr_high(),
            State::FetchIndirectHigh => self.state = State::ProcessIndirectHigh,
            State::ProcessIndirectHigh => self.process_indirect_high(),
            State::Execute => self.execute(),
            State::WaitAlu => self.wait_alu(),
        }
    }

    /// Runs for at most `max_ticks` clock ticks, stopping early on halt.
    /// Returns the number of ticks consumed.
    pub fn run(&mut self, max_ticks: u64) -> u64 {
        let start = self.ticks;
        while self.ticks - start < max_ticks && !self.halted {
            self.tick();
        }
        self.ticks - start
    }

    // ========== State handlers ==========

    fn decode(&mut self) {
        self.ir = self.mem_r_data;
        self.controls = *self.decoder.decode(self.ir);

        if self.controls.halt {
            self.halted = true;
            return;
        }

        match self.controls.mode {
            AddressingMode::Implied => {
                if self.controls.mem_oe {
                    // Stack pull: ride the operand path through the byte
                    // above the stack pointer.
                    let addr = 0x0100 | self.regs.read(Register::S).wrapping_add(1) as u16;
                    self.effective_addr = addr;
                    self.mem_addr = addr;
                    self.state = State::WaitOperand;
                } else {
                    self.state = State::Execute;
                }
            }
            AddressingMode::Immediate | AddressingMode::Relative => {
                self.effective_addr = self.pc.wrapping_add(1);
                self.mem_addr = self.effective_addr;
                self.state = State::WaitOperand;
            }
            _ => {
                // Every EA-computing mode starts by fetching the byte after
                // the opcode.
                self.mem_addr = self.pc.wrapping_add(1);
                self.state = State::FetchAddrLow;
            }
        }
    }

    fn process_addr_low(&mut self) {
        let low = self.mem_r_data;
        match self.controls.mode {
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                self.effective_addr = low as u16;
                self.mem_addr = self.pc.wrapping_add(2);
                self.state = State::FetchAddrHigh;
            }
            AddressingMode::ZeroPage => {
                self.assert_operand_addr(low as u16);
            }
            AddressingMode::ZeroPageX => {
                self.assert_operand_addr(low.wrapping_add(self.regs.read(Register::X)) as u16);
            }
            AddressingMode::ZeroPageY => {
                self.assert_operand_addr(low.wrapping_add(self.regs.read(Register::Y)) as u16);
            }
            AddressingMode::IndirectX => {
                // Pointer lives at (operand + X) in zero page.
                self.effective_addr = low.wrapping_add(self.regs.read(Register::X)) as u16;
                self.mem_addr = self.effective_addr;
                self.state = State::FetchAddrHigh;
            }
            AddressingMode::IndirectY => {
                self.effective_addr = low as u16;
                self.mem_addr = self.effective_addr;
                self.state = State::FetchAddrHigh;
            }
            mode => unreachable!("no address phase for {:?}", mode),
        }
    }

    fn process_addr_high(&mut self) {
        match self.controls.mode {
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                let base = ((self.mem_r_data as u16) << 8) | self.effective_addr;
                let ea = match self.controls.mode {
                    AddressingMode::AbsoluteX => {
                        base.wrapping_add(self.regs.read(Register::X) as u16)
                    }
                    AddressingMode::AbsoluteY => {
                        base.wrapping_add(self.regs.read(Register::Y) as u16)
                    }
                    _ => base,
                };
                self.assert_operand_addr(ea);
            }
            AddressingMode::IndirectX | AddressingMode::IndirectY => {
                // First pointer byte arrived; the second wraps within zero
                // page.
                self.pointer_low = self.mem_r_data;
                self.mem_addr = self.effective_addr.wrapping_add(1) & 0x00FF;
                self.state = State::FetchIndirectHigh;
            }
            mode => unreachable!("no high-address phase for {:?}", mode),
        }
    }

    fn process_indirect_high(&mut self) {
        let mut pointer = ((self.mem_r_data as u16) << 8) | self.pointer_low as u16;
        if self.controls.mode == AddressingMode::IndirectY {
            pointer = pointer.wrapping_add(self.regs.read(Register::Y) as u16);
        }
        self.assert_operand_addr(pointer);
    }

    /// Final step of every addressing path: latch the EA, assert it, and go
    /// wait for the operand.
    fn assert_operand_addr(&mut self, ea: u16) {
        self.effective_addr = ea;
        self.mem_addr = ea;
        self.state = State::WaitOperand;
    }

    fn execute(&mut self) {
        let c = self.controls;
        let is_store = c.mem_we && !c.alu_enable;

        // (1) Latch the operand unless this is a store (stores never read
        // their target). Stack pulls arrive through the same path.
        if (c.mode.has_operand() || c.mem_oe) && !is_store {
            self.operand = self.mem_r_data;
        }

        // (2) Branches resolve here: condition against P, signed offset from
        // the address after the instruction.
        if let Some(cond) = c.branch {
            let taken = self.regs.status().contains(cond.flag) == cond.branch_if_set;
            let next = self.pc.wrapping_add(c.mode.instruction_len());
            self.pc = if taken {
                next.wrapping_add_signed((self.operand as i8) as i16)
            } else {
                next
            };
            self.state = State::Fetch;
            return;
        }

        // (3) ALU operations latch their inputs and settle one tick later.
        if c.alu_enable {
            let (a, b) = self.alu_inputs(&c);
            self.alu_a = a;
            self.alu_b = b;
            self.alu_carry_in = self.regs.status().contains(Status::CARRY);
            self.state = State::WaitAlu;
            return;
        }

        // (4) Loads without the ALU write the operand straight through;
        // flags come from the written byte.
        if c.reg_we {
            let data = self.operand;
            self.write_register(c.reg_dst, data, c.set_flags, data == 0, data & 0x80 != 0);
            if c.mem_oe && c.mode == AddressingMode::Implied {
                // Stack pull consumed one byte.
                let s = self.regs.read(Register::S).wrapping_add(1);
                self.regs.write(Register::S, s, false, false, false);
            }
        }

        // (5) Stores write the source register at the EA; pushes write it at
        // the stack pointer and move S down.
        if c.mem_we {
            let data = if c.reg_src == Register::P {
                // A software-pushed P carries the break bit.
                self.regs.read(Register::P) | Status::BREAK.bits()
            } else {
                self.regs.read(c.reg_src)
            };
            if c.mode == AddressingMode::Implied {
                let s = self.regs.read(Register::S);
                self.memory.write(0x0100 | s as u16, data);
                self.regs.write(Register::S, s.wrapping_sub(1), false, false, false);
            } else {
                self.memory.write(self.effective_addr, data);
            }
        }

        // (6) Program counter update.
        self.advance_pc(&c);

        // (7) Direct flag signals latch this tick.
        if let Some(signal) = c.flag_signal {
            self.regs.apply(signal);
        }

        self.state = State::Fetch;
    }

    fn wait_alu(&mut self) {
        let c = self.controls;
        let out = alu::evaluate(self.alu_a, self.alu_b, self.alu_carry_in, c.alu_op);

        if c.reg_we {
            self.write_register(c.reg_dst, out.result, c.set_flags, out.zero, out.negative);
        } else if c.set_flags {
            // Compares update flags without a register write.
            self.regs.update_nz(out.zero, out.negative);
        }

        // Read-modify-write stores the ALU result back at the EA.
        if c.mem_we {
            self.memory.write(self.effective_addr, out.result);
        }

        if c.set_flags {
            if let Some(carry) = out.carry {
                self.regs.set_carry(carry);
            }
            if let Some(overflow) = out.overflow {
                self.regs.set_overflow(overflow);
            }
        }

        self.advance_pc(&c);
        self.state = State::Fetch;
    }

    // ========== Execution helpers ==========

    /// Selects the ALU input pair for the current instruction.
    fn alu_inputs(&self, c: &Controls) -> (u8, u8) {
        match c.alu_op {
            // MOV moves the operand for loads, the source register for
            // implied-mode transfers.
            AluOp::Mov => {
                if c.mode == AddressingMode::Implied {
                    (self.read_source(c.reg_src), 0)
                } else {
                    (self.operand, 0)
                }
            }
            AluOp::Cmp | AluOp::Cpx | AluOp::Cpy => (self.read_source(c.reg_src), self.operand),
            // Unary ops work on the fetched byte for memory RMW and on the
            // selected register for the implied forms.
            AluOp::Inc | AluOp::Dec | AluOp::Asl | AluOp::Lsr | AluOp::Rol | AluOp::Ror => {
                if c.mem_we {
                    (self.operand, 0)
                } else {
                    (self.read_source(c.reg_src), 0)
                }
            }
            // Binary arithmetic/logic: accumulator against the operand.
            AluOp::Adc | AluOp::Sbc | AluOp::And | AluOp::Ora | AluOp::Eor => {
                (self.read_source(c.reg_src), self.operand)
            }
        }
    }

    /// Reads a source register, substituting the shadow for A so that a
    /// write-back still in flight is visible to the ALU.
    fn read_source(&self, src: Register) -> u8 {
        match src {
            Register::A => self.shadow_a,
            _ => self.regs.read(src),
        }
    }

    fn write_register(&mut self, dst: Register, data: u8, set_nz: bool, z: bool, n: bool) {
        self.regs.write(dst, data, set_nz, z, n);
        if dst == Register::A {
            self.shadow_a = data;
        }
    }

    fn advance_pc(&mut self, c: &Controls) {
        if c.pc_load {
            self.pc = self.effective_addr;
        } else if c.pc_inc {
            self.pc = self.pc.wrapping_add(c.mode.instruction_len());
        }
    }

    // ========== Observers ==========

    /// Accumulator value.
    pub fn a(&self) -> u8 {
        self.regs.read(Register::A)
    }

    /// X index register value.
    pub fn x(&self) -> u8 {
        self.regs.read(Register::X)
    }

    /// Y index register value.
    pub fn y(&self) -> u8 {
        self.regs.read(Register::Y)
    }

    /// Stack pointer value.
    pub fn sp(&self) -> u8 {
        self.regs.read(Register::S)
    }

    /// Program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Processor status word (bit 5 always reads as 1).
    pub fn status(&self) -> Status {
        self.regs.status()
    }

    /// True once a BRK has been decoded.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Total clock ticks executed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Shared access to memory.
    pub fn memory(&self) -> &Memory<S> {
        &self.memory
    }

    /// Mutable access to memory; the loader writes the program image through
    /// this before the first tick.
    pub fn memory_mut(&mut self) -> &mut Memory<S> {
        &mut self.memory
    }
}
