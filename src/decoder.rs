//! # Control Decoder
//!
//! The combinational mapping from an 8-bit opcode to the bundle of control
//! signals that drive the register file, ALU, memory and program counter.
//!
//! The 256-entry table is the single source of truth for per-opcode
//! semantics. It is not written out by hand: the regular instruction columns
//! of the 6502 encoding (`aaa-bbb-cc` bit groups) are generated from a small
//! set of mode maps, and a short exceptions list patches the irregular column
//! (transfers, stack operations, flag instructions, branches, jumps, BRK).
//!
//! Undocumented opcodes decode to a NOP-equivalent record: every enable off,
//! `pc_inc` on.

use crate::addressing::AddressingMode;
use crate::alu::AluOp;
use crate::registers::{FlagSignal, Register, Status};

/// Condition attached to a conditional branch opcode: branch when `flag` in
/// P equals `branch_if_set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchCondition {
    pub flag: Status,
    pub branch_if_set: bool,
}

/// Control-signal bundle for one opcode.
///
/// This is the decoder output the sequencer consumes: which addressing path
/// to walk, whether the ALU participates and with which operation, which
/// registers are read and written, whether memory is read or written, and
/// how the program counter advances.
#[derive(Debug, Clone, Copy)]
pub struct Controls {
    /// Addressing mode; determines instruction length and the EA path.
    pub mode: AddressingMode,
    /// ALU operation (meaningful only when `alu_enable` is set).
    pub alu_op: AluOp,
    /// Route the operation through the ALU (EXECUTE defers to WAIT_ALU).
    pub alu_enable: bool,
    /// Update Z/N (and C/V where the ALU produces them) from the result.
    pub set_flags: bool,
    /// Write the result to `reg_dst`.
    pub reg_we: bool,
    /// Write destination register.
    pub reg_dst: Register,
    /// Source register for stores, transfers, pushes and compares.
    pub reg_src: Register,
    /// Write memory: a store at the effective address, a push when the mode
    /// is implied, or the write-back half of a read-modify-write when
    /// combined with `alu_enable`.
    pub mem_we: bool,
    /// The operand is read through the memory bus (or the stack, when the
    /// mode is implied).
    pub mem_oe: bool,
    /// Advance PC by the instruction length.
    pub pc_inc: bool,
    /// Load PC from the effective address (jumps).
    pub pc_load: bool,
    /// Direct flag set/clear signal (CLC/SEC/CLI/SEI/CLD/SED/CLV).
    pub flag_signal: Option<FlagSignal>,
    /// Branch condition for the eight conditional branches.
    pub branch: Option<BranchCondition>,
    /// Halt request (BRK).
    pub halt: bool,
}

impl Controls {
    const fn base(mode: AddressingMode) -> Self {
        Self {
            mode,
            alu_op: AluOp::Mov,
            alu_enable: false,
            set_flags: false,
            reg_we: false,
            reg_dst: Register::A,
            reg_src: Register::A,
            mem_we: false,
            mem_oe: false,
            pc_inc: true,
            pc_load: false,
            flag_signal: None,
            branch: None,
            halt: false,
        }
    }

    /// NOP-equivalent record: no enables, PC advances by the mode's length.
    /// Also used for the documented control-flow stubs (JSR/RTS/RTI).
    const fn nop(mode: AddressingMode) -> Self {
        Self::base(mode)
    }

    /// Loads (LDA/LDX/LDY): the operand byte is written straight to the
    /// destination register, flags from the written value.
    const fn load(dst: Register, mode: AddressingMode) -> Self {
        let mut c = Self::base(mode);
        c.reg_dst = dst;
        c.reg_we = true;
        c.set_flags = true;
        c.mem_oe = !matches!(mode, AddressingMode::Immediate);
        c
    }

    /// Stores (STA/STX/STY): `reg_src` goes to memory at the EA.
    const fn store(src: Register, mode: AddressingMode) -> Self {
        let mut c = Self::base(mode);
        c.reg_src = src;
        c.mem_we = true;
        c
    }

    /// Accumulator-operand ALU instructions (ADC/SBC/AND/ORA/EOR).
    const fn binary(op: AluOp, mode: AddressingMode) -> Self {
        let mut c = Self::base(mode);
        c.alu_op = op;
        c.alu_enable = true;
        c.reg_dst = Register::A;
        c.reg_src = Register::A;
        c.reg_we = true;
        c.set_flags = true;
        c.mem_oe = !matches!(mode, AddressingMode::Immediate);
        c
    }

    /// Compares (CMP/CPX/CPY): flags only, result discarded.
    const fn compare(op: AluOp, src: Register, mode: AddressingMode) -> Self {
        let mut c = Self::base(mode);
        c.alu_op = op;
        c.alu_enable = true;
        c.reg_src = src;
        c.set_flags = true;
        c.mem_oe = !matches!(mode, AddressingMode::Immediate);
        c
    }

    /// Read-modify-write on memory (INC/DEC/ASL/LSR/ROL/ROR with an EA).
    const fn rmw(op: AluOp, mode: AddressingMode) -> Self {
        let mut c = Self::base(mode);
        c.alu_op = op;
        c.alu_enable = true;
        c.mem_we = true;
        c.mem_oe = true;
        c.set_flags = true;
        c
    }

    /// Implied-mode ALU operation on a register: the accumulator shift forms
    /// and the index steps (INX/INY/DEX/DEY).
    const fn implied_alu(op: AluOp, reg: Register) -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.alu_op = op;
        c.alu_enable = true;
        c.reg_dst = reg;
        c.reg_src = reg;
        c.reg_we = true;
        c.set_flags = true;
        c
    }

    /// Register transfer through the ALU MOV path.
    const fn transfer(src: Register, dst: Register, set_flags: bool) -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.alu_enable = true;
        c.reg_src = src;
        c.reg_dst = dst;
        c.reg_we = true;
        c.set_flags = set_flags;
        c
    }

    /// Stack push (PHA/PHP).
    const fn push(src: Register) -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.reg_src = src;
        c.mem_we = true;
        c
    }

    /// Stack pull (PLA/PLP).
    const fn pull(dst: Register, set_flags: bool) -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.reg_dst = dst;
        c.reg_we = true;
        c.set_flags = set_flags;
        c.mem_oe = true;
        c
    }

    /// Single-purpose flag instruction.
    const fn flag(signal: FlagSignal) -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.flag_signal = Some(signal);
        c
    }

    /// Conditional branch.
    const fn branch(flag: Status, branch_if_set: bool) -> Self {
        let mut c = Self::base(AddressingMode::Relative);
        c.branch = Some(BranchCondition {
            flag,
            branch_if_set,
        });
        c
    }

    /// JMP: load PC from the effective address.
    const fn jump() -> Self {
        let mut c = Self::base(AddressingMode::Absolute);
        c.pc_load = true;
        c.pc_inc = false;
        c
    }

    /// BRK: halt request, observed at DECODE.
    const fn brk() -> Self {
        let mut c = Self::base(AddressingMode::Implied);
        c.pc_inc = false;
        c.halt = true;
        c
    }
}

/// Pure opcode decoder over a 256-entry control table.
///
/// # Examples
///
/// ```
/// use tick6502::addressing::AddressingMode;
/// use tick6502::decoder::ControlDecoder;
/// use tick6502::registers::Register;
///
/// let decoder = ControlDecoder::new();
///
/// // LDA #imm writes A from the immediate operand
/// let lda = decoder.decode(0xA9);
/// assert_eq!(lda.mode, AddressingMode::Immediate);
/// assert!(lda.reg_we);
/// assert_eq!(lda.reg_dst, Register::A);
///
/// // Undocumented opcodes are NOPs
/// let ill = decoder.decode(0x02);
/// assert!(!ill.reg_we && !ill.mem_we && !ill.alu_enable);
/// assert!(ill.pc_inc);
/// ```
pub struct ControlDecoder {
    table: Box<[Controls; 256]>,
}

impl ControlDecoder {
    /// Builds the decode table.
    pub fn new() -> Self {
        Self {
            table: build_table(),
        }
    }

    /// Returns the control bundle for `opcode`. Total: every opcode decodes.
    pub fn decode(&self, opcode: u8) -> &Controls {
        &self.table[opcode as usize]
    }
}

impl Default for ControlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Addressing modes for the `cc = 01` column, indexed by the `bbb` bits.
const CC01_MODES: [AddressingMode; 8] = [
    AddressingMode::IndirectX,
    AddressingMode::ZeroPage,
    AddressingMode::Immediate,
    AddressingMode::Absolute,
    AddressingMode::IndirectY,
    AddressingMode::ZeroPageX,
    AddressingMode::AbsoluteY,
    AddressingMode::AbsoluteX,
];

fn build_table() -> Box<[Controls; 256]> {
    let mut table = Box::new([Controls::nop(AddressingMode::Implied); 256]);

    // --- cc = 01: the fully regular accumulator column ---
    for aaa in 0u8..8 {
        for (bbb, &mode) in CC01_MODES.iter().enumerate() {
            let opcode = (aaa << 5) | ((bbb as u8) << 2) | 0b01;
            table[opcode as usize] = match aaa {
                0 => Controls::binary(AluOp::Ora, mode),
                1 => Controls::binary(AluOp::And, mode),
                2 => Controls::binary(AluOp::Eor, mode),
                3 => Controls::binary(AluOp::Adc, mode),
                // 0x89 (STA #imm) does not exist
                4 if mode == AddressingMode::Immediate => continue,
                4 => Controls::store(Register::A, mode),
                5 => Controls::load(Register::A, mode),
                6 => Controls::compare(AluOp::Cmp, Register::A, mode),
                _ => Controls::binary(AluOp::Sbc, mode),
            };
        }
    }

    // --- cc = 10: shifts/rotates and the X column ---
    let shift_ops = [
        (0u8, AluOp::Asl),
        (1, AluOp::Rol),
        (2, AluOp::Lsr),
        (3, AluOp::Ror),
    ];
    let rmw_modes = [
        (1u8, AddressingMode::ZeroPage),
        (3, AddressingMode::Absolute),
        (5, AddressingMode::ZeroPageX),
        (7, AddressingMode::AbsoluteX),
    ];
    for (aaa, op) in shift_ops {
        for (bbb, mode) in rmw_modes {
            table[((aaa << 5) | (bbb << 2) | 0b10) as usize] = Controls::rmw(op, mode);
        }
        // bbb = 2 is the accumulator form
        table[((aaa << 5) | (2 << 2) | 0b10) as usize] = Controls::implied_alu(op, Register::A);
    }
    for (aaa, op) in [(6u8, AluOp::Dec), (7u8, AluOp::Inc)] {
        for (bbb, mode) in rmw_modes {
            table[((aaa << 5) | (bbb << 2) | 0b10) as usize] = Controls::rmw(op, mode);
        }
    }
    // STX: zp / abs / zp,Y
    table[0x86] = Controls::store(Register::X, AddressingMode::ZeroPage);
    table[0x8E] = Controls::store(Register::X, AddressingMode::Absolute);
    table[0x96] = Controls::store(Register::X, AddressingMode::ZeroPageY);
    // LDX: imm / zp / abs / zp,Y / abs,Y
    table[0xA2] = Controls::load(Register::X, AddressingMode::Immediate);
    table[0xA6] = Controls::load(Register::X, AddressingMode::ZeroPage);
    table[0xAE] = Controls::load(Register::X, AddressingMode::Absolute);
    table[0xB6] = Controls::load(Register::X, AddressingMode::ZeroPageY);
    table[0xBE] = Controls::load(Register::X, AddressingMode::AbsoluteY);

    // --- cc = 00: the Y column ---
    table[0x84] = Controls::store(Register::Y, AddressingMode::ZeroPage);
    table[0x8C] = Controls::store(Register::Y, AddressingMode::Absolute);
    table[0x94] = Controls::store(Register::Y, AddressingMode::ZeroPageX);
    table[0xA0] = Controls::load(Register::Y, AddressingMode::Immediate);
    table[0xA4] = Controls::load(Register::Y, AddressingMode::ZeroPage);
    table[0xAC] = Controls::load(Register::Y, AddressingMode::Absolute);
    table[0xB4] = Controls::load(Register::Y, AddressingMode::ZeroPageX);
    table[0xBC] = Controls::load(Register::Y, AddressingMode::AbsoluteX);
    for (base, op, src) in [
        (0xC0u8, AluOp::Cpy, Register::Y),
        (0xE0u8, AluOp::Cpx, Register::X),
    ] {
        table[base as usize] = Controls::compare(op, src, AddressingMode::Immediate);
        table[(base + 0x04) as usize] = Controls::compare(op, src, AddressingMode::ZeroPage);
        table[(base + 0x0C) as usize] = Controls::compare(op, src, AddressingMode::Absolute);
    }

    // --- Exceptions: the irregular column ---

    // Register transfers. TSX updates Z/N; TXS does not.
    table[0xAA] = Controls::transfer(Register::A, Register::X, true);
    table[0xA8] = Controls::transfer(Register::A, Register::Y, true);
    table[0x8A] = Controls::transfer(Register::X, Register::A, true);
    table[0x98] = Controls::transfer(Register::Y, Register::A, true);
    table[0xBA] = Controls::transfer(Register::S, Register::X, true);
    table[0x9A] = Controls::transfer(Register::X, Register::S, false);

    // Index register steps
    table[0xE8] = Controls::implied_alu(AluOp::Inc, Register::X);
    table[0xC8] = Controls::implied_alu(AluOp::Inc, Register::Y);
    table[0xCA] = Controls::implied_alu(AluOp::Dec, Register::X);
    table[0x88] = Controls::implied_alu(AluOp::Dec, Register::Y);

    // Stack data operations
    table[0x48] = Controls::push(Register::A);
    table[0x08] = Controls::push(Register::P);
    table[0x68] = Controls::pull(Register::A, true);
    table[0x28] = Controls::pull(Register::P, false);

    // Flag instructions
    table[0x18] = Controls::flag(FlagSignal::ClearCarry);
    table[0x38] = Controls::flag(FlagSignal::SetCarry);
    table[0x58] = Controls::flag(FlagSignal::ClearInterrupt);
    table[0x78] = Controls::flag(FlagSignal::SetInterrupt);
    table[0xB8] = Controls::flag(FlagSignal::ClearOverflow);
    table[0xD8] = Controls::flag(FlagSignal::ClearDecimal);
    table[0xF8] = Controls::flag(FlagSignal::SetDecimal);

    // Conditional branches (cc = 00, bbb = 100)
    table[0x10] = Controls::branch(Status::NEGATIVE, false);
    table[0x30] = Controls::branch(Status::NEGATIVE, true);
    table[0x50] = Controls::branch(Status::OVERFLOW, false);
    table[0x70] = Controls::branch(Status::OVERFLOW, true);
    table[0x90] = Controls::branch(Status::CARRY, false);
    table[0xB0] = Controls::branch(Status::CARRY, true);
    table[0xD0] = Controls::branch(Status::ZERO, false);
    table[0xF0] = Controls::branch(Status::ZERO, true);

    // Jumps. JMP (ind) keeps the simplified behavior: PC loads the pointer
    // address itself, with no second-level fetch.
    table[0x4C] = Controls::jump();
    table[0x6C] = Controls::jump();

    // Control-flow stubs: decode as NOPs that advance past their operands.
    table[0x20] = Controls::nop(AddressingMode::Absolute); // JSR
    table[0x60] = Controls::nop(AddressingMode::Implied); // RTS
    table[0x40] = Controls::nop(AddressingMode::Implied); // RTI

    table[0xEA] = Controls::nop(AddressingMode::Implied);
    table[0x00] = Controls::brk();

    table
}
