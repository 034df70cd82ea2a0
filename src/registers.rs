//! # Register File
//!
//! Storage for the five programmer-visible registers (A, X, Y, S, P) and the
//! flag-mutation primitives the sequencer drives: NZ updates from ALU
//! outputs, carry/overflow latching, and the direct set/clear signals used by
//! the flag-control instructions.

use bitflags::bitflags;

bitflags! {
    /// Processor status word (P register) bit assignments.
    ///
    /// Bit 5 (`UNUSED`) reads as 1 on a real 6502; `BREAK` appears only on
    /// software-pushed copies of P.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

/// Register selector used by the control decoder for write destinations and
/// read sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Accumulator.
    A,
    /// X index register.
    X,
    /// Y index register.
    Y,
    /// Stack pointer (addresses within 0x0100-0x01FF).
    S,
    /// Processor status.
    P,
}

/// Direct flag set/clear signals.
///
/// At most one of these is asserted per tick (the decoder emits them only for
/// the single-purpose flag instructions CLC/SEC/CLI/SEI/CLD/SED/CLV).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSignal {
    SetCarry,
    ClearCarry,
    SetInterrupt,
    ClearInterrupt,
    SetDecimal,
    ClearDecimal,
    ClearOverflow,
}

/// The five-register file.
///
/// Only the sequencer writes it; the decoder and ALU are pure and hold no
/// register state.
///
/// # Examples
///
/// ```
/// use tick6502::registers::{Register, RegisterFile, Status};
///
/// let mut regs = RegisterFile::new();
/// assert_eq!(regs.read(Register::S), 0xFF);
/// assert_eq!(regs.read(Register::P), 0x20); // only the unused bit
///
/// regs.write(Register::A, 0x80, true, false, true);
/// assert_eq!(regs.read(Register::A), 0x80);
/// assert!(regs.status().contains(Status::NEGATIVE));
/// ```
#[derive(Debug, Clone)]
pub struct RegisterFile {
    a: u8,
    x: u8,
    y: u8,
    s: u8,
    p: Status,
}

impl RegisterFile {
    /// Creates a register file in the reset state: A=X=Y=0, S=0xFF, P=0x20.
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFF,
            p: Status::UNUSED,
        }
    }

    /// Returns the file to its reset state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reads the selected register. P always reads with bit 5 set.
    pub fn read(&self, sel: Register) -> u8 {
        match sel {
            Register::A => self.a,
            Register::X => self.x,
            Register::Y => self.y,
            Register::S => self.s,
            Register::P => (self.p | Status::UNUSED).bits(),
        }
    }

    /// Writes `data` to the selected register; if `set_nz`, bits 1 and 7 of P
    /// are replaced by `z_in` and `n_in`.
    ///
    /// A write to P (PLP path) ignores the incoming BREAK bit and forces the
    /// unused bit set.
    pub fn write(&mut self, sel: Register, data: u8, set_nz: bool, z_in: bool, n_in: bool) {
        match sel {
            Register::A => self.a = data,
            Register::X => self.x = data,
            Register::Y => self.y = data,
            Register::S => self.s = data,
            Register::P => {
                self.p = (Status::from_bits_retain(data) - Status::BREAK) | Status::UNUSED;
            }
        }
        if set_nz {
            self.update_nz(z_in, n_in);
        }
    }

    /// Replaces the Z and N bits of P.
    ///
    /// Used directly for operations that update flags without a register
    /// write (the compares).
    pub fn update_nz(&mut self, z: bool, n: bool) {
        self.p.set(Status::ZERO, z);
        self.p.set(Status::NEGATIVE, n);
    }

    /// Latches an ALU carry output into P.
    pub fn set_carry(&mut self, carry: bool) {
        self.p.set(Status::CARRY, carry);
    }

    /// Latches an ALU overflow output into P.
    pub fn set_overflow(&mut self, overflow: bool) {
        self.p.set(Status::OVERFLOW, overflow);
    }

    /// Applies one direct flag set/clear signal.
    pub fn apply(&mut self, signal: FlagSignal) {
        match signal {
            FlagSignal::SetCarry => self.p.insert(Status::CARRY),
            FlagSignal::ClearCarry => self.p.remove(Status::CARRY),
            FlagSignal::SetInterrupt => self.p.insert(Status::INTERRUPT_DISABLE),
            FlagSignal::ClearInterrupt => self.p.remove(Status::INTERRUPT_DISABLE),
            FlagSignal::SetDecimal => self.p.insert(Status::DECIMAL),
            FlagSignal::ClearDecimal => self.p.remove(Status::DECIMAL),
            FlagSignal::ClearOverflow => self.p.remove(Status::OVERFLOW),
        }
    }

    /// The status word as a flag set (bit 5 always present).
    pub fn status(&self) -> Status {
        self.p | Status::UNUSED
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
