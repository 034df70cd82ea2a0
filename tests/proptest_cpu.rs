//! Property-based tests for CPU invariants.
//!
//! These tests use proptest to verify that the core maintains its
//! architectural invariants across wide input ranges: store/load round
//! trips, shift recovery identities, flag exclusivity, and graceful
//! handling of arbitrary byte streams as programs.

use proptest::prelude::*;
use tick6502::cpu::Cpu;
use tick6502::memory::{BufferSink, Memory};
use tick6502::registers::Status;

fn cpu_with_program(program: &[u8]) -> Cpu<BufferSink> {
    let mut memory = Memory::new(BufferSink::new());
    memory.load(program);
    Cpu::new(memory)
}

fn run_to_halt(cpu: &mut Cpu<BufferSink>) {
    cpu.run(10_000);
    assert!(cpu.halted(), "program did not reach BRK");
}

proptest! {
    /// Property: LDA #v ; STA addr ; LDA #0 ; LDA addr leaves A = v for any
    /// value and any plain-RAM address outside the program image.
    #[test]
    fn prop_store_load_round_trip(v in 0u8..=255, addr in 0x0010u16..=0xFEFF) {
        let lo = (addr & 0xFF) as u8;
        let hi = (addr >> 8) as u8;
        let mut cpu = cpu_with_program(&[
            0xA9, v, // LDA #v
            0x8D, lo, hi, // STA addr
            0xA9, 0x00, // LDA #$00
            0xAD, lo, hi, // LDA addr
            0x00, // BRK
        ]);
        run_to_halt(&mut cpu);
        prop_assert_eq!(cpu.a(), v);
    }

    /// Property: the stored byte equals the accumulator for every value.
    #[test]
    fn prop_store_writes_exact_byte(v in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0xA9, v, 0x8D, 0x00, 0x02, 0x00]);
        run_to_halt(&mut cpu);
        prop_assert_eq!(cpu.memory().read(0x0200), v);
    }

    /// Property: LSR then ASL recovers the byte iff bit 0 was zero.
    #[test]
    fn prop_lsr_then_asl_recovery(v in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0xA9, v, 0x4A, 0x0A, 0x00]);
        run_to_halt(&mut cpu);
        if v & 0x01 == 0 {
            prop_assert_eq!(cpu.a(), v);
        } else {
            prop_assert_ne!(cpu.a(), v);
        }
    }

    /// Property: ASL then LSR recovers the byte iff bit 7 was zero.
    #[test]
    fn prop_asl_then_lsr_recovery(v in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0xA9, v, 0x0A, 0x4A, 0x00]);
        run_to_halt(&mut cpu);
        if v & 0x80 == 0 {
            prop_assert_eq!(cpu.a(), v);
        } else {
            prop_assert_ne!(cpu.a(), v);
        }
    }

    /// Property: rotate left then right with carry cleared before each
    /// recovers any byte whose bits 0 and 7 are both zero.
    #[test]
    fn prop_rotate_round_trip(v in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0x18, 0xA9, v, 0x2A, 0x18, 0x6A, 0x00]);
        run_to_halt(&mut cpu);
        if v & 0x81 == 0 {
            prop_assert_eq!(cpu.a(), v);
        }
    }

    /// Property: in load-only code, each register ends at the last
    /// immediate that targeted it.
    #[test]
    fn prop_last_load_wins(
        loads in prop::collection::vec((0u8..3, any::<u8>()), 1..12),
    ) {
        let mut program = Vec::new();
        let (mut last_a, mut last_x, mut last_y) = (None, None, None);
        for &(reg, value) in &loads {
            match reg {
                0 => {
                    program.extend_from_slice(&[0xA9, value]);
                    last_a = Some(value);
                }
                1 => {
                    program.extend_from_slice(&[0xA2, value]);
                    last_x = Some(value);
                }
                _ => {
                    program.extend_from_slice(&[0xA0, value]);
                    last_y = Some(value);
                }
            }
        }
        program.push(0x00);

        let mut cpu = cpu_with_program(&program);
        run_to_halt(&mut cpu);
        prop_assert_eq!(cpu.a(), last_a.unwrap_or(0));
        prop_assert_eq!(cpu.x(), last_x.unwrap_or(0));
        prop_assert_eq!(cpu.y(), last_y.unwrap_or(0));
    }

    /// Property: Z and N are never both set after a flags-updating load.
    #[test]
    fn prop_z_and_n_exclusive(v in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0xA9, v, 0x00]);
        run_to_halt(&mut cpu);
        let p = cpu.status();
        prop_assert!(!(p.contains(Status::ZERO) && p.contains(Status::NEGATIVE)));
    }

    /// Property: ADC never diverges from wrapping 8-bit addition, and the
    /// carry flag matches the unsigned overflow.
    #[test]
    fn prop_adc_matches_wrapping_add(a in 0u8..=255, b in 0u8..=255) {
        let mut cpu = cpu_with_program(&[0x18, 0xA9, a, 0x69, b, 0x00]);
        run_to_halt(&mut cpu);
        prop_assert_eq!(cpu.a(), a.wrapping_add(b));
        prop_assert_eq!(
            cpu.status().contains(Status::CARRY),
            (a as u16 + b as u16) > 0xFF
        );
    }

    /// Property: an arbitrary byte stream never breaks the machine — every
    /// opcode decodes, bit 5 of P stays set, and the tick budget is always
    /// honored.
    #[test]
    fn prop_arbitrary_programs_are_safe(program in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut cpu = cpu_with_program(&program);
        let consumed = cpu.run(500);
        prop_assert!(consumed <= 500);
        prop_assert!(cpu.status().contains(Status::UNUSED));
    }
}
