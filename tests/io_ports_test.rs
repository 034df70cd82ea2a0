//! Tests for the memory-mapped output ports at 0xFF00-0xFF03.
//!
//! Each store to a port emits exactly one formatted record to the sink and
//! leaves the backing array untouched.

use tick6502::cpu::Cpu;
use tick6502::memory::{BufferSink, Memory, PORT_BINARY, PORT_CHAR, PORT_DECIMAL, PORT_HEX};

fn cpu_with_program(program: &[u8]) -> Cpu<BufferSink> {
    let mut memory = Memory::new(BufferSink::new());
    memory.load(program);
    Cpu::new(memory)
}

fn run_to_halt(cpu: &mut Cpu<BufferSink>) {
    cpu.run(10_000);
    assert!(cpu.halted(), "program did not reach BRK");
}

#[test]
fn test_decimal_port() {
    // LDA #$2A ; STA $FF00 ; BRK
    let mut cpu = cpu_with_program(&[0xA9, 0x2A, 0x8D, 0x00, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["42"]);
}

#[test]
fn test_hex_port() {
    // LDA #$0A ; STA $FF01 ; BRK
    let mut cpu = cpu_with_program(&[0xA9, 0x0A, 0x8D, 0x01, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["0x0a"]);
}

#[test]
fn test_char_port() {
    // LDA #'H' ; STA $FF02 ; BRK
    let mut cpu = cpu_with_program(&[0xA9, 0x48, 0x8D, 0x02, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["H"]);
}

#[test]
fn test_binary_port() {
    // LDA #$A5 ; STA $FF03 ; BRK
    let mut cpu = cpu_with_program(&[0xA9, 0xA5, 0x8D, 0x03, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["10100101"]);
}

#[test]
fn test_each_store_emits_exactly_one_record() {
    // LDA #$01 ; STA $FF00 ; STA $FF00 ; STA $FF01 ; BRK
    let mut cpu = cpu_with_program(&[
        0xA9, 0x01, 0x8D, 0x00, 0xFF, 0x8D, 0x00, 0xFF, 0x8D, 0x01, 0xFF, 0x00,
    ]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["1", "1", "0x01"]);
}

#[test]
fn test_port_write_does_not_populate_backing_store() {
    // LDA #$55 ; STA $FF00 ; LDA $FF00 ; BRK — reading the port returns
    // the untouched backing byte (zero), not the last write.
    let mut cpu = cpu_with_program(&[0xA9, 0x55, 0x8D, 0x00, 0xFF, 0xAD, 0x00, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.a(), 0x00);
    assert_eq!(cpu.memory().sink().records(), ["85"]);
}

#[test]
fn test_indexed_store_reaches_ports() {
    // LDX #$03 ; LDA #$F0 ; STA $FF00,X ; BRK — EA = 0xFF03, binary port
    let mut cpu = cpu_with_program(&[0xA2, 0x03, 0xA9, 0xF0, 0x9D, 0x00, 0xFF, 0x00]);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.memory().sink().records(), ["11110000"]);
}

#[test]
fn test_port_constants_cover_the_io_page_corner() {
    assert_eq!(PORT_DECIMAL, 0xFF00);
    assert_eq!(PORT_HEX, 0xFF01);
    assert_eq!(PORT_CHAR, 0xFF02);
    assert_eq!(PORT_BINARY, 0xFF03);
}

#[test]
fn test_zero_and_max_values_format_correctly() {
    // LDA #$00 ; STA $FF00 ; STA $FF01 ; STA $FF03 ;
    // LDA #$FF ; STA $FF00 ; STA $FF01 ; STA $FF03 ; BRK
    let mut cpu = cpu_with_program(&[
        0xA9, 0x00, 0x8D, 0x00, 0xFF, 0x8D, 0x01, 0xFF, 0x8D, 0x03, 0xFF, 0xA9, 0xFF, 0x8D, 0x00,
        0xFF, 0x8D, 0x01, 0xFF, 0x8D, 0x03, 0xFF, 0x00,
    ]);
    run_to_halt(&mut cpu);
    assert_eq!(
        cpu.memory().sink().records(),
        ["0", "0x00", "00000000", "255", "0xff", "11111111"]
    );
}
