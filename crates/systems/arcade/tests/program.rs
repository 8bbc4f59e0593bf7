//! Whole-program tests driving the machine through its public interface.

use emu8080_arcade::{LoadFormat, Machine, RunOutcome, STACK_TOP};

#[test]
fn test_counted_sum_loop() {
    // Sums B down to zero into A:
    //         MVI A, 0x00     ; 3E 00      @ 0x0000
    //         MVI B, 0x05     ; 06 05      @ 0x0002
    // loop:   ADD B           ; 80         @ 0x0004
    //         DCR B           ; 05         @ 0x0005
    //         JNZ loop        ; C2 04 00   @ 0x0006
    //         HLT             ; 76         @ 0x0009
    let program = [
        0x3E, 0x00, 0x06, 0x05, 0x80, 0x05, 0xC2, 0x04, 0x00, 0x76,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    assert_eq!(machine.run(1000).unwrap(), RunOutcome::Halted);
    assert_eq!(machine.registers().a, 15, "5+4+3+2+1");
    assert_eq!(machine.registers().b, 0);
    assert_eq!(machine.steps(), 18, "2 setup + 5 iterations of 3 + HLT");
}

#[test]
fn test_nested_subroutine_calls() {
    //         MVI A, 0x10     ; 3E 10      @ 0x0000
    //         CALL double     ; CD 09 00   @ 0x0002
    //         CALL double     ; CD 09 00   @ 0x0005
    //         HLT             ; 76         @ 0x0008
    // double: ADD A           ; 87         @ 0x0009
    //         RET             ; C9         @ 0x000A
    let program = [
        0x3E, 0x10, 0xCD, 0x09, 0x00, 0xCD, 0x09, 0x00, 0x76, 0x87, 0xC9,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    assert_eq!(machine.run(100).unwrap(), RunOutcome::Halted);
    assert_eq!(machine.registers().a, 0x40);
    assert_eq!(machine.registers().sp, STACK_TOP, "stack balanced after returns");
}

#[test]
fn test_memory_fill_loop() {
    //         LXI H, 0x1000   ; 21 00 10   @ 0x0000
    //         MVI B, 0x04     ; 06 04      @ 0x0003
    //         MVI A, 0xAB     ; 3E AB      @ 0x0005
    // fill:   MOV M, A        ; 77         @ 0x0007
    //         INX H           ; 23         @ 0x0008
    //         DCR B           ; 05         @ 0x0009
    //         JNZ fill        ; C2 07 00   @ 0x000A
    //         HLT             ; 76         @ 0x000D
    let program = [
        0x21, 0x00, 0x10, 0x06, 0x04, 0x3E, 0xAB, 0x77, 0x23, 0x05, 0xC2, 0x07, 0x00, 0x76,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    assert_eq!(machine.run(1000).unwrap(), RunOutcome::Halted);
    for addr in 0x1000..0x1004 {
        assert_eq!(machine.memory().get(addr), Some(0xAB), "addr {addr:#06x}");
    }
    assert_eq!(machine.memory().get(0x1004), Some(0x00), "fill stops after 4 bytes");
    assert_eq!(machine.registers().hl(), 0x1004);
}

#[test]
fn test_bcd_addition_with_carry_out() {
    // 95 + 05 = 100 in BCD: the sum wraps to 00 with carry set.
    //         MVI A, 0x95     ; 3E 95
    //         ADI 0x05        ; C6 05
    //         DAA             ; 27
    //         HLT             ; 76
    let program = [0x3E, 0x95, 0xC6, 0x05, 0x27, 0x76];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    machine.run(100).unwrap();
    assert_eq!(machine.registers().a, 0x00);
    assert!(machine.flags().carry, "hundreds digit carries out");
}

#[test]
fn test_bcd_addition_without_carry() {
    // 38 + 45 = 83 in BCD.
    let program = [0x3E, 0x38, 0xC6, 0x45, 0x27, 0x76];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    machine.run(100).unwrap();
    assert_eq!(machine.registers().a, 0x83);
    assert!(!machine.flags().carry);
}

#[test]
fn test_compare_and_branch() {
    //         MVI A, 0x21     ; 3E 21      @ 0x0000
    //         CPI 0x20        ; FE 20      @ 0x0002
    //         JC less         ; DA 0A 00   @ 0x0004
    //         MVI C, 0x01     ; 0E 01      @ 0x0007
    //         HLT             ; 76         @ 0x0009
    // less:   MVI C, 0xFF     ; 0E FF      @ 0x000A
    //         HLT             ; 76         @ 0x000C
    let program = [
        0x3E, 0x21, 0xFE, 0x20, 0xDA, 0x0A, 0x00, 0x0E, 0x01, 0x76, 0x0E, 0xFF, 0x76,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    machine.run(100).unwrap();
    assert_eq!(machine.registers().c, 0x01, "0x21 >= 0x20 takes the ge path");
    assert_eq!(machine.registers().a, 0x21, "CPI leaves the accumulator alone");
}

#[test]
fn test_flags_survive_psw_round_trip() {
    //         MVI A, 0xC3     ; 3E C3      @ 0x0000
    //         ORA A           ; B7         @ 0x0002   sign set, parity even
    //         PUSH PSW        ; F5         @ 0x0003
    //         MVI A, 0x00     ; 3E 00      @ 0x0004
    //         ORA A           ; B7         @ 0x0006   zero set, sign clear
    //         POP PSW         ; F1         @ 0x0007
    //         JM neg          ; FA 0E 00   @ 0x0008
    //         MVI D, 0x00     ; 16 00      @ 0x000B
    //         HLT             ; 76         @ 0x000D
    // neg:    MVI D, 0x01     ; 16 01      @ 0x000E
    //         HLT             ; 76         @ 0x0010
    let program = [
        0x3E, 0xC3, 0xB7, 0xF5, 0x3E, 0x00, 0xB7, 0xF1, 0xFA, 0x0E, 0x00, 0x16, 0x00, 0x76,
        0x16, 0x01, 0x76,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    machine.run(100).unwrap();
    assert_eq!(machine.registers().a, 0xC3, "POP PSW restores the accumulator");
    assert_eq!(machine.registers().d, 0x01, "JM sees the restored sign flag");
}

#[test]
fn test_shift_register_sprite_window() {
    //         MVI A, 0xF0     ; 3E F0
    //         OUT 4           ; D3 04      high byte = F0
    //         MVI A, 0x0F     ; 3E 0F
    //         OUT 4           ; D3 04      value now 0x0FF0
    //         MVI A, 0x04     ; 3E 04
    //         OUT 2           ; D3 02
    //         IN 3            ; DB 03      window at offset 4
    //         STA 0x1000      ; 32 00 10
    //         MVI A, 0x00     ; 3E 00
    //         OUT 2           ; D3 02
    //         IN 3            ; DB 03      window at offset 0
    //         STA 0x1001      ; 32 01 10
    //         HLT             ; 76
    let program = [
        0x3E, 0xF0, 0xD3, 0x04, 0x3E, 0x0F, 0xD3, 0x04, 0x3E, 0x04, 0xD3, 0x02, 0xDB, 0x03,
        0x32, 0x00, 0x10, 0x3E, 0x00, 0xD3, 0x02, 0xDB, 0x03, 0x32, 0x01, 0x10, 0x76,
    ];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    assert_eq!(machine.run(100).unwrap(), RunOutcome::Halted);
    assert_eq!(machine.memory().get(0x1000), Some(0xFF), "bits 11..=4 of 0x0FF0");
    assert_eq!(machine.memory().get(0x1001), Some(0x0F), "bits 15..=8 of 0x0FF0");
}

#[test]
fn test_hex_and_binary_images_run_identically() {
    let binary = [0x3E, 0x07, 0xC6, 0x03, 0x76];
    let hex = b"3E 07\nC6 03\n76\n";
    let mut from_binary = Machine::load(&binary, LoadFormat::Raw, None).unwrap();
    let mut from_hex = Machine::load(hex, LoadFormat::Raw, None).unwrap();
    from_binary.run(100).unwrap();
    from_hex.run(100).unwrap();
    assert_eq!(from_binary.registers(), from_hex.registers());
    assert_eq!(from_binary.cycles(), from_hex.cycles());
    assert_eq!(from_binary.registers().a, 0x0A);
}

#[test]
fn test_diag_convention_jumps_to_image() {
    // MVI A, 0x77 / HLT placed at 0x0100 with a JMP patched at 0.
    let program = [0x3E, 0x77, 0x76];
    let mut machine = Machine::load(&program, LoadFormat::Diag, None).unwrap();
    assert_eq!(machine.registers().pc, 0x0000);
    assert_eq!(machine.run(100).unwrap(), RunOutcome::Halted);
    assert_eq!(machine.registers().a, 0x77);
    assert_eq!(machine.steps(), 3, "JMP, MVI, HLT");
}

#[test]
fn test_halt_is_terminal() {
    let program = [0x76, 0x3E, 0x42];
    let mut machine = Machine::load(&program, LoadFormat::Raw, None).unwrap();
    assert_eq!(machine.run(100).unwrap(), RunOutcome::Halted);
    let pc = machine.registers().pc;
    let cycles = machine.cycles();
    // Further stepping must not execute the bytes after HLT.
    machine.step().unwrap();
    machine.step().unwrap();
    assert_eq!(machine.registers().a, 0x00);
    assert_eq!(machine.registers().pc, pc);
    assert_eq!(machine.cycles(), cycles);
}
