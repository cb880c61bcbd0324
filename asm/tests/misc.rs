use bfasm::{AsmError, Assembler};

mod common;
use common::*;

fn assemble_err(source: &str) -> AsmError {
    Assembler::new().assemble(source).unwrap_err()
}

#[test]
fn test_unresolved_symbol_is_fatal() {
    let err = assemble_err("PUSH @top @nope");
    assert!(matches!(err, AsmError::UnresolvedSymbol(_)), "{err}");
    let err = assemble_err("PUSH @top &nope");
    assert!(matches!(err, AsmError::UnresolvedSymbol(_)), "{err}");
}

#[test]
fn test_unsupported_combination_is_fatal() {
    let err = assemble_err("PLUS 1 2 3");
    assert!(matches!(err, AsmError::Unsupported { .. }), "{err}");
    let err = assemble_err("SWAP @top");
    assert!(matches!(err, AsmError::Unsupported { .. }), "{err}");
}

#[test]
fn test_unsupported_width_is_fatal() {
    let err = assemble_err("PUSH:16 @top 1\nPUSH:16 @top 1\nSWAP:16 @top @top");
    assert!(matches!(err, AsmError::Unsupported { .. }), "{err}");
    let err = assemble_err("PUSH:16 @top 1\nPUSH @top 1\nPLUS @top:16 @top:16 @top");
    assert!(matches!(err, AsmError::UnsupportedWidth { .. }), "{err}");
}

#[test]
fn test_function_redefinition_is_fatal() {
    let err = assemble_err("FUNC f\nRTRN\nFUNC f\nRTRN");
    assert!(matches!(err, AsmError::FunctionRedefined(_)), "{err}");
}

#[test]
fn test_unknown_function_is_fatal() {
    let err = assemble_err("CALL ghost");
    assert!(matches!(err, AsmError::UnknownFunction(_)), "{err}");
}

#[test]
fn test_pop_of_empty_stack_is_fatal() {
    let err = assemble_err("POPV @top");
    assert!(matches!(err, AsmError::StackUnderflow { .. }), "{err}");
}

#[test]
fn test_divide_by_zero_immediate_is_fatal() {
    let err = assemble_err("PUSH @top 4\nDIVI @top @top 0");
    assert!(matches!(err, AsmError::DivideByZero), "{err}");
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    let err = assemble_err("PUSH @top 1\nPUSH @top[3] 2");
    match err {
        AsmError::Parse { line, .. } => assert_eq!(2, line),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn test_raw_passthrough() {
    let (asm, vm) = run("_RAW +++ > ++");
    assert_eq!(0, asm.stack_pointer());
    assert_eq!(3, vm.cell(0));
    assert_eq!(2, vm.cell(1));
}

#[test]
fn test_internal_sixteen_bit_add_layout() {
    // [low, high, carry, temp] with carry and temp back at zero
    let (_, vm) = run("_ADD:16 3000");
    assert_eq!(3000 % 256, vm.cell(0) as usize);
    assert_eq!(3000 / 256, vm.cell(1) as usize);
    assert_eq!(0, vm.cell(2));
    assert_eq!(0, vm.cell(3));
    assert_eq!(0, vm.pointer());
}

#[test]
fn test_internal_sixteen_bit_sub() {
    let cases = [(3000u32, 2000u32), (257, 5), (5, 10), (65535, 2), (0, 1)];
    for (a, b) in cases {
        let (_, vm) = run(&format!("_ADD:16 {a}\n_SUB:16 {b}"));
        let expected = (65536 + a - b) % 65536;
        assert_eq!((expected % 256) as u8, vm.cell(0), "{a} - {b}");
        assert_eq!((expected / 256) as u8, vm.cell(1), "{a} - {b}");
        assert_eq!(0, vm.cell(2));
        assert_eq!(0, vm.cell(3));
        assert_eq!(0, vm.pointer());
    }
}

#[test]
fn test_internal_set() {
    let (_, vm) = run("_ADD 200\n_SET 5");
    assert_eq!(5, vm.cell(0));
    let (_, vm) = run("_ADD:16 60000\n_SET:16 300");
    assert_eq!(44, vm.cell(0));
    assert_eq!(1, vm.cell(1));
    assert_eq!(0, vm.cell(2));
}

#[test]
fn test_generated_code_is_pure_machine_text() {
    let (_, code) = build(
        "ALOC a 1
         PUSH @a 7
         PUSH @top @a
         PUSH @top 3
         PLUS @top @top @top",
    );
    assert!(code.chars().all(|c| "+-<>[],.".contains(c)), "{code}");
}

#[test]
fn test_stack_pointer_tracks_machine_pointer_through_mixed_program() {
    let (asm, vm) = run(
        "ALOC a 2
         PUSH @a[1] 4
         PUSH @top 10
         PUSH @top 20
         SWAP @top @top
         PLUS @top @top @top
         PUSH @top @a[1]
         MULT @top @top @top
         PUSH @top 0
         POPV @top",
    );
    assert_eq!(asm.stack_pointer() as usize, vm.pointer());
    assert_stack!(asm, vm, [120]);
}
