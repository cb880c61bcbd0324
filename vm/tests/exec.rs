use bfvm::ExecError;

mod common;
use common::*;

#[test]
fn test_increment_decrement() {
    let m = run("+++++--").unwrap();
    assert_eq!(3, m.cell(0));
    assert_eq!(0, m.pointer());
}

#[test]
fn test_cell_wraps_mod_256() {
    let m = run(&"+".repeat(300)).unwrap();
    assert_eq!(44, m.cell(0));
    let m = run("-").unwrap();
    assert_eq!(255, m.cell(0));
}

#[test]
fn test_pointer_motion() {
    let m = run(">>+>++<").unwrap();
    assert_eq!(0, m.cell(0));
    assert_eq!(0, m.cell(1));
    assert_eq!(1, m.cell(2));
    assert_eq!(2, m.cell(3));
    assert_eq!(2, m.pointer());
}

#[test]
fn test_loop_skipped_on_zero() {
    // guarded block never runs, trailing increment does
    let m = run("[>+++++<]>+").unwrap();
    assert_eq!(1, m.cell(1));
}

#[test]
fn test_loop_moves_value() {
    let m = run("+++++[->+<]").unwrap();
    assert_eq!(0, m.cell(0));
    assert_eq!(5, m.cell(1));
}

#[test]
fn test_nested_loops() {
    // 3 * 4 by repeated addition
    let m = run("+++[->++++<]").unwrap();
    assert_eq!(4 * 3, m.cell(1));
}

#[test]
fn test_output() {
    let (_, out) = run_with_input("++++++++[->++++++++<]>+.", &[]).unwrap();
    assert_eq!(vec![65], out);
}

#[test]
fn test_input_echo() {
    let (m, out) = run_with_input(",.>,.", &[104, 105]).unwrap();
    assert_eq!(vec![104, 105], out);
    assert_eq!(104, m.cell(0));
    assert_eq!(105, m.cell(1));
}

#[test]
fn test_input_exhausted_leaves_cell() {
    let (m, _) = run_with_input("+++++,", &[]).unwrap();
    assert_eq!(5, m.cell(0));
}

#[test]
fn test_tape_underflow() {
    assert!(matches!(run("<"), Err(ExecError::TapeUnderflow(0))));
}

#[test]
fn test_unbalanced_open() {
    assert!(matches!(run("["), Err(ExecError::UnbalancedOpen(0))));
}

#[test]
fn test_unbalanced_close() {
    assert!(matches!(run("+]"), Err(ExecError::UnbalancedClose(1))));
}

#[test]
fn test_cycle_limit() {
    assert!(matches!(run("+[]"), Err(ExecError::CycleLimit(_))));
}

#[test]
fn test_cycles_counted() {
    let m = run("+++").unwrap();
    assert_eq!(3, m.cycles());
}
