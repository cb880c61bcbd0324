mod common;
use common::*;

#[test]
fn test_push_immediate() {
    let (asm, vm) = run("PUSH @top 5\nPUSH @top 0\nPUSH @top 255");
    assert_stack!(asm, vm, [5, 0, 255]);
}

#[test]
fn test_push_immediate_wraps() {
    let (asm, vm) = run("PUSH @top 300");
    assert_stack!(asm, vm, [44]);
}

#[test]
fn test_push16_immediate() {
    let cases = [0u32, 1, 255, 256, 3000, 65535];
    for v in cases {
        let (asm, vm) = run(&format!("PUSH:16 @top {v}"));
        assert_stack16!(asm, vm, [v]);
    }
}

#[test]
fn test_aloc_assigns_increasing_cells() {
    let (asm, vm) = run(
        "ALOC a 1
         ALOC b 1
         PUSH @top &a
         PUSH @top &b
         PUSH @top 5",
    );
    assert_eq!(5, asm.stack_pointer());
    assert_stack!(asm, vm, [0, 1, 5]);
}

#[test]
fn test_aloc_sixteen_bit_units() {
    let (asm, vm) = run("ALOC:16 w 1\nALOC q 1\nPUSH @top &q");
    // a 16-bit unit takes four cells, so q lands on cell 4
    assert_stack!(asm, vm, [4]);
}

#[test]
fn test_push_variable_is_nondestructive() {
    let (asm, vm) = run(
        "ALOC a 1
         PUSH @a 255
         PUSH @a 77
         PUSH @top @a
         PUSH @top @a",
    );
    assert_eq!(77, vm.cell(0));
    assert_stack!(asm, vm, [77, 77]);
}

#[test]
fn test_push16_variable() {
    let (asm, vm) = run(
        "ALOC:16 w 1
         PUSH:16 @w 40000
         PUSH:16 @top @w:16",
    );
    assert_eq!(64, vm.cell(0));
    assert_eq!(156, vm.cell(1));
    assert_stack16!(asm, vm, [40000]);
}

#[test]
fn test_push_dup() {
    let (asm, vm) = run("PUSH @top 9\nPUSH @top @top");
    assert_stack!(asm, vm, [9, 9]);
}

#[test]
fn test_push16_dup() {
    let (asm, vm) = run("PUSH:16 @top 999\nPUSH:16 @top @top");
    assert_stack16!(asm, vm, [999, 999]);
}

#[test]
fn test_push_top_into_variable() {
    let (asm, vm) = run(
        "ALOC a 1
         PUSH @top 9
         PUSH @a @top",
    );
    assert_eq!(9, vm.cell(0));
    assert_stack!(asm, vm, [9]);
}

#[test]
fn test_popv_discards_and_cleans() {
    let (asm, vm) = run("PUSH @top 5\nPUSH @top 9\nPOPV @top");
    assert_stack!(asm, vm, [5]);
}

#[test]
fn test_popv16() {
    let (asm, vm) = run("PUSH:16 @top 3000\nPUSH:16 @top 65535\nPOPV:16 @top");
    assert_stack16!(asm, vm, [3000]);
}

#[test]
fn test_popv_into_variable() {
    for v in [0u32, 1, 77, 255, 300] {
        let (asm, vm) = run(&format!(
            "ALOC a 1
             ALOC b 1
             ALOC c 1
             PUSH @b 5
             PUSH @top {v}
             POPV @b @top"
        ));
        assert_cells!(vm, 0, [0, (v % 256) as u8, 0]);
        assert_stack!(asm, vm, []);
    }
}

#[test]
fn test_popv16_into_variable() {
    let (asm, vm) = run(
        "ALOC:16 w 1
         PUSH:16 @top 40000
         POPV:16 @w @top",
    );
    assert_eq!(64, vm.cell(0));
    assert_eq!(156, vm.cell(1));
    assert_stack!(asm, vm, []);
}

#[test]
fn test_swap() {
    let cases = [(0, 0), (0, 1), (1, 0), (5, 10), (255, 0), (255, 255)];
    for (a, b) in cases {
        let (asm, vm) = run(&format!("PUSH @top {a}\nPUSH @top {b}\nSWAP @top @top"));
        assert_stack!(asm, vm, [b, a]);
    }
}

#[test]
fn test_geti_from_stack() {
    for i in 0..5u8 {
        let (asm, vm) = run(&format!(
            "PUSH @top 1
             PUSH @top 2
             PUSH @top 3
             PUSH @top 4
             PUSH @top 5
             PUSH @top {i}
             GETI @top @top"
        ));
        assert_stack!(asm, vm, [1, 2, 3, 4, 5, i + 1]);
    }
}

#[test]
fn test_seti_from_stack() {
    for i in 0..5usize {
        let (asm, vm) = run(&format!(
            "PUSH @top 1
             PUSH @top 2
             PUSH @top 3
             PUSH @top 4
             PUSH @top 5
             PUSH @top 10
             PUSH @top {i}
             SETI @top @top"
        ));
        let mut expected = [1u8, 2, 3, 4, 5];
        expected[i] = 10;
        assert_stack!(
            asm,
            vm,
            [expected[0], expected[1], expected[2], expected[3], expected[4]]
        );
    }
}

#[test]
fn test_geti_named_array() {
    let (asm, vm) = run(
        "ALOC arr 3
         PUSH @arr[0] 10
         PUSH @arr[1] 20
         PUSH @arr[2] 30
         PUSH @top 2
         GETI @top @arr",
    );
    assert_cells!(vm, 0, [10, 20, 30]);
    assert_stack!(asm, vm, [30]);
}

#[test]
fn test_seti_named_array() {
    let (asm, vm) = run(
        "ALOC arr 3
         PUSH @arr[0] 10
         PUSH @arr[1] 20
         PUSH @arr[2] 30
         PUSH @top 99
         PUSH @top 1
         SETI @arr @top",
    );
    assert_cells!(vm, 0, [10, 99, 30]);
    assert_stack!(asm, vm, []);
}

#[test]
fn test_indirect_address_reads_through_geti() {
    let (asm, vm) = run(
        "ALOC arr 3
         PUSH @arr[0] 10
         PUSH @arr[1] 20
         PUSH @arr[2] 30
         PUSH @top 1
         PUSH @top @arr[@top]",
    );
    assert_stack!(asm, vm, [20]);
}

#[test]
fn test_indirect_address_writes_through_seti() {
    let (asm, vm) = run(
        "ALOC arr 3
         PUSH @arr[0] 10
         PUSH @arr[1] 20
         PUSH @arr[2] 30
         PUSH @top 77
         PUSH @top 0
         POPV @arr[@top] @top",
    );
    assert_cells!(vm, 0, [77, 20, 30]);
    assert_stack!(asm, vm, []);
}

#[test]
fn test_constant_index_folds_at_assembly_time() {
    let (asm, vm) = run(
        "ALOC arr 3
         PUSH @arr[2] 42
         PUSH @top @arr[2]",
    );
    assert_cells!(vm, 0, [0, 0, 42]);
    assert_stack!(asm, vm, [42]);
}

#[test]
fn test_noise_insensitivity() {
    let core = "PUSH @top 3\nPUSH @top 4\nPLUS @top @top @top";
    let (asm, vm) = run(core);
    assert_stack!(asm, vm, [7]);
    let noisy = format!("PUSH @top 9\nPUSH @top 8\n{core}");
    let (asm, vm) = run(&noisy);
    assert_stack!(asm, vm, [9, 8, 7]);
}

#[test]
fn test_read() {
    let (asm, vm, _) = run_with_input("READ 3", &[7, 8, 9]);
    assert_stack!(asm, vm, [7, 8, 9]);
}

#[test]
fn test_outp_peeks() {
    let (asm, vm, out) = run_with_input("PUSH @top 65\nOUTP @top", &[]);
    assert_eq!(vec![65], out);
    assert_stack!(asm, vm, [65]);
}

#[test]
fn test_outc() {
    let (asm, vm, out) = run_with_input(
        "ALOC msg 3
         PUSH @msg[0] 72
         PUSH @msg[1] 73
         PUSH @msg[2] 33
         OUTC @msg 3",
        &[],
    );
    assert_eq!(b"HI!".to_vec(), out);
    assert_stack!(asm, vm, []);
}
