//! End-to-end batches through the default pipeline.

use kernfuse_ir::{Instruction, Opcode};

use crate::fusion::{FuseConfig, fuse_gently};
use crate::test::helpers::*;

#[test]
fn test_linear_chain() {
    let [a, b, c, d, e] = arrays::<5>(8);
    let mut instrs = vec![add(&a, &b, &c), mul(&d, &a, &a), binary(Opcode::Subtract, &e, &d, &b)];
    instrs.extend(release(&a));
    instrs.extend(release(&d));

    let bhir = fused(&instrs, &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 1);
    assert_respects_dependencies(&instrs, &bhir.flatten());

    let kernel = &bhir.kernel_list[0];
    let mut temps: Vec<u64> = kernel.temps().iter().map(|b| b.id().0).collect();
    temps.sort();
    assert_eq!(temps, vec![0, 3]);
    assert_eq!(kernel.cost(), 96);
}

#[test]
fn test_independent_branches() {
    let [a, b, c, x, y, z] = arrays::<6>(8);
    let instrs = [add(&a, &b, &c), add(&x, &y, &z)];

    let mut graph = singleton(&instrs);
    assert_eq!(graph.num_edges_d(), 0);
    assert_eq!(graph.num_edges_w(), 0);
    assert_eq!(fuse_gently(&mut graph, &kernfuse_ir::DefaultPolicy), 0);

    let bhir = fused(&instrs, &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 2);
    assert_eq!(bhir.flatten(), instrs.to_vec());
}

#[test]
fn test_diamond() {
    let [a, b, c, d, e, f] = arrays::<6>(8);
    let instrs = [
        add(&a, &b, &c),
        binary_const(Opcode::Multiply, &d, &a, 2.0),
        binary_const(Opcode::Divide, &e, &a, 2.0),
        binary(Opcode::Subtract, &f, &d, &e),
    ];

    let bhir = fused(&instrs, &FuseConfig::default());
    assert!(bhir.kernel_list.len() <= 2);
    assert_respects_dependencies(&instrs, &bhir.flatten());
}

#[test]
fn test_sync_barrier() {
    let [a, b, c] = arrays::<3>(8);
    let instrs = [add(&a, &b, &c), Instruction::sync(a.clone()), mul(&a, &a, &a)];

    let bhir = fused(&instrs, &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 3);
    assert_eq!(bhir.flatten(), instrs.to_vec());
    assert!(bhir.kernel_list.iter().filter(|k| k.has_sync()).all(|k| k.len() == 1));
}

#[test]
fn test_sync_barrier_holds_for_readers() {
    let [a, b, c, d] = arrays::<4>(8);
    let instrs = [add(&a, &b, &c), Instruction::sync(a.clone()), add(&d, &a, &a)];

    let bhir = fused(&instrs, &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 3);
    assert_eq!(bhir.flatten(), instrs.to_vec());
}

#[test]
fn test_full_queue_chain_collapses() {
    let [a, b] = arrays::<2>(8);
    let instrs = vec![add(&a, &a, &b); 1024];

    let bhir = fused(&instrs, &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 1);
    assert_eq!(bhir.kernel_list[0].len(), 1024);
    // a and b, once each.
    assert_eq!(bhir.kernel_list[0].cost(), 64);
}
