use kernfuse_ir::{DefaultPolicy, Instruction, Opcode};

use crate::cost::dag_cost;
use crate::fusion::fuse_gently;
use crate::test::helpers::*;

#[test]
fn test_chain_collapses() {
    let [a, b, c, d, e] = arrays::<5>(8);
    let mut graph = singleton(&[add(&a, &b, &c), mul(&d, &a, &a), binary(Opcode::Subtract, &e, &d, &b)]);

    assert_eq!(fuse_gently(&mut graph, &DefaultPolicy), 2);
    assert_eq!(graph.num_vertices(), 1);
    assert_eq!(graph.kernel(graph.vertices().next().unwrap()).len(), 3);
}

#[test]
fn test_releases_join_their_producer() {
    let [a, b, c, d] = arrays::<4>(8);
    let mut instrs = vec![add(&a, &b, &c), mul(&d, &a, &a)];
    instrs.extend(release(&a));
    let mut graph = singleton(&instrs);

    fuse_gently(&mut graph, &DefaultPolicy);
    assert_eq!(graph.num_vertices(), 1);
    let kernel = graph.kernel(graph.vertices().next().unwrap());
    assert_eq!(kernel.temps().iter().map(|b| b.id().0).collect::<Vec<_>>(), vec![0]);
}

#[test]
fn test_diamond_is_left_alone() {
    let [a, b, c, d, e, f] = arrays::<6>(8);
    let mut graph = singleton(&[
        add(&a, &b, &c),
        binary_const(Opcode::Multiply, &d, &a, 2.0),
        binary_const(Opcode::Divide, &e, &a, 2.0),
        binary(Opcode::Subtract, &f, &d, &e),
    ]);

    assert_eq!(fuse_gently(&mut graph, &DefaultPolicy), 0);
    assert_eq!(graph.num_vertices(), 4);
}

#[test]
fn test_does_not_cross_sync() {
    let [a, b, c] = arrays::<3>(8);
    let mut graph = singleton(&[add(&a, &b, &c), Instruction::sync(a.clone()), mul(&a, &a, &a)]);
    assert_eq!(fuse_gently(&mut graph, &DefaultPolicy), 0);
    assert_eq!(graph.num_vertices(), 3);
}

#[test]
fn test_broadcast_pair_is_not_gentle() {
    let grid = kernfuse_ir::View::row_major(base(0, 8), &[4, 2]).unwrap();
    let row = kernfuse_ir::View::row_major(base(1, 2), &[2]).unwrap();
    let mut graph = singleton(&[add(&grid, &grid, &grid), add(&row, &row, &grid)]);
    assert_eq!(fuse_gently(&mut graph, &DefaultPolicy), 0);
}

#[test]
fn test_cost_does_not_grow() {
    let [a, b, c, d, e] = arrays::<5>(8);
    let mut instrs = vec![add(&a, &b, &c), mul(&d, &a, &a), binary(Opcode::Subtract, &e, &d, &b)];
    instrs.extend(release(&a));
    instrs.extend(release(&d));
    let mut graph = singleton(&instrs);

    let before = dag_cost(&graph);
    fuse_gently(&mut graph, &DefaultPolicy);
    assert!(dag_cost(&graph) < before);
    // b, c and e remain.
    assert_eq!(dag_cost(&graph), 96);
}
