use kernfuse_dtype::DType;
use kernfuse_ir::{BaseArray, BaseId, Instruction, Opcode, View};

use crate::array::Array;
use crate::queue::{InstructionQueue, with_releases};

fn array(id: u64) -> Array {
    Array::new(View::contiguous(BaseArray::new(BaseId(id), DType::Float32, 8)))
}

fn add(out: &Array, lhs: &Array, rhs: &Array) -> Instruction {
    Instruction::binary(Opcode::Add, out.view().clone(), lhs.view().clone(), rhs.view().clone()).unwrap()
}

#[test]
fn test_queue_fits_until_capacity() {
    let (a, b, c) = (array(0), array(1), array(2));
    let mut queue = InstructionQueue::new(3);
    assert!(queue.fits(3));

    queue.push([add(&a, &b, &c), add(&a, &b, &c)]);
    assert!(queue.fits(1));
    assert!(!queue.fits(2));
}

#[test]
fn test_queue_oversized_group_fits_empty_queue() {
    let queue = InstructionQueue::new(2);
    assert!(queue.fits(5));
}

#[test]
fn test_queue_zero_capacity_is_clamped() {
    assert_eq!(InstructionQueue::new(0).capacity(), 1);
    assert_eq!(InstructionQueue::default().capacity(), 1024);
}

#[test]
fn test_queue_take_empties() {
    let (a, b, c) = (array(0), array(1), array(2));
    let mut queue = InstructionQueue::new(4);
    queue.push([add(&a, &b, &c)]);

    let batch = queue.take();
    assert_eq!(batch, vec![add(&a, &b, &c)]);
    assert!(queue.is_empty());
    assert_eq!(queue.take(), vec![]);
}

#[test]
fn test_releases_follow_instruction() {
    let (a, b, c) = (array(0), array(1).temporary(), array(2).temporary());
    let instr = add(&a, &b, &c);

    let group = with_releases(instr.clone(), [&a, &b, &c]);
    let expected = [
        instr,
        Instruction::free(b.base().clone()),
        Instruction::discard(b.base().clone()),
        Instruction::free(c.base().clone()),
        Instruction::discard(c.base().clone()),
    ];
    assert_eq!(group.as_slice(), expected.as_slice());
}

#[test]
fn test_releases_once_per_base() {
    let (a, b) = (array(0), array(1).temporary());
    let half = b.slice(4, &[4], &[1]).unwrap().temporary();
    let group = with_releases(add(&a, &b, &b), [&a, &b, &b, &half]);
    assert_eq!(group.len(), 3);
    assert_eq!(group[1].opcode(), Opcode::Free);
    assert_eq!(group[2].opcode(), Opcode::Discard);
}

#[test]
fn test_no_releases_without_temporaries() {
    let (a, b, c) = (array(0), array(1), array(2));
    assert_eq!(with_releases(add(&a, &b, &c), [&a, &b, &c]).len(), 1);
}
