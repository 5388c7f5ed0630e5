use kernfuse_dtype::DType;
use kernfuse_ir::{Constant, Instruction, Opcode};

use crate::backends::NullVem;
use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::error_code::ErrorCode;
use crate::runtime::Runtime;
use crate::test::helpers::*;

#[test]
fn test_new_array_allocates_fresh_bases() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let a = runtime.new_array(DType::Float32, &[4, 2]).unwrap();
    let b = runtime.new_array(DType::Int64, &[3]).unwrap();

    assert_ne!(a.base().id(), b.base().id());
    assert_eq!(a.base().nelem(), 8);
    assert_eq!(a.view().shape(), &[4, 2]);
    assert_eq!(b.base().nbytes(), 24);
    assert!(!a.is_temporary());
}

#[test]
fn test_new_array_rejects_negative_extent() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    assert!(matches!(runtime.new_array(DType::Float32, &[-1]), Err(Error::Instruction { .. })));
}

#[test]
fn test_queue_overflow_flushes_full_batches() {
    let vem = RecordingVem::default();
    let mut runtime = runtime(&vem, RuntimeConfig::default());

    for _ in 0..2050 {
        let [out, lhs, rhs] = arrays::<3>(&mut runtime);
        runtime.enqueue_binary(Opcode::Add, &out, &lhs, &rhs).unwrap();
    }
    assert_eq!(vem.batch_sizes(), vec![1024, 1024]);
    assert_eq!(runtime.pending().len(), 2);

    runtime.shutdown().unwrap();
    assert_eq!(vem.batch_sizes(), vec![1024, 1024, 2]);
    assert_eq!(vem.shutdowns(), 1);
}

#[test]
fn test_temporary_operand_is_released() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let [a, b, c] = arrays::<3>(&mut runtime);
    let b = b.temporary();

    runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();
    let opcodes: Vec<Opcode> = runtime.pending().iter().map(Instruction::opcode).collect();
    assert_eq!(opcodes, vec![Opcode::Add, Opcode::Free, Opcode::Discard]);
    assert_eq!(runtime.pending()[1], Instruction::free(b.base().clone()));
    assert_eq!(runtime.pending()[2], Instruction::discard(b.base().clone()));
}

#[test]
fn test_group_is_never_split() {
    let vem = RecordingVem::default();
    let mut runtime = runtime(&vem, unfused(4));
    let [a, b, c] = arrays::<3>(&mut runtime);

    for _ in 0..3 {
        runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();
    }
    let temp = runtime.new_array(DType::Float32, &[8]).unwrap().temporary();
    runtime.enqueue_binary(Opcode::Add, &a, &temp, &c).unwrap();

    assert_eq!(vem.batch_sizes(), vec![3]);
    assert_eq!(runtime.pending().len(), 3);
}

#[test]
fn test_oversized_group_goes_into_empty_queue() {
    let vem = RecordingVem::default();
    let mut runtime = runtime(&vem, unfused(2));
    let [a, b, c] = arrays::<3>(&mut runtime);

    runtime.enqueue_binary(Opcode::Add, &a, &b.temporary(), &c.temporary()).unwrap();
    assert!(vem.batch_sizes().is_empty());
    assert_eq!(runtime.pending().len(), 5);
    assert_eq!(runtime.flush().unwrap(), 5);
}

#[test]
fn test_flush_is_idempotent_on_empty_queue() {
    let vem = RecordingVem::default();
    let mut runtime = runtime(&vem, RuntimeConfig::default());
    assert_eq!(runtime.flush().unwrap(), 0);
    assert!(vem.batches().is_empty());
}

#[test]
fn test_flush_dispatches_fused_stream() {
    let vem = RecordingVem::default();
    let mut runtime = runtime(&vem, RuntimeConfig::default());
    let [a, b, c, d] = arrays::<4>(&mut runtime);

    runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();
    runtime.enqueue_binary(Opcode::Multiply, &d, &a, &a).unwrap();
    runtime.free(&a).unwrap();
    let pending = runtime.pending().to_vec();

    assert_eq!(runtime.flush().unwrap(), 4);
    assert_eq!(vem.batches(), vec![pending]);
    assert!(runtime.pending().is_empty());
}

#[test]
fn test_backend_error_is_reported_once() {
    let vem = RecordingVem::failing(ErrorCode::OutOfMemory);
    let mut runtime = runtime(&vem, RuntimeConfig::default());
    let [a, b, c] = arrays::<3>(&mut runtime);
    runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();

    let err = runtime.flush().unwrap_err();
    assert!(matches!(err, Error::Execution { count: 1, source: ErrorCode::OutOfMemory }));
    assert_eq!(err.code(), Some(ErrorCode::OutOfMemory));
    assert!(runtime.pending().is_empty());

    assert_eq!(runtime.flush().unwrap(), 0);
    assert_eq!(vem.batch_sizes(), vec![1]);
}

#[test]
fn test_constant_operands() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let [a, b] = arrays::<2>(&mut runtime);

    runtime.enqueue_fill(&a, Constant::native(1.5f32)).unwrap();
    runtime.enqueue_binary(Opcode::Multiply, &b, &a, Constant::native(2.0f32)).unwrap();
    runtime.enqueue_unary(Opcode::Sqrt, &b, &b).unwrap();
    runtime.enqueue_random(&a, 7).unwrap();

    let pending = runtime.pending();
    assert_eq!(pending.len(), 4);
    assert_eq!(pending[0].opcode(), Opcode::Identity);
    assert!(pending[0].operands()[1].is_const());
    assert!(pending[1].operands()[2].is_const());
    assert_eq!(pending[3].opcode(), Opcode::Random);
}

#[test]
fn test_invalid_instruction_is_rejected() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let [a, b] = arrays::<2>(&mut runtime);
    let err = runtime.enqueue_unary(Opcode::Add, &a, &b).unwrap_err();
    assert!(matches!(err, Error::Instruction { .. }));
    assert!(runtime.pending().is_empty());
}

#[test]
fn test_sync_and_free() {
    let mut runtime = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let [a] = arrays::<1>(&mut runtime);

    runtime.sync(&a).unwrap();
    runtime.free(&a).unwrap();
    let opcodes: Vec<Opcode> = runtime.pending().iter().map(Instruction::opcode).collect();
    assert_eq!(opcodes, vec![Opcode::Sync, Opcode::Free, Opcode::Discard]);
}

#[test]
fn test_register_function() {
    let mut null = Runtime::init(bridge(NullVem::new()), RuntimeConfig::default()).unwrap();
    assert_eq!(null.register_function("matmul").unwrap(), 0);
    assert_eq!(null.register_function("lu").unwrap(), 1);

    let mut recording = runtime(&RecordingVem::default(), RuntimeConfig::default());
    let err = recording.register_function("matmul").unwrap_err();
    assert!(matches!(err, Error::RegisterFunction { ref name, source: ErrorCode::UserFuncNotSupported } if name == "matmul"));
}

#[test]
fn test_drop_flushes_and_shuts_down() {
    let vem = RecordingVem::default();
    {
        let mut runtime = runtime(&vem, RuntimeConfig::default());
        let [a, b, c] = arrays::<3>(&mut runtime);
        runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();
    }
    assert_eq!(vem.batch_sizes(), vec![1]);
    assert_eq!(vem.shutdowns(), 1);
}

#[test]
fn test_shutdown_reports_failed_flush() {
    let vem = RecordingVem::failing(ErrorCode::InstNotSupported);
    let mut runtime = runtime(&vem, RuntimeConfig::default());
    let [a, b, c] = arrays::<3>(&mut runtime);
    runtime.enqueue_binary(Opcode::Add, &a, &b, &c).unwrap();

    let err = runtime.shutdown().unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InstNotSupported));
    assert_eq!(vem.shutdowns(), 1);
}
