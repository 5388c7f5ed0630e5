use std::sync::Arc;

use kernfuse_ir::{BhIr, FusionPolicy, Instruction, Kernel, Opcode};

use crate::error::Error;
use crate::fusion::{FuseConfig, FuseStrategy, Fuser};
use crate::test::helpers::*;

fn workload() -> Vec<Instruction> {
    let [a, b, c, d, e, f] = arrays::<6>(8);
    let mut instrs = vec![
        add(&a, &b, &c),
        binary_const(Opcode::Multiply, &d, &a, 2.0),
        binary_const(Opcode::Divide, &e, &a, 2.0),
        binary(Opcode::Subtract, &f, &d, &e),
    ];
    instrs.extend(release(&d));
    instrs.extend(release(&e));
    instrs
}

#[derive(Debug)]
struct NeverFuse;

impl FusionPolicy for NeverFuse {
    fn fusible(&self, _: &Kernel, _: &Kernel) -> bool {
        false
    }

    fn fusible_gently(&self, _: &Kernel, _: &Kernel) -> bool {
        false
    }

    fn name(&self) -> &str {
        "never"
    }
}

#[test]
fn test_fuse_rejects_fused_batch() {
    let mut bhir = BhIr::new(workload());
    bhir.kernel_list.push(Kernel::new());

    let err = Fuser::new(FuseConfig::default()).fuse(&mut bhir).unwrap_err();
    assert!(matches!(err, Error::KernelListNotEmpty { kernels: 1 }));
}

#[test]
fn test_singleton_keeps_every_instruction_apart() {
    let config = FuseConfig::builder().strategies(vec![FuseStrategy::Singleton]).build();
    let bhir = fused(&workload(), &config);
    assert_eq!(bhir.kernel_list.len(), workload().len());
    assert_eq!(bhir.flatten(), workload());
}

#[test]
fn test_default_pipeline_fuses_workload() {
    let bhir = fused(&workload(), &FuseConfig::default());
    assert_eq!(bhir.kernel_list.len(), 1);
    assert_respects_dependencies(&workload(), &bhir.flatten());
}

#[test]
fn test_policy_is_consulted() {
    let mut bhir = BhIr::new(workload());
    let fuser = Fuser::with_policy(FuseConfig::default(), Arc::new(NeverFuse));
    assert_eq!(fuser.fuse(&mut bhir).unwrap(), workload().len());
}

#[test]
fn test_fuse_is_deterministic() {
    let config = FuseConfig::default();
    let first = fused(&workload(), &config);
    let second = fused(&workload(), &config);
    assert_eq!(first.kernel_list, second.kernel_list);
}

#[test]
fn test_dot_dumps_per_batch() {
    let dir = std::env::temp_dir().join(format!("kernfuse-dumps-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let fuser = Fuser::new(FuseConfig::builder().dot_dir(dir.clone()).build());
    for _ in 0..2 {
        fuser.fuse(&mut BhIr::new(workload())).unwrap();
    }

    let mut names: Vec<String> =
        std::fs::read_dir(&dir).unwrap().map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned()).collect();
    names.sort();
    assert_eq!(names, ["batch-0000-post.dot", "batch-0000-pre.dot", "batch-0001-post.dot", "batch-0001-pre.dot"]);
    std::fs::remove_dir_all(&dir).unwrap();
}
