use super::*;
use crate::compute::group_count;

/// Doubles every word of buffer 0 covered by the dispatch (4 per group on X).
fn double_words(buffers: &mut [Vec<u32>], groups: UVec3) {
  let threads = (groups.x * 4) as usize;
  for word in buffers[0].iter_mut().take(threads) {
    *word *= 2;
  }
}

fn registry() -> KernelRegistry {
  KernelRegistry::new().with_kernel("double", double_words)
}

#[test]
fn test_write_dispatch_read() {
  let mut job = SoftwareComputeJob::new(registry());
  job.init(&["double"], &[32]).unwrap();

  let input: Vec<u32> = (1..=8).collect();
  job.write_buffer(0, bytemuck::cast_slice(&input)).unwrap();
  job.dispatch_immediate(0, UVec3::new(2, 1, 1)).unwrap();

  let bytes = job.read_buffer(0, 32).unwrap();
  let output: Vec<u32> = bytemuck::pod_collect_to_vec(&bytes);
  assert_eq!(output, vec![2, 4, 6, 8, 10, 12, 14, 16]);
  assert_eq!(job.dispatch_count(), 1);
}

#[test]
fn test_partial_dispatch_leaves_tail_untouched() {
  let mut job = SoftwareComputeJob::new(registry());
  job.init(&["double"], &[32]).unwrap();
  job.write_buffer(0, bytemuck::cast_slice(&[1u32; 8])).unwrap();
  job.dispatch_immediate(0, UVec3::ONE).unwrap();

  let output: Vec<u32> = bytemuck::pod_collect_to_vec(&job.read_buffer(0, 32).unwrap());
  assert_eq!(output, vec![2, 2, 2, 2, 1, 1, 1, 1]);
}

#[test]
fn test_unknown_kernel_fails_init() {
  let mut job = SoftwareComputeJob::new(registry());
  let err = job.init(&["double", "missing"], &[4]).unwrap_err();
  assert!(matches!(err, Error::UnknownKernel(name) if name == "missing"));
  assert_eq!(job.init_count(), 0);
}

#[test]
fn test_dispatch_before_init() {
  let mut job = SoftwareComputeJob::new(registry());
  assert!(matches!(job.dispatch_immediate(0, UVec3::ONE), Err(Error::NotInitialized)));
}

#[test]
fn test_buffer_bounds_are_checked() {
  let mut job = SoftwareComputeJob::new(registry());
  job.init(&["double"], &[6]).unwrap();

  // Unaligned sizes are allowed up to the declared byte size
  job.write_buffer(0, &[1, 2, 3, 4, 5, 6]).unwrap();
  assert_eq!(job.read_buffer(0, 6).unwrap(), vec![1, 2, 3, 4, 5, 6]);

  assert!(matches!(
    job.write_buffer(0, &[0; 7]),
    Err(Error::BufferOutOfRange { index: 0, len: 7, capacity: 6 })
  ));
  assert!(job.read_buffer(1, 4).is_err());
}

#[test]
fn test_reinit_clears_buffers() {
  let mut job = SoftwareComputeJob::new(registry());
  job.init(&["double"], &[8]).unwrap();
  job.write_buffer(0, &[9; 8]).unwrap();
  job.init(&["double"], &[8]).unwrap();
  assert_eq!(job.read_buffer(0, 8).unwrap(), vec![0; 8]);
  assert_eq!(job.init_count(), 2);
}

#[test]
fn test_group_count_rounds_up() {
  assert_eq!(group_count(UVec3::new(1, 4, 5)), UVec3::new(1, 1, 2));
  assert_eq!(group_count(UVec3::new(24, 0, 9)), UVec3::new(6, 0, 3));
}

#[test]
fn test_boxed_job_forwards() {
  let mut job: Box<dyn ComputeJob> = Box::new(SoftwareComputeJob::new(registry()));
  job.init(&["double"], &[4]).unwrap();
  job.write_buffer(0, bytemuck::bytes_of(&21u32)).unwrap();
  job.dispatch_immediate(0, UVec3::ONE).unwrap();
  assert_eq!(job.read_buffer(0, 4).unwrap(), 42u32.to_ne_bytes().to_vec());
  assert_eq!(job.name(), "software");
}
