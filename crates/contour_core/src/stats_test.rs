use super::*;

#[test]
fn test_timing_history_drops_oldest() {
  let mut history = TimingHistory::with_capacity(3);
  assert!(history.is_empty());

  for us in [10, 20, 30] {
    history.record(us);
  }
  assert_eq!(history.len(), 3);
  assert_eq!(history.total_us(), 60);
  assert_eq!(history.mean_us(), 20.0);

  history.record(40);
  assert_eq!(history.samples().collect::<Vec<_>>(), vec![20, 30, 40]);
  assert_eq!(history.range_us(), Some((20, 40)));
  assert_eq!(history.latest(), Some(40));
}

#[test]
fn test_empty_history() {
  let history = TimingHistory::default();
  assert_eq!(history.mean_us(), 0.0);
  assert_eq!(history.range_us(), None);
  assert_eq!(history.latest(), None);
}

#[test]
fn test_zero_capacity_keeps_nothing() {
  let mut history = TimingHistory::with_capacity(0);
  history.record(5);
  assert!(history.is_empty());
}

#[test]
fn test_metrics_record() {
  let mut metrics = MeshingMetrics::new();
  let stats = ExtractionStats {
    total_us: 500,
    vertex_count: 10,
    triangle_count: 16,
    ..Default::default()
  };
  metrics.record(&stats);
  metrics.record(&ExtractionStats {
    total_us: 1500,
    ..stats
  });
  metrics.record_failure();

  assert_eq!(metrics.meshes_generated, 2);
  assert_eq!(metrics.vertices_generated, 20);
  assert_eq!(metrics.triangles_generated, 32);
  assert_eq!(metrics.failures, 1);
  assert_eq!(metrics.avg_mesh_timing_us(), 1000.0);
  assert_eq!(metrics.last.map(|s| s.total_us), Some(1500));
}
