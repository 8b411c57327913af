use glam::Vec3;

use super::*;
use crate::scene::Transform;
use contour_core::test_utils::two_spheres;

const PROBES: [Vec3; 5] = [
  Vec3::ZERO,
  Vec3::new(0.8, 0.0, 0.0),
  Vec3::new(-1.5, 0.2, 0.0),
  Vec3::new(0.3, 0.9, -0.4),
  Vec3::new(3.0, 3.0, 3.0),
];

fn sphere_pair(scene: &mut Scene, combinator: SdfComponent) -> EntityId {
  let root = scene.spawn("csg");
  scene.node_mut(root).unwrap().sdf = Some(combinator);
  for x in [-0.8, 0.8] {
    let child = scene.spawn_child(root, "sphere").unwrap();
    let node = scene.node_mut(child).unwrap();
    node.sdf = Some(SdfComponent::Sphere);
    node.transform = Transform::from_translation(Vec3::new(x, 0.0, 0.0));
  }
  root
}

#[test]
fn test_entity_without_sdf_is_none() {
  let mut scene = Scene::new();
  let id = scene.spawn("empty");
  let sdf = snapshot_sdf(&scene, id).unwrap();
  assert_eq!(sdf.evaluate(Vec3::ZERO), f32::INFINITY);
}

#[test]
fn test_union_matches_core_tree() {
  let mut scene = Scene::new();
  let root = sphere_pair(&mut scene, SdfComponent::Union);
  let snapshot = snapshot_sdf(&scene, root).unwrap();
  let expected = two_spheres(1.6, SdfNode::Union);

  for p in PROBES {
    assert!((snapshot.evaluate(p) - expected.evaluate(p)).abs() < 1e-6, "at {p}");
  }
}

#[test]
fn test_intersect_matches_core_tree() {
  let mut scene = Scene::new();
  let root = sphere_pair(&mut scene, SdfComponent::Intersect);
  let snapshot = snapshot_sdf(&scene, root).unwrap();
  let expected = two_spheres(1.6, SdfNode::Intersect);

  for p in PROBES {
    assert!((snapshot.evaluate(p) - expected.evaluate(p)).abs() < 1e-6, "at {p}");
  }
}

#[test]
fn test_children_without_sdf_are_skipped() {
  let mut scene = Scene::new();
  let root = sphere_pair(&mut scene, SdfComponent::Union);
  let marker = scene.spawn_child(root, "marker").unwrap();
  scene.node_mut(marker).unwrap().transform = Transform::from_translation(Vec3::splat(5.0));

  let snapshot = snapshot_sdf(&scene, root).unwrap();
  let SdfNode::Union(children) = &snapshot else {
    panic!("expected union, got {snapshot:?}");
  };
  assert_eq!(children.len(), 2);
}

#[test]
fn test_root_transform_is_not_applied() {
  let mut scene = Scene::new();
  let id = scene.spawn("sphere");
  let node = scene.node_mut(id).unwrap();
  node.sdf = Some(SdfComponent::Sphere);
  node.transform = Transform::from_translation(Vec3::splat(10.0));

  let sdf = snapshot_sdf(&scene, id).unwrap();
  assert_eq!(sdf.evaluate(Vec3::ZERO), -1.0);
}

#[test]
fn test_nested_combinators() {
  let mut scene = Scene::new();
  let root = scene.spawn("root");
  scene.node_mut(root).unwrap().sdf = Some(SdfComponent::Union);
  let inner = sphere_pair(&mut scene, SdfComponent::Union);
  scene.set_parent(inner, Some(root)).unwrap();
  scene.node_mut(inner).unwrap().transform = Transform::from_translation(Vec3::Y * 2.0);

  let sdf = snapshot_sdf(&scene, root).unwrap();
  assert!(sdf.evaluate(Vec3::new(0.8, 2.0, 0.0)) < 0.0);
  assert!(sdf.evaluate(Vec3::new(0.8, 0.0, 0.0)) > 0.0);
  assert_eq!(sdf.depth(), 2);
}

#[test]
fn test_custom_sdf_is_shared() {
  let mut scene = Scene::new();
  let id = scene.spawn("custom");
  scene.node_mut(id).unwrap().sdf = Some(SdfComponent::custom(|p| p.y - 0.25));
  let sdf = snapshot_sdf(&scene, id).unwrap();
  assert_eq!(sdf.evaluate(Vec3::new(4.0, 0.25, -2.0)), 0.0);
  assert!(!sdf.is_gpu_compatible());
}

#[test]
fn test_stale_entity_fails() {
  let mut scene = Scene::new();
  let id = scene.spawn("gone");
  scene.despawn(id).unwrap();
  assert!(snapshot_sdf(&scene, id).is_err());
}
