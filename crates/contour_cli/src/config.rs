//! Scene description parsing.

use anyhow::{Context, Result};
use contour_core::DualContouringParams;
use glam::{EulerRot, Quat, Vec3};
use serde::Deserialize;
use std::path::Path;

/// Root of a scene file.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Root entities.
	#[serde(rename = "entity")]
	pub entities: Vec<EntityConfig>,
}

/// One entity and its subtree.
#[derive(Debug, Deserialize)]
pub struct EntityConfig {
	pub name: String,
	/// Distance field contributed by this entity.
	pub sdf: Option<SdfKind>,
	/// Local translation.
	#[serde(default)]
	pub translation: [f32; 3],
	/// Local rotation as XYZ Euler angles in degrees.
	#[serde(default)]
	pub rotation: [f32; 3],
	/// Local scale.
	#[serde(default = "default_scale")]
	pub scale: [f32; 3],
	/// Present on entities that should be meshed.
	pub mesh: Option<MeshConfig>,
	#[serde(default)]
	pub children: Vec<EntityConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdfKind {
	Sphere,
	Box,
	Plane,
	Union,
	Intersect,
}

/// Extraction settings. Missing fields keep the library defaults.
#[derive(Debug, Default, Deserialize)]
pub struct MeshConfig {
	pub min_bound: Option<[f32; 3]>,
	pub max_bound: Option<[f32; 3]>,
	pub resolution: Option<f32>,
	pub normal_delta: Option<f32>,
	pub iteration_count: Option<u32>,
	pub step_size: Option<f32>,
	/// Re-extract every frame instead of once.
	#[serde(default)]
	pub enable_update: bool,
}

fn default_scale() -> [f32; 3] {
	[1.0; 3]
}

impl Config {
	/// Load a scene from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read scene file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate scene TOML.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).with_context(|| "Failed to parse scene TOML")?;

		if config.entities.is_empty() {
			anyhow::bail!("Scene must have at least one [[entity]]");
		}
		for entity in &config.entities {
			entity.validate()?;
		}

		Ok(config)
	}
}

impl EntityConfig {
	fn validate(&self) -> Result<()> {
		if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
			anyhow::bail!("Entity '{}': scale must be positive, got {:?}", self.name, self.scale);
		}
		if let Some(mesh) = &self.mesh {
			mesh.params()
				.validate()
				.with_context(|| format!("Entity '{}': invalid mesh settings", self.name))?;
		}
		for child in &self.children {
			child.validate()?;
		}
		Ok(())
	}

	pub fn translation(&self) -> Vec3 {
		Vec3::from_array(self.translation)
	}

	pub fn rotation(&self) -> Quat {
		let [x, y, z] = self.rotation.map(f32::to_radians);
		Quat::from_euler(EulerRot::XYZ, x, y, z)
	}

	pub fn scale(&self) -> Vec3 {
		Vec3::from_array(self.scale)
	}
}

impl MeshConfig {
	/// Library defaults overridden by the fields present in the file.
	pub fn params(&self) -> DualContouringParams {
		let mut params = DualContouringParams::default();
		if let Some(min) = self.min_bound {
			params.min_bound = Vec3::from_array(min);
		}
		if let Some(max) = self.max_bound {
			params.max_bound = Vec3::from_array(max);
		}
		if let Some(resolution) = self.resolution {
			params.resolution = resolution;
		}
		if let Some(delta) = self.normal_delta {
			params.normal_delta = delta;
		}
		if let Some(count) = self.iteration_count {
			params.iteration_count = count;
		}
		if let Some(step) = self.step_size {
			params.step_size = step;
		}
		params
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TWO_SPHERES: &str = r#"
[[entity]]
name = "spheres"
sdf = "union"

[entity.mesh]
min_bound = [-2.7, -1.2, -1.2]
max_bound = [2.7, 1.2, 1.2]
resolution = 8.0

[[entity.children]]
name = "left"
sdf = "sphere"
translation = [-1.5, 0.0, 0.0]

[[entity.children]]
name = "right"
sdf = "sphere"
translation = [1.5, 0.0, 0.0]
"#;

	#[test]
	fn test_parse_nested_entities() {
		let config = Config::parse(TWO_SPHERES).unwrap();
		assert_eq!(config.entities.len(), 1);

		let root = &config.entities[0];
		assert_eq!(root.sdf, Some(SdfKind::Union));
		assert_eq!(root.children.len(), 2);
		assert_eq!(root.children[0].translation(), Vec3::new(-1.5, 0.0, 0.0));
		assert_eq!(root.children[1].scale(), Vec3::ONE);

		let params = root.mesh.as_ref().unwrap().params();
		assert_eq!(params.resolution, 8.0);
		assert_eq!(params.iteration_count, DualContouringParams::default().iteration_count);
		assert!(!root.mesh.as_ref().unwrap().enable_update);
	}

	#[test]
	fn test_rejects_empty_scene() {
		assert!(Config::parse("entity = []").is_err());
	}

	#[test]
	fn test_rejects_invalid_mesh_settings() {
		let content = TWO_SPHERES.replace("resolution = 8.0", "resolution = 0.0");
		let err = Config::parse(&content).unwrap_err();
		assert!(format!("{err:#}").contains("spheres"));
	}

	#[test]
	fn test_rejects_unknown_sdf() {
		let content = TWO_SPHERES.replace("sdf = \"union\"", "sdf = \"torus\"");
		assert!(Config::parse(&content).is_err());
	}

	#[test]
	fn test_rotation_is_degrees() {
		let content = TWO_SPHERES.replace(
			"translation = [-1.5, 0.0, 0.0]",
			"translation = [-1.5, 0.0, 0.0]\nrotation = [0.0, 0.0, 90.0]",
		);
		let config = Config::parse(&content).unwrap();
		let rotated = config.entities[0].children[0].rotation() * Vec3::X;
		assert!((rotated - Vec3::Y).length() < 1e-5);
	}
}
