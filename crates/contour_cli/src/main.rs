//! Scene mesher.
//!
//! Builds a scene from a TOML description, runs the mesh extraction system
//! for a number of frames and prints what every meshed entity produced.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use contour_scene::{
	update_meshes, DualContouringComponent, EntityId, ExtractionBackend, Scene, SdfComponent,
	Transform,
};
use std::path::PathBuf;

use config::{Config, EntityConfig, SdfKind};

/// Mesh SDF scenes with Dual Contouring.
#[derive(Parser, Debug)]
#[command(name = "contour")]
#[command(about = "Extracts meshes from SDF scenes and reports statistics")]
struct Args {
	/// Path to scene TOML file.
	#[arg(short, long)]
	scene: PathBuf,

	/// Where extraction runs.
	#[arg(short, long, value_enum, default_value_t = BackendArg::Cpu)]
	backend: BackendArg,

	/// Number of frames to simulate.
	#[arg(short, long, default_value_t = 1)]
	frames: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
	Cpu,
	SoftwareGpu,
	Gpu,
}

fn main() -> Result<()> {
	let args = Args::parse();

	println!("Loading scene from: {}", args.scene.display());
	let config = Config::load(&args.scene)?;

	let mut scene = Scene::new();
	let mut meshed = Vec::new();
	for entity in &config.entities {
		spawn_entity(&mut scene, None, entity, args.backend, &mut meshed)?;
	}

	println!(
		"Meshing {} of {} entities on {:?} for {} frame(s)",
		meshed.len(),
		scene.len(),
		args.backend,
		args.frames
	);

	let mut failures = 0;
	for frame in 0..args.frames {
		let report = update_meshes(&mut scene);
		for err in &report.failures {
			eprintln!("  frame {frame}: {err}");
		}
		failures += report.failures.len();
		println!(
			"  frame {frame}: {} updated, {} empty, {} skipped, {} failed ({} us)",
			report.updated.len(),
			report.empty.len(),
			report.skipped,
			report.failures.len(),
			report.frame_us
		);
	}

	println!();
	for id in meshed {
		print_entity(&scene, id)?;
	}

	if failures > 0 {
		anyhow::bail!("{failures} extraction(s) failed");
	}
	Ok(())
}

/// Spawn `config` and its subtree, collecting entities that carry an extractor.
fn spawn_entity(
	scene: &mut Scene,
	parent: Option<EntityId>,
	config: &EntityConfig,
	backend: BackendArg,
	meshed: &mut Vec<EntityId>,
) -> Result<EntityId> {
	let id = match parent {
		Some(parent) => scene.spawn_child(parent, config.name.as_str())?,
		None => scene.spawn(config.name.as_str()),
	};

	let extractor = match &config.mesh {
		Some(mesh) => Some(
			DualContouringComponent::new(mesh.params())
				.with_enable_update(mesh.enable_update)
				.with_backend(make_backend(backend)?),
		),
		None => None,
	};
	if extractor.is_some() {
		meshed.push(id);
	}

	let node = scene.node_mut(id)?;
	node.transform = Transform::from_translation(config.translation())
		.with_rotation(config.rotation())
		.with_scale(config.scale());
	node.sdf = config.sdf.map(|kind| match kind {
		SdfKind::Sphere => SdfComponent::Sphere,
		SdfKind::Box => SdfComponent::Box,
		SdfKind::Plane => SdfComponent::Plane,
		SdfKind::Union => SdfComponent::Union,
		SdfKind::Intersect => SdfComponent::Intersect,
	});
	node.extractor = extractor;

	for child in &config.children {
		spawn_entity(scene, Some(id), child, backend, meshed)?;
	}
	Ok(id)
}

fn make_backend(backend: BackendArg) -> Result<ExtractionBackend> {
	match backend {
		BackendArg::Cpu => Ok(ExtractionBackend::Cpu),
		BackendArg::SoftwareGpu => Ok(ExtractionBackend::software_gpu()),
		#[cfg(feature = "gpu")]
		BackendArg::Gpu => ExtractionBackend::wgpu().context("Failed to create GPU backend"),
		#[cfg(not(feature = "gpu"))]
		BackendArg::Gpu => anyhow::bail!("Built without the `gpu` feature; use cpu or software-gpu"),
	}
}

fn print_entity(scene: &Scene, id: EntityId) -> Result<()> {
	let node = scene
		.node(id)
		.with_context(|| format!("Entity {id} vanished"))?;
	let Some(extractor) = &node.extractor else {
		return Ok(());
	};
	let metrics = &extractor.metrics;

	println!("{} [{}]", node.name, extractor.backend.name());
	match extractor.last_stats() {
		Some(stats) => {
			println!(
				"  grid {}x{}x{}: {} vertices, {} triangles",
				stats.grid_size[0],
				stats.grid_size[1],
				stats.grid_size[2],
				stats.vertex_count,
				stats.triangle_count
			);
			println!(
				"  last {} us, average {:.1} us over {} mesh(es), {} failure(s)",
				stats.total_us,
				metrics.avg_mesh_timing_us(),
				metrics.meshes_generated,
				metrics.failures
			);
		}
		None => println!("  no mesh ({} failure(s))", metrics.failures),
	}
	if let Some(mesh) = &node.mesh {
		println!(
			"  mesh revision {}: {} vertices, {} triangles",
			mesh.revision(),
			mesh.vertices().len(),
			mesh.triangle_count()
		);
	}
	Ok(())
}
