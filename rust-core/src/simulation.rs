// Simulation module: top-level setup of geometry, materials and beam, and the event loop
// Every configuration problem surfaces here as a Result; nothing terminates the process

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analysis::{EventRecord, RunAnalysis, RunSettings, RunSummary, TrackerHit};
use crate::beam::{BeamSampler, BeamSettings, ParticleSpecies, PrimaryVertex};
use crate::config::{DEFAULT_ENERGY_CUTOFF_FRACTION, DEFAULT_POSITION_CUTOFF_R};
use crate::geometry::{DetectorLayout, GeometryConfig};
use crate::materials::{resolve_target_material, CommonMaterials, Material};
use crate::Result;

/// User-facing run configuration; angles in degrees, lengths in mm, energies in MeV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub target_thickness: f64,
    /// Catalog name or `NAME::pressure` gas description
    pub target_material: String,
    pub detector_distance: f64,
    /// Detector rotation about y [deg], 0 for an unrotated detector
    pub detector_angle: f64,
    /// Target rotation about y [deg], 0 for an unrotated target
    pub target_angle: f64,
    /// Transverse world size, 0 for automatic sizing
    pub world_size: f64,
    pub magnet_definitions: Vec<String>,

    pub beam_energy: f64,
    pub beam_type: String,
    /// Horizontal beam offset [mm]
    pub beam_offset: f64,
    /// Beam start along z, 0 for automatic placement
    pub beam_z_start: f64,
    /// Twiss description `epsN:beta:alpha(::epsN_y:beta_y:alpha_y)`
    pub covariance: Option<String>,

    pub num_events: u64,
    pub seed: u64,
    pub folder: PathBuf,
    /// Output name, generated from the setup when `None`
    pub filename: Option<String>,
    pub position_cutoff_r: f64,
    pub energy_cutoff_fraction: f64,
    pub mini_file: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_thickness: 1.0,
            target_material: "G4_Al".to_string(),
            detector_distance: 50.0,
            detector_angle: 0.0,
            target_angle: 0.0,
            world_size: 0.0,
            magnet_definitions: Vec::new(),
            beam_energy: 200.0,
            beam_type: "proton".to_string(),
            beam_offset: 0.0,
            beam_z_start: 0.0,
            covariance: None,
            num_events: 0,
            seed: 123,
            folder: PathBuf::from("plots"),
            filename: None,
            position_cutoff_r: DEFAULT_POSITION_CUTOFF_R,
            energy_cutoff_fraction: DEFAULT_ENERGY_CUTOFF_FRACTION,
            mini_file: false,
        }
    }
}

impl SimulationConfig {
    /// Geometry inputs with angles converted to radians
    pub fn geometry_config(&self) -> GeometryConfig {
        GeometryConfig {
            target_thickness: self.target_thickness,
            target_angle: self.target_angle.to_radians(),
            target_rotated: self.target_angle != 0.0,
            detector_distance: self.detector_distance,
            detector_angle: self.detector_angle.to_radians(),
            detector_rotated: self.detector_angle != 0.0,
            world_size: (self.world_size > 0.0).then_some(self.world_size),
            magnet_definitions: self.magnet_definitions.clone(),
            ..GeometryConfig::default()
        }
    }

    /// Output name used when none is given
    pub fn output_filename(&self) -> String {
        self.filename.clone().unwrap_or_else(|| {
            format!(
                "output_{}mm_{}_{}MeV_{}",
                self.target_thickness,
                self.target_material.replace("::", "_"),
                self.beam_energy,
                self.beam_type
            )
        })
    }
}

/// Seam to the particle transport: turns one primary into the hits of one event
pub trait Transport {
    fn transport(&mut self, event_id: u64, vertex: &PrimaryVertex, simulation: &Simulation) -> EventRecord;
}

/// Straight-line propagation without interactions
///
/// Records the primary where it leaves the target and where it crosses the detector
/// plane, which is enough to follow the beam optics through a drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct BallisticTransport;

/// Plane `normal . p = offset`
fn intersect_plane(
    origin: &Vector3<f64>,
    direction: &Vector3<f64>,
    normal: &Vector3<f64>,
    offset: f64,
) -> Option<Vector3<f64>> {
    let denom = normal.dot(direction);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = (offset - normal.dot(origin)) / denom;
    (t > 0.0).then(|| origin + direction * t)
}

/// Local axes of a plane rotated about y: (in-plane x, normal)
fn rotated_axes(angle: f64) -> (Vector3<f64>, Vector3<f64>) {
    let (sin, cos) = angle.sin_cos();
    (Vector3::new(cos, 0.0, -sin), Vector3::new(sin, 0.0, cos))
}

impl Transport for BallisticTransport {
    fn transport(&mut self, event_id: u64, vertex: &PrimaryVertex, simulation: &Simulation) -> EventRecord {
        let layout = simulation.layout();
        let geometry = &layout.config;
        let particle = &simulation.sampler().settings().particle;
        let momentum = vertex.direction
            * (vertex.kinetic_energy * (vertex.kinetic_energy + 2.0 * particle.mass)).sqrt();
        let hit_at = |position: Vector3<f64>| TrackerHit {
            position,
            momentum,
            kinetic_energy: vertex.kinetic_energy,
            pdg: particle.pdg,
            charge: particle.charge,
            particle_name: particle.name.clone(),
        };

        let mut event = EventRecord {
            event_id,
            ..EventRecord::default()
        };

        if layout.has_target() {
            let angle = if geometry.target_rotated { geometry.target_angle } else { 0.0 };
            let (_, normal) = rotated_axes(angle);
            if let Some(exit) =
                intersect_plane(&vertex.position, &vertex.direction, &normal, geometry.target_thickness / 2.0)
            {
                event.target_exit.push(hit_at(exit));
            }
        }

        let angle = if geometry.detector_rotated { geometry.detector_angle } else { 0.0 };
        let (u_axis, normal) = rotated_axes(angle);
        let center = Vector3::new(0.0, 0.0, layout.detector_z);
        if let Some(hit) = intersect_plane(&vertex.position, &vertex.direction, &normal, normal.dot(&center)) {
            let local = hit - center;
            if local.dot(&u_axis).abs() <= layout.detector.x / 2.0 && local.y.abs() <= layout.detector.y / 2.0 {
                event.tracker.push(hit_at(hit));
            } else {
                debug!("Event {}: primary misses the detector at {:?}", event_id, hit);
            }
        }

        event
    }
}

/// A fully configured simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    layout: DetectorLayout,
    target_material: Option<Material>,
    world_material: Material,
    sampler: BeamSampler,
}

impl Simulation {
    /// Build and validate the geometry, materials and beam
    ///
    /// # Errors
    /// Any parse, configuration or numerical error from the layout, material lookup,
    /// beam start validation, particle lookup or covariance setup.
    pub fn setup(config: SimulationConfig) -> Result<Self> {
        let layout = DetectorLayout::build(config.geometry_config())?;
        info!(
            "World size = {} x {} x {} [mm]",
            layout.world.x, layout.world.y, layout.world.z
        );

        let target_material = if layout.has_target() {
            let material = resolve_target_material(&config.target_material)?;
            info!(
                "Target material '{}': density = {} [g/cm3], dominant Z = {:?}, A = {:?} [g/mol]",
                material.name,
                material.density,
                material.target_z(),
                material.target_a()
            );
            Some(material)
        } else {
            info!("No target, magnets only");
            None
        };
        let world_material = CommonMaterials::vacuum()?;

        let z_start = layout.beam_start_z(config.beam_z_start)?;
        let settings = BeamSettings {
            particle: ParticleSpecies::find(&config.beam_type)?,
            kinetic_energy: config.beam_energy,
            offset: config.beam_offset,
            z_start,
        };
        info!(
            "Beam: {} at {} MeV, offset = {} [mm], z_start = {} [mm]",
            settings.particle.name, settings.kinetic_energy, settings.offset, settings.z_start
        );
        let sampler = BeamSampler::from_description(settings, config.covariance.as_deref())?;

        Ok(Self {
            config,
            layout,
            target_material,
            world_material,
            sampler,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn layout(&self) -> &DetectorLayout {
        &self.layout
    }

    pub fn target_material(&self) -> Option<&Material> {
        self.target_material.as_ref()
    }

    pub fn world_material(&self) -> &Material {
        &self.world_material
    }

    pub fn sampler(&self) -> &BeamSampler {
        &self.sampler
    }

    /// Analysis settings for a run of `num_events`
    pub fn run_settings(&self, num_events: u64) -> RunSettings {
        let mut metadata = BTreeMap::new();
        metadata.insert("target_material".to_string(), self.config.target_material.clone());
        metadata.insert("target_thickness".to_string(), self.config.target_thickness.to_string());
        metadata.insert("detector_distance".to_string(), self.config.detector_distance.to_string());
        metadata.insert("beam_type".to_string(), self.config.beam_type.clone());
        if let Some(covariance) = &self.config.covariance {
            metadata.insert("covariance".to_string(), covariance.clone());
        }
        RunSettings {
            folder: self.config.folder.clone(),
            filename: self.config.output_filename(),
            beam_energy: self.config.beam_energy,
            target_thickness: self.config.target_thickness,
            energy_cutoff_fraction: self.config.energy_cutoff_fraction,
            position_cutoff_r: self.config.position_cutoff_r,
            mini_file: self.config.mini_file,
            num_events,
            metadata,
        }
    }

    /// Run `num_events` primaries through straight-line transport
    pub fn run(&self, num_events: u64) -> Result<RunSummary> {
        self.run_with(&mut BallisticTransport, num_events)
    }

    /// Run `num_events` primaries through the given transport
    pub fn run_with<T: Transport + ?Sized>(&self, transport: &mut T, num_events: u64) -> Result<RunSummary> {
        let mut analysis = RunAnalysis::begin_run(self.run_settings(num_events))?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        for event_id in 0..num_events {
            let vertex = self.sampler.sample_vertex(&mut rng);
            analysis.record_primary(&vertex);
            let event = transport.transport(event_id, &vertex, self);
            analysis.process_event(&event);
        }

        Ok(analysis.end_run())
    }
}
