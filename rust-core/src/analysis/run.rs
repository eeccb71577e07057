// Run analysis module: run-scoped accumulation of per-event results
// A RunAnalysis is created by begin_run, fed by the event loop that owns it and consumed by
// end_run, which hands back a serialisable RunSummary

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::histogram::{Axis, Histogram1D, Histogram2D, Histogram3D};
use crate::analysis::hits::{EventRecord, TrackerHit};
use crate::analysis::twiss_estimator::{TwissEstimate, TwissEstimator};
use crate::beam::sampler::PrimaryVertex;
use crate::config::{
    DEFAULT_ENERGY_CUTOFF_FRACTION, DEFAULT_POSITION_CUTOFF_R, EDEP_DENS_NBINS, ENERGY_NBINS, M_TO_MM,
    PHASESPACE_ANG_LIMIT, PHASESPACE_NBINS, PHASESPACE_POS_LIMIT,
};
use crate::error::MiniScatterError;
use crate::Result;

/// Output and cutoff settings of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Output folder
    pub folder: PathBuf,
    /// Output file name without extension
    pub filename: String,
    /// Beam kinetic energy [MeV]
    pub beam_energy: f64,
    /// Target thickness along its normal [mm], sets the depth axis of the deposit densities
    pub target_thickness: f64,
    /// Charged particles above this fraction of the beam energy pass the energy cutoff
    pub energy_cutoff_fraction: f64,
    /// Charged particles closer than this to the axis pass the position cutoff [mm]
    pub position_cutoff_r: f64,
    /// Skip histograms in the summary
    pub mini_file: bool,
    /// Number of events requested, 0 if unknown
    pub num_events: u64,
    /// Free-form run description copied into the summary
    pub metadata: BTreeMap<String, String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("plots"),
            filename: "output".to_string(),
            beam_energy: 200.0,
            target_thickness: 1.0,
            energy_cutoff_fraction: DEFAULT_ENERGY_CUTOFF_FRACTION,
            position_cutoff_r: DEFAULT_POSITION_CUTOFF_R,
            mini_file: false,
            num_events: 0,
            metadata: BTreeMap::new(),
        }
    }
}

impl RunSettings {
    fn validate(&self) -> Result<()> {
        if !(self.beam_energy > 0.0) {
            return Err(MiniScatterError::configuration(format!(
                "Beam energy {} MeV must be positive",
                self.beam_energy
            )));
        }
        if !(self.target_thickness >= 0.0) {
            return Err(MiniScatterError::configuration(format!(
                "Target thickness {} mm must not be negative",
                self.target_thickness
            )));
        }
        if !(0.0..=1.0).contains(&self.energy_cutoff_fraction) {
            return Err(MiniScatterError::configuration(format!(
                "Energy cutoff fraction {} must be within [0, 1]",
                self.energy_cutoff_fraction
            )));
        }
        if !(self.position_cutoff_r > 0.0) {
            return Err(MiniScatterError::configuration(format!(
                "Position cutoff radius {} mm must be positive",
                self.position_cutoff_r
            )));
        }
        if self.filename.trim().is_empty() {
            return Err(MiniScatterError::configuration("Output filename must not be empty"));
        }
        Ok(())
    }
}

/// Number of particles of each type that crossed a plane
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleTypeCounter {
    /// Count per PDG code
    pub particle_types: BTreeMap<i32, u64>,
    /// Name per PDG code
    pub particle_names: BTreeMap<i32, String>,
    pub num_particles: u64,
}

impl ParticleTypeCounter {
    pub fn fill(&mut self, pdg: i32, name: &str) {
        *self.particle_types.entry(pdg).or_insert(0) += 1;
        self.particle_names.entry(pdg).or_insert_with(|| name.to_string());
        self.num_particles += 1;
    }

    fn log(&self, label: &str) {
        info!("Got types at {}:", label);
        for (pdg, count) in &self.particle_types {
            let name = self.particle_names.get(pdg).map(String::as_str).unwrap_or("?");
            info!("\t{:<12} ({:>10}): {}", name, pdg, count);
        }
    }
}

/// Running sums of hit positions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
struct HitMoments {
    count: u64,
    sum_x: f64,
    sum_xx: f64,
    sum_y: f64,
    sum_yy: f64,
}

impl HitMoments {
    fn push(&mut self, x: f64, y: f64) {
        self.count += 1;
        self.sum_x += x;
        self.sum_xx += x * x;
        self.sum_y += y;
        self.sum_yy += y * y;
    }

    fn statistics(&self) -> HitStatistics {
        if self.count == 0 {
            return HitStatistics::default();
        }
        let n = self.count as f64;
        let (mean_x, mean_y) = (self.sum_x / n, self.sum_y / n);
        HitStatistics {
            num_particles: self.count,
            mean_x,
            sigma_x: (self.sum_xx / n - mean_x * mean_x).max(0.0).sqrt(),
            mean_y,
            sigma_y: (self.sum_yy / n - mean_y * mean_y).max(0.0).sqrt(),
        }
    }
}

/// Mean and spread of hit positions [mm]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitStatistics {
    pub num_particles: u64,
    pub mean_x: f64,
    pub sigma_x: f64,
    pub mean_y: f64,
    pub sigma_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
struct AngleMoments {
    count: u64,
    sum: f64,
    sum2: f64,
}

impl AngleMoments {
    fn push(&mut self, angle: f64) {
        self.count += 1;
        self.sum += angle;
        self.sum2 += angle * angle;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Spread around the mean
    fn rms(&self) -> Option<f64> {
        let mean = self.mean()?;
        Some((self.sum2 / self.count as f64 - mean * mean).max(0.0).sqrt())
    }
}

/// Every histogram filled during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistograms {
    pub target_edep: Histogram1D,
    pub target_edep_niel: Histogram1D,
    pub target_edep_iel: Histogram1D,
    /// Deposited energy per (x, y, z) cell in target coordinates [MeV]
    pub target_edep_dens: Histogram3D,
    /// Deposited energy per (z, r) cell in target coordinates [MeV]
    pub target_edep_rdens: Histogram2D,
    pub target_exit_angle: Histogram1D,
    pub target_exit_angle_cutoff: Histogram1D,
    pub target_exit_phasespace_x: Histogram2D,
    pub target_exit_phasespace_y: Histogram2D,
    pub target_exit_phasespace_x_cutoff: Histogram2D,
    pub target_exit_phasespace_y_cutoff: Histogram2D,
    pub target_exit_energy: BTreeMap<i32, Histogram1D>,
    pub target_exit_cutoff_energy: BTreeMap<i32, Histogram1D>,
    pub target_exit_rpos: BTreeMap<i32, Histogram1D>,
    pub target_exit_rpos_cutoff: BTreeMap<i32, Histogram1D>,

    pub tracker_num_particles: Histogram1D,
    pub tracker_energy: Histogram1D,
    pub tracker_type_energy: BTreeMap<i32, Histogram1D>,
    pub tracker_type_cutoff_energy: BTreeMap<i32, Histogram1D>,
    pub tracker_hit_pos: Histogram2D,
    pub tracker_hit_pos_cutoff: Histogram2D,
    pub tracker_phasespace_x: Histogram2D,
    pub tracker_phasespace_y: Histogram2D,
    pub tracker_phasespace_x_cutoff: Histogram2D,
    pub tracker_phasespace_y_cutoff: Histogram2D,
    pub tracker_rpos: BTreeMap<i32, Histogram1D>,
    pub tracker_rpos_cutoff: BTreeMap<i32, Histogram1D>,

    pub init_phasespace_x: Histogram2D,
    pub init_phasespace_y: Histogram2D,
    pub init_phasespace_xy: Histogram2D,
    pub init_energy: Histogram1D,
}

impl RunHistograms {
    fn new(beam_energy: f64, target_thickness: f64) -> Self {
        let energy = |name: &str, title: &str| Histogram1D::new(name, title, ENERGY_NBINS, 0.0, beam_energy);
        let angle = |name: &str, title: &str| Histogram1D::new(name, title, 1000, 0.0, FRAC_PI_2);
        let pos = Axis::new(PHASESPACE_NBINS, -PHASESPACE_POS_LIMIT, PHASESPACE_POS_LIMIT);
        let ang = Axis::new(PHASESPACE_NBINS, -PHASESPACE_ANG_LIMIT, PHASESPACE_ANG_LIMIT);
        let phase = |name: &str, title: &str| Histogram2D::new(name, title, pos, ang);
        let xy = |name: &str, title: &str| Histogram2D::new(name, title, pos, pos);

        // Zero thickness (magnets only) still needs a valid depth axis
        let half_depth = if target_thickness > 0.0 { target_thickness / 2.0 } else { 0.5 };
        let depth = Axis::new(EDEP_DENS_NBINS, -half_depth, half_depth);
        let transverse = Axis::new(EDEP_DENS_NBINS, -PHASESPACE_POS_LIMIT, PHASESPACE_POS_LIMIT);
        let radial = Axis::new(EDEP_DENS_NBINS, 0.0, PHASESPACE_POS_LIMIT);

        Self {
            target_edep: energy("targetEdep", "Total energy deposit/event [MeV]"),
            target_edep_niel: energy("targetEdep_NIEL", "Total NIEL/event [MeV]"),
            target_edep_iel: energy("targetEdep_IEL", "Total ionizing energy deposit/event [MeV]"),
            target_edep_dens: Histogram3D::new(
                "target_edep_dens",
                "Energy deposition density [MeV], x/y/z [mm]",
                transverse,
                transverse,
                depth,
            ),
            target_edep_rdens: Histogram2D::new(
                "target_edep_rdens",
                "Energy deposition density [MeV], z/r [mm]",
                depth,
                radial,
            ),
            target_exit_angle: angle("target_exitangle", "Exit angle of charged particles [rad]"),
            target_exit_angle_cutoff: angle("target_exitangle_cutoff", "Exit angle of charged particles after cutoff [rad]"),
            target_exit_phasespace_x: phase("target_exit_phasespaceX", "Target exit phase space x [mm, rad]"),
            target_exit_phasespace_y: phase("target_exit_phasespaceY", "Target exit phase space y [mm, rad]"),
            target_exit_phasespace_x_cutoff: phase(
                "target_exit_phasespaceX_cutoff",
                "Target exit phase space x after cutoff [mm, rad]",
            ),
            target_exit_phasespace_y_cutoff: phase(
                "target_exit_phasespaceY_cutoff",
                "Target exit phase space y after cutoff [mm, rad]",
            ),
            target_exit_energy: BTreeMap::new(),
            target_exit_cutoff_energy: BTreeMap::new(),
            target_exit_rpos: BTreeMap::new(),
            target_exit_rpos_cutoff: BTreeMap::new(),

            tracker_num_particles: Histogram1D::new("numParticles", "Number of particles / event", 1001, -0.5, 1000.5),
            tracker_energy: energy("tracker_energy", "Energy of outgoing particles [MeV]"),
            tracker_type_energy: BTreeMap::new(),
            tracker_type_cutoff_energy: BTreeMap::new(),
            tracker_hit_pos: xy("tracker_hitPos", "Tracker hit position [mm]"),
            tracker_hit_pos_cutoff: xy("tracker_hitPos_cutoff", "Tracker hit position after cutoff [mm]"),
            tracker_phasespace_x: phase("tracker_phasespaceX", "Tracker phase space x [mm, rad]"),
            tracker_phasespace_y: phase("tracker_phasespaceY", "Tracker phase space y [mm, rad]"),
            tracker_phasespace_x_cutoff: phase("tracker_phasespaceX_cutoff", "Tracker phase space x after cutoff [mm, rad]"),
            tracker_phasespace_y_cutoff: phase("tracker_phasespaceY_cutoff", "Tracker phase space y after cutoff [mm, rad]"),
            tracker_rpos: BTreeMap::new(),
            tracker_rpos_cutoff: BTreeMap::new(),

            init_phasespace_x: phase("init_phasespaceX", "Initial phase space x [mm, rad]"),
            init_phasespace_y: phase("init_phasespaceY", "Initial phase space y [mm, rad]"),
            init_phasespace_xy: xy("init_phasespaceXY", "Initial position [mm]"),
            init_energy: Histogram1D::new("init_E", "Initial energy [MeV]", ENERGY_NBINS, 0.0, beam_energy * 1.1),
        }
    }
}

/// Per-PDG histogram, created on first use
fn type_histogram<'a>(
    map: &'a mut BTreeMap<i32, Histogram1D>,
    pdg: i32,
    prefix: &str,
    nbins: usize,
    max: f64,
) -> &'a mut Histogram1D {
    map.entry(pdg).or_insert_with(|| {
        let name = format!("{}_{}", prefix, pdg);
        Histogram1D::new(&name, &name, nbins, 0.0, max)
    })
}

/// Run-scoped analysis context
#[derive(Debug, Clone)]
pub struct RunAnalysis {
    settings: RunSettings,
    histograms: RunHistograms,
    target_exit_types: ParticleTypeCounter,
    tracker_types: ParticleTypeCounter,
    tracker_hits: HitMoments,
    tracker_hits_cutoff: HitMoments,
    exit_angle: AngleMoments,
    exit_angle_cutoff: AngleMoments,
    init_x: TwissEstimator,
    init_y: TwissEstimator,
    tracker_x: TwissEstimator,
    tracker_y: TwissEstimator,
    tracker_cutoff_x: TwissEstimator,
    tracker_cutoff_y: TwissEstimator,
    primaries: u64,
    events_processed: u64,
}

impl RunAnalysis {
    /// Start a run
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` for a non-positive beam energy or cutoff radius, an
    /// energy cutoff fraction outside [0, 1] or an empty filename.
    pub fn begin_run(settings: RunSettings) -> Result<Self> {
        settings.validate()?;
        info!(
            "Starting run: output '{}', beam energy {} MeV, cutoffs E > {} MeV and r < {} mm",
            settings.folder.join(format!("{}.json", settings.filename)).display(),
            settings.beam_energy,
            settings.energy_cutoff_fraction * settings.beam_energy,
            settings.position_cutoff_r
        );
        Ok(Self {
            histograms: RunHistograms::new(settings.beam_energy, settings.target_thickness),
            settings,
            target_exit_types: ParticleTypeCounter::default(),
            tracker_types: ParticleTypeCounter::default(),
            tracker_hits: HitMoments::default(),
            tracker_hits_cutoff: HitMoments::default(),
            exit_angle: AngleMoments::default(),
            exit_angle_cutoff: AngleMoments::default(),
            init_x: TwissEstimator::new(),
            init_y: TwissEstimator::new(),
            tracker_x: TwissEstimator::new(),
            tracker_y: TwissEstimator::new(),
            tracker_cutoff_x: TwissEstimator::new(),
            tracker_cutoff_y: TwissEstimator::new(),
            primaries: 0,
            events_processed: 0,
        })
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn histograms(&self) -> &RunHistograms {
        &self.histograms
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Record the initial distribution of one generated primary
    pub fn record_primary(&mut self, vertex: &PrimaryVertex) {
        let ps = vertex.phase_space;
        let h = &mut self.histograms;
        h.init_phasespace_x.fill(ps.x * M_TO_MM, ps.xp);
        h.init_phasespace_y.fill(ps.y * M_TO_MM, ps.yp);
        h.init_phasespace_xy.fill(vertex.position.x, vertex.position.y);
        h.init_energy.fill(vertex.kinetic_energy);
        self.init_x.push(ps.x, ps.xp);
        self.init_y.push(ps.y, ps.yp);
        self.primaries += 1;
    }

    /// True if a charged hit passes both the energy and the radius cutoff
    pub fn passes_cutoff(&self, hit: &TrackerHit) -> bool {
        hit.is_charged()
            && hit.kinetic_energy > self.settings.energy_cutoff_fraction * self.settings.beam_energy
            && hit.radius() < self.settings.position_cutoff_r
    }

    /// Accumulate everything recorded in one event
    pub fn process_event(&mut self, event: &EventRecord) {
        let (edep, niel) = event
            .target_edep
            .iter()
            .fold((0.0, 0.0), |(e, n), hit| (e + hit.deposited_energy, n + hit.deposited_energy_niel));
        self.histograms.target_edep.fill(edep);
        self.histograms.target_edep_niel.fill(niel);
        self.histograms.target_edep_iel.fill(edep - niel);
        for hit in &event.target_edep {
            let p = hit.position;
            self.histograms.target_edep_dens.fill_weighted(p.x, p.y, p.z, hit.deposited_energy);
            self.histograms.target_edep_rdens.fill_weighted(p.z, hit.radius(), hit.deposited_energy);
        }

        for hit in &event.target_exit {
            self.target_exit_hit(hit);
        }

        self.histograms.tracker_num_particles.fill(event.tracker.len() as f64);
        for hit in &event.tracker {
            self.tracker_hit(hit);
        }

        self.events_processed += 1;
    }

    fn target_exit_hit(&mut self, hit: &TrackerHit) {
        let cutoff = self.passes_cutoff(hit);
        let beam_energy = self.settings.beam_energy;
        let h = &mut self.histograms;
        let (x, y) = (hit.position.x, hit.position.y);

        self.target_exit_types.fill(hit.pdg, &hit.particle_name);
        type_histogram(&mut h.target_exit_energy, hit.pdg, "target_exit_energy", ENERGY_NBINS, beam_energy)
            .fill(hit.kinetic_energy);
        type_histogram(&mut h.target_exit_rpos, hit.pdg, "target_exit_Rpos", PHASESPACE_NBINS, PHASESPACE_POS_LIMIT)
            .fill(hit.radius());

        if !hit.is_charged() {
            return;
        }
        let angle = hit.angle();
        h.target_exit_angle.fill(angle);
        h.target_exit_phasespace_x.fill(x, hit.xp());
        h.target_exit_phasespace_y.fill(y, hit.yp());
        self.exit_angle.push(angle);

        if cutoff {
            type_histogram(
                &mut h.target_exit_cutoff_energy,
                hit.pdg,
                "target_exit_cutoff_energy",
                ENERGY_NBINS,
                beam_energy,
            )
            .fill(hit.kinetic_energy);
            type_histogram(
                &mut h.target_exit_rpos_cutoff,
                hit.pdg,
                "target_exit_Rpos_cutoff",
                PHASESPACE_NBINS,
                PHASESPACE_POS_LIMIT,
            )
            .fill(hit.radius());
            h.target_exit_angle_cutoff.fill(angle);
            h.target_exit_phasespace_x_cutoff.fill(x, hit.xp());
            h.target_exit_phasespace_y_cutoff.fill(y, hit.yp());
            self.exit_angle_cutoff.push(angle);
        }
    }

    fn tracker_hit(&mut self, hit: &TrackerHit) {
        let cutoff = self.passes_cutoff(hit);
        let beam_energy = self.settings.beam_energy;
        let h = &mut self.histograms;
        let (x, y) = (hit.position.x, hit.position.y);

        self.tracker_types.fill(hit.pdg, &hit.particle_name);
        h.tracker_energy.fill(hit.kinetic_energy);
        type_histogram(&mut h.tracker_type_energy, hit.pdg, "tracker_type_energy", ENERGY_NBINS, beam_energy)
            .fill(hit.kinetic_energy);
        type_histogram(&mut h.tracker_rpos, hit.pdg, "tracker_Rpos", PHASESPACE_NBINS, PHASESPACE_POS_LIMIT)
            .fill(hit.radius());

        if !hit.is_charged() {
            return;
        }
        h.tracker_hit_pos.fill(x, y);
        h.tracker_phasespace_x.fill(x, hit.xp());
        h.tracker_phasespace_y.fill(y, hit.yp());
        self.tracker_hits.push(x, y);
        self.tracker_x.push(x / M_TO_MM, hit.xp());
        self.tracker_y.push(y / M_TO_MM, hit.yp());

        if cutoff {
            type_histogram(
                &mut h.tracker_type_cutoff_energy,
                hit.pdg,
                "tracker_type_cutoff_energy",
                ENERGY_NBINS,
                beam_energy,
            )
            .fill(hit.kinetic_energy);
            type_histogram(
                &mut h.tracker_rpos_cutoff,
                hit.pdg,
                "tracker_Rpos_cutoff",
                PHASESPACE_NBINS,
                PHASESPACE_POS_LIMIT,
            )
            .fill(hit.radius());
            h.tracker_hit_pos_cutoff.fill(x, y);
            h.tracker_phasespace_x_cutoff.fill(x, hit.xp());
            h.tracker_phasespace_y_cutoff.fill(y, hit.yp());
            self.tracker_hits_cutoff.push(x, y);
            self.tracker_cutoff_x.push(x / M_TO_MM, hit.xp());
            self.tracker_cutoff_y.push(y / M_TO_MM, hit.yp());
        }
    }

    /// Finish the run and produce its summary
    pub fn end_run(self) -> RunSummary {
        if self.settings.num_events > 0 && self.events_processed != self.settings.num_events {
            warn!(
                "Processed {} events, but {} were requested",
                self.events_processed, self.settings.num_events
            );
        }

        self.target_exit_types.log("target exit");
        self.tracker_types.log("tracker");

        let statistics = RunStatistics {
            tracker: self.tracker_hits.statistics(),
            tracker_cutoff: self.tracker_hits_cutoff.statistics(),
            target_exit_angle_mean: self.exit_angle.mean(),
            target_exit_angle_rms: self.exit_angle.rms(),
            target_exit_angle_mean_cutoff: self.exit_angle_cutoff.mean(),
            target_exit_angle_rms_cutoff: self.exit_angle_cutoff.rms(),
        };
        info!(
            "Tracker (charged): n = {}, x = {} +/- {} mm, y = {} +/- {} mm",
            statistics.tracker.num_particles,
            statistics.tracker.mean_x,
            statistics.tracker.sigma_x,
            statistics.tracker.mean_y,
            statistics.tracker.sigma_y
        );
        info!(
            "Tracker (after cutoff): n = {}, x = {} +/- {} mm, y = {} +/- {} mm",
            statistics.tracker_cutoff.num_particles,
            statistics.tracker_cutoff.mean_x,
            statistics.tracker_cutoff.sigma_x,
            statistics.tracker_cutoff.mean_y,
            statistics.tracker_cutoff.sigma_y
        );

        if let (Some(mean), Some(rms)) = (statistics.target_exit_angle_mean, statistics.target_exit_angle_rms) {
            info!("Target exit angle (charged): {} +/- {} rad", mean, rms);
        }

        let mut twiss = BTreeMap::new();
        for (label, estimator) in [
            ("init_x", &self.init_x),
            ("init_y", &self.init_y),
            ("tracker_x", &self.tracker_x),
            ("tracker_y", &self.tracker_y),
            ("tracker_cutoff_x", &self.tracker_cutoff_x),
            ("tracker_cutoff_y", &self.tracker_cutoff_y),
        ] {
            if let Some(estimate) = estimator.estimate() {
                info!(
                    "Twiss {}: epsG = {} [um], beta = {} [m], alpha = {} ({} samples)",
                    label, estimate.eps_g, estimate.beta, estimate.alpha, estimate.samples
                );
                twiss.insert(label.to_string(), estimate);
            }
        }

        let mut particle_counts = BTreeMap::new();
        particle_counts.insert("target_exit".to_string(), self.target_exit_types);
        particle_counts.insert("tracker".to_string(), self.tracker_types);

        RunSummary {
            metadata: RunMetadata {
                version: crate::VERSION.to_string(),
                folder: self.settings.folder.clone(),
                filename: self.settings.filename.clone(),
                beam_energy: self.settings.beam_energy,
                energy_cutoff_fraction: self.settings.energy_cutoff_fraction,
                position_cutoff_r: self.settings.position_cutoff_r,
                num_events_requested: self.settings.num_events,
                events_processed: self.events_processed,
                primaries_generated: self.primaries,
                description: self.settings.metadata.clone(),
            },
            statistics,
            particle_counts,
            twiss,
            histograms: (!self.settings.mini_file).then_some(self.histograms),
        }
    }
}

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub version: String,
    pub folder: PathBuf,
    pub filename: String,
    pub beam_energy: f64,
    pub energy_cutoff_fraction: f64,
    pub position_cutoff_r: f64,
    pub num_events_requested: u64,
    pub events_processed: u64,
    pub primaries_generated: u64,
    pub description: BTreeMap<String, String>,
}

/// End-of-run statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub tracker: HitStatistics,
    pub tracker_cutoff: HitStatistics,
    /// Mean exit angle of charged particles [rad]
    pub target_exit_angle_mean: Option<f64>,
    /// RMS of the exit angle around its mean [rad]
    pub target_exit_angle_rms: Option<f64>,
    pub target_exit_angle_mean_cutoff: Option<f64>,
    pub target_exit_angle_rms_cutoff: Option<f64>,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub metadata: RunMetadata,
    pub statistics: RunStatistics,
    pub particle_counts: BTreeMap<String, ParticleTypeCounter>,
    pub twiss: BTreeMap<String, TwissEstimate>,
    /// `None` for mini files
    pub histograms: Option<RunHistograms>,
}

impl RunSummary {
    /// `<folder>/<filename>.json`
    pub fn output_path(&self) -> PathBuf {
        self.metadata.folder.join(format!("{}.json", self.metadata.filename))
    }

    /// Write the summary as JSON, creating the output folder if needed
    pub fn write_json(&self) -> Result<PathBuf> {
        let path = self.output_path();
        fs::create_dir_all(&self.metadata.folder)?;
        let mut file = fs::File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        info!("Wrote run summary to '{}'", path.display());
        Ok(path)
    }
}
