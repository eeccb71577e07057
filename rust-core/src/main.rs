use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use miniscatter::beam::PhaseSpaceSample;
use miniscatter::simulation::{Simulation, SimulationConfig};

#[derive(Parser)]
#[command(name = "miniscatter")]
#[command(about = "Setup and beam sampling for thin-target scattering simulations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the geometry and beam, run primaries and write the run summary
    Run {
        #[command(flatten)]
        setup: SetupArgs,

        /// Number of events to run
        #[arg(short = 'n', long, default_value_t = 0)]
        events: u64,

        /// Random seed
        #[arg(short, long, default_value_t = 123)]
        seed: u64,

        /// Output folder
        #[arg(short = 'o', long, default_value = "plots")]
        folder: PathBuf,

        /// Output file name (without extension)
        #[arg(short = 'f', long)]
        filename: Option<String>,

        /// Radius for the position cutoff [mm]
        #[arg(short = 'r', long, default_value_t = 1.0)]
        cutoff_radius: f64,

        /// Fraction of the beam energy for the energy cutoff
        #[arg(long, default_value_t = 0.95)]
        cutoff_energy_fraction: f64,

        /// Only write statistics, no histograms
        #[arg(long)]
        mini: bool,
    },
    /// Print the beam covariance matrices and their Cholesky factors
    Beam {
        #[command(flatten)]
        beam: BeamArgs,

        /// Number of phase-space samples to print
        #[arg(short = 'n', long, default_value_t = 0)]
        samples: usize,

        /// Random seed
        #[arg(short, long, default_value_t = 123)]
        seed: u64,
    },
    /// Print the fitted world, target and detector layout
    Geometry {
        #[command(flatten)]
        geometry: GeometryArgs,
    },
}

#[derive(Args)]
struct GeometryArgs {
    /// Target thickness [mm]
    #[arg(short = 't', long, default_value_t = 1.0)]
    thickness: f64,

    /// Target material name, or NAME::pressure[mbar] for a gas
    #[arg(short = 'm', long, default_value = "G4_Al")]
    material: String,

    /// Distance from the target center to the detector [mm]
    #[arg(short = 'd', long, default_value_t = 50.0)]
    distance: f64,

    /// Detector rotation about y [deg]
    #[arg(short = 'a', long, default_value_t = 0.0, allow_negative_numbers = true)]
    detector_angle: f64,

    /// Target rotation about y [deg]
    #[arg(short = 'A', long, default_value_t = 0.0, allow_negative_numbers = true)]
    target_angle: f64,

    /// Transverse world size [mm], 0 for automatic sizing
    #[arg(short = 'w', long, default_value_t = 0.0)]
    world_size: f64,

    /// Magnet definition, passed through to the geometry builder (repeatable)
    #[arg(long = "magnet")]
    magnets: Vec<String>,
}

#[derive(Args)]
struct BeamArgs {
    /// Beam kinetic energy [MeV]
    #[arg(short = 'e', long, default_value_t = 200.0)]
    energy: f64,

    /// Beam particle type
    #[arg(short = 'b', long, default_value = "proton")]
    beam_type: String,

    /// Horizontal beam offset [mm]
    #[arg(short = 'x', long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset: f64,

    /// Beam start along z [mm], 0 for automatic placement
    #[arg(short = 'z', long, default_value_t = 0.0, allow_negative_numbers = true)]
    z_start: f64,

    /// Twiss parameters epsN[um]:beta[m]:alpha(::epsN_y:beta_y:alpha_y)
    #[arg(short = 'c', long)]
    covariance: Option<String>,
}

#[derive(Args)]
struct SetupArgs {
    #[command(flatten)]
    geometry: GeometryArgs,

    #[command(flatten)]
    beam: BeamArgs,
}

impl GeometryArgs {
    fn apply(self, config: &mut SimulationConfig) {
        config.target_thickness = self.thickness;
        config.target_material = self.material;
        config.detector_distance = self.distance;
        config.detector_angle = self.detector_angle;
        config.target_angle = self.target_angle;
        config.world_size = self.world_size;
        config.magnet_definitions = self.magnets;
    }
}

impl BeamArgs {
    fn apply(self, config: &mut SimulationConfig) {
        config.beam_energy = self.energy;
        config.beam_type = self.beam_type;
        config.beam_offset = self.offset;
        config.beam_z_start = self.z_start;
        config.covariance = self.covariance;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("Failed to set thread pool size")?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count {} specified but parallel feature not enabled. Ignoring.", threads);
        }
    }

    info!("Starting miniscatter v{}", miniscatter::VERSION);

    match cli.command {
        Commands::Run {
            setup,
            events,
            seed,
            folder,
            filename,
            cutoff_radius,
            cutoff_energy_fraction,
            mini,
        } => {
            let mut config = SimulationConfig {
                num_events: events,
                seed,
                folder,
                filename,
                position_cutoff_r: cutoff_radius,
                energy_cutoff_fraction: cutoff_energy_fraction,
                mini_file: mini,
                ..SimulationConfig::default()
            };
            setup.geometry.apply(&mut config);
            setup.beam.apply(&mut config);
            run_simulation(config)
        }
        Commands::Beam { beam, samples, seed } => {
            let mut config = SimulationConfig {
                seed,
                ..SimulationConfig::default()
            };
            beam.apply(&mut config);
            print_beam(config, samples)
        }
        Commands::Geometry { geometry } => {
            let mut config = SimulationConfig::default();
            geometry.apply(&mut config);
            print_geometry(config)
        }
    }
}

fn run_simulation(config: SimulationConfig) -> anyhow::Result<()> {
    let num_events = config.num_events;
    let simulation = Simulation::setup(config).context("Simulation setup failed")?;
    if num_events == 0 {
        warn!("No events requested; setup only");
    }
    let summary = simulation.run(num_events)?;
    let path = summary.write_json().context("Could not write the run summary")?;
    println!("{}", path.display());
    Ok(())
}

fn print_beam(config: SimulationConfig, samples: usize) -> anyhow::Result<()> {
    let seed = config.seed;
    let simulation = Simulation::setup(config).context("Beam setup failed")?;
    let sampler = simulation.sampler();

    match sampler.correlated() {
        Some(beam) => println!("{}", serde_json::to_string_pretty(beam)?),
        None => println!("No covariance given; every primary starts on the nominal axis"),
    }

    if samples > 0 {
        for sample in draw_samples(&simulation, seed, samples) {
            println!("{} {} {} {}", sample.x, sample.xp, sample.y, sample.yp);
        }
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn draw_samples(simulation: &Simulation, seed: u64, count: usize) -> Vec<PhaseSpaceSample> {
    simulation.sampler().sample_many_parallel(seed, count, 4096)
}

#[cfg(not(feature = "parallel"))]
fn draw_samples(simulation: &Simulation, seed: u64, count: usize) -> Vec<PhaseSpaceSample> {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    simulation.sampler().sample_many(&mut StdRng::seed_from_u64(seed), count)
}

fn print_geometry(config: SimulationConfig) -> anyhow::Result<()> {
    let simulation = Simulation::setup(config).context("Geometry setup failed")?;
    println!("{}", serde_json::to_string_pretty(simulation.layout())?);
    Ok(())
}
