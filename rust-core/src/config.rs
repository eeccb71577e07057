// Constants

// Tolerances
pub const CHOLESKY_TOLERANCE: f64 = 1e-9; // Relative pivot tolerance for covariance decomposition
pub const DETERMINANT_TOLERANCE: f64 = 1e-6; // Relative check of det(C) against the squared emittance
pub const GEOMETRY_TOLERANCE: f64 = 1e-9; // Relative slack when fitting footprints into the world

// Geometry defaults [mm]
pub const WORLD_SIZE_Z_BUFFER: f64 = 10.0; // Free space behind the detector and in front of the target
pub const DEFAULT_WORLD_SIZE_XY: f64 = 50.0; // Transverse world size when none is requested
pub const DETECTOR_THICKNESS: f64 = 1e-3; // 1 um tracker plane

// Unit conversions
pub const UM_TO_M: f64 = 1e-6; // Emittances are given in um (mm mrad), covariances are in m and rad
pub const M_TO_MM: f64 = 1e3;
pub const MBAR_TO_PA: f64 = 100.0;

// Gas targets
pub const GAS_TEMPERATURE: f64 = 300.0; // [K]
pub const MOLAR_GAS_CONSTANT: f64 = 8.314_462_618; // N_A * k_B [J / (mol K)]

// Analysis defaults
pub const DEFAULT_ENERGY_CUTOFF_FRACTION: f64 = 0.95; // Charged particles above this fraction of the beam energy pass the cutoff
pub const DEFAULT_POSITION_CUTOFF_R: f64 = 1.0; // [mm]
pub const ENERGY_NBINS: usize = 1000;
pub const PHASESPACE_NBINS: usize = 200;
pub const PHASESPACE_POS_LIMIT: f64 = 10.0; // [mm]
pub const PHASESPACE_ANG_LIMIT: f64 = 0.1; // [rad]
pub const EDEP_DENS_NBINS: usize = 50;
