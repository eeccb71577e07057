// Analysis module: per-event accumulation and end-of-run summaries
// This module fills histograms and statistics from hit records and estimates Twiss parameters from phase space

// ======================== MODULE DECLARATIONS ========================
pub mod histogram;
pub mod hits;
pub mod run;
pub mod twiss_estimator;

// Test modules
mod _tests_estimator;

// ======================== HISTOGRAMS ========================
pub use histogram::{
    Axis,        // struct - uniform binning of one axis
    Histogram1D, // struct - bins, under/overflow, in-range mean and rms
    Histogram2D, // struct - bins and in-range covariance
    Histogram3D, // struct - weighted bins, used for deposit densities
};

// ======================== HIT RECORDS ========================
pub use hits::{
    EdepHit,     // struct - total and non-ionising deposit of one step, with position
    EventRecord, // struct - target deposits, target exit and tracker hits of one event
    TrackerHit,  // struct - position, momentum, energy and type of a crossing particle
};

// ======================== TWISS ESTIMATION ========================
pub use twiss_estimator::{
    TwissEstimate,  // struct - eps_g [um], beta [m], alpha from a distribution
    TwissEstimator, // struct - running (x, x') moments
};

// ======================== RUN CONTEXT ========================
pub use run::{
    HitStatistics,       // struct - mean and sigma of hit positions
    ParticleTypeCounter, // struct - count per PDG code
    RunAnalysis,         // struct - run-scoped accumulation context
    RunHistograms,       // struct - every histogram of a run
    RunMetadata,         // struct - settings and counters of a run
    RunSettings,         // struct - output location and cutoffs
    RunStatistics,       // struct - end-of-run hit statistics
    RunSummary,          // struct - serialisable result of end_run
};
// RunAnalysis impl methods:
//   begin_run(settings: RunSettings) -> Result<Self>     - validates cutoffs and output name
//   record_primary(&mut self, vertex: &PrimaryVertex)    - initial distribution
//   process_event(&mut self, event: &EventRecord)        - per-event accumulation
//   end_run(self) -> RunSummary                          - statistics, Twiss estimates, histograms

// RunSummary impl methods:
//   write_json(&self) -> Result<PathBuf>                 - writes <folder>/<filename>.json
