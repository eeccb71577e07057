//! MiniScatter setup core
//!
//! This library configures a scattering simulation: detector, target and world geometry
//! (including tilted planes), target materials and gas targets, a primary beam with optional
//! correlated Twiss phase-space sampling, and run-scoped analysis of the recorded hits.

pub mod analysis;
pub mod beam;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interfaces;
pub mod materials;
pub mod simulation;

pub use error::MiniScatterError;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, MiniScatterError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MiniScatterError>();
        assert_send_sync::<beam::CholeskyFactor>();
        assert_send_sync::<beam::BeamSampler>();
    }
}
