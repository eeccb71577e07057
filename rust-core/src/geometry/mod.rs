// Geometry module: world, target and detector dimensions
// This module fits tilted target or detector planes into the world volume

// ======================== MODULE DECLARATIONS ========================
pub mod fitter;
pub mod layout;
pub mod section;

mod _tests_layout;

// ======================== GEOMETRY FIT ========================
pub use fitter::{
    edge_clipping,    // fn(theta: f64, thickness: f64) -> f64 - three-way clipping around pi/4
    GeometryConfig,   // struct - thicknesses, distance, angles, rotation flags, world size
    GeometryFit,      // struct - world sizes, component size and offset
    RotatedFootprint, // struct - dz, dx, rp, dr, size_xy of a rotated plane
};
// RotatedFootprint impl methods:
//   compute(theta: f64, thickness: f64, distance: f64) -> Result<Self> - pure fit of one rotated plane

// GeometryFit impl methods:
//   compute(config: &GeometryConfig) -> Result<Self>          - rotated or unrotated world fit
//   world_section(&self) -> SectionBox                        - world box in the xz plane

// ======================== LAYOUT ========================
pub use layout::{
    BoxSize,        // struct - full x, y, z sizes of a volume
    DetectorLayout, // struct - world, target and detector boxes
};
// DetectorLayout impl methods:
//   build(config: GeometryConfig) -> Result<Self>             - validates and sizes all volumes
//   beam_start_z(&self, requested: f64) -> Result<f64>        - resolves the primary starting z

// ======================== SECTIONS ========================
pub use section::{
    SectionBox, // struct - axis-aligned box in the xz plane
    TiltedSlab, // struct - slab rotated about y
};
