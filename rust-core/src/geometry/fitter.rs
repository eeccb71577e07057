// Geometry fitter module: world and component sizes for tilted detector or target planes
// This module computes the minimal world volume so that a component rotated about the
// y axis neither crosses the world boundary nor clips itself at its thin edge

use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_WORLD_SIZE_XY, DETECTOR_THICKNESS, GEOMETRY_TOLERANCE, WORLD_SIZE_Z_BUFFER};
use crate::error::MiniScatterError;
use crate::geometry::section::{SectionBox, TiltedSlab};
use crate::interfaces::RotatedComponent;
use crate::Result;

/// Geometry inputs, lengths in mm and angles in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub target_thickness: f64,
    pub target_angle: f64,
    pub target_rotated: bool,
    /// Distance from the target center to the detector center
    pub detector_distance: f64,
    pub detector_angle: f64,
    pub detector_rotated: bool,
    pub detector_thickness: f64,
    /// Requested transverse world size, `None` for automatic sizing
    pub world_size: Option<f64>,
    /// Free space added around the components along z
    pub world_size_z_buffer: f64,
    /// Magnet definitions passed through to the geometry builder
    pub magnet_definitions: Vec<String>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            target_thickness: 1.0,
            target_angle: 0.0,
            target_rotated: false,
            detector_distance: 50.0,
            detector_angle: 0.0,
            detector_rotated: false,
            detector_thickness: DETECTOR_THICKNESS,
            world_size: None,
            world_size_z_buffer: WORLD_SIZE_Z_BUFFER,
            magnet_definitions: Vec::new(),
        }
    }
}

impl GeometryConfig {
    /// Which component is rotated
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` if both are.
    pub fn rotated_component(&self) -> Result<RotatedComponent> {
        match (self.detector_rotated, self.target_rotated) {
            (true, true) => Err(MiniScatterError::configuration(
                "Both target and detector rotation is not supported",
            )),
            (true, false) => Ok(RotatedComponent::Detector),
            (false, true) => Ok(RotatedComponent::Target),
            (false, false) => Ok(RotatedComponent::None),
        }
    }

    /// Minimum world length along z for the unrotated stack
    pub fn minimum_world_size_z(&self) -> f64 {
        (self.detector_distance + self.detector_thickness + self.world_size_z_buffer) * 2.0
    }
}

/// How much of the rotated plane must be cut off so that its corner stays inside
///
/// The three cases avoid the tangent blowing up on either side of pi/4.
pub fn edge_clipping(theta: f64, thickness: f64) -> f64 {
    match theta.partial_cmp(&FRAC_PI_4) {
        Some(Ordering::Less) => thickness / (2.0 * theta.tan()),
        Some(Ordering::Greater) => thickness * theta.tan() / 2.0,
        _ => thickness / 2.0,
    }
}

/// Intermediate quantities of the rotated fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedFootprint {
    /// Rotation angle [rad], 0 < theta <= pi/2
    pub theta: f64,
    pub thickness: f64,
    pub distance: f64,
    /// Offset of the rotated component center vs. the end of the unrotated one
    pub dz: f64,
    /// Transverse half-size of the volume that contains the component
    pub dx: f64,
    /// Length of the rotated volume before clipping
    pub rp: f64,
    /// Edge clipping
    pub dr: f64,
    /// Final in-plane size of the rotated component
    pub size_xy: f64,
}

impl RotatedFootprint {
    /// Fit a plane of `thickness` rotated by `theta` at `distance` along the beam axis
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` if theta is outside (0, pi/2], or the
    /// component would self-intersect (non-positive `dz` or `size_xy`).
    pub fn compute(theta: f64, thickness: f64, distance: f64) -> Result<Self> {
        if !theta.is_finite() || theta <= 0.0 {
            return Err(MiniScatterError::configuration(format!(
                "Rotation angle {} rad must be in (0, pi/2] for a rotated fit",
                theta
            )));
        }
        if theta > FRAC_PI_2 {
            return Err(MiniScatterError::configuration(format!(
                "Rotation angle {} rad should be within +/- pi/2",
                theta
            )));
        }

        let dz = distance - thickness / 2.0;
        if dz <= 0.0 {
            return Err(MiniScatterError::configuration(format!(
                "Distance {} mm is not larger than half the thickness {} mm",
                distance, thickness
            )));
        }
        let dx = dz / theta.tan();
        let rp = dz / theta.sin();
        let dr = edge_clipping(theta, thickness);
        let size_xy = (rp - dr) * 2.0;

        if !(size_xy > 0.0) {
            return Err(MiniScatterError::configuration(format!(
                "Rotated component of thickness {} mm at {} rad does not fit: size_xy = {} mm",
                thickness, theta, size_xy
            )));
        }

        debug!("Rotated fit: dz = {}, dx = {}, rp = {}, dr = {}, size_xy = {}", dz, dx, rp, dr, size_xy);
        Ok(Self { theta, thickness, distance, dz, dx, rp, dr, size_xy })
    }
}

/// Result of the geometry fit (all sizes are full lengths in mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryFit {
    pub world_size_x: f64,
    pub world_size_y: f64,
    pub world_size_z: f64,
    /// Transverse size of the rotated component, or of the world when nothing is rotated
    pub component_size_xy: f64,
    /// Longitudinal offset of the fitted component
    pub offset_z: f64,
    pub rotated: RotatedComponent,
    pub footprint: Option<RotatedFootprint>,
}

impl GeometryFit {
    /// Fit the world around the target and detector
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` for two simultaneous rotations, angles beyond
    /// pi/2, a requested world size that cannot contain the geometry, or a rotated
    /// component whose footprint leaves the world.
    pub fn compute(config: &GeometryConfig) -> Result<Self> {
        let rotated = config.rotated_component()?;
        let (theta, thickness, center_z) = match rotated {
            RotatedComponent::Detector => (
                config.detector_angle.abs(),
                config.detector_thickness,
                config.detector_distance,
            ),
            RotatedComponent::Target => (config.target_angle.abs(), config.target_thickness, 0.0),
            RotatedComponent::None => (0.0, config.detector_thickness, config.detector_distance),
        };

        if rotated.is_rotated() && theta == 0.0 {
            warn!("{:?} flagged as rotated with a zero angle; using the unrotated layout", rotated);
            let unrotated = GeometryConfig {
                target_rotated: false,
                detector_rotated: false,
                ..config.clone()
            };
            return Self::compute(&unrotated);
        }

        match rotated {
            RotatedComponent::None => Self::unrotated(config),
            _ => Self::rotated(config, rotated, theta, thickness, center_z),
        }
    }

    fn unrotated(config: &GeometryConfig) -> Result<Self> {
        let world_xy = config.world_size.unwrap_or(DEFAULT_WORLD_SIZE_XY);
        if world_xy <= 0.0 {
            return Err(MiniScatterError::configuration(format!(
                "World size {} mm must be positive",
                world_xy
            )));
        }
        Ok(Self {
            world_size_x: world_xy,
            world_size_y: world_xy,
            world_size_z: config.minimum_world_size_z(),
            component_size_xy: world_xy,
            offset_z: config.detector_distance - config.detector_thickness / 2.0,
            rotated: RotatedComponent::None,
            footprint: None,
        })
    }

    fn rotated(
        config: &GeometryConfig,
        rotated: RotatedComponent,
        theta: f64,
        thickness: f64,
        center_z: f64,
    ) -> Result<Self> {
        // The distance along the beam is the detector distance for either component
        let footprint = RotatedFootprint::compute(theta, thickness, config.detector_distance)?;

        let mut world_size_x = footprint.dx * 2.0;
        let mut world_size_y = footprint.size_xy;
        if let Some(requested) = config.world_size {
            if requested < world_size_x || requested < world_size_y {
                return Err(MiniScatterError::configuration(format!(
                    "Manually specified world size {} mm must be larger than {} and {} mm",
                    requested, world_size_x, world_size_y
                )));
            }
            world_size_x = requested;
            world_size_y = requested;
        }

        let world_size_z =
            (2.0 * (config.target_thickness / 2.0 + 2.0 * footprint.dz)).max(config.minimum_world_size_z());

        let fit = Self {
            world_size_x,
            world_size_y,
            world_size_z,
            component_size_xy: footprint.size_xy,
            offset_z: footprint.dz,
            rotated,
            footprint: Some(footprint),
        };
        fit.check_footprint(center_z)?;

        info!(
            "Rotated {:?} at {:.3} deg: world = {} x {} x {} mm, component = {} mm",
            rotated,
            theta.to_degrees(),
            world_size_x,
            world_size_y,
            world_size_z,
            footprint.size_xy
        );
        Ok(fit)
    }

    /// Section of the world volume in the xz plane
    pub fn world_section(&self) -> SectionBox {
        SectionBox::from_center_size(Vector2::zeros(), Vector2::new(self.world_size_x, self.world_size_z))
    }

    /// Verify that the rotated slab centered at `center_z` lies inside the world section
    fn check_footprint(&self, center_z: f64) -> Result<()> {
        let Some(fp) = self.footprint else {
            return Ok(());
        };
        let slab = TiltedSlab::new(Vector2::new(0.0, center_z), fp.size_xy, fp.thickness, fp.theta);
        let world = self.world_section();
        let slack = GEOMETRY_TOLERANCE * self.world_size_x.max(self.world_size_z);
        if !world.contains_box(&slab.footprint(), slack) {
            return Err(MiniScatterError::configuration(format!(
                "Rotated {:?} footprint {:?} leaves the world section {:?}",
                self.rotated,
                slab.footprint(),
                world
            )));
        }
        Ok(())
    }
}
