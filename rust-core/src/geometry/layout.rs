// Layout module: sizes and placements of the world, target and detector volumes
// This module validates the geometry inputs and hands the resolved dimensions to the
// external geometry builder

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::MiniScatterError;
use crate::geometry::fitter::{GeometryConfig, GeometryFit};
use crate::interfaces::RotatedComponent;
use crate::Result;

/// Full box dimensions of one volume [mm]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Placement of the world, target and detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorLayout {
    pub config: GeometryConfig,
    pub fit: GeometryFit,
    pub world: BoxSize,
    /// `None` when the target thickness is zero (magnets only)
    pub target: Option<BoxSize>,
    pub detector: BoxSize,
    /// z position of the detector center
    pub detector_z: f64,
}

impl DetectorLayout {
    /// Validate the configuration and compute every volume
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` for negative target thickness, a missing target
    /// combined with rotations or without magnets, magnets with rotation, a detector inside
    /// the target, and everything `GeometryFit::compute` rejects.
    pub fn build(config: GeometryConfig) -> Result<Self> {
        let rotated = config.rotated_component()?;

        let has_target = if config.target_thickness == 0.0 {
            if config.detector_rotated {
                return Err(MiniScatterError::configuration(
                    "TargetThickness=0 doesn't work together with rotated detector",
                ));
            }
            if config.target_rotated {
                return Err(MiniScatterError::configuration(
                    "TargetThickness=0 doesn't make any sense with a rotated target",
                ));
            }
            if config.magnet_definitions.is_empty() {
                return Err(MiniScatterError::configuration(
                    "Magnet definitions must be used if TargetThickness=0",
                ));
            }
            false
        } else if config.target_thickness < 0.0 || config.target_thickness.is_nan() {
            return Err(MiniScatterError::configuration(format!(
                "TargetThickness = {} < 0.0; this is not allowed",
                config.target_thickness
            )));
        } else {
            true
        };

        if rotated.is_rotated() && !config.magnet_definitions.is_empty() {
            return Err(MiniScatterError::configuration(
                "Magnet definitions not currently supported with a rotated detector or target",
            ));
        }

        let fit = GeometryFit::compute(&config)?;

        if fit.rotated == RotatedComponent::None {
            let gap = config.detector_distance - config.target_thickness / 2.0 - config.detector_thickness / 2.0;
            if gap < 0.0 {
                return Err(MiniScatterError::configuration(format!(
                    "Detector is inside target: distance target end to detector start = {} mm",
                    gap
                )));
            }
            info!("Creating an unrotated detector; distance target end to detector start = {} [mm]", gap);
        }

        let world = BoxSize {
            x: fit.world_size_x,
            y: fit.world_size_y,
            z: fit.world_size_z,
        };
        let spanning = |thickness: f64| BoxSize {
            x: world.x,
            y: world.y,
            z: thickness,
        };
        let square = |thickness: f64| BoxSize {
            x: fit.component_size_xy,
            y: fit.component_size_xy,
            z: thickness,
        };

        let (target, detector) = match fit.rotated {
            RotatedComponent::Detector => (spanning(config.target_thickness), square(config.detector_thickness)),
            RotatedComponent::Target => (square(config.target_thickness), spanning(config.detector_thickness)),
            RotatedComponent::None => (spanning(config.target_thickness), spanning(config.detector_thickness)),
        };

        Ok(Self {
            detector_z: config.detector_distance,
            fit,
            world,
            target: has_target.then_some(target),
            detector,
            config,
        })
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn target_thickness(&self) -> f64 {
        self.config.target_thickness
    }

    /// Resolve and validate the beam starting position along z [mm]
    ///
    /// A request of 0 places the beam half a buffer in front of the target back plane.
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` if the requested position is not behind the
    /// target back plane or not inside the world.
    pub fn beam_start_z(&self, requested: f64) -> Result<f64> {
        let back_plane = -self.target_thickness() / 2.0;
        if requested == 0.0 {
            return Ok(back_plane - self.config.world_size_z_buffer / 2.0);
        }
        if requested >= back_plane {
            return Err(MiniScatterError::configuration(format!(
                "Beam starting position = {} [mm] is not behind target back plane = {} [mm]",
                requested, back_plane
            )));
        }
        if requested <= -self.world.z / 2.0 {
            return Err(MiniScatterError::configuration(format!(
                "Beam starting position = {} [mm] is behind world back plane = {} [mm]",
                requested,
                -self.world.z / 2.0
            )));
        }
        Ok(requested)
    }
}
