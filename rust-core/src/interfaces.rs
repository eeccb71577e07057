// Definitions that are used throughout all modules

use serde::{Deserialize, Serialize};

// Transverse plane of the beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    X,
    Y,
}

impl Plane {
    pub fn label(&self) -> &'static str {
        match self {
            Plane::X => "x",
            Plane::Y => "y",
        }
    }
}

// Which component (if any) is tilted around the y axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotatedComponent {
    None,
    Detector,
    Target,
}

impl RotatedComponent {
    pub fn is_rotated(&self) -> bool {
        !matches!(self, RotatedComponent::None)
    }
}
