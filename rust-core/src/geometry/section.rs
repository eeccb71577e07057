// Section module: axis-aligned boxes and tilted slabs in the xz plane
// Rotations are about the y axis, so the y extent of a slab is unaffected and every
// containment question reduces to 2D geometry in (x, z)

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the xz plane
///
/// `min` and `max` store (x, z) corners in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionBox {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl SectionBox {
    /// Create a section box from its corners
    ///
    /// # Panics
    /// In debug builds, if `min` is not component-wise below `max`
    pub fn new(min: Vector2<f64>, max: Vector2<f64>) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y,
            "Minimum coordinates must be less than or equal to maximum coordinates"
        );
        Self { min, max }
    }

    /// Box centered on `center` with full sizes `size` = (size_x, size_z)
    pub fn from_center_size(center: Vector2<f64>, size: Vector2<f64>) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        });
        Some(Self { min, max })
    }

    /// True if `other` lies inside this box, allowing `slack` on every side
    pub fn contains_box(&self, other: &SectionBox, slack: f64) -> bool {
        self.min.x - slack <= other.min.x
            && self.max.x + slack >= other.max.x
            && self.min.y - slack <= other.min.y
            && self.max.y + slack >= other.max.y
    }

    pub fn center(&self) -> Vector2<f64> {
        (self.min + self.max) / 2.0
    }

    /// Full extent along x
    pub fn size_x(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Full extent along z
    pub fn size_z(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A rectangular slab placed in the xz plane and rotated about the y axis
///
/// The slab has full transverse size `width` and full thickness `thickness` before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltedSlab {
    /// Center (x, z) [mm]
    pub center: Vector2<f64>,
    /// Transverse size along the unrotated x axis [mm]
    pub width: f64,
    /// Size along the unrotated z axis [mm]
    pub thickness: f64,
    /// Rotation angle about y [rad]
    pub angle: f64,
}

impl TiltedSlab {
    pub fn new(center: Vector2<f64>, width: f64, thickness: f64, angle: f64) -> Self {
        Self { center, width, thickness, angle }
    }

    /// The four corners after rotation, in placement coordinates
    pub fn corners(&self) -> [Vector2<f64>; 4] {
        let rotation = Rotation2::new(self.angle);
        let (hw, ht) = (self.width / 2.0, self.thickness / 2.0);
        [
            Vector2::new(-hw, -ht),
            Vector2::new(hw, -ht),
            Vector2::new(hw, ht),
            Vector2::new(-hw, ht),
        ]
        .map(|corner| self.center + rotation * corner)
    }

    /// Axis-aligned footprint of the rotated slab
    pub fn footprint(&self) -> SectionBox {
        // Four corners are always present
        SectionBox::from_points(self.corners()).unwrap_or(SectionBox {
            min: self.center,
            max: self.center,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_from_points() {
        let bbox = SectionBox::from_points(vec![
            Vector2::new(1.0, 2.0),
            Vector2::new(-1.0, 3.0),
            Vector2::new(2.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bbox.min, Vector2::new(-1.0, -1.0));
        assert_eq!(bbox.max, Vector2::new(2.0, 3.0));
        assert!(SectionBox::from_points(std::iter::empty::<Vector2<f64>>()).is_none());
    }

    #[test]
    fn test_contains_box_with_slack() {
        let outer = SectionBox::from_center_size(Vector2::zeros(), Vector2::new(10.0, 10.0));
        let inner = SectionBox::from_center_size(Vector2::zeros(), Vector2::new(10.0 + 1e-12, 4.0));
        assert!(!outer.contains_box(&inner, 0.0));
        assert!(outer.contains_box(&inner, 1e-9));
    }

    #[test]
    fn test_unrotated_slab_footprint() {
        let slab = TiltedSlab::new(Vector2::new(0.0, 5.0), 20.0, 2.0, 0.0);
        let fp = slab.footprint();
        assert_relative_eq!(fp.size_x(), 20.0);
        assert_relative_eq!(fp.size_z(), 2.0);
        assert_relative_eq!(fp.center().y, 5.0);
    }

    #[test]
    fn test_quarter_turn_swaps_extents() {
        let slab = TiltedSlab::new(Vector2::zeros(), 20.0, 2.0, FRAC_PI_2);
        let fp = slab.footprint();
        assert_relative_eq!(fp.size_x(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(fp.size_z(), 20.0, epsilon = 1e-12);
    }
}
