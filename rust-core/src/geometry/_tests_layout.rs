#[cfg(test)]
mod tests {
    use super::super::fitter::GeometryConfig;
    use super::super::layout::DetectorLayout;
    use crate::config::{DETECTOR_THICKNESS, WORLD_SIZE_Z_BUFFER};
    use crate::error::MiniScatterError;
    use approx::assert_relative_eq;

    fn assert_configuration_error<T: std::fmt::Debug>(result: crate::Result<T>, needle: &str) {
        match result {
            Err(MiniScatterError::Configuration(msg)) => {
                assert!(msg.contains(needle), "message '{}' lacks '{}'", msg, needle)
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_unrotated_layout() {
        let layout = DetectorLayout::build(GeometryConfig {
            target_thickness: 2.0,
            detector_distance: 30.0,
            world_size: Some(80.0),
            ..GeometryConfig::default()
        })
        .unwrap();

        assert!(layout.has_target());
        assert_eq!(layout.world.x, 80.0);
        assert_eq!(layout.world.y, 80.0);
        assert_relative_eq!(layout.world.z, (30.0 + DETECTOR_THICKNESS + WORLD_SIZE_Z_BUFFER) * 2.0);

        let target = layout.target.unwrap();
        assert_eq!((target.x, target.y, target.z), (80.0, 80.0, 2.0));
        assert_eq!(layout.detector.x, 80.0);
        assert_eq!(layout.detector.z, DETECTOR_THICKNESS);
        assert_eq!(layout.detector_z, 30.0);
    }

    #[test]
    fn test_rotated_target_gets_fitted_size() {
        let layout = DetectorLayout::build(GeometryConfig {
            target_thickness: 1.0,
            target_angle: 30f64.to_radians(),
            target_rotated: true,
            detector_distance: 100.0,
            ..GeometryConfig::default()
        })
        .unwrap();

        let target = layout.target.unwrap();
        assert_relative_eq!(target.x, 396.267949, epsilon = 1e-5);
        assert_eq!(target.x, target.y);
        assert_eq!(layout.detector.x, layout.world.x);
        assert_eq!(layout.detector.y, layout.world.y);
    }

    #[test]
    fn test_rotated_detector_gets_fitted_size() {
        let layout = DetectorLayout::build(GeometryConfig {
            detector_angle: 45f64.to_radians(),
            detector_rotated: true,
            detector_distance: 100.0,
            ..GeometryConfig::default()
        })
        .unwrap();

        let target = layout.target.unwrap();
        assert_eq!(target.x, layout.world.x);
        assert_eq!(layout.detector.x, layout.fit.component_size_xy);
    }

    #[test]
    fn test_negative_target_thickness() {
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_thickness: -1.0,
                ..GeometryConfig::default()
            }),
            "not allowed",
        );
    }

    #[test]
    fn test_no_target_requires_magnets() {
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_thickness: 0.0,
                ..GeometryConfig::default()
            }),
            "Magnet definitions must be used",
        );

        let layout = DetectorLayout::build(GeometryConfig {
            target_thickness: 0.0,
            magnet_definitions: vec!["COLLIMATOR_RECT:100:50:G4_Cu".to_string()],
            ..GeometryConfig::default()
        })
        .unwrap();
        assert!(!layout.has_target());
    }

    #[test]
    fn test_no_target_with_rotation() {
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_thickness: 0.0,
                detector_rotated: true,
                detector_angle: 0.2,
                ..GeometryConfig::default()
            }),
            "rotated detector",
        );
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_thickness: 0.0,
                target_rotated: true,
                target_angle: 0.2,
                ..GeometryConfig::default()
            }),
            "rotated target",
        );
    }

    #[test]
    fn test_magnets_with_rotation() {
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_rotated: true,
                target_angle: 0.2,
                magnet_definitions: vec!["PLASMALENS:100".to_string()],
                ..GeometryConfig::default()
            }),
            "Magnet definitions not currently supported",
        );
    }

    #[test]
    fn test_detector_inside_target() {
        assert_configuration_error(
            DetectorLayout::build(GeometryConfig {
                target_thickness: 10.0,
                detector_distance: 4.0,
                ..GeometryConfig::default()
            }),
            "inside target",
        );
    }

    #[test]
    fn test_beam_start_position() {
        let layout = DetectorLayout::build(GeometryConfig {
            target_thickness: 2.0,
            detector_distance: 30.0,
            ..GeometryConfig::default()
        })
        .unwrap();

        assert_relative_eq!(layout.beam_start_z(0.0).unwrap(), -1.0 - WORLD_SIZE_Z_BUFFER / 2.0);
        assert_eq!(layout.beam_start_z(-10.0).unwrap(), -10.0);
        assert_configuration_error(layout.beam_start_z(-0.5), "not behind target back plane");
        assert_configuration_error(layout.beam_start_z(-layout.world.z), "behind world back plane");
    }
}
