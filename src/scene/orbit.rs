//! Orbit transform controller
//!
//! Maps an angle (degrees) and a radius to `M = R_y(angle) * T(radius, 0, 0)`:
//! the local origin is pushed out along +X by `radius`, then rotated about +Y.
//! Rotation is right-handed, so `angle = 90` sends the origin to `(0, 0, -radius)`.

use glam::{Mat4, Vec3};

use super::transform::TransformSink;
use crate::error::{ViewerError, ViewerResult};

/// Radius a new controller starts with; the mesh spins in place.
pub const DEFAULT_ORBIT_RADIUS: f32 = 0.0;

/// Angle in `[0, 360)` used when comparing angles.
fn wrapped(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Derived orbit matrix.
pub fn orbit_matrix(angle: f32, radius: f32) -> Mat4 {
    Mat4::from_rotation_y(angle.to_radians()) * Mat4::from_translation(Vec3::new(radius, 0.0, 0.0))
}

/// Drives one transform sink from an angle and a radius.
///
/// Every change recomputes the matrix and pushes it to the sink. Writing a
/// value equal to the current one is a no-op and pushes nothing. Angles are
/// compared modulo 360, but the raw value is what [`OrbitController::angle`]
/// reports.
#[derive(Debug)]
pub struct OrbitController<S: TransformSink> {
    sink: S,
    angle: f32,
    radius: f32,
    matrix: Mat4,
}

impl<S: TransformSink> OrbitController<S> {
    /// Angle 0, radius [`DEFAULT_ORBIT_RADIUS`]. Nothing is pushed until the
    /// first change or [`sync`](Self::sync).
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            angle: 0.0,
            radius: DEFAULT_ORBIT_RADIUS,
            matrix: orbit_matrix(0.0, DEFAULT_ORBIT_RADIUS),
        }
    }

    /// Start from a given state and push it once.
    pub fn with_state(sink: S, angle: f32, radius: f32) -> ViewerResult<Self> {
        check_angle(angle)?;
        check_radius(radius)?;
        let mut controller = Self {
            sink,
            angle,
            radius,
            matrix: orbit_matrix(angle, radius),
        };
        controller.sync();
        Ok(controller)
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The transform most recently derived from angle and radius.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Set the angle in degrees. Returns whether the sink was updated.
    pub fn set_angle(&mut self, angle: f32) -> ViewerResult<bool> {
        check_angle(angle)?;
        let changed = wrapped(angle).to_bits() != wrapped(self.angle).to_bits();
        self.angle = angle;
        if changed {
            self.update();
        }
        Ok(changed)
    }

    /// Set the orbit radius. Returns whether the sink was updated.
    pub fn set_radius(&mut self, radius: f32) -> ViewerResult<bool> {
        check_radius(radius)?;
        if radius.to_bits() == self.radius.to_bits() {
            return Ok(false);
        }
        self.radius = radius;
        self.update();
        Ok(true)
    }

    /// Push the current matrix regardless of whether anything changed.
    pub fn sync(&mut self) {
        log::trace!(
            "Orbit sync: angle {} radius {}",
            self.angle,
            self.radius
        );
        self.sink.set_matrix(self.matrix);
    }

    fn update(&mut self) {
        self.matrix = orbit_matrix(self.angle, self.radius);
        log::trace!(
            "Orbit update: angle {} radius {} -> {:?}",
            self.angle,
            self.radius,
            self.matrix.w_axis
        );
        self.sink.set_matrix(self.matrix);
    }
}

fn check_angle(angle: f32) -> ViewerResult<()> {
    if angle.is_finite() {
        Ok(())
    } else {
        Err(ViewerError::InvalidOrbitParameter {
            parameter: "angle",
            value: angle,
        })
    }
}

fn check_radius(radius: f32) -> ViewerResult<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(ViewerError::InvalidOrbitParameter {
            parameter: "radius",
            value: radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Default)]
    struct RecordingSink(Vec<Mat4>);

    impl TransformSink for RecordingSink {
        fn set_matrix(&mut self, matrix: Mat4) {
            self.0.push(matrix);
        }
    }

    fn origin(matrix: Mat4) -> Vec3 {
        matrix.transform_point3(Vec3::ZERO)
    }

    #[rstest]
    #[case::zero(0.0, Vec3::new(2.0, 0.0, 0.0))]
    #[case::quarter(90.0, Vec3::new(0.0, 0.0, -2.0))]
    #[case::half(180.0, Vec3::new(-2.0, 0.0, 0.0))]
    #[case::three_quarter(270.0, Vec3::new(0.0, 0.0, 2.0))]
    fn test_orbit_maps_origin(#[case] angle: f32, #[case] expected: Vec3) {
        assert!(origin(orbit_matrix(angle, 2.0)).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_set_angle_pushes_derived_matrix() {
        let mut controller = OrbitController::new(RecordingSink::default());
        controller.set_radius(3.0).unwrap();
        assert!(controller.set_angle(90.0).unwrap());

        let pushed = controller.sink().0.last().copied().unwrap();
        assert_eq!(pushed, controller.matrix());
        assert!(origin(pushed).abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));
        assert_eq!(controller.sink().0.len(), 2);
    }

    #[test]
    fn test_equal_values_do_not_push() {
        let mut controller = OrbitController::new(RecordingSink::default());
        assert!(!controller.set_angle(0.0).unwrap());
        assert!(!controller.set_radius(DEFAULT_ORBIT_RADIUS).unwrap());
        assert!(controller.sink().0.is_empty());

        assert!(controller.set_angle(45.0).unwrap());
        assert!(!controller.set_angle(45.0).unwrap());
        assert_eq!(controller.sink().0.len(), 1);
    }

    #[test]
    fn test_angle_compared_modulo_360() {
        let mut controller = OrbitController::new(RecordingSink::default());
        controller.set_angle(30.0).unwrap();
        assert!(!controller.set_angle(390.0).unwrap());
        assert_eq!(controller.angle(), 390.0);
        assert_eq!(controller.sink().0.len(), 1);

        assert!(!controller.set_angle(360.0 + 360.0 + 30.0).unwrap());
        assert!(controller.set_angle(-30.0).unwrap());
        assert_eq!(controller.sink().0.len(), 2);
    }

    #[test]
    fn test_zero_radius_is_pure_rotation() {
        let mut controller = OrbitController::new(Mat4::IDENTITY);
        assert!(!controller.set_radius(0.0).unwrap());
        controller.set_angle(90.0).unwrap();
        assert!(origin(*controller.sink()).abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(controller
            .sink()
            .transform_vector3(Vec3::X)
            .abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut controller = OrbitController::new(RecordingSink::default());
        assert!(matches!(
            controller.set_radius(-1.0),
            Err(ViewerError::InvalidOrbitParameter {
                parameter: "radius",
                ..
            })
        ));
        assert!(controller.set_angle(f32::NAN).is_err());
        assert!(controller.set_angle(f32::INFINITY).is_err());
        assert_eq!(controller.radius(), DEFAULT_ORBIT_RADIUS);
        assert!(controller.sink().0.is_empty());
    }

    #[test]
    fn test_with_state_and_sync_push() {
        let mut controller =
            OrbitController::with_state(RecordingSink::default(), 90.0, 2.0).unwrap();
        assert_eq!(controller.sink().0.len(), 1);
        controller.sync();
        assert_eq!(controller.sink().0.len(), 2);
        assert_eq!(controller.into_sink().0[1], orbit_matrix(90.0, 2.0));
    }
}
