//! Orientation Frame

use super::{Matrix3x3, Vector3f};
use crate::math::*;

/// Cross products with the up-vector shorter than this fall back to the
/// secondary up-vector.
const DEGENERATE_CROSS_LENGTH: Float = 1e-6;

/// An orthonormal frame whose local x-axis follows a given direction. The
/// local z-axis is horizontal (perpendicular to +Y) whenever possible so that
/// frames built from nearby directions stay close to each other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Local x-axis; the direction the frame was built from.
    pub x: Vector3f,

    /// Local y-axis.
    pub y: Vector3f,

    /// Local z-axis.
    pub z: Vector3f,
}

impl Frame {
    /// Builds the frame for a unit direction.
    ///
    /// * `direction` - The unit direction that becomes the local x-axis.
    pub fn from_direction(direction: &Vector3f) -> Self {
        let mut z = direction.cross(&Vector3f::Y_AXIS);
        if z.length() < DEGENERATE_CROSS_LENGTH {
            z = direction.cross(&Vector3f::Z_AXIS);
        }
        let z = z.normalize();
        let y = z.cross(direction);

        Self {
            x: *direction,
            y,
            z,
        }
    }

    /// Returns the matrix whose rows are the frame axes. It maps world space
    /// vectors into the frame's local space.
    pub fn to_local_matrix(&self) -> Matrix3x3 {
        Matrix3x3::from_rows(&self.x, &self.y, &self.z)
    }

    /// Returns the rotation mapping local space vectors into world space,
    /// i.e. the inverse of `to_local_matrix()`.
    pub fn to_world_matrix(&self) -> Matrix3x3 {
        self.to_local_matrix().inverse()
    }

    /// Expresses a world space vector in local coordinates.
    ///
    /// * `v` - The world space vector.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    /// Returns the six cardinal directions of the frame: ±x, ±y and ±z.
    pub fn cardinal_directions(&self) -> [Vector3f; 6] {
        [self.x, -self.x, self.y, -self.y, self.z, -self.z]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn x_axis_frame_is_identity() {
        let frame = Frame::from_direction(&Vector3f::X_AXIS);
        assert_eq!(frame.x, Vector3f::X_AXIS);
        assert_eq!(frame.y, Vector3f::Y_AXIS);
        assert_eq!(frame.z, Vector3f::Z_AXIS);
    }

    #[test]
    fn up_direction_uses_fallback() {
        let frame = Frame::from_direction(&Vector3f::Y_AXIS);
        assert!(!frame.z.has_nans());
        assert!(approx_eq!(Float, frame.z.length(), 1.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, frame.z.dot(&frame.x), 0.0, epsilon = 1e-12));
    }

    proptest! {
        #[test]
        fn frame_is_orthonormal(theta in 0.0..PI, phi in 0.0..TWO_PI) {
            let d = Vector3f::spherical_direction(theta, phi);
            let frame = Frame::from_direction(&d);

            prop_assert!(approx_eq!(Float, frame.y.length(), 1.0, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, frame.z.length(), 1.0, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, frame.x.dot(&frame.y), 0.0, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, frame.x.dot(&frame.z), 0.0, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, frame.y.dot(&frame.z), 0.0, epsilon = 1e-9));
        }

        #[test]
        fn world_matrix_maps_local_x_to_direction(theta in 0.0..PI, phi in 0.0..TWO_PI) {
            let d = Vector3f::spherical_direction(theta, phi);
            let frame = Frame::from_direction(&d);
            let world = &frame.to_world_matrix() * &Vector3f::X_AXIS;

            prop_assert!(approx_eq!(Float, world.x, d.x, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, world.y, d.y, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, world.z, d.z, epsilon = 1e-9));

            let back = frame.to_local(&d);
            prop_assert!(approx_eq!(Float, back.x, 1.0, epsilon = 1e-9));
        }
    }
}
