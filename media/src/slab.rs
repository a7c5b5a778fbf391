//! Slab Geometry

use cloud_core::error::*;
use cloud_core::geometry::Vector3f;
use cloud_core::math::*;

/// Directions whose component along the slab axis is below this are
/// considered perpendicular to the axis.
const AXIS_EPSILON: Float = 1e-6;

/// Relative tolerance on the side wall discriminant before the viewer is
/// considered outside the slab.
const DISCRIMINANT_EPSILON: Float = 1e-9;

/// A finite cylinder of cloud along the x-axis, from x = 0 to x = `length`.
/// Its diameter is `thickness` and the viewer stands at `height` above the
/// bottom tangent line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Slab {
    /// Length along the x-axis.
    pub length: Float,

    /// Diameter.
    pub thickness: Float,

    /// Height of the viewer above the bottom of the slab.
    pub height: Float,
}

impl Slab {
    /// Create a new `Slab`.
    ///
    /// * `length`    - Length along the x-axis.
    /// * `thickness` - Diameter.
    /// * `height`    - Height of the viewer above the bottom.
    pub fn new(length: Float, thickness: Float, height: Float) -> Self {
        Self {
            length,
            thickness,
            height,
        }
    }

    /// Returns the distance from the viewer at axial position `x` to the
    /// slab boundary along a unit direction.
    ///
    /// * `direction` - The unit direction.
    /// * `x`         - Axial position of the viewer.
    pub fn hit_distance(&self, direction: &Vector3f, x: Float) -> Result<Float> {
        // End caps.
        let cap = if direction.x > AXIS_EPSILON {
            (self.length - x) / direction.x
        } else if direction.x < -AXIS_EPSILON {
            -x / direction.x
        } else {
            INFINITY
        };

        // Side wall.
        let a = direction.y * direction.y + direction.z * direction.z;
        if a < AXIS_EPSILON {
            return Ok(max(0.0, cap));
        }

        let radius = 0.5 * self.thickness;
        let p = self.height - radius;
        let b = p * direction.y;
        let c = p * p - radius * radius;
        let mut delta = b * b - a * c;
        if delta < 0.0 {
            if delta < -DISCRIMINANT_EPSILON * a * radius * radius {
                return Err(Error::ViewerOutsideSlab {
                    x,
                    length: self.length,
                    thickness: self.thickness,
                    height: self.height,
                    dx: direction.x,
                    dy: direction.y,
                    dz: direction.z,
                });
            }
            delta = 0.0;
        }
        let side = (-b + delta.sqrt()) / a;

        Ok(max(0.0, min(side, cap)))
    }
}

/// Returns the distance from a viewer inside a slab to its boundary.
///
/// * `direction` - The unit direction.
/// * `x`         - Axial position of the viewer.
/// * `length`    - Slab length.
/// * `thickness` - Slab diameter.
/// * `height`    - Viewer height above the bottom of the slab.
pub fn hit_distance(
    direction: &Vector3f,
    x: Float,
    length: Float,
    thickness: Float,
    height: Float,
) -> Result<Float> {
    Slab::new(length, thickness, height).hit_distance(direction, x)
}

/// The approximate slab seen along a scattered ray, derived from the hit
/// distances perpendicular to that ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SecondarySlab {
    /// Approximate diameter.
    pub thickness: Float,

    /// Approximate viewer height.
    pub height: Float,
}

impl SecondarySlab {
    /// Averages the chords along the frame's ±y and ±z axes into a single
    /// cylinder. A zero-length chord places the viewer at its middle.
    ///
    /// * `y0` - Hit distance along +y.
    /// * `y1` - Hit distance along -y.
    /// * `z0` - Hit distance along +z.
    /// * `z1` - Hit distance along -z.
    pub fn from_hits(y0: Float, y1: Float, z0: Float, z1: Float) -> Self {
        let size_y = y0 + y1;
        let size_z = z0 + z1;
        let thickness = 0.5 * (size_y + size_z);
        let relative_height = 0.5 * (chord_ratio(y1, size_y) + chord_ratio(z1, size_z));
        Self {
            thickness,
            height: relative_height * thickness,
        }
    }
}

/// Returns the relative position along a chord.
///
/// * `below` - Distance to the lower end.
/// * `size`  - Chord length.
#[inline]
fn chord_ratio(below: Float, size: Float) -> Float {
    if size > 0.0 {
        below / size
    } else {
        0.5
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
