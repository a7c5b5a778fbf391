//! 3-D Vectors

#![allow(dead_code)]
use crate::math::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 3-D vector containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D vector containing `Float` values.
pub type Vector3f = Vector3<Float>;

impl<T: Num> Vector3<T> {
    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D zero vector.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> T
    where
        T: Copy,
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the vector's length.
    pub fn length(&self) -> T
    where
        T: num_traits::Float,
    {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector.
    pub fn normalize(&self) -> Self
    where
        T: num_traits::Float,
    {
        *self / self.length()
    }

    /// Returns the dot product with another vector.
    ///
    /// * `other` -  The other vector.
    pub fn dot(&self, other: &Self) -> T
    where
        T: Copy,
    {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn cross(&self, other: &Self) -> Self
    where
        T: Copy,
    {
        Self::new(
            (self.y * other.z) - (self.z * other.y),
            (self.z * other.x) - (self.x * other.z),
            (self.x * other.y) - (self.y * other.x),
        )
    }
}

impl Vector3f {
    /// Unit vector along the x-axis, which is the slab's length axis.
    pub const X_AXIS: Vector3f = Vector3::new(1.0, 0.0, 0.0);

    /// Unit vector along the y-axis.
    pub const Y_AXIS: Vector3f = Vector3::new(0.0, 1.0, 0.0);

    /// Unit vector along the z-axis.
    pub const Z_AXIS: Vector3f = Vector3::new(0.0, 0.0, 1.0);

    /// Returns the unit direction for the given spherical angles with θ
    /// measured from the z-axis and φ measured in the xy-plane from the
    /// x-axis.
    ///
    /// * `theta` - Polar angle θ.
    /// * `phi`   - Azimuthal angle φ.
    pub fn spherical_direction(theta: Float, phi: Float) -> Self {
        let sin_theta = theta.sin();
        Self::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
    }

    /// Returns the spherical angles (θ, φ) of a unit vector, the inverse of
    /// `spherical_direction()`. φ is in [0, 2π).
    pub fn spherical_angles(&self) -> (Float, Float) {
        let theta = acos(self.z);
        let phi = self.y.atan2(self.x);
        (theta, if phi < 0.0 { phi + TWO_PI } else { phi })
    }
}

impl<T: Num> Add for Vector3<T> {
    type Output = Self;

    /// Adds the given vector and returns the result.
    ///
    /// * `other` -  The vector to add.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> AddAssign for Vector3<T> {
    /// Performs the `+=` operation.
    ///
    /// * `other` -  The vector to add.
    fn add_assign(&mut self, other: Self) {
        *self = Self::new(self.x + other.x, self.y + other.y, self.z + other.z);
    }
}

impl<T: Num> Sub for Vector3<T> {
    type Output = Self;

    /// Subtracts the given vector and returns the result.
    ///
    /// * `other` -  The vector to subtract.
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> SubAssign for Vector3<T> {
    /// Performs the `-=` operation.
    ///
    /// * `other` -  The vector to subtract.
    fn sub_assign(&mut self, other: Self) {
        *self = Self::new(self.x - other.x, self.y - other.y, self.z - other.z);
    }
}

impl<T: Num + Copy> Mul<T> for Vector3<T> {
    type Output = Vector3<T>;

    /// Scale the vector.
    ///
    /// * `f` -  The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Self::Output::new(f * self.x, f * self.y, f * self.z)
    }
}

impl Mul<Vector3<Float>> for Float {
    type Output = Vector3<Float>;

    /// Scale the vector.
    ///
    /// * `v` -  The vector.
    fn mul(self, v: Vector3<Float>) -> Vector3<Float> {
        Vector3::new(self * v.x, self * v.y, self * v.z)
    }
}

impl<T: Num + Copy> MulAssign<T> for Vector3<T> {
    /// Scale and assign the result to the vector.
    ///
    /// * `f` -  The scaling factor.
    fn mul_assign(&mut self, f: T) {
        *self = Self::new(f * self.x, f * self.y, f * self.z);
    }
}

impl<T: Num + Copy> Div<T> for Vector3<T> {
    type Output = Self;

    /// Scale the vector by 1/f.
    ///
    /// * `f` -  The scaling factor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());

        let inv = T::one() / f;
        Self::Output::new(inv * self.x, inv * self.y, inv * self.z)
    }
}

impl<T: Num + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Vector3<T>;

    /// Flip the vector's direction (scale by -1).
    fn neg(self) -> Self::Output {
        Self::Output::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    /// Index the vector by coordinate index.
    ///
    /// * `i` -  0 = x, 1 = y, 2 = z.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid axis index {i}"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Vector3<T> {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
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
    fn zero_vector() {
        assert!(Vector3::new(0.0, 0.0, 0.0) == Vector3f::zero());
    }

    #[test]
    fn has_nans() {
        assert!(!Vector3::new(0.0, 0.0, 0.0).has_nans());
        assert!(Vector3::new(f64::NAN, f64::NAN, f64::NAN).has_nans());
    }

    #[test]
    fn cross_axis() {
        assert!(Vector3f::X_AXIS.cross(&Vector3f::Y_AXIS) == Vector3f::Z_AXIS);
        assert!(Vector3f::Y_AXIS.cross(&Vector3f::X_AXIS) == -Vector3f::Z_AXIS);
        assert!(Vector3f::Y_AXIS.cross(&Vector3f::Z_AXIS) == Vector3f::X_AXIS);
        assert!(Vector3f::Z_AXIS.cross(&Vector3f::X_AXIS) == Vector3f::Y_AXIS);
    }

    #[test]
    fn spherical_poles() {
        let north = Vector3f::spherical_direction(0.0, 1.234);
        assert!(approx_eq!(Float, north.z, 1.0, ulps = 2));
        let east = Vector3f::spherical_direction(PI_OVER_TWO, 0.0);
        assert!(approx_eq!(Float, east.x, 1.0, ulps = 2));
    }

    proptest! {
        #[test]
        fn spherical_angles_inverts_direction(
            theta in 0.01..(PI - 0.01),
            phi in 0.0..(TWO_PI - 0.01),
        ) {
            let v = Vector3f::spherical_direction(theta, phi);
            prop_assert!(approx_eq!(Float, v.length(), 1.0, epsilon = 1e-12));

            let (t, p) = v.spherical_angles();
            prop_assert!(approx_eq!(Float, t, theta, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, p, phi, epsilon = 1e-9));
        }

        #[test]
        fn cross_is_orthogonal(
            x in -10.0..10.0f64, y in -10.0..10.0f64, z in -10.0..10.0f64,
        ) {
            let v = Vector3::new(x, y, z);
            let c = v.cross(&Vector3f::Y_AXIS);
            prop_assert!(approx_eq!(Float, c.dot(&v), 0.0, epsilon = 1e-9));
            prop_assert!(approx_eq!(Float, c.dot(&Vector3f::Y_AXIS), 0.0, epsilon = 1e-9));
        }
    }
}
