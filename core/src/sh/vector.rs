//! SH coefficient vectors

use crate::geometry::Vector3f;
use crate::math::*;
use crate::sh::sh_basis_direction;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result, Write};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign};

/// A vector of spherical harmonics coefficients. The length is `order²` and
/// never changes after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SHVector {
    /// The coefficients.
    pub coeffs: Vec<Float>,
}

impl SHVector {
    /// Returns a vector with all coefficients set to 0.
    ///
    /// * `n` - Number of coefficients.
    pub fn zero(n: usize) -> Self {
        Self {
            coeffs: vec![0.0; n],
        }
    }

    /// Wraps the given coefficients.
    ///
    /// * `coeffs` - The coefficients.
    pub fn from_coeffs(coeffs: Vec<Float>) -> Self {
        Self { coeffs }
    }

    /// Returns the number of coefficients.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Returns true if there are no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Returns the coefficients.
    pub fn as_slice(&self) -> &[Float] {
        &self.coeffs
    }

    /// Returns the coefficients for modification.
    pub fn as_mut_slice(&mut self) -> &mut [Float] {
        &mut self.coeffs
    }

    /// Returns the band 0 (DC) coefficient.
    pub fn dc(&self) -> Float {
        self.coeffs.first().copied().unwrap_or(0.0)
    }

    /// Adds `scale * other` to this vector.
    ///
    /// * `scale` - Scale factor applied to `other`.
    /// * `other` - Coefficients to add; must have the same length.
    pub fn add_scaled(&mut self, scale: Float, other: &[Float]) {
        debug_assert_eq!(self.coeffs.len(), other.len());
        for (c, o) in self.coeffs.iter_mut().zip(other) {
            *c += scale * o;
        }
    }

    /// Returns true if any coefficient is NaN.
    pub fn has_nans(&self) -> bool {
        self.coeffs.iter().any(|c| c.is_nan())
    }

    /// Evaluates the function represented by the coefficients in a direction.
    ///
    /// * `direction` - The unit direction.
    pub fn evaluate(&self, direction: &Vector3f) -> Float {
        let order = (self.coeffs.len() as Float).sqrt() as usize;
        let basis = sh_basis_direction(order, direction);
        self.coeffs.iter().zip(basis.iter()).map(|(c, b)| c * b).sum()
    }

    /// Writes the coefficients as little-endian 64-bit floats.
    ///
    /// * `w` - The writer.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        for c in self.coeffs.iter() {
            w.write_f64::<LittleEndian>(*c)?;
        }
        Ok(())
    }

    /// Reads `n` little-endian 64-bit floats.
    ///
    /// * `n` - Number of coefficients.
    /// * `r` - The reader.
    pub fn read<R: Read>(n: usize, r: &mut R) -> Result<Self> {
        let mut coeffs = vec![0.0; n];
        r.read_f64_into::<LittleEndian>(&mut coeffs)?;
        Ok(Self { coeffs })
    }
}

impl Add for SHVector {
    type Output = SHVector;

    /// Adds the given vector and returns the result.
    ///
    /// * `other` - The vector to add.
    fn add(mut self, other: Self) -> Self::Output {
        self += &other;
        self
    }
}

impl AddAssign<&SHVector> for SHVector {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The vector to add.
    fn add_assign(&mut self, other: &SHVector) {
        self.add_scaled(1.0, &other.coeffs);
    }
}

impl Mul<Float> for SHVector {
    type Output = SHVector;

    /// Scale the vector.
    ///
    /// * `f` - The scaling factor.
    fn mul(mut self, f: Float) -> Self::Output {
        self *= f;
        self
    }
}

impl MulAssign<Float> for SHVector {
    /// Scale the vector and assign the result.
    ///
    /// * `f` - The scaling factor.
    fn mul_assign(&mut self, f: Float) {
        for c in self.coeffs.iter_mut() {
            *c *= f;
        }
    }
}

impl Index<usize> for SHVector {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.coeffs[i]
    }
}

impl IndexMut<usize> for SHVector {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.coeffs[i]
    }
}

impl From<Vec<Float>> for SHVector {
    fn from(coeffs: Vec<Float>) -> Self {
        Self { coeffs }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
