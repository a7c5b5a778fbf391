//! 3x3 Matrix

#![allow(dead_code)]
use super::Vector3f;
use crate::math::*;
use std::ops::Mul;

/// A 3x3 matrix containing Float values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix3x3 {
    /// Stores a 2-D array of Float
    pub m: [[Float; 3]; 3],
}

/// Zero matrix.
pub const ZERO_MATRIX: Matrix3x3 = Matrix3x3 { m: [[0.0; 3]; 3] };

/// Ientity matrix.
pub const IDENTITY_MATRIX: Matrix3x3 = Matrix3x3 {
    m: [
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ],
};

impl Matrix3x3 {
    /// Create a matrix from its rows.
    ///
    /// * `r0` - Row 1.
    /// * `r1` - Row 2.
    /// * `r2` - Row 3.
    pub fn from_rows(r0: &Vector3f, r1: &Vector3f, r2: &Vector3f) -> Self {
        Self {
            m: [[r0.x, r0.y, r0.z], [r1.x, r1.y, r1.z], [r2.x, r2.y, r2.z]],
        }
    }

    /// Returns a row of the matrix as a vector.
    ///
    /// * `i` - The row index.
    pub fn row(&self, i: usize) -> Vector3f {
        Vector3f::new(self.m[i][0], self.m[i][1], self.m[i][2])
    }

    /// Returns the transpose of the matrix.
    #[rustfmt::skip]
    pub fn transpose(&self) -> Self {
        Self {
            m: [
                [self.m[0][0], self.m[1][0], self.m[2][0]],
                [self.m[0][1], self.m[1][1], self.m[2][1]],
                [self.m[0][2], self.m[1][2], self.m[2][2]],
            ],
        }
    }

    /// Returns the inverse of the matrix using numerically stable Gauss-Jordan
    /// elimination.
    ///
    /// The function will panic if the matrix is singular.
    pub fn inverse(&self) -> Self {
        let mut indxc = [0; 3];
        let mut indxr = [0; 3];
        let mut ipiv = [0; 3];

        let mut minv = self.m;

        for i in 0..3 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;

            // Choose pivot
            for j in 0..3 {
                if ipiv[j] != 1 {
                    for k in 0..3 {
                        if ipiv[k] == 0 {
                            let abs_minv = abs(minv[j][k]);
                            if abs_minv >= big {
                                big = abs_minv;
                                irow = j;
                                icol = k;
                            }
                        } else if ipiv[k] > 1 {
                            panic!("Singular matrix in MatrixInvert");
                        }
                    }
                }
            }

            ipiv[icol] += 1;

            // Swap rows `irow` and `icol` for pivot
            if irow != icol {
                minv.swap(irow, icol);
            }

            indxr[i] = irow;
            indxc[i] = icol;
            if minv[icol][icol] == 0.0 {
                panic!("Singular matrix in MatrixInvert");
            }

            // Set `m[icol][icol]` to one by scaling row `icol` appropriately
            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for j in 0..3 {
                minv[icol][j] *= pivinv;
            }

            // Subtract this row from others to zero out their columns
            for j in 0..3 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..3 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }

        // Swap columns to reflect permutation
        for j in (0..3).rev() {
            if indxr[j] != indxc[j] {
                for row in minv.iter_mut() {
                    row.swap(indxr[j], indxc[j]);
                }
            }
        }

        Self { m: minv }
    }
}

impl Mul<Matrix3x3> for Matrix3x3 {
    type Output = Matrix3x3;

    /// Post-multiply the given matrix.
    ///
    /// * `other` - The other matrix.
    fn mul(self, other: Matrix3x3) -> Self::Output {
        let mut r = ZERO_MATRIX;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }
        r
    }
}

impl Mul<&Vector3f> for &Matrix3x3 {
    type Output = Vector3f;

    /// Transform a column vector.
    ///
    /// * `v` - The vector.
    fn mul(self, v: &Vector3f) -> Self::Output {
        Vector3f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
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
    #[should_panic]
    fn inverse_panics_when_matrix_is_zero() {
        let _ = ZERO_MATRIX.inverse();
    }

    #[test]
    fn inverse_returns_identity_when_matrix_is_idenitity() {
        assert_eq!(IDENTITY_MATRIX.inverse(), IDENTITY_MATRIX);
    }

    #[test]
    fn rows_round_trip() {
        let a = Vector3f::new(1.0, 2.0, 3.0);
        let b = Vector3f::new(4.0, 5.0, 6.0);
        let c = Vector3f::new(7.0, 8.0, 9.0);
        let m = Matrix3x3::from_rows(&a, &b, &c);
        assert_eq!(m.row(0), a);
        assert_eq!(m.row(1), b);
        assert_eq!(m.row(2), c);
        assert_eq!(m.transpose().transpose(), m);
    }

    proptest! {
        #[test]
        fn inverse_returns_matrix_when_matrix_is_non_singular(
            a in 0.001..10.0f64, b in 0.001..10.0f64, c in 0.001..10.0f64,
            d in -1.0..1.0f64,
        ) {
            let mat = Matrix3x3 {
                m: [
                    [  a,   d, 0.0],
                    [0.0,   b,   d],
                    [0.0, 0.0,   c],
                ],
            };

            let prod = mat * mat.inverse();
            for j in 0..3 {
                for i in 0..3 {
                    prop_assert!(approx_eq!(
                        Float,
                        prod.m[i][j],
                        IDENTITY_MATRIX.m[i][j],
                        epsilon = 1e-9
                    ));
                }
            }
        }
    }
}
