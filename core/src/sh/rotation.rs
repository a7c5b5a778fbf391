//! SH Rotation

use crate::geometry::{Frame, Matrix3x3, Vector3f};
use crate::math::*;
use crate::sh::{sh_basis_direction, sh_coefficient_count, SHVector, Sample};

/// Minimum number of fitting directions per band.
const MIN_FIT_DIRECTIONS: usize = 64;

/// A rotation in SH coefficient space. The matrix is stored densely but only
/// the diagonal band blocks are non-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct ShRotation {
    /// Number of SH bands.
    order: usize,

    /// Row-major `order² x order²` matrix.
    m: Vec<Float>,
}

impl ShRotation {
    /// Returns the identity rotation.
    ///
    /// * `order` - Number of SH bands.
    pub fn identity(order: usize) -> Self {
        let n = sh_coefficient_count(order);
        let mut m = vec![0.0; n * n];
        for i in 0..n {
            m[i * n + i] = 1.0;
        }
        Self { order, m }
    }

    /// Builds the SH rotation for a 3x3 rotation `r` such that rotating the
    /// coefficients of `f` yields the coefficients of `g(ω) = f(r⁻¹ω)`.
    ///
    /// Each band block is solved by least squares from the basis evaluated
    /// at a fixed set of directions; since a rotated band-l function stays in
    /// band l the fit is exact up to rounding.
    ///
    /// * `r`     - The rotation.
    /// * `order` - Number of SH bands.
    pub fn from_matrix(r: &Matrix3x3, order: usize) -> Self {
        let n = sh_coefficient_count(order);
        let r_inv = r.inverse();

        let directions = fibonacci_sphere(MIN_FIT_DIRECTIONS.max(4 * n));
        let a: Vec<Vec<Float>> = directions
            .iter()
            .map(|w| sh_basis_direction(order, w))
            .collect();
        let b: Vec<Vec<Float>> = directions
            .iter()
            .map(|w| sh_basis_direction(order, &(&r_inv * w)))
            .collect();

        let mut m = vec![0.0; n * n];
        for l in 0..order {
            let offset = l * l;
            let size = 2 * l + 1;

            // Normal equations (AᵀA) X = AᵀB restricted to band l.
            let mut ata = vec![vec![0.0; size]; size];
            let mut atb = vec![vec![0.0; size]; size];
            for (ak, bk) in a.iter().zip(b.iter()) {
                for i in 0..size {
                    let ai = ak[offset + i];
                    for j in 0..size {
                        ata[i][j] += ai * ak[offset + j];
                        atb[i][j] += ai * bk[offset + j];
                    }
                }
            }

            // Column j of X holds the expansion of y_j(r⁻¹ω) in band l, so
            // the coefficient mapping c' = Xc.
            let x = solve(ata, atb);
            for i in 0..size {
                for j in 0..size {
                    m[(offset + i) * n + offset + j] = x[i][j];
                }
            }
        }

        Self { order, m }
    }

    /// Returns the number of SH bands.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the matrix element at row `i` and column `j`.
    ///
    /// * `i` - Row.
    /// * `j` - Column.
    pub fn get(&self, i: usize, j: usize) -> Float {
        self.m[i * sh_coefficient_count(self.order) + j]
    }

    /// Rotates coefficients as a block-diagonal product and writes the result
    /// into `out`.
    ///
    /// * `input` - Coefficients to rotate.
    /// * `out`   - Rotated coefficients.
    pub fn rotate_into(&self, input: &[Float], out: &mut [Float]) {
        let n = sh_coefficient_count(self.order);
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(out.len(), n);

        for l in 0..self.order {
            let offset = l * l;
            let size = 2 * l + 1;
            for i in offset..offset + size {
                let row = &self.m[i * n + offset..i * n + offset + size];
                out[i] = row
                    .iter()
                    .zip(&input[offset..offset + size])
                    .map(|(r, c)| r * c)
                    .sum();
            }
        }
    }

    /// Returns the rotated coefficients.
    ///
    /// * `v` - Coefficients to rotate.
    pub fn rotate(&self, v: &SHVector) -> SHVector {
        let mut out = SHVector::zero(v.len());
        self.rotate_into(v.as_slice(), out.as_mut_slice());
        out
    }
}

/// Rotations for every forward sample direction. The forward rotation maps
/// the local +x axis onto the sample direction `d`, the mirror rotation maps
/// it onto `-d`.
#[derive(Clone, Debug)]
pub struct RotationCache {
    /// Frame built from each sample direction.
    frames: Vec<Frame>,

    /// Rotations for `d`.
    forward: Vec<ShRotation>,

    /// Rotations for `-d`.
    mirror: Vec<ShRotation>,
}

impl RotationCache {
    /// Builds the rotations for the given samples.
    ///
    /// * `samples` - The forward samples.
    /// * `order`   - Number of SH bands.
    pub fn new(samples: &[Sample], order: usize) -> Self {
        let mut frames = Vec::with_capacity(samples.len());
        let mut forward = Vec::with_capacity(samples.len());
        let mut mirror = Vec::with_capacity(samples.len());

        for sample in samples {
            let frame = Frame::from_direction(&sample.direction);
            let mirror_frame = Frame::from_direction(&(-sample.direction));

            forward.push(ShRotation::from_matrix(&frame.to_world_matrix(), order));
            mirror.push(ShRotation::from_matrix(&mirror_frame.to_world_matrix(), order));
            frames.push(frame);
        }

        debug!("Built {} SH rotation pairs", frames.len());

        Self {
            frames,
            forward,
            mirror,
        }
    }

    /// Returns the number of cached samples.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frame of sample `i`.
    ///
    /// * `i` - Sample index.
    pub fn frame(&self, i: usize) -> &Frame {
        &self.frames[i]
    }

    /// Returns the rotation for the direction of sample `i`.
    ///
    /// * `i` - Sample index.
    pub fn forward(&self, i: usize) -> &ShRotation {
        &self.forward[i]
    }

    /// Returns the rotation for the opposite direction of sample `i`.
    ///
    /// * `i` - Sample index.
    pub fn mirror(&self, i: usize) -> &ShRotation {
        &self.mirror[i]
    }
}

/// Returns `n` roughly uniformly distributed unit directions.
///
/// * `n` - Number of directions.
fn fibonacci_sphere(n: usize) -> Vec<Vector3f> {
    let golden_angle = PI * (3.0 - (5.0 as Float).sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - (2.0 * i as Float + 1.0) / n as Float;
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = golden_angle * i as Float;
            Vector3f::new(r * phi.cos(), r * phi.sin(), z)
        })
        .collect()
}

/// Solves `a x = b` for a square system with multiple right hand sides
/// using Gauss-Jordan elimination with partial pivoting.
///
/// * `a` - Square matrix.
/// * `b` - Right hand sides, one column per system.
fn solve(mut a: Vec<Vec<Float>>, mut b: Vec<Vec<Float>>) -> Vec<Vec<Float>> {
    let n = a.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            panic!("Singular matrix in SH rotation fitting");
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let inv = 1.0 / a[col][col];
        for k in 0..n {
            a[col][k] *= inv;
        }
        for v in b[col].iter_mut() {
            *v *= inv;
        }

        for row in 0..n {
            if row != col {
                let f = a[row][col];
                if f != 0.0 {
                    for k in 0..n {
                        a[row][k] -= f * a[col][k];
                    }
                    for k in 0..b[row].len() {
                        b[row][k] -= f * b[col][k];
                    }
                }
            }
        }
    }
    b
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IDENTITY_MATRIX;
    use float_cmp::*;
    use proptest::prelude::*;

    fn unit(x: Float, y: Float, z: Float) -> Vector3f {
        Vector3f::new(x, y, z).normalize()
    }

    #[test]
    fn identity_matrix_gives_identity_rotation() {
        let rot = ShRotation::from_matrix(&IDENTITY_MATRIX, 4);
        let id = ShRotation::identity(4);
        for i in 0..16 {
            for j in 0..16 {
                assert!(approx_eq!(Float, rot.get(i, j), id.get(i, j), epsilon = 1e-10));
            }
        }
    }

    #[test]
    fn x_axis_frame_gives_identity() {
        let frame = Frame::from_direction(&Vector3f::X_AXIS);
        let rot = ShRotation::from_matrix(&frame.to_world_matrix(), 3);
        for i in 0..9 {
            for j in 0..9 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx_eq!(Float, rot.get(i, j), expected, epsilon = 1e-10));
            }
        }
    }

    #[test]
    fn mirror_keeps_dc() {
        let frame = Frame::from_direction(&(-Vector3f::X_AXIS));
        let rot = ShRotation::from_matrix(&frame.to_world_matrix(), 3);
        assert!(approx_eq!(Float, rot.get(0, 0), 1.0, epsilon = 1e-10));
        for j in 1..9 {
            assert!(rot.get(0, j).abs() < 1e-10);
            assert!(rot.get(j, 0).abs() < 1e-10);
        }
    }

    #[test]
    fn off_band_entries_are_zero() {
        let frame = Frame::from_direction(&unit(0.3, 0.5, -0.8));
        let rot = ShRotation::from_matrix(&frame.to_world_matrix(), 3);
        // Band 1 occupies slots 1..4, band 2 slots 4..9.
        for i in 1..4 {
            for j in 4..9 {
                assert_eq!(rot.get(i, j), 0.0);
                assert_eq!(rot.get(j, i), 0.0);
            }
        }
    }

    #[test]
    fn cache_pairs_forward_and_mirror() {
        let samples = vec![Sample {
            direction: unit(0.6, 0.0, 0.8),
            sh_factors: vec![0.0; 9],
        }];
        let cache = RotationCache::new(&samples, 3);
        assert_eq!(cache.len(), 1);

        // A lobe along local +x ends up along d and -d respectively.
        let lobe = SHVector::from_coeffs(sh_basis_direction(3, &Vector3f::X_AXIS));
        let d = samples[0].direction;
        let fwd = cache.forward(0).rotate(&lobe);
        let mir = cache.mirror(0).rotate(&lobe);
        assert!(fwd.evaluate(&d) > fwd.evaluate(&(-d)));
        assert!(mir.evaluate(&(-d)) > mir.evaluate(&d));
        assert!(approx_eq!(Float, fwd.evaluate(&d), lobe.evaluate(&Vector3f::X_AXIS), epsilon = 1e-9));
    }

    proptest! {
        #[test]
        fn rotated_function_matches_rotated_argument(
            dx in -1.0..1.0f64, dy in -1.0..1.0f64, dz in -1.0..1.0f64,
            wx in -1.0..1.0f64, wy in -1.0..1.0f64, wz in -1.0..1.0f64,
            coeffs in prop::collection::vec(-1.0..1.0f64, 9),
        ) {
            let d = Vector3f::new(dx, dy, dz);
            let w = Vector3f::new(wx, wy, wz);
            prop_assume!(d.length() > 0.1 && w.length() > 0.1);
            let d = d.normalize();
            let w = w.normalize();

            let frame = Frame::from_direction(&d);
            let r = frame.to_world_matrix();
            let rot = ShRotation::from_matrix(&r, 3);

            let f = SHVector::from_coeffs(coeffs);
            let g = rot.rotate(&f);

            // g(w) = f(r⁻¹ w) and r⁻¹ maps world space into the frame.
            let expected = f.evaluate(&frame.to_local(&w));
            prop_assert!((g.evaluate(&w) - expected).abs() < 1e-8);
        }

        #[test]
        fn rotation_preserves_norm(
            dx in -1.0..1.0f64, dy in -1.0..1.0f64, dz in -1.0..1.0f64,
            coeffs in prop::collection::vec(-1.0..1.0f64, 16),
        ) {
            let d = Vector3f::new(dx, dy, dz);
            prop_assume!(d.length() > 0.1);
            let frame = Frame::from_direction(&d.normalize());
            let rot = ShRotation::from_matrix(&frame.to_world_matrix(), 4);

            let f = SHVector::from_coeffs(coeffs);
            let g = rot.rotate(&f);
            let nf: Float = f.coeffs.iter().map(|c| c * c).sum();
            let ng: Float = g.coeffs.iter().map(|c| c * c).sum();
            prop_assert!((nf - ng).abs() < 1e-8);
        }
    }
}
