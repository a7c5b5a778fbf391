//! Real spherical harmonics basis.
//!
//! Coefficients of order `n` occupy `n²` slots; band `l` holds the `2l + 1`
//! functions `y_l^m` for `m` in `-l..=l` at slot `l(l + 1) + m`.

use crate::geometry::Vector3f;
use crate::math::*;

/// Returns the number of coefficients for the given SH order.
///
/// * `order` - Number of bands.
#[inline(always)]
pub fn sh_coefficient_count(order: usize) -> usize {
    order * order
}

/// Returns the coefficient slot of `y_l^m`.
///
/// * `l` - The band.
/// * `m` - The index within the band in `-l..=l`.
#[inline(always)]
pub fn sh_index(l: usize, m: i32) -> usize {
    debug_assert!(m.unsigned_abs() as usize <= l);
    ((l * (l + 1)) as i64 + m as i64) as usize
}

/// Returns the band that a coefficient slot belongs to.
///
/// * `index` - The coefficient slot.
#[inline(always)]
pub fn sh_band(index: usize) -> usize {
    let mut l = (index as Float).sqrt() as usize;
    while (l + 1) * (l + 1) <= index {
        l += 1;
    }
    while l * l > index {
        l -= 1;
    }
    l
}

/// Evaluates the associated Legendre polynomial `P_l^m(x)` including the
/// Condon-Shortley phase.
///
/// * `l` - The band.
/// * `m` - The order within the band, `0 <= m <= l`.
/// * `x` - The argument in [-1, 1].
pub fn legendre(l: usize, m: usize, x: Float) -> Float {
    let mut pmm = 1.0;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();
        let mut fact = 1.0;
        for _ in 1..=m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if l == m {
        return pmm;
    }

    let mut pmmp1 = x * (2 * m + 1) as Float * pmm;
    if l == m + 1 {
        return pmmp1;
    }

    let mut pll = 0.0;
    for ll in (m + 2)..=l {
        pll = ((2 * ll - 1) as Float * x * pmmp1 - (ll + m - 1) as Float * pmm) / (ll - m) as Float;
        pmm = pmmp1;
        pmmp1 = pll;
    }
    pll
}

/// Returns the normalisation constant `K_l^m`.
///
/// * `l` - The band.
/// * `m` - The index within the band.
pub fn sh_normalization(l: usize, m: i32) -> Float {
    let am = m.unsigned_abs() as usize;
    ((2 * l + 1) as Float * factorial(l - am) / (FOUR_PI * factorial(l + am))).sqrt()
}

/// Evaluates the real spherical harmonic `y_l^m(θ, φ)`.
///
/// * `l`     - The band.
/// * `m`     - The index within the band in `-l..=l`.
/// * `theta` - Polar angle θ.
/// * `phi`   - Azimuthal angle φ.
pub fn sh(l: usize, m: i32, theta: Float, phi: Float) -> Float {
    let k = sh_normalization(l, m);
    let cos_theta = theta.cos();
    match m {
        0 => k * legendre(l, 0, cos_theta),
        m if m > 0 => {
            std::f64::consts::SQRT_2 * k * (m as Float * phi).cos() * legendre(l, m as usize, cos_theta)
        }
        m => {
            std::f64::consts::SQRT_2
                * k
                * (-m as Float * phi).sin()
                * legendre(l, (-m) as usize, cos_theta)
        }
    }
}

/// Evaluates all `order²` basis functions at the given spherical angles.
///
/// * `order` - Number of bands.
/// * `theta` - Polar angle θ.
/// * `phi`   - Azimuthal angle φ.
pub fn sh_basis(order: usize, theta: Float, phi: Float) -> Vec<Float> {
    let mut basis = Vec::with_capacity(sh_coefficient_count(order));
    for l in 0..order {
        let l_i = l as i32;
        for m in -l_i..=l_i {
            basis.push(sh(l, m, theta, phi));
        }
    }
    basis
}

/// Evaluates all `order²` basis functions in the direction of a unit vector.
///
/// * `order`     - Number of bands.
/// * `direction` - The unit direction.
pub fn sh_basis_direction(order: usize, direction: &Vector3f) -> Vec<Float> {
    let (theta, phi) = direction.spherical_angles();
    sh_basis(order, theta, phi)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn indices_and_bands() {
        assert_eq!(sh_index(0, 0), 0);
        assert_eq!(sh_index(1, -1), 1);
        assert_eq!(sh_index(1, 1), 3);
        assert_eq!(sh_index(2, -2), 4);
        assert_eq!(sh_index(2, 2), 8);

        let bands: Vec<usize> = (0..9).map(sh_band).collect();
        assert_eq!(bands, vec![0, 1, 1, 1, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn known_values() {
        // y_0^0 = 1 / (2 sqrt(π)).
        assert!(approx_eq!(Float, sh(0, 0, 0.3, 1.2), 0.28209479177387814, epsilon = 1e-12));

        // y_1^0 = sqrt(3 / 4π) cos θ.
        let theta: Float = 0.7;
        let expected = (3.0 / FOUR_PI).sqrt() * theta.cos();
        assert!(approx_eq!(Float, sh(1, 0, theta, 2.0), expected, epsilon = 1e-12));

        // y_2^0 = sqrt(5 / 16π) (3cos²θ - 1).
        let expected = (5.0 / (16.0 * PI)).sqrt() * (3.0 * theta.cos() * theta.cos() - 1.0);
        assert!(approx_eq!(Float, sh(2, 0, theta, 2.0), expected, epsilon = 1e-12));
    }

    #[test]
    fn basis_is_orthonormal() {
        let order = 3;
        let n = sh_coefficient_count(order);
        let (n_theta, n_phi) = (256, 512);
        let d_theta = PI / n_theta as Float;
        let d_phi = TWO_PI / n_phi as Float;

        let mut gram = vec![0.0; n * n];
        for i in 0..n_theta {
            let theta = (i as Float + 0.5) * d_theta;
            let weight = theta.sin() * d_theta * d_phi;
            for j in 0..n_phi {
                let phi = (j as Float + 0.5) * d_phi;
                let basis = sh_basis(order, theta, phi);
                for a in 0..n {
                    for b in 0..n {
                        gram[a * n + b] += basis[a] * basis[b] * weight;
                    }
                }
            }
        }

        for a in 0..n {
            for b in 0..n {
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!(
                    approx_eq!(Float, gram[a * n + b], expected, epsilon = 1e-3),
                    "<y{a}, y{b}> = {}",
                    gram[a * n + b]
                );
            }
        }
    }
}
