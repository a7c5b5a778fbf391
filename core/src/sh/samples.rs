//! Sample directions

use crate::geometry::Vector3f;
use crate::math::*;
use crate::rng::RNG;
use crate::sh::sh_basis;

/// A sample direction with the SH basis evaluated in that direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Unit direction.
    pub direction: Vector3f,

    /// The basis functions `y_i(direction)`, one per SH coefficient slot.
    pub sh_factors: Vec<Float>,
}

/// A fixed set of stratified sample directions over the sphere.
#[derive(Clone, Debug)]
pub struct DirectionSampler {
    /// Number of SH bands.
    sh_order: usize,

    /// Number of polar strata.
    theta_count: usize,

    /// All samples covering the sphere.
    full_samples: Vec<Sample>,

    /// Samples with a non-negative x component.
    forward_samples: Vec<Sample>,
}

impl DirectionSampler {
    /// Default number of polar strata.
    pub const DEFAULT_THETA_COUNT: usize = 20;

    /// Default RNG sequence.
    pub const DEFAULT_SEED: u64 = 1;

    /// Generates `2 * theta_count²` jittered samples, `theta_count` strata in
    /// cos θ and `2 * theta_count` strata in φ.
    ///
    /// * `sh_order`    - Number of SH bands.
    /// * `theta_count` - Number of polar strata.
    /// * `seed`        - RNG sequence index used for jittering.
    pub fn new(sh_order: usize, theta_count: usize, seed: u64) -> Self {
        let phi_count = 2 * theta_count;
        let mut rng = RNG::new(seed);

        let mut full_samples = Vec::with_capacity(theta_count * phi_count);
        for i in 0..theta_count {
            for j in 0..phi_count {
                let u = rng.uniform_float();
                let v = rng.uniform_float();

                let theta = 2.0 * acos((1.0 - (i as Float + u) / theta_count as Float).sqrt());
                let phi = TWO_PI * (j as Float + v) / phi_count as Float;

                full_samples.push(Sample {
                    direction: Vector3f::spherical_direction(theta, phi),
                    sh_factors: sh_basis(sh_order, theta, phi),
                });
            }
        }

        let forward_samples: Vec<Sample> = full_samples
            .iter()
            .filter(|s| s.direction.x >= 0.0)
            .cloned()
            .collect();

        debug!(
            "Generated {} samples ({} forward) for SH order {}",
            full_samples.len(),
            forward_samples.len(),
            sh_order
        );

        Self {
            sh_order,
            theta_count,
            full_samples,
            forward_samples,
        }
    }

    /// Returns the number of SH bands.
    pub fn sh_order(&self) -> usize {
        self.sh_order
    }

    /// Returns the number of polar strata.
    pub fn theta_count(&self) -> usize {
        self.theta_count
    }

    /// Returns the samples covering the whole sphere.
    pub fn full_samples(&self) -> &[Sample] {
        &self.full_samples
    }

    /// Returns the samples in the forward hemisphere (`direction.x >= 0`).
    pub fn forward_samples(&self) -> &[Sample] {
        &self.forward_samples
    }
}

impl Default for DirectionSampler {
    fn default() -> Self {
        Self::new(3, Self::DEFAULT_THETA_COUNT, Self::DEFAULT_SEED)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn default_sample_counts() {
        let sampler = DirectionSampler::default();
        assert_eq!(sampler.full_samples().len(), 800);

        let forward = sampler.forward_samples().len();
        assert!(forward > 300 && forward < 500, "forward = {forward}");
        assert!(sampler.forward_samples().iter().all(|s| s.direction.x >= 0.0));
    }

    #[test]
    fn samples_are_unit_with_full_basis() {
        let sampler = DirectionSampler::new(4, 8, 3);
        for s in sampler.full_samples() {
            assert!(approx_eq!(Float, s.direction.length(), 1.0, epsilon = 1e-12));
            assert_eq!(s.sh_factors.len(), 16);
        }
    }

    #[test]
    fn deterministic_for_seed() {
        let a = DirectionSampler::new(3, 6, 7);
        let b = DirectionSampler::new(3, 6, 7);
        assert_eq!(a.full_samples(), b.full_samples());

        let c = DirectionSampler::new(3, 6, 8);
        assert_ne!(a.full_samples(), c.full_samples());
    }

    #[test]
    fn monte_carlo_projection_of_constant() {
        // Projecting f = 1 onto the basis yields 2 sqrt(π) for y_0^0 and ~0
        // for every other slot.
        let sampler = DirectionSampler::default();
        let samples = sampler.full_samples();
        let weight = FOUR_PI / samples.len() as Float;

        let mut coeffs = vec![0.0; 9];
        for s in samples {
            for (c, y) in coeffs.iter_mut().zip(s.sh_factors.iter()) {
                *c += y * weight;
            }
        }

        assert!(approx_eq!(Float, coeffs[0], 2.0 * PI.sqrt(), epsilon = 1e-9));
        for c in coeffs.iter().skip(1) {
            assert!(c.abs() < 0.05, "coefficient {c}");
        }
    }
}
