//! Cloud Phase Function

use cloud_core::math::*;
use cloud_core::sh::Sample;

/// Number of entries in the source phase curve (0.1° resolution over 180°).
pub const PHASE_SOURCE_ENTRIES: usize = 1801;

/// Number of angular steps in a compiled phase profile.
pub const PHASE_PROFILE_SIZE: usize = 1024;

/// Clip angle in degrees removing the forward diffraction peak for multiple
/// scattering.
pub const FORWARD_CLIP_DEGREES: Float = 5.0;

/// Henyey-Greenstein lobes (weight, asymmetry) summed into the source curve:
/// a narrow diffraction peak, a broad forward lobe and a weak backscatter.
const MIE_LOBES: [(Float, Float); 3] = [(0.45, 0.995), (0.5, 0.8), (0.05, -0.4)];

/// Computes the Henyey-Greenstein phase function.
///
/// * `cos_theta` - Cosine of the angle between the outgoing and incident
///                 directions, both pointing away from the scattering point.
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * denom.sqrt())
}

/// Returns a cloud droplet phase curve tabulated over scattering angles
/// [0°, 180°] in 0.1° steps, 0° being the forward direction.
pub fn mie_phase_curve() -> Vec<Float> {
    (0..PHASE_SOURCE_ENTRIES)
        .map(|i| {
            let theta = PI * i as Float / (PHASE_SOURCE_ENTRIES - 1) as Float;
            // Scattering angle θ is between the propagation directions.
            let cos_theta = -theta.cos();
            MIE_LOBES
                .iter()
                .map(|(w, g)| w * phase_hg(cos_theta, *g))
                .sum()
        })
        .collect()
}

/// A phase curve clipped to an angular interval, stretched over [0, π] and
/// normalised such that `2π ∫ p(θ) dθ = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseProfile {
    /// Normalised factors at `i * π / len` for each index `i`.
    factors: Vec<Float>,
}

impl PhaseProfile {
    /// Compiles a phase profile from a source curve.
    ///
    /// * `source`      - Phase values over [0, π] at regular intervals.
    /// * `start_angle` - Source angle mapped to 0.
    /// * `end_angle`   - Source angle mapped to π.
    /// * `size`        - Number of entries in the compiled profile.
    pub fn new(source: &[Float], start_angle: Float, end_angle: Float, size: usize) -> Self {
        let len = source.len();
        let min_index = (len as Float * start_angle / PI) as usize;
        let max_index = (len as Float * end_angle / PI) as usize;
        let source_index =
            |i: usize| (min_index + (max_index - min_index) * i / size).min(len - 1);

        let integral: Float = (0..size).map(|i| source[source_index(i)]).sum::<Float>()
            * (PI / size as Float)
            * TWO_PI;

        let factors = (0..size).map(|i| source[source_index(i)] / integral).collect();
        Self { factors }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns true if the profile has no entries.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Returns `2π Σ p Δθ`, which is 1 for a freshly compiled profile.
    pub fn integral(&self) -> Float {
        self.factors.iter().sum::<Float>() * (PI / self.len() as Float) * TWO_PI
    }

    /// Returns the linearly interpolated factor for an angle. Angles outside
    /// [0, π] are clamped.
    ///
    /// * `angle` - Scattering angle in radians.
    pub fn factor(&self, angle: Float) -> Float {
        let last = self.factors.len() - 1;
        let x = clamp(angle, 0.0, PI) * self.factors.len() as Float / PI;
        let i0 = (x.floor() as usize).min(last);
        let i1 = (i0 + 1).min(last);
        let t = x - i0 as Float;
        lerp(t, self.factors[i0], self.factors[i1])
    }
}

/// Produces per-sample phase weights from a tabulated phase curve.
#[derive(Clone, Debug)]
pub struct PhaseFunctionTable {
    /// Source phase curve over [0, π].
    source: Vec<Float>,
}

impl Default for PhaseFunctionTable {
    fn default() -> Self {
        Self::new(mie_phase_curve())
    }
}

impl PhaseFunctionTable {
    /// Create a new `PhaseFunctionTable`.
    ///
    /// * `source` - Phase values over [0, π] at regular intervals.
    pub fn new(source: Vec<Float>) -> Self {
        assert!(source.len() >= 2, "phase curve needs at least 2 entries");
        Self { source }
    }

    /// Returns the source curve.
    pub fn source(&self) -> &[Float] {
        &self.source
    }

    /// Compiles the profile with the forward peak clipped.
    ///
    /// * `clip_angle_degrees` - Clip angle in degrees.
    pub fn profile(&self, clip_angle_degrees: Float) -> PhaseProfile {
        PhaseProfile::new(
            &self.source,
            radians(clip_angle_degrees),
            PI,
            PHASE_PROFILE_SIZE,
        )
    }

    /// Returns one weight per sample such that `Σ weight * sin(angle)`
    /// equals `target`, the angle of a sample being `acos(-direction.x)`.
    ///
    /// * `samples`            - The samples.
    /// * `clip_angle_degrees` - Clip angle in degrees.
    /// * `target`             - Value of the normalised discrete integral.
    pub fn normalize(&self, samples: &[Sample], clip_angle_degrees: Float, target: Float) -> Vec<Float> {
        let profile = self.profile(clip_angle_degrees);
        let mut weights: Vec<Float> = samples
            .iter()
            .map(|s| profile.factor(sample_angle(s)))
            .collect();

        let integral = phase_integral(samples, &weights);
        let scale = if integral > 0.0 { target / integral } else { 0.0 };
        for w in weights.iter_mut() {
            *w *= scale;
        }

        debug!(
            "Phase weights for {} samples (clip {}°): raw integral {}, scale {}",
            samples.len(),
            clip_angle_degrees,
            integral,
            scale
        );
        weights
    }
}

/// Returns the scattering angle of a sample relative to the slab axis.
///
/// * `sample` - The sample.
#[inline]
pub fn sample_angle(sample: &Sample) -> Float {
    acos(-sample.direction.x)
}

/// Returns `Σ weight * sin(angle)` over paired samples and weights.
///
/// * `samples` - The samples.
/// * `weights` - One weight per sample.
pub fn phase_integral(samples: &[Sample], weights: &[Float]) -> Float {
    samples
        .iter()
        .zip(weights)
        .map(|(s, w)| w * sample_angle(s).sin())
        .sum()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_core::sh::DirectionSampler;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn hg_is_normalized() {
        for g in [-0.5, 0.0, 0.3, 0.8] {
            let n = 20000;
            let d_theta = PI / n as Float;
            let integral: Float = (0..n)
                .map(|i| {
                    let theta = (i as Float + 0.5) * d_theta;
                    phase_hg(theta.cos(), g) * theta.sin() * d_theta * TWO_PI
                })
                .sum();
            assert!(approx_eq!(Float, integral, 1.0, epsilon = 1e-4), "g = {g}");
        }
    }

    #[test]
    fn curve_is_forward_peaked() {
        let curve = mie_phase_curve();
        assert_eq!(curve.len(), PHASE_SOURCE_ENTRIES);
        assert!(curve[0] > 100.0 * curve[900]);
        assert!(curve[900] < curve[1800]);
        assert!(curve.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn profile_integrates_to_one() {
        let table = PhaseFunctionTable::default();
        for clip in [0.0, FORWARD_CLIP_DEGREES, 20.0] {
            let profile = table.profile(clip);
            assert_eq!(profile.len(), PHASE_PROFILE_SIZE);
            assert!(approx_eq!(Float, profile.integral(), 1.0, epsilon = 1e-9));
        }
    }

    #[test]
    fn clipping_removes_peak() {
        let table = PhaseFunctionTable::default();
        let full = table.profile(0.0);
        let clipped = table.profile(FORWARD_CLIP_DEGREES);
        assert!(full.factor(0.0) / full.factor(PI) > clipped.factor(0.0) / clipped.factor(PI));
    }

    #[test]
    fn factor_interpolates_and_clamps() {
        let profile = PhaseProfile::new(&[1.0, 3.0], 0.0, PI, 2);
        // Factors are [1, 3] / (4 * π/2 * 2π).
        let k = 1.0 / (4.0 * PI * PI);
        assert!(approx_eq!(Float, profile.factor(0.0), k, epsilon = 1e-12));
        assert!(approx_eq!(Float, profile.factor(PI / 4.0), 2.0 * k, epsilon = 1e-12));
        assert!(approx_eq!(Float, profile.factor(PI), 3.0 * k, epsilon = 1e-12));
        assert_eq!(profile.factor(-1.0), profile.factor(0.0));
        assert_eq!(profile.factor(10.0), profile.factor(PI));
    }

    #[test]
    fn sample_weights_normalize() {
        let sampler = DirectionSampler::default();
        let table = PhaseFunctionTable::default();

        let full = table.normalize(sampler.full_samples(), 0.0, 1.0);
        assert_eq!(full.len(), sampler.full_samples().len());
        let integral = phase_integral(sampler.full_samples(), &full);
        assert!(approx_eq!(Float, integral, 1.0, epsilon = 1e-3));

        let forward = table.normalize(sampler.forward_samples(), FORWARD_CLIP_DEGREES, 0.5);
        let integral = phase_integral(sampler.forward_samples(), &forward);
        assert!(approx_eq!(Float, integral, 0.5, epsilon = 1e-3));

        assert!(full.iter().chain(forward.iter()).all(|w| *w >= 0.0));
    }

    proptest! {
        #[test]
        fn factor_is_bounded_by_neighbours(angle in 0.0..PI) {
            let profile = PhaseFunctionTable::default().profile(FORWARD_CLIP_DEGREES);
            let x = angle * profile.len() as Float / PI;
            let i0 = (x.floor() as usize).min(profile.len() - 1);
            let i1 = (i0 + 1).min(profile.len() - 1);
            let a = profile.factors[i0];
            let b = profile.factors[i1];
            let f = profile.factor(angle);
            prop_assert!(f >= a.min(b) - 1e-15 && f <= a.max(b) + 1e-15);
        }
    }
}
