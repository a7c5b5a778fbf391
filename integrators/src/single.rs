//! Single Scattering

use crate::{ScatteringSetup, SlabIntegrator};
use cloud_core::error::*;
use cloud_core::math::*;
use cloud_core::sh::SHVector;
use media::Slab;

/// Computes light scattered exactly once inside the slab.
///
/// Light is assumed to travel to the scattering point and back out, so
/// extinction is applied twice along every path.
pub struct SingleScattering<'a> {
    /// Shared precomputed data.
    setup: &'a ScatteringSetup,
}

impl<'a> SingleScattering<'a> {
    /// Create a new `SingleScattering`.
    ///
    /// * `setup` - Shared precomputed data.
    pub fn new(setup: &'a ScatteringSetup) -> Self {
        Self { setup }
    }
}

impl<'a> SlabIntegrator for SingleScattering<'a> {
    fn order(&self) -> usize {
        1
    }

    fn compute_cell(&self, depth_index: usize, thickness: Float, height: Float) -> Result<SHVector> {
        compute_single_scattering(self.setup, depth_index, thickness, height)
    }
}

/// Marches through a slab from its far end towards the viewer, attenuating
/// the light gathered so far and adding the light scattered at each step.
///
/// * `setup`       - Shared precomputed data.
/// * `depth_index` - Length index.
/// * `thickness`   - Slab thickness.
/// * `height`      - Viewer height.
pub fn compute_single_scattering(
    setup: &ScatteringSetup,
    depth_index: usize,
    thickness: Float,
    height: Float,
) -> Result<SHVector> {
    let layout = setup.layout();
    let step = layout.step_length;
    let sigma = setup.extinction();
    let slab = Slab::new(layout.length(depth_index), thickness, height);

    let extinction = (-2.0 * sigma * step).exp();
    let in_scattering = 2.0 * sigma * step;

    let samples = setup.sampler().full_samples();
    let weights = setup.full_weights();

    let mut v = SHVector::zero(layout.coefficient_count());
    let mut x = slab.length - 0.5 * step;
    for _ in 0..=depth_index {
        v *= extinction;

        for (sample, weight) in samples.iter().zip(weights) {
            let hit = slab.hit_distance(&sample.direction, x)?;
            let energy = in_scattering * weight * (-2.0 * sigma * hit).exp();
            v.add_scaled(energy, &sample.sh_factors);
        }

        x -= step;
    }
    Ok(v)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
