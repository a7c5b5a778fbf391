//! Scattering Setup

use cloud_core::error::*;
use cloud_core::math::*;
use cloud_core::sh::{DirectionSampler, RotationCache};
use cloud_core::table::TableLayout;
use media::{CloudMedium, PhaseFunctionTable, FORWARD_CLIP_DEGREES};

/// Everything the scattering integrators need that does not depend on the
/// scattering order. Built once and shared read-only by all worker threads.
#[derive(Clone, Debug)]
pub struct ScatteringSetup {
    /// Table dimensions.
    layout: TableLayout,

    /// Extinction coefficient `σt` in m⁻¹.
    extinction: Float,

    /// Sample directions.
    sampler: DirectionSampler,

    /// Phase weights of the full sphere samples for single scattering.
    full_weights: Vec<Float>,

    /// Phase weights of the forward samples for multiple scattering.
    forward_weights: Vec<Float>,

    /// SH rotations of the forward samples.
    rotations: RotationCache,
}

impl ScatteringSetup {
    /// Builds the setup with the default phase function and sample seed.
    ///
    /// * `layout`      - Table dimensions.
    /// * `medium`      - The cloud.
    /// * `theta_count` - Number of polar strata of the sample directions.
    pub fn new(layout: TableLayout, medium: &CloudMedium, theta_count: usize) -> Result<Self> {
        let sampler = DirectionSampler::new(layout.sh_order, theta_count, DirectionSampler::DEFAULT_SEED);
        Self::with_phase(layout, medium, sampler, &PhaseFunctionTable::default())
    }

    /// Builds the setup from explicit components.
    ///
    /// * `layout`  - Table dimensions.
    /// * `medium`  - The cloud.
    /// * `sampler` - Sample directions; must use the layout's SH order.
    /// * `phase`   - The phase function.
    pub fn with_phase(
        layout: TableLayout,
        medium: &CloudMedium,
        sampler: DirectionSampler,
        phase: &PhaseFunctionTable,
    ) -> Result<Self> {
        layout.validate()?;
        if sampler.sh_order() != layout.sh_order {
            return Err(Error::InvalidLayout(format!(
                "samples use SH order {} but the layout stores {}",
                sampler.sh_order(),
                layout.sh_order
            )));
        }

        let full_weights = phase.normalize(sampler.full_samples(), 0.0, 1.0);
        let forward_weights = phase.normalize(sampler.forward_samples(), FORWARD_CLIP_DEGREES, 0.5);
        let rotations = RotationCache::new(sampler.forward_samples(), layout.sh_order);

        let extinction = medium.extinction_coefficient();
        info!(
            "Scattering setup: σ = {extinction} m⁻¹, {} samples ({} forward), SH order {}",
            sampler.full_samples().len(),
            sampler.forward_samples().len(),
            layout.sh_order
        );

        Ok(Self {
            layout,
            extinction,
            sampler,
            full_weights,
            forward_weights,
            rotations,
        })
    }

    /// Returns the table dimensions.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Returns the extinction coefficient `σt` in m⁻¹.
    pub fn extinction(&self) -> Float {
        self.extinction
    }

    /// Returns the sample directions.
    pub fn sampler(&self) -> &DirectionSampler {
        &self.sampler
    }

    /// Returns the phase weights paired with `sampler().full_samples()`.
    pub fn full_weights(&self) -> &[Float] {
        &self.full_weights
    }

    /// Returns the phase weights paired with `sampler().forward_samples()`.
    pub fn forward_weights(&self) -> &[Float] {
        &self.forward_weights
    }

    /// Returns the SH rotations paired with `sampler().forward_samples()`.
    pub fn rotations(&self) -> &RotationCache {
        &self.rotations
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
