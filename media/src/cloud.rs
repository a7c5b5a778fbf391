//! Cloud Medium

use cloud_core::math::*;

/// A homogeneous cloud made of water droplets. Clouds have an albedo close
/// to 1 so the scattering coefficient equals the extinction coefficient.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CloudMedium {
    /// Number of droplets per m³.
    pub droplet_density: Float,

    /// Effective droplet radius in meters.
    pub effective_radius: Float,
}

impl Default for CloudMedium {
    /// Returns a typical cumulus: 300 droplets per cm³ with a 7µm radius.
    fn default() -> Self {
        Self {
            droplet_density: 300.0e6,
            effective_radius: 7.0e-6,
        }
    }
}

impl CloudMedium {
    /// Create a new `CloudMedium`.
    ///
    /// * `droplet_density`  - Number of droplets per m³.
    /// * `effective_radius` - Effective droplet radius in meters.
    pub fn new(droplet_density: Float, effective_radius: Float) -> Self {
        Self {
            droplet_density,
            effective_radius,
        }
    }

    /// Returns the extinction cross section of a droplet. The geometric cross
    /// section πr² is halved since the diffraction peak of the phase function
    /// is clipped and treated as unscattered light.
    pub fn extinction_cross_section(&self) -> Float {
        0.5 * PI * self.effective_radius * self.effective_radius
    }

    /// Returns the extinction coefficient `σt` in m⁻¹.
    pub fn extinction_coefficient(&self) -> Float {
        self.droplet_density * self.extinction_cross_section()
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
    fn default_extinction() {
        let cloud = CloudMedium::default();
        let sigma = cloud.extinction_coefficient();
        assert!(approx_eq!(Float, sigma, 0.023090706, epsilon = 1e-8));
    }

    #[test]
    fn extinction_scales_with_density_and_area() {
        let cloud = CloudMedium::new(1.0e6, 1.0e-5);
        let denser = CloudMedium::new(2.0e6, 1.0e-5);
        let larger = CloudMedium::new(1.0e6, 2.0e-5);
        let sigma = cloud.extinction_coefficient();
        assert!(approx_eq!(Float, denser.extinction_coefficient(), 2.0 * sigma, epsilon = 1e-15));
        assert!(approx_eq!(Float, larger.extinction_coefficient(), 4.0 * sigma, epsilon = 1e-15));
    }
}
