//! Multiple Scattering

use crate::{ScatteringSetup, SlabIntegrator};
use cloud_core::error::*;
use cloud_core::math::*;
use cloud_core::sh::SHVector;
use cloud_core::table::Table;
use media::{SecondarySlab, Slab};

/// Computes light scattered `order` times using the table of order
/// `order - 1` as the light arriving at each scattering point.
pub struct MultipleScattering<'a> {
    /// Shared precomputed data.
    setup: &'a ScatteringSetup,

    /// Table of the previous scattering order.
    previous: &'a Table,

    /// Scattering order computed.
    order: usize,
}

impl<'a> MultipleScattering<'a> {
    /// Create a new `MultipleScattering`.
    ///
    /// * `setup`    - Shared precomputed data.
    /// * `previous` - Table of the previous scattering order.
    /// * `order`    - Scattering order to compute; at least 2.
    pub fn new(setup: &'a ScatteringSetup, previous: &'a Table, order: usize) -> Result<Self> {
        if order < 2 {
            return Err(Error::InvalidLayout(format!(
                "multiple scattering starts at order 2, got {order}"
            )));
        }
        if previous.layout() != setup.layout() {
            return Err(Error::InvalidLayout(
                "previous table does not match the setup layout".to_string(),
            ));
        }
        Ok(Self {
            setup,
            previous,
            order,
        })
    }
}

impl<'a> SlabIntegrator for MultipleScattering<'a> {
    fn order(&self) -> usize {
        self.order
    }

    fn compute_cell(&self, depth_index: usize, thickness: Float, height: Float) -> Result<SHVector> {
        compute_multiple_scattering(self.setup, self.previous, depth_index, thickness, height)
    }
}

/// Marches through a slab like single scattering. At each step the light
/// arriving along every forward sample direction, and its opposite, is
/// looked up in the previous table for the secondary slab seen along that
/// direction, rotated into the slab's frame and accumulated.
///
/// * `setup`       - Shared precomputed data.
/// * `previous`    - Table of the previous scattering order.
/// * `depth_index` - Length index.
/// * `thickness`   - Slab thickness.
/// * `height`      - Viewer height.
pub fn compute_multiple_scattering(
    setup: &ScatteringSetup,
    previous: &Table,
    depth_index: usize,
    thickness: Float,
    height: Float,
) -> Result<SHVector> {
    let layout = setup.layout();
    let step = layout.step_length;
    let sigma = setup.extinction();
    let slab = Slab::new(layout.length(depth_index), thickness, height);

    let extinction = (-sigma * step).exp();
    let in_scattering = sigma * step;

    let weights = setup.forward_weights();
    let rotations = setup.rotations();

    let n = layout.coefficient_count();
    let mut fetched = vec![0.0; n];
    let mut rotated = vec![0.0; n];

    let mut v = SHVector::zero(n);
    let mut x = slab.length - 0.5 * step;
    for _ in 0..=depth_index {
        v *= extinction;

        for (i, weight) in weights.iter().enumerate() {
            let frame = rotations.frame(i);
            let [fwd, back, y0, y1, z0, z1] = frame.cardinal_directions();

            let hit_forward = slab.hit_distance(&fwd, x)?;
            let hit_backward = slab.hit_distance(&back, x)?;
            let secondary = SecondarySlab::from_hits(
                slab.hit_distance(&y0, x)?,
                slab.hit_distance(&y1, x)?,
                slab.hit_distance(&z0, x)?,
                slab.hit_distance(&z1, x)?,
            );

            let energy = in_scattering * weight;

            // Forward lobe.
            previous.lookup(secondary.thickness, secondary.height, hit_forward, &mut fetched);
            rotations.forward(i).rotate_into(&fetched, &mut rotated);
            v.add_scaled(energy, &rotated);

            // Backward lobe.
            previous.lookup(secondary.thickness, secondary.height, hit_backward, &mut fetched);
            rotations.mirror(i).rotate_into(&fetched, &mut rotated);
            v.add_scaled(energy, &rotated);
        }

        x -= step;
    }
    Ok(v)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SingleScattering;
    use cloud_core::table::TableLayout;
    use media::CloudMedium;

    fn setup() -> ScatteringSetup {
        let layout = TableLayout {
            size: 4,
            depth: 4,
            ..TableLayout::default()
        };
        ScatteringSetup::new(layout, &CloudMedium::default(), 5).unwrap()
    }

    fn single_table(setup: &ScatteringSetup) -> Table {
        let layout = *setup.layout();
        let integrator = SingleScattering::new(setup);
        let mut table = Table::new(layout);
        for l in 0..layout.depth {
            let slice = integrator.compute_slice(&layout, l).unwrap();
            table.set_slice(l, &slice);
        }
        table
    }

    #[test]
    fn zero_previous_gives_zero() {
        let setup = setup();
        let previous = Table::new(*setup.layout());
        let thickness = setup.layout().thickness(2);
        let v = compute_multiple_scattering(&setup, &previous, 3, thickness, 0.3 * thickness).unwrap();
        assert!(v.coeffs.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn second_order_is_positive() {
        let setup = setup();
        let single = single_table(&setup);
        let layout = *setup.layout();

        for l in 0..layout.depth {
            let thickness = layout.thickness(3);
            let height = layout.height(thickness, 2);
            let v = compute_multiple_scattering(&setup, &single, l, thickness, height).unwrap();
            assert!(!v.has_nans());
            assert!(v.dc() > 0.0);
        }
    }

    #[test]
    fn rejects_bad_order_and_layout() {
        let setup = setup();
        let previous = Table::new(*setup.layout());
        assert!(MultipleScattering::new(&setup, &previous, 1).is_err());

        let other = Table::new(TableLayout::quick());
        assert!(MultipleScattering::new(&setup, &other, 2).is_err());

        let integrator = MultipleScattering::new(&setup, &previous, 5).unwrap();
        assert_eq!(integrator.order(), 5);
    }
}
