//! Slab Integrator

use cloud_core::error::*;
use cloud_core::math::*;
use cloud_core::sh::SHVector;
use cloud_core::table::TableLayout;
use itertools::iproduct;

/// Computes the light scattered towards a viewer inside a slab for one
/// scattering order.
pub trait SlabIntegrator: Send + Sync {
    /// Returns the scattering order computed.
    fn order(&self) -> usize;

    /// Returns the SH vector of one table cell.
    ///
    /// * `depth_index` - Length index; the slab length is
    ///                   `(1 + depth_index) * step_length`.
    /// * `thickness`   - Slab thickness.
    /// * `height`      - Viewer height.
    fn compute_cell(&self, depth_index: usize, thickness: Float, height: Float) -> Result<SHVector>;

    /// Computes every (thickness, height) cell of a depth slice and returns
    /// the coefficients nested thickness, height.
    ///
    /// * `layout`      - Table dimensions.
    /// * `depth_index` - Length index.
    fn compute_slice(&self, layout: &TableLayout, depth_index: usize) -> Result<Vec<Float>> {
        let n = layout.coefficient_count();
        let mut slice = Vec::with_capacity(layout.slice_cell_count() * n);
        for (t, h) in iproduct!(0..layout.size, 0..layout.size) {
            let thickness = layout.thickness(t);
            let height = layout.height(thickness, h);
            let v = self.compute_cell(depth_index, thickness, height)?;
            slice.extend_from_slice(v.as_slice());
        }
        Ok(slice)
    }
}
