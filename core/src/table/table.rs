//! Table

use super::TableLayout;
use crate::error::*;
use crate::math::*;
use crate::sh::SHVector;
use itertools::iproduct;
use std::ops::AddAssign;

/// A dense 3D table of SH vectors indexed by (thickness, height, length).
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// The dimensions.
    layout: TableLayout,

    /// Flat coefficients nested thickness, height, length, coefficient.
    data: Vec<Float>,
}

impl Table {
    /// Allocates a table with all coefficients set to 0.
    ///
    /// * `layout` - The dimensions.
    pub fn new(layout: TableLayout) -> Self {
        Self {
            layout,
            data: vec![0.0; layout.value_count()],
        }
    }

    /// Wraps flat coefficients.
    ///
    /// * `layout` - The dimensions.
    /// * `data`   - Coefficients nested thickness, height, length.
    pub fn from_data(layout: TableLayout, data: Vec<Float>) -> Result<Self> {
        if data.len() != layout.value_count() {
            return Err(Error::InvalidLayout(format!(
                "{} coefficients for a layout of {}",
                data.len(),
                layout.value_count()
            )));
        }
        Ok(Self { layout, data })
    }

    /// Returns the dimensions.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Returns all coefficients.
    pub fn data(&self) -> &[Float] {
        &self.data
    }

    /// Returns the coefficients of a cell.
    ///
    /// * `t` - Thickness index.
    /// * `h` - Height index.
    /// * `l` - Length index.
    pub fn get(&self, t: usize, h: usize, l: usize) -> &[Float] {
        let n = self.layout.coefficient_count();
        let i = self.layout.cell_index(t, h, l) * n;
        &self.data[i..i + n]
    }

    /// Returns a copy of the coefficients of a cell.
    ///
    /// * `t` - Thickness index.
    /// * `h` - Height index.
    /// * `l` - Length index.
    pub fn sh(&self, t: usize, h: usize, l: usize) -> SHVector {
        SHVector::from_coeffs(self.get(t, h, l).to_vec())
    }

    /// Stores the coefficients of a cell.
    ///
    /// * `t`      - Thickness index.
    /// * `h`      - Height index.
    /// * `l`      - Length index.
    /// * `coeffs` - The coefficients.
    pub fn set(&mut self, t: usize, h: usize, l: usize, coeffs: &[Float]) {
        let n = self.layout.coefficient_count();
        let i = self.layout.cell_index(t, h, l) * n;
        self.data[i..i + n].copy_from_slice(coeffs);
    }

    /// Stores a whole depth slice.
    ///
    /// * `l`     - Length index.
    /// * `slice` - Coefficients of every cell in the slice nested thickness,
    ///             height.
    pub fn set_slice(&mut self, l: usize, slice: &[Float]) {
        let n = self.layout.coefficient_count();
        debug_assert_eq!(slice.len(), self.layout.slice_cell_count() * n);
        let size = self.layout.size;
        for (t, h) in iproduct!(0..size, 0..size) {
            let cell = (t * size + h) * n;
            self.set(t, h, l, &slice[cell..cell + n]);
        }
    }

    /// Looks up the table for a slab. Thickness and height use the nearest
    /// bin; length is interpolated linearly between two depth slices. The
    /// coefficients are written into `out`.
    ///
    /// * `thickness` - Slab thickness.
    /// * `height`    - Viewer height.
    /// * `length`    - Slab length.
    /// * `out`       - Interpolated coefficients.
    pub fn lookup(&self, thickness: Float, height: Float, length: Float, out: &mut [Float]) {
        let t = self.layout.thickness_index(thickness);
        let h = self.layout.height_index(thickness, height);
        let (z0, z1, f) = self.layout.depth_lookup(length);

        let v0 = self.get(t, h, z0);
        let v1 = self.get(t, h, z1);
        for ((o, a), b) in out.iter_mut().zip(v0).zip(v1) {
            *o = lerp(f, *a, *b);
        }
    }
}

impl AddAssign<&Table> for Table {
    /// Adds another table with the same layout cell by cell.
    ///
    /// * `other` - The table to add.
    fn add_assign(&mut self, other: &Table) {
        debug_assert_eq!(self.layout, other.layout);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn small_layout() -> TableLayout {
        TableLayout {
            size: 4,
            depth: 3,
            sh_order: 2,
            ..Default::default()
        }
    }

    #[test]
    fn set_and_get() {
        let mut table = Table::new(small_layout());
        table.set(1, 2, 0, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.get(1, 2, 0), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.sh(1, 2, 0).coeffs, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.get(1, 2, 1), &[0.0; 4]);
    }

    #[test]
    fn from_data_checks_length() {
        let layout = small_layout();
        assert!(Table::from_data(layout, vec![0.0; 3]).is_err());
        assert!(Table::from_data(layout, vec![0.0; layout.value_count()]).is_ok());
    }

    #[test]
    fn set_slice_places_cells() {
        let layout = small_layout();
        let mut table = Table::new(layout);
        let slice: Vec<Float> = (0..layout.slice_cell_count() * 4)
            .map(|i| i as Float)
            .collect();
        table.set_slice(2, &slice);

        // Cell (t = 1, h = 3) is the 7th cell of the slice.
        assert_eq!(table.get(1, 3, 2), &[28.0, 29.0, 30.0, 31.0]);
        assert_eq!(table.get(1, 3, 1), &[0.0; 4]);
    }

    #[test]
    fn lookup_interpolates_length() {
        let layout = small_layout();
        let mut table = Table::new(layout);
        let thickness = layout.thickness(2);
        let height = layout.height(thickness, 1);
        table.set(2, 1, 0, &[1.0; 4]);
        table.set(2, 1, 1, &[3.0; 4]);

        let mut out = [0.0; 4];
        table.lookup(thickness, height, 0.25 * layout.step_length, &mut out);
        for v in out.iter() {
            assert!(approx_eq!(Float, *v, 1.5, epsilon = 1e-12));
        }
    }

    #[test]
    fn add_assign_sums_cells() {
        let layout = small_layout();
        let mut a = Table::new(layout);
        let mut b = Table::new(layout);
        a.set(0, 0, 0, &[1.0; 4]);
        b.set(0, 0, 0, &[2.0; 4]);
        b.set(3, 3, 2, &[5.0; 4]);
        a += &b;
        assert_eq!(a.get(0, 0, 0), &[3.0; 4]);
        assert_eq!(a.get(3, 3, 2), &[5.0; 4]);
    }
}
