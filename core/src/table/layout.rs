//! Table Layout

use crate::error::*;
use crate::math::*;

/// Dimensions of a scattering table and the mapping between cell indices and
/// slab parameters. Tables carry no header so the same layout must be used to
/// write and read a file.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableLayout {
    /// Number of thickness bins and of height bins.
    pub size: usize,

    /// Number of length bins (depth slices).
    pub depth: usize,

    /// Number of SH bands stored per cell.
    pub sh_order: usize,

    /// Thickness of the first thickness bin in meters.
    pub min_thickness: Float,

    /// Thickness of the last thickness bin in meters.
    pub max_thickness: Float,

    /// Length of one depth slice in meters; also the ray marching step.
    pub step_length: Float,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            size: 128,
            depth: 32,
            sh_order: 3,
            min_thickness: 2.0,
            max_thickness: 400.0,
            step_length: 8.0,
        }
    }
}

impl TableLayout {
    /// Returns a reduced layout for quick test runs.
    pub fn quick() -> Self {
        Self {
            size: 32,
            depth: 8,
            ..Default::default()
        }
    }

    /// Checks that the layout describes a usable table.
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::InvalidLayout(format!("size {} < 2", self.size)));
        }
        if self.depth == 0 {
            return Err(Error::InvalidLayout("depth is 0".to_string()));
        }
        if self.sh_order == 0 {
            return Err(Error::InvalidLayout("SH order is 0".to_string()));
        }
        if !(self.min_thickness > 0.0 && self.min_thickness < self.max_thickness) {
            return Err(Error::InvalidLayout(format!(
                "thickness range [{}, {}]",
                self.min_thickness, self.max_thickness
            )));
        }
        if self.step_length <= 0.0 {
            return Err(Error::InvalidLayout(format!(
                "step length {}",
                self.step_length
            )));
        }
        Ok(())
    }

    /// Returns the number of SH coefficients per cell.
    pub fn coefficient_count(&self) -> usize {
        self.sh_order * self.sh_order
    }

    /// Returns the number of cells in one depth slice.
    pub fn slice_cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Returns the total number of cells.
    pub fn cell_count(&self) -> usize {
        self.size * self.size * self.depth
    }

    /// Returns the total number of coefficients.
    pub fn value_count(&self) -> usize {
        self.cell_count() * self.coefficient_count()
    }

    /// Returns the size in bytes of a table file.
    pub fn file_size(&self) -> u64 {
        (self.value_count() * std::mem::size_of::<f64>()) as u64
    }

    /// Returns the offset of cell (t, h, l) in a flat table; cells are nested
    /// thickness, then height, then length.
    ///
    /// * `t` - Thickness index.
    /// * `h` - Height index.
    /// * `l` - Length index.
    #[inline]
    pub fn cell_index(&self, t: usize, h: usize, l: usize) -> usize {
        debug_assert!(t < self.size && h < self.size && l < self.depth);
        (t * self.size + h) * self.depth + l
    }

    /// Returns the slab thickness of a thickness bin. Bins are spaced
    /// exponentially from `min_thickness` to `max_thickness`.
    ///
    /// * `t` - Thickness index.
    pub fn thickness(&self, t: usize) -> Float {
        let k = (self.min_thickness / self.max_thickness).ln();
        self.max_thickness * (k * (1.0 - t as Float / (self.size - 1) as Float)).exp()
    }

    /// Returns the viewer height of a height bin within a slab.
    ///
    /// * `thickness` - Slab thickness.
    /// * `h`         - Height index.
    pub fn height(&self, thickness: Float, h: usize) -> Float {
        thickness * h as Float / (self.size - 1) as Float
    }

    /// Returns the slab length of a length bin.
    ///
    /// * `l` - Length index.
    pub fn length(&self, l: usize) -> Float {
        (1 + l) as Float * self.step_length
    }

    /// Returns the thickness bin used when looking up a slab thickness.
    ///
    /// * `thickness` - Slab thickness.
    pub fn thickness_index(&self, thickness: Float) -> usize {
        let f = 1.0
            - (self.max_thickness / thickness).ln()
                / (self.max_thickness / self.min_thickness).ln();
        self.bin(self.size as Float * f)
    }

    /// Returns the height bin used when looking up a viewer height.
    ///
    /// * `thickness` - Slab thickness.
    /// * `height`    - Viewer height.
    pub fn height_index(&self, thickness: Float, height: Float) -> usize {
        self.bin(self.size as Float * height / thickness)
    }

    /// Returns the two length bins bracketing a slab length and the
    /// interpolation weight of the second one.
    ///
    /// * `length` - Slab length.
    pub fn depth_lookup(&self, length: Float) -> (usize, usize, Float) {
        let z = (length / self.step_length).max(0.0);
        let z0 = z.floor();
        let f = z - z0;
        let last = self.depth - 1;
        let z0 = if z0.is_finite() {
            (z0 as usize).min(last)
        } else {
            last
        };
        let z1 = (z0 + 1).min(last);
        (z0, z1, if f.is_finite() { f } else { 0.0 })
    }

    /// Floors and clamps a fractional bin to `[0, size - 1]`.
    fn bin(&self, x: Float) -> usize {
        if x.is_nan() || x < 0.0 {
            0
        } else {
            (x.floor() as usize).min(self.size - 1)
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
