//! Table persistence

use super::{Table, TableLayout};
use crate::error::*;
use crate::sh::SHVector;
use itertools::iproduct;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// File name of the sum of all multiple scattering orders.
pub const ACCUMULATED_TABLE_NAME: &str = "AccumulatedScattering.sh";

/// Returns the file name of the table for a scattering order.
///
/// * `order` - Scattering order.
pub fn order_table_name(order: usize) -> String {
    format!("Scattering{order}.sh")
}

/// Writes the coefficients of a table cell by cell as little-endian 64-bit
/// floats.
///
/// * `table` - The table.
/// * `w`     - The writer.
pub fn write_table<W: Write>(table: &Table, w: &mut W) -> Result<()> {
    let layout = table.layout();
    for (t, h, l) in iproduct!(0..layout.size, 0..layout.size, 0..layout.depth) {
        table.sh(t, h, l).write(w)?;
    }
    Ok(())
}

/// Reads a table with the given layout.
///
/// * `layout` - The dimensions.
/// * `r`      - The reader.
pub fn read_table<R: Read>(layout: TableLayout, r: &mut R) -> Result<Table> {
    let n = layout.coefficient_count();
    let mut table = Table::new(layout);
    for (t, h, l) in iproduct!(0..layout.size, 0..layout.size, 0..layout.depth) {
        let cell = SHVector::read(n, r)?;
        table.set(t, h, l, cell.as_slice());
    }
    Ok(table)
}

/// Tables summed by `TableStore::accumulate()`.
#[derive(Clone, Debug)]
pub struct Accumulation {
    /// Sum of the tables that were found.
    pub table: Table,

    /// Scattering orders that were found and summed.
    pub orders: Vec<usize>,
}

/// Saves and loads tables in a directory.
#[derive(Clone, Debug)]
pub struct TableStore {
    /// Directory holding the table files.
    dir: PathBuf,

    /// Dimensions of every table in the directory.
    layout: TableLayout,
}

impl TableStore {
    /// Returns a store for the given directory.
    ///
    /// * `dir`    - Directory holding the table files.
    /// * `layout` - Dimensions of the tables.
    pub fn new<P: Into<PathBuf>>(dir: P, layout: TableLayout) -> Self {
        Self {
            dir: dir.into(),
            layout,
        }
    }

    /// Returns the directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the dimensions of the tables.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Returns the path of the table for a scattering order.
    ///
    /// * `order` - Scattering order.
    pub fn order_path(&self, order: usize) -> PathBuf {
        self.dir.join(order_table_name(order))
    }

    /// Returns the path of the accumulated table.
    pub fn accumulated_path(&self) -> PathBuf {
        self.dir.join(ACCUMULATED_TABLE_NAME)
    }

    /// Saves a table, creating parent directories as needed.
    ///
    /// * `table` - The table.
    /// * `path`  - Destination file.
    pub fn save(&self, table: &Table, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(path)?);
        write_table(table, &mut w)?;
        w.flush()?;
        debug!("Saved {}", path.display());
        Ok(())
    }

    /// Loads a table. The file size must match the layout exactly.
    ///
    /// * `path` - Source file.
    pub fn load(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)?;
        let actual = file.metadata()?.len();
        let expected = self.layout.file_size();
        if actual != expected {
            return Err(Error::TableSize {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        let table = read_table(self.layout, &mut BufReader::new(file))?;
        debug!("Loaded {}", path.display());
        Ok(table)
    }

    /// Saves the table of a scattering order.
    ///
    /// * `order` - Scattering order.
    /// * `table` - The table.
    pub fn save_order(&self, order: usize, table: &Table) -> Result<()> {
        self.save(table, &self.order_path(order))
    }

    /// Loads the table of a scattering order.
    ///
    /// * `order` - Scattering order.
    pub fn load_order(&self, order: usize) -> Result<Table> {
        self.load(&self.order_path(order))
    }

    /// Saves the accumulated table.
    ///
    /// * `table` - The table.
    pub fn save_accumulated(&self, table: &Table) -> Result<()> {
        self.save(table, &self.accumulated_path())
    }

    /// Loads the accumulated table.
    pub fn load_accumulated(&self) -> Result<Table> {
        self.load(&self.accumulated_path())
    }

    /// Sums the tables of the given orders. Stops at the first missing file
    /// and returns what was summed so far; other errors are returned.
    ///
    /// * `orders` - Scattering orders to sum.
    pub fn accumulate(&self, orders: RangeInclusive<usize>) -> Result<Accumulation> {
        let mut acc = Accumulation {
            table: Table::new(self.layout),
            orders: Vec::new(),
        };

        for order in orders {
            match self.load_order(order) {
                Ok(table) => {
                    acc.table += &table;
                    acc.orders.push(order);
                }
                Err(e) if e.is_not_found() => {
                    info!("Scattering order {order} not found; accumulation stops");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!("Accumulated {} scattering orders", acc.orders.len());
        Ok(acc)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
