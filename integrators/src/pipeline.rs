//! Scattering Pipeline

use crate::{MultipleScattering, ProgressSink, ScatteringSetup, SingleScattering, SliceScheduler};
use cloud_core::error::*;
use cloud_core::table::{Accumulation, Table, TableStore};

/// Computes scattering orders one after another, each from the table of the
/// previous order, and persists them.
pub struct ScatteringPipeline {
    /// Shared precomputed data.
    setup: ScatteringSetup,

    /// Runs the jobs.
    scheduler: SliceScheduler,

    /// Persists the tables.
    store: TableStore,
}

impl ScatteringPipeline {
    /// Create a new `ScatteringPipeline`.
    ///
    /// * `setup`     - Shared precomputed data.
    /// * `scheduler` - Runs the jobs.
    /// * `store`     - Persists the tables; must use the setup's layout.
    pub fn new(setup: ScatteringSetup, scheduler: SliceScheduler, store: TableStore) -> Result<Self> {
        if store.layout() != setup.layout() {
            return Err(Error::InvalidLayout(
                "table store and scattering setup use different layouts".to_string(),
            ));
        }
        Ok(Self {
            setup,
            scheduler,
            store,
        })
    }

    /// Returns the shared precomputed data.
    pub fn setup(&self) -> &ScatteringSetup {
        &self.setup
    }

    /// Returns the table store.
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Computes the table of one scattering order. Order 1 is single
    /// scattering; higher orders need the table of the previous order.
    ///
    /// * `order`    - Scattering order.
    /// * `previous` - Table of order `order - 1`.
    /// * `sink`     - Receives progress events.
    pub fn compute_order(&self, order: usize, previous: Option<&Table>, sink: &dyn ProgressSink) -> Result<Table> {
        let layout = self.setup.layout();
        match order {
            0 => Err(Error::InvalidLayout("scattering orders start at 1".to_string())),
            1 => {
                let integrator = SingleScattering::new(&self.setup);
                self.scheduler.run(layout, &integrator, sink)
            }
            _ => {
                let previous = previous.ok_or(Error::MissingPreviousTable(order))?;
                let integrator = MultipleScattering::new(&self.setup, previous, order)?;
                self.scheduler.run(layout, &integrator, sink)
            }
        }
    }

    /// Computes and saves orders `first..=last`. When `first > 1` the table
    /// of order `first - 1` is loaded from the store. Returns the table of
    /// the last order computed.
    ///
    /// * `first` - First scattering order to compute.
    /// * `last`  - Last scattering order to compute.
    /// * `sink`  - Receives progress events.
    pub fn run(&self, first: usize, last: usize, sink: &dyn ProgressSink) -> Result<Option<Table>> {
        let mut previous = if first > 1 {
            info!("Resuming from {}", self.store.order_path(first - 1).display());
            Some(self.store.load_order(first - 1)?)
        } else {
            None
        };

        for order in first..=last {
            let table = self.compute_order(order, previous.as_ref(), sink)?;
            self.store.save_order(order, &table)?;
            info!("Saved {}", self.store.order_path(order).display());
            previous = Some(table);
        }
        Ok(previous)
    }

    /// Sums the saved multiple scattering orders `2..=last` and saves the
    /// result as the accumulated table. Single scattering is left out.
    ///
    /// * `last` - Last scattering order to include.
    pub fn accumulate(&self, last: usize) -> Result<Accumulation> {
        let acc = self.store.accumulate(2..=last)?;
        self.store.save_accumulated(&acc.table)?;
        info!(
            "Saved {} ({} orders)",
            self.store.accumulated_path().display(),
            acc.orders.len()
        );
        Ok(acc)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
