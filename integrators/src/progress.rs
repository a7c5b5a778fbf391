//! Progress Bars

use crate::{JobState, ProgressEvent, ProgressSink};
use cloud_core::progress::{create_order_progress_bar, create_progress_bar};
use indicatif::{MultiProgress, ProgressBar};
use std::sync::Mutex;

/// Shows an overall bar counting scattering orders and a bar counting the
/// depth slices of the order being computed.
pub struct ProgressBarSink {
    /// Container of both bars.
    multi: MultiProgress,

    /// Counts scattering orders.
    orders: ProgressBar,

    /// Counts depth slices of the current order.
    slices: Mutex<Option<ProgressBar>>,
}

impl ProgressBarSink {
    /// Create a new `ProgressBarSink`.
    ///
    /// * `n_orders` - Number of scattering orders that will be computed.
    pub fn new(n_orders: u64) -> Self {
        let multi = MultiProgress::new();
        let orders = multi.add(create_order_progress_bar(n_orders));
        Self {
            multi,
            orders,
            slices: Mutex::new(None),
        }
    }

    /// Completes the overall bar.
    pub fn finish(&self) {
        self.orders.finish_with_message("done");
    }
}

impl ProgressSink for ProgressBarSink {
    fn report(&self, event: &ProgressEvent) {
        let Ok(mut slices) = self.slices.lock() else {
            return;
        };

        match event {
            ProgressEvent::State {
                order,
                state: JobState::NotStarted,
                slices: total,
            } => {
                let bar = self.multi.add(create_progress_bar(*total as u64));
                bar.set_message(format!("Scattering order {order}"));
                self.orders.set_message(format!("computing order {order}"));
                *slices = Some(bar);
            }
            ProgressEvent::State {
                order,
                state: JobState::AllSlicesComputed,
                ..
            } => {
                if let Some(bar) = slices.take() {
                    bar.finish_with_message(format!("Scattering order {order} complete"));
                }
                self.orders.inc(1);
            }
            ProgressEvent::State {
                order,
                state: JobState::Aborted,
                ..
            } => {
                if let Some(bar) = slices.take() {
                    bar.abandon_with_message(format!("Scattering order {order} aborted"));
                }
                self.orders.abandon();
            }
            ProgressEvent::State { .. } => {}
            ProgressEvent::Slice(p) => {
                if let Some(bar) = slices.as_ref() {
                    bar.set_message(format!(
                        "Scattering order {} slice #{} worker {} ETA {}s",
                        p.order,
                        p.slice,
                        p.worker,
                        p.eta.as_secs()
                    ));
                    bar.inc(1);
                }
            }
        }
    }
}
