//! Progress Reporting

use indicatif::{ProgressBar, ProgressStyle};

/// Template for progress bars tracking depth slices.
const SLICE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Template for the progress bar tracking scattering orders.
const ORDER_TEMPLATE: &str = "[{elapsed_precise}] [{bar:40.yellow/blue}] order {pos}/{len} {msg}";

/// Returns a styled progress bar.
///
/// * `len` - Total number of steps.
pub fn create_progress_bar(len: u64) -> ProgressBar {
    styled(ProgressBar::new(len), SLICE_TEMPLATE)
}

/// Returns a styled progress bar for counting scattering orders.
///
/// * `len` - Number of orders.
pub fn create_order_progress_bar(len: u64) -> ProgressBar {
    styled(ProgressBar::new(len), ORDER_TEMPLATE)
}

/// Applies a template to a progress bar.
///
/// * `bar`      - The progress bar.
/// * `template` - The template.
fn styled(bar: ProgressBar, template: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
