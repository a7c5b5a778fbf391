//! Application related stuff

use crate::math::Float;
use crate::sh::DirectionSampler;
use crate::table::TableLayout;
use clap::Parser;
use std::path::PathBuf;

/// Command line options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Precomputes cloud multiple scattering tables.", long_about = None)]
pub struct Options {
    /// Number of threads to use for computing depth slices.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 4,
        help = "Use specified number of worker threads."
    )]
    n_threads: usize,

    /// Directory holding the table files.
    #[arg(
        long = "tables",
        short = 'd',
        value_name = "DIR",
        default_value = "Tables",
        help = "Directory to write and read the scattering tables."
    )]
    pub tables_dir: PathBuf,

    /// First scattering order to compute.
    #[arg(
        long = "first-order",
        value_name = "NUM",
        default_value_t = 1,
        help = "First scattering order to compute; earlier orders are loaded from disk."
    )]
    pub first_order: usize,

    /// Last scattering order to compute.
    #[arg(
        long = "last-order",
        value_name = "NUM",
        default_value_t = 30,
        help = "Last scattering order to compute."
    )]
    pub last_order: usize,

    /// Number of thickness and height bins.
    #[arg(long, value_name = "NUM", help = "Number of thickness and height bins.")]
    pub size: Option<usize>,

    /// Number of length bins.
    #[arg(long, value_name = "NUM", help = "Number of length bins (depth slices).")]
    pub depth: Option<usize>,

    /// Number of SH bands.
    #[arg(long = "sh-order", value_name = "NUM", help = "Number of SH bands per cell.")]
    pub sh_order: Option<usize>,

    /// Number of polar strata for sample directions.
    #[arg(
        long = "theta-samples",
        value_name = "NUM",
        default_value_t = DirectionSampler::DEFAULT_THETA_COUNT,
        help = "Number of polar strata; 2 * NUM² sample directions are used."
    )]
    pub theta_samples: usize,

    /// Use a reduced table layout.
    #[arg(
        long = "quick",
        help = "Automatically reduce the table resolution to compute more quickly."
    )]
    pub quick: bool,

    /// Suppress progress bars.
    #[arg(long, help = "Suppress progress bars.")]
    pub quiet: bool,

    /// Skip writing the accumulated table.
    #[arg(long = "no-accumulate", help = "Do not write the accumulated table.")]
    pub no_accumulate: bool,

    /// Only accumulate existing tables.
    #[arg(
        long = "accumulate-only",
        conflicts_with = "inspect",
        help = "Only sum existing per-order tables into the accumulated table."
    )]
    pub accumulate_only: bool,

    /// Print the cell nearest to a slab thickness and viewer height.
    #[arg(
        long = "inspect",
        num_args = 2,
        value_names = ["T", "H"],
        allow_negative_numbers = true,
        help = "Print the coefficients of every depth slice for the given thickness and height."
    )]
    pub inspect: Option<Vec<Float>>,

    /// Scattering order to inspect.
    #[arg(
        long = "order",
        value_name = "NUM",
        requires = "inspect",
        help = "Scattering order to inspect instead of the accumulated table."
    )]
    pub inspect_order: Option<usize>,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }

    /// Returns the table layout selected by `--quick` and the explicit
    /// dimension overrides.
    pub fn layout(&self) -> TableLayout {
        let mut layout = if self.quick {
            TableLayout::quick()
        } else {
            TableLayout::default()
        };
        if let Some(size) = self.size {
            layout.size = size;
        }
        if let Some(depth) = self.depth {
            layout.depth = depth;
        }
        if let Some(sh_order) = self.sh_order {
            layout.sh_order = sh_order;
        }
        layout
    }

    /// Returns the (thickness, height) pair given to `--inspect`.
    pub fn inspect_cell(&self) -> Option<(Float, Float)> {
        match self.inspect.as_deref() {
            Some([t, h]) => Some((*t, *h)),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn defaults() {
        let options = Options::parse_from(["cloud-precompute"]);
        assert_eq!(options.first_order, 1);
        assert_eq!(options.last_order, 30);
        assert_eq!(options.tables_dir, PathBuf::from("Tables"));
        assert_eq!(options.layout(), TableLayout::default());
        assert_eq!(options.theta_samples, 20);
        assert!(options.inspect_cell().is_none());
        assert!(options.threads() >= 1);
    }

    #[test]
    fn quick_with_overrides() {
        let options =
            Options::parse_from(["cloud-precompute", "--quick", "--depth", "4", "--sh-order", "2"]);
        let layout = options.layout();
        assert_eq!(layout.size, TableLayout::quick().size);
        assert_eq!(layout.depth, 4);
        assert_eq!(layout.sh_order, 2);
    }

    #[test]
    fn inspect_takes_two_values() {
        let options =
            Options::parse_from(["cloud-precompute", "--inspect", "100", "25.5", "--order", "3"]);
        assert_eq!(options.inspect_cell(), Some((100.0, 25.5)));
        assert_eq!(options.inspect_order, Some(3));

        assert!(Options::try_parse_from(["cloud-precompute", "--order", "3"]).is_err());
    }

    #[test]
    fn zero_threads_is_clamped() {
        let options = Options::parse_from(["cloud-precompute", "-t", "0"]);
        assert_eq!(options.threads(), 1);
    }

    #[test]
    fn quiet_only_hides_progress() {
        let options = Options::parse_from(["cloud-precompute", "--quiet"]);
        assert!(options.quiet);

        let command = Options::command();
        let quiet = command
            .get_arguments()
            .find(|arg| arg.get_id() == "quiet")
            .unwrap();
        assert_eq!(quiet.get_help().unwrap().to_string(), "Suppress progress bars.");
    }
}
