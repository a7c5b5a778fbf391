#[macro_use]
extern crate log;

use clap::Parser;
use cloud_core::app::*;
use cloud_core::error::*;
use cloud_core::math::Float;
use cloud_core::table::*;
use integrators::*;
use media::CloudMedium;

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

fn main() {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(e) = run(&options) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let layout = options.layout();
    layout.validate()?;
    let store = TableStore::new(&options.tables_dir, layout);

    if let Some((thickness, height)) = options.inspect_cell() {
        return inspect(&store, thickness, height, options.inspect_order);
    }

    if options.accumulate_only {
        let acc = store.accumulate(2..=options.last_order)?;
        return store.save_accumulated(&acc.table);
    }

    if options.first_order == 0 || options.first_order > options.last_order {
        return Err(Error::InvalidLayout(format!(
            "invalid scattering order range {}..={}",
            options.first_order, options.last_order
        )));
    }

    let setup = ScatteringSetup::new(layout, &CloudMedium::default(), options.theta_samples)?;
    let pipeline = ScatteringPipeline::new(setup, SliceScheduler::new(options.threads()), store)?;

    if options.quiet {
        pipeline.run(options.first_order, options.last_order, &NullProgress)?;
    } else {
        let n_orders = (options.last_order - options.first_order + 1) as u64;
        let sink = ProgressBarSink::new(n_orders);
        pipeline.run(options.first_order, options.last_order, &sink)?;
        sink.finish();
    }

    if !options.no_accumulate {
        pipeline.accumulate(options.last_order)?;
    }
    Ok(())
}

/// Prints the coefficients of the cell nearest to a thickness and height for
/// every depth slice.
///
/// * `store`     - The table store.
/// * `thickness` - Slab thickness.
/// * `height`    - Viewer height.
/// * `order`     - Scattering order or `None` for the accumulated table.
fn inspect(store: &TableStore, thickness: Float, height: Float, order: Option<usize>) -> Result<()> {
    let (table, name) = match order {
        Some(order) => (store.load_order(order)?, format!("Scattering order {order}")),
        None => (store.load_accumulated()?, "Accumulated scattering".to_string()),
    };

    let layout = store.layout();
    let t = layout.thickness_index(thickness);
    let h = layout.height_index(thickness, height);
    let cell_thickness = layout.thickness(t);
    println!(
        "{name}: thickness {:.2}m (#{t}), height {:.2}m (#{h})",
        cell_thickness,
        layout.height(cell_thickness, h)
    );

    for l in 0..layout.depth {
        let coeffs: Vec<String> = table.get(t, h, l).iter().map(|c| format!("{c:+.6e}")).collect();
        println!("{:>8.1}m  {}", layout.length(l), coeffs.join(" "));
    }
    Ok(())
}
