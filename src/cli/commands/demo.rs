//! Demo command: the squaring example run through the worker pool

use crate::cli::Output;
use crate::config::ParmapConfig;
use crate::parallel::{BoundArgs, FnTask, ParallelMap, Task};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct DemoArgs {
    /// Number of items to map (0..N)
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: u64,

    /// Return each number unchanged instead of squaring it
    #[arg(long)]
    pub identity: bool,

    /// Fixed number of workers (0 = derive from CPU count)
    #[arg(short = 'w', long, default_value_t = 0)]
    pub workers: usize,
}

/// `square(x, square)`: x squared when the flag is set, x otherwise
pub fn square_task() -> impl Task<Item = u64, Output = u64> {
    FnTask::new(["x", "square"], |x: &u64, args: &BoundArgs| {
        let square: bool = args.get("square")?;
        if square {
            x.checked_mul(*x)
                .with_context(|| format!("{x} squared overflows u64"))
        } else {
            Ok(*x)
        }
    })
}

pub fn execute(
    args: DemoArgs,
    output: &Output,
    config_path: Option<&str>,
    no_progress: bool,
) -> Result<()> {
    let mut config = ParmapConfig::load_with_custom_config(config_path)?;
    if no_progress || output.is_quiet() {
        config.progress.enabled = false;
    }

    let items: Vec<u64> = (0..args.count).collect();
    let outcome = ParallelMap::new(square_task())
        .config(&config)
        .data_arg("x")
        .kwarg("square", !args.identity)
        .workers(args.workers)
        .label(if args.identity { "Identity" } else { "Squaring" })
        .run_with_outcome(items)?;

    output.verbose(&format!(
        "{} workers, chunk size {}, {} chunks, {:.2?}",
        outcome.workers, outcome.chunk_size, outcome.chunks, outcome.elapsed
    ));
    output.result(&serde_json::to_string(&outcome.results)?);
    output.success(&format!("Mapped {} items", outcome.results.len()));
    Ok(())
}
