//! Version command implementation

use crate::cli::Output;
use crate::parallel::calculate_optimal_workers;
use anyhow::Result;
use clap::Args;

#[derive(Args, Default)]
pub struct VersionArgs {}

/// Execute the version command
pub fn execute(_args: VersionArgs, output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    output.result(&format!("{name} {version}"));

    output.header("parmap Version Information");
    output.category("About");
    output.key_value("Description:", description, false);

    output.category("Build Information");
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
        false,
    );
    output.key_value("CPUs:", &num_cpus::get().to_string(), false);
    output.key_value(
        "Default workers:",
        &calculate_optimal_workers(0, 100).to_string(),
        true,
    );
    output.blank_line();
    Ok(())
}
