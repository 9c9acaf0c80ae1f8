use crate::cli::Output;
use crate::config::ParmapConfig;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration
    Show {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Check that the merged configuration is usable
    Validate,
}

pub fn execute(args: ConfigArgs, output: &Output, config_path: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            let config = ParmapConfig::load_with_custom_config(config_path)?;
            output.result(config.render(&format)?.trim_end());
            Ok(())
        }
        ConfigCommand::Validate => {
            let config = ParmapConfig::load_with_custom_config(config_path)
                .context("Invalid configuration")?;
            output.success("Configuration is valid");
            output.key_value("Max threads:", &config.parallel.max_threads.to_string(), false);
            output.key_value(
                "Thread percentage:",
                &format!("{}%", config.parallel.thread_percentage),
                false,
            );
            output.key_value(
                "Progress:",
                if config.progress.enabled { "enabled" } else { "disabled" },
                config.progress.enabled,
            );
            Ok(())
        }
    }
}
