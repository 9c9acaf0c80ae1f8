use super::Output;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod config;
pub mod demo;
pub mod version;

#[derive(Parser)]
#[command(
    name = "parmap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ordered parallel map over a fixed-size worker pool",
    long_about = "parmap applies a function to every item of a sequence on a pool of worker \
                  threads, shows progress while items complete, and returns results in input order."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true, env = "PARMAP_CONFIG")]
    pub config: Option<String>,

    /// Do not draw a progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Square (or pass through) the numbers 0..N in parallel
    Demo(demo::DemoArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Set up logging based on verbosity
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Demo(args)) => {
                demo::execute(args, &output, self.config.as_deref(), self.no_progress)
            }
            Some(Commands::Config(args)) => config::execute(args, &output, self.config.as_deref()),
            Some(Commands::Version(args)) => version::execute(args, &output),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
