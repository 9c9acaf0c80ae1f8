//! # parmap - ordered parallel map with progress
//!
//! Applies a function to every item of a sequence on a fixed-size pool of
//! worker threads, reports progress on the console while items complete, and
//! returns the results in input order.
//!
//! ## Features
//!
//! - **Checked calls**: the data argument and extra positional/keyword arguments
//!   are bound against the function's declared parameters before any work runs
//! - **Chunked dispatch**: chunk size scales with `sqrt(n) * workers / 2`
//! - **Fail fast**: the first argument mismatch or failure aborts the whole call
//! - **Layered configuration**: embedded defaults, config files and `PARMAP_` env vars
//!
//! ## Quick Start
//!
//! ```rust
//! use parmap::parallel::{BoundArgs, FnTask, ParallelMap};
//!
//! let square = FnTask::new(["x", "square"], |x: &i64, args: &BoundArgs| {
//!     let square: bool = args.get("square")?;
//!     Ok(if square { x * x } else { *x })
//! });
//!
//! let squared = ParallelMap::new(square)
//!     .data_arg("x")
//!     .kwarg("square", true)
//!     .progress(false)
//!     .run(vec![0, 1, 2, 3, 4])?;
//! assert_eq!(squared, vec![0, 1, 4, 9, 16]);
//! # Ok::<(), parmap::MapError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parallel;

pub use config::ParmapConfig;
pub use error::{ArgumentError, MapError};
pub use parallel::ParallelMap;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
