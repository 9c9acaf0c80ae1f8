//! Ordered parallel map over a fixed-size worker pool
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Argument Binding**: Checks the data argument and extra arguments against the
//!   function's declared parameters before anything runs
//! - **Partitioning**: Splits the input into contiguous chunks sized by `sqrt(n) * workers / 2`
//! - **Execution**: Feeds chunks to scoped worker threads over crossbeam channels and
//!   reassembles results in input order
//! - **Progress**: Reports completed items on the console while the pool works
//!
//! ## What This Module Does NOT Do:
//! - **Cancellation or Timeouts**: A call blocks until every chunk has finished or one fails
//! - **Partial Results**: Any failure aborts the whole call
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    ┌─────────────┐
//! │  items      │───▶│  chunking    │───▶│  workers     │───▶│  collector  │
//! │  + Args     │    │  (ordered    │    │  (Task::call │    │  (sort by   │
//! │  bind()     │    │   ranges)    │    │   per item)  │    │   chunk)    │
//! └─────────────┘    └──────────────┘    └──────────────┘    └─────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use parmap::parallel::{BoundArgs, FnTask, ParallelMap};
//!
//! let scale = FnTask::new(["factor", "x"], |x: &u32, args: &BoundArgs| {
//!     Ok(x * args.get::<u32>("factor")?)
//! });
//!
//! let results = ParallelMap::new(scale)
//!     .data_arg("x")
//!     .arg(10)
//!     .progress(false)
//!     .run(vec![1, 2, 3])
//!     .unwrap();
//! assert_eq!(results, vec![10, 20, 30]);
//! ```

pub mod chunking;
pub mod core;
pub mod progress;
pub mod signature;
pub mod task;

// Re-export main types for easier access
pub use self::core::{MapOutcome, ParallelMap, calculate_optimal_workers};
pub use progress::ProgressReporter;
pub use signature::{Args, BoundArgs, Signature};
pub use task::{FnTask, Task};
