use super::chunking::{chunk_ranges, chunk_size};
use super::progress::ProgressReporter;
use super::signature::{Args, BoundArgs, to_value};
use super::task::Task;
use crate::config::ParmapConfig;
use crate::error::MapError;
use crossbeam::channel::{Receiver, Sender, bounded};
use serde::Serialize;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Result of a completed map call together with how it was executed
#[derive(Debug)]
pub struct MapOutcome<R> {
    pub results: Vec<R>,
    pub workers: usize,
    pub chunk_size: usize,
    pub chunks: usize,
    pub elapsed: Duration,
}

/// A chunk handed to a worker: its position and the item range it covers
type ChunkJob = (usize, Range<usize>);

/// What a worker sends back for one chunk
type ChunkResult<R> = (usize, Result<Vec<R>, MapError>);

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<'a, K: Task> {
    worker_id: usize,
    items: &'a [K::Item],
    task: &'a K,
    args: &'a BoundArgs,
    work_rx: Receiver<ChunkJob>,
    result_tx: Sender<ChunkResult<K::Output>>,
    abort: Arc<AtomicBool>,
    progress: ProgressReporter,
}

/// Ordered parallel map of a [`Task`] over a fixed-size worker pool
///
/// ```rust
/// use parmap::parallel::{BoundArgs, FnTask, ParallelMap};
///
/// let square = FnTask::new(["x", "square"], |x: &i64, args: &BoundArgs| {
///     let square: bool = args.get("square")?;
///     Ok(if square { x * x } else { *x })
/// });
///
/// let results = ParallelMap::new(square)
///     .data_arg("x")
///     .kwarg("square", true)
///     .progress(false)
///     .run(vec![0, 1, 2, 3, 4])
///     .unwrap();
/// assert_eq!(results, vec![0, 1, 4, 9, 16]);
/// ```
pub struct ParallelMap<K: Task> {
    task: K,
    data_arg: Option<String>,
    args: Args,
    pending_error: Option<MapError>,
    workers: usize,
    max_threads: usize,
    thread_percentage: u8,
    channel_buffer_multiplier: usize,
    show_progress: bool,
    tick: Duration,
    label: String,
}

impl<K: Task> ParallelMap<K> {
    pub fn new(task: K) -> Self {
        let defaults = ParmapConfig::default();
        Self {
            task,
            data_arg: None,
            args: Args::new(),
            pending_error: None,
            workers: 0,
            max_threads: defaults.parallel.max_threads,
            thread_percentage: defaults.parallel.thread_percentage,
            channel_buffer_multiplier: defaults.parallel.channel_buffer_multiplier,
            show_progress: defaults.progress.enabled,
            tick: Duration::from_millis(defaults.progress.tick_ms),
            label: "Mapping".to_string(),
        }
    }

    /// Apply pool sizing and progress settings from a loaded configuration
    pub fn config(mut self, config: &ParmapConfig) -> Self {
        self.max_threads = config.parallel.max_threads;
        self.thread_percentage = config.parallel.thread_percentage;
        self.channel_buffer_multiplier = config.parallel.channel_buffer_multiplier;
        self.show_progress = config.progress.enabled;
        self.tick = Duration::from_millis(config.progress.tick_ms);
        self
    }

    /// Name of the parameter that receives each item
    ///
    /// Defaults to the first declared parameter.
    pub fn data_arg(mut self, name: impl Into<String>) -> Self {
        self.data_arg = Some(name.into());
        self
    }

    /// Append an extra positional argument
    pub fn arg<V: Serialize>(mut self, value: V) -> Self {
        match to_value(value) {
            Ok(v) => self.args.push(v),
            Err(e) => self.remember(e),
        }
        self
    }

    /// Add an extra keyword argument
    pub fn kwarg<V: Serialize>(mut self, name: impl Into<String>, value: V) -> Self {
        match to_value(value) {
            Ok(v) => self.args.insert(name, v),
            Err(e) => self.remember(e),
        }
        self
    }

    /// Replace the extra arguments wholesale
    pub fn args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Fixed worker count; 0 derives it from the CPU count and configuration
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    fn remember(&mut self, err: MapError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(err);
        }
    }

    pub fn run(self, items: Vec<K::Item>) -> Result<Vec<K::Output>, MapError> {
        self.run_with_outcome(items).map(|outcome| outcome.results)
    }

    pub fn run_with_outcome(
        mut self,
        items: Vec<K::Item>,
    ) -> Result<MapOutcome<K::Output>, MapError> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        if items.len() < 2 {
            return Err(MapError::InsufficientItems { len: items.len() });
        }

        let data_arg = match self.data_arg.take() {
            Some(name) => name,
            None => self
                .task
                .signature()
                .params()
                .first()
                .cloned()
                .unwrap_or_default(),
        };
        let bound = self.args.bind(self.task.signature(), &data_arg)?;

        let started = Instant::now();
        let item_count = items.len();
        let max_workers = if self.workers > 0 {
            self.workers
        } else {
            calculate_optimal_workers(self.max_threads, self.thread_percentage)
        };
        let size = chunk_size(item_count, max_workers);
        let ranges = chunk_ranges(item_count, size);
        let chunks = ranges.len();
        let workers = max_workers.min(chunks).max(1);

        debug!(
            "Mapping {} items over {} workers in {} chunks of up to {} (data argument '{}')",
            item_count, workers, chunks, size, data_arg
        );

        let progress = ProgressReporter::new(
            &self.label,
            item_count,
            workers,
            self.show_progress,
            self.tick,
        );

        match self.execute(&items, &bound, ranges, workers, &progress) {
            Ok(results) => {
                progress.finish();
                let elapsed = started.elapsed();
                info!(
                    "Mapped {} items in {:.2?} ({} workers, chunk size {})",
                    item_count, elapsed, workers, size
                );
                Ok(MapOutcome {
                    results,
                    workers,
                    chunk_size: size,
                    chunks,
                    elapsed,
                })
            }
            Err(err) => {
                error!("Parallel map aborted: {:#}", err);
                progress.abandon(&err.to_string());
                Err(err)
            }
        }
    }

    /// Producer-consumer execution over chunk ranges
    fn execute(
        &self,
        items: &[K::Item],
        args: &BoundArgs,
        ranges: Vec<Range<usize>>,
        workers: usize,
        progress: &ProgressReporter,
    ) -> Result<Vec<K::Output>, MapError> {
        let chunk_count = ranges.len();
        // The queue never holds more than every chunk at once
        let buffer = workers
            .saturating_mul(self.channel_buffer_multiplier.max(1))
            .clamp(1, chunk_count.max(1));
        let (work_tx, work_rx): (Sender<ChunkJob>, Receiver<ChunkJob>) = bounded(buffer);
        let (result_tx, result_rx) = bounded::<ChunkResult<K::Output>>(buffer);
        let abort = Arc::new(AtomicBool::new(false));

        // Use crossbeam::thread::scope for safe borrowing
        let collected = crossbeam::thread::scope(|s| {
            for worker_id in 0..workers {
                let ctx = WorkerContext {
                    worker_id,
                    items,
                    task: &self.task,
                    args,
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    abort: abort.clone(),
                    progress: progress.clone(),
                };
                s.spawn(move |_| worker_thread(ctx));
            }

            // Producer thread: send chunks to workers
            let producer_abort = abort.clone();
            s.spawn(move |_| {
                for job in ranges.into_iter().enumerate() {
                    if producer_abort.load(Ordering::Relaxed) || work_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            // Drop the collector's handles so the channels close when workers finish
            drop(work_rx);
            drop(result_tx);

            collect_results(result_rx, chunk_count, &abort)
        })
        .map_err(|_| MapError::WorkerPanic)?;

        let mut chunks = collected?;
        if chunks.len() != chunk_count {
            return Err(MapError::WorkerPanic);
        }
        chunks.sort_by_key(|(index, _)| *index);

        let mut results = Vec::with_capacity(items.len());
        for (_, chunk) in chunks {
            results.extend(chunk);
        }
        Ok(results)
    }
}

fn worker_thread<K: Task>(ctx: WorkerContext<'_, K>) {
    while let Ok((chunk_index, range)) = ctx.work_rx.recv() {
        // Keep draining after an abort so the producer never blocks
        if ctx.abort.load(Ordering::Relaxed) {
            continue;
        }

        let len = range.len();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut out = Vec::with_capacity(len);
            for index in range {
                match ctx.task.call(&ctx.items[index], ctx.args) {
                    Ok(value) => out.push(value),
                    Err(err) => return Err(MapError::from_task(index, err)),
                }
            }
            Ok(out)
        }))
        .unwrap_or(Err(MapError::WorkerPanic));

        match outcome {
            Ok(_) => ctx.progress.advance(len),
            Err(_) => {
                debug!("Worker {} failed on chunk {}", ctx.worker_id, chunk_index);
                ctx.abort.store(true, Ordering::Relaxed);
            }
        }

        if ctx.result_tx.send((chunk_index, outcome)).is_err() {
            break; // Collector dropped
        }
    }
}

/// Gather chunk results until every worker has hung up
///
/// On failure the error with the lowest item index wins so the reported
/// error does not depend on scheduling.
fn collect_results<R>(
    result_rx: Receiver<ChunkResult<R>>,
    chunk_count: usize,
    abort: &AtomicBool,
) -> Result<Vec<(usize, Vec<R>)>, MapError> {
    let mut chunks = Vec::with_capacity(chunk_count);
    let mut first_error: Option<MapError> = None;

    while let Ok((chunk_index, message)) = result_rx.recv() {
        match message {
            Ok(values) => chunks.push((chunk_index, values)),
            Err(err) => {
                abort.store(true, Ordering::Relaxed);
                let replace = match (&first_error, err.item_index()) {
                    (None, _) => true,
                    (Some(current), Some(index)) => current.item_index().is_some_and(|c| index < c),
                    (Some(_), None) => false,
                };
                if replace {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(chunks),
    }
}

/// Worker count from available cores and configuration limits
///
/// ```text
/// 1. cores = num_cpus::get()
/// 2. by_percentage = max(1, cores * thread_percentage / 100)
/// 3. min(max_threads, by_percentage) when max_threads > 0
/// ```
pub fn calculate_optimal_workers(max_threads: usize, thread_percentage: u8) -> usize {
    let available_cores = num_cpus::get();
    let by_percentage = std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

    if max_threads > 0 {
        std::cmp::min(max_threads, by_percentage)
    } else {
        by_percentage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::FnTask;
    use anyhow::bail;
    use std::sync::atomic::AtomicUsize;

    fn square_task() -> impl Task<Item = i64, Output = i64> {
        FnTask::new(["x", "square"], |x: &i64, args: &BoundArgs| {
            let square: bool = args.get("square")?;
            Ok(if square { x * x } else { *x })
        })
    }

    #[test]
    fn test_squares_when_flag_set() {
        let results = ParallelMap::new(square_task())
            .data_arg("x")
            .kwarg("square", true)
            .progress(false)
            .run(vec![0, 1, 2, 3, 4])
            .unwrap();
        assert_eq!(results, vec![0, 1, 4, 9, 16]);
    }

    #[test]
    fn test_identity_when_flag_cleared() {
        let results = ParallelMap::new(square_task())
            .data_arg("x")
            .arg(false)
            .progress(false)
            .run(vec![0, 1, 2, 3, 4])
            .unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_order_preserved_with_many_workers() {
        let items: Vec<i64> = (0..1_000).collect();
        let outcome = ParallelMap::new(square_task())
            .kwarg("square", false)
            .workers(8)
            .progress(false)
            .run_with_outcome(items.clone())
            .unwrap();

        assert_eq!(outcome.results, items);
        assert!(outcome.workers <= 8);
        // sqrt(1000) * 8 / 2 ~= 126
        assert_eq!(outcome.chunk_size, 126);
        assert_eq!(outcome.chunks, 8);
    }

    #[test]
    fn test_uneven_durations_keep_order() {
        let task = FnTask::new(["x"], |x: &u64, _: &BoundArgs| {
            std::thread::sleep(Duration::from_millis(10 - x % 10));
            Ok(x * 3)
        });
        let results = ParallelMap::new(task)
            .workers(4)
            .progress(false)
            .run((0..40).collect())
            .unwrap();
        assert_eq!(results, (0..40).map(|x| x * 3).collect::<Vec<_>>());
    }

    #[test]
    fn test_rejects_short_input() {
        for items in [vec![], vec![1]] {
            let err = ParallelMap::new(square_task())
                .kwarg("square", true)
                .progress(false)
                .run(items)
                .unwrap_err();
            assert!(matches!(err, MapError::InsufficientItems { .. }));
        }
    }

    #[test]
    fn test_unknown_data_argument_dispatches_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let task = FnTask::new(["x", "square"], move |x: &i64, _: &BoundArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(*x)
        });

        let err = ParallelMap::new(task)
            .data_arg("value")
            .kwarg("square", true)
            .progress(false)
            .run(vec![1, 2, 3])
            .unwrap_err();

        assert!(matches!(err, MapError::UnknownDataArgument { .. }));
        assert!(err.is_precondition());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let err = ParallelMap::new(square_task())
            .data_arg("x")
            .progress(false)
            .run(vec![1, 2, 3])
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::ArityMismatch {
                expected: 2,
                supplied: 1
            }
        ));
    }

    #[test]
    fn test_wrong_argument_type_is_mismatch() {
        let err = ParallelMap::new(square_task())
            .kwarg("square", "yes")
            .workers(2)
            .progress(false)
            .run(vec![1, 2, 3, 4])
            .unwrap_err();
        assert!(matches!(err, MapError::ArgumentMismatch { .. }));
    }

    #[test]
    fn test_failure_carries_item_index() {
        let task = FnTask::new(["x"], |x: &i32, _: &BoundArgs| {
            if *x == 150 {
                bail!("cannot map {x}");
            }
            Ok(*x)
        });

        let err = ParallelMap::new(task)
            .workers(4)
            .progress(false)
            .run((0..200).collect())
            .unwrap_err();

        match err {
            MapError::Failure { index, ref source } => {
                assert_eq!(index, 150);
                assert!(source.to_string().contains("cannot map 150"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_collector_keeps_lowest_failing_index() {
        let (tx, rx) = bounded::<ChunkResult<i32>>(4);
        let abort = AtomicBool::new(false);
        tx.send((0, Ok(vec![1, 2]))).unwrap();
        tx.send((3, Err(MapError::Failure {
            index: 40,
            source: anyhow::anyhow!("late"),
        })))
        .unwrap();
        tx.send((1, Err(MapError::Failure {
            index: 12,
            source: anyhow::anyhow!("early"),
        })))
        .unwrap();
        drop(tx);

        let err = collect_results(rx, 4, &abort).unwrap_err();
        assert_eq!(err.item_index(), Some(12));
        assert!(abort.load(Ordering::Relaxed));
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let task = FnTask::new(["x"], |x: &i32, _: &BoundArgs| {
            if *x == 5 {
                panic!("boom");
            }
            Ok(*x)
        });
        let err = ParallelMap::new(task)
            .workers(2)
            .progress(false)
            .run((0..10).collect())
            .unwrap_err();
        assert!(matches!(err, MapError::WorkerPanic));
    }

    #[test]
    fn test_panic_stops_remaining_chunks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let task = FnTask::new(["x"], move |x: &u32, _: &BoundArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            if *x == 0 {
                panic!("boom");
            }
            std::thread::sleep(Duration::from_millis(2));
            Ok(*x)
        });

        // sqrt(400) * 2 / 2 = 20 items per chunk, 20 chunks
        let err = ParallelMap::new(task)
            .workers(2)
            .progress(false)
            .run((0..400).collect())
            .unwrap_err();

        assert!(matches!(err, MapError::WorkerPanic));
        // Only the chunk already in flight on the other worker may finish
        assert!(calls.load(Ordering::SeqCst) < 100, "calls: {}", calls.load(Ordering::SeqCst));
    }

    #[test]
    fn test_huge_buffer_multiplier_is_clamped() {
        let mut config = ParmapConfig::default();
        config.parallel.channel_buffer_multiplier = usize::MAX / 2;
        config.progress.enabled = false;

        let results = ParallelMap::new(square_task())
            .config(&config)
            .kwarg("square", true)
            .workers(4)
            .run((0..20).collect())
            .unwrap();
        assert_eq!(results[19], 361);
    }

    #[test]
    fn test_config_applies_thread_cap() {
        let mut config = ParmapConfig::default();
        config.parallel.max_threads = 1;
        config.progress.enabled = false;

        let outcome = ParallelMap::new(square_task())
            .config(&config)
            .kwarg("square", true)
            .run_with_outcome((0..50).collect())
            .unwrap();
        assert_eq!(outcome.workers, 1);
        assert_eq!(outcome.results[7], 49);
    }

    #[test]
    fn test_optimal_workers_calculation() {
        let workers = calculate_optimal_workers(0, 100);
        assert_eq!(workers, num_cpus::get());

        let capped = calculate_optimal_workers(2, 100);
        assert!(capped >= 1 && capped <= 2);

        assert!(calculate_optimal_workers(0, 1) >= 1);
    }
}
