use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Item counts tracked atomically across workers
#[derive(Debug, Default)]
pub struct MapStats {
    pub completed: AtomicUsize,
    pub chunks: AtomicUsize,
}

impl MapStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chunk(&self, items: usize) -> usize {
        self.chunks.fetch_add(1, Ordering::Relaxed);
        self.completed.fetch_add(items, Ordering::Relaxed) + items
    }

    pub fn get_counts(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Relaxed),
            self.chunks.load(Ordering::Relaxed),
        )
    }
}

/// Console progress for a single map call
///
/// Draws to stderr so results printed on stdout stay clean. When disabled the
/// bar is hidden but the counters still run.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    stats: Arc<MapStats>,
    workers: usize,
}

impl ProgressReporter {
    pub fn new(label: &str, total_items: usize, workers: usize, enabled: bool, tick: Duration) -> Self {
        let bar = if enabled {
            ProgressBar::with_draw_target(Some(total_items as u64), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };

        let style = ProgressStyle::with_template(
            "⚡ {prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({percent}%) {spinner} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.set_message(format!("{workers} workers"));
        if enabled && !tick.is_zero() {
            bar.enable_steady_tick(tick);
        }

        Self {
            bar,
            stats: Arc::new(MapStats::new()),
            workers,
        }
    }

    /// A reporter that never draws
    pub fn hidden(total_items: usize) -> Self {
        Self::new("", total_items, 1, false, Duration::ZERO)
    }

    /// Record a finished chunk of `items` items
    pub fn advance(&self, items: usize) {
        let completed = self.stats.record_chunk(items);
        self.bar.set_position(completed as u64);
    }

    pub fn stats(&self) -> Arc<MapStats> {
        self.stats.clone()
    }

    pub fn finish(&self) {
        let (completed, chunks) = self.stats.get_counts();
        self.bar.finish_with_message(format!(
            "{completed} items in {chunks} chunks across {} workers",
            self.workers
        ));
    }

    /// Leave the bar where it stopped and show why
    pub fn abandon(&self, reason: &str) {
        self.bar.abandon_with_message(format!("✖ {reason}"));
    }
}
