//! Partitioning of work into ordered chunks
//!
//! Chunk size grows with `sqrt(n) * workers / 2`: large inputs get bigger
//! chunks to amortize dispatch, while small ones stay fine-grained enough for
//! the pool to balance.

use std::ops::Range;

/// Items per chunk for `item_count` items spread over `workers` workers
pub fn chunk_size(item_count: usize, workers: usize) -> usize {
    if item_count == 0 {
        return 1;
    }
    let raw = (item_count as f64).sqrt() * workers.max(1) as f64 / 2.0;
    (raw as usize).clamp(1, item_count)
}

/// Contiguous index ranges covering `0..item_count`, in order
pub fn chunk_ranges(item_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let step = chunk_size.max(1);
    (0..item_count)
        .step_by(step)
        .map(|start| start..(start + step).min(item_count))
        .collect()
}
