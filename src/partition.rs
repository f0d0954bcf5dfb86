use std::ops::Range;

/// Contiguous slice of an index space owned by one worker.
///
/// Worker `id` of `num_threads` gets `[id*n/num_threads, (id+1)*n/num_threads)`; the last
/// worker's end is pinned to `n` so the integer-division remainder is never dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerRange {
    pub start: usize,
    pub end: usize,
}

impl WorkerRange {
    pub fn for_worker(id: usize, num_threads: usize, n: usize) -> Self {
        debug_assert!(num_threads > 0 && id < num_threads);
        let start = id * n / num_threads;
        let end = if id == num_threads - 1 { n } else { (id + 1) * n / num_threads };
        Self { start, end }
    }

    pub fn len(&self) -> usize { self.end - self.start }

    pub fn is_empty(&self) -> bool { self.start >= self.end }

    pub fn indices(&self) -> Range<usize> { self.start..self.end }
}
