//! Progress reporting for long-running stages.
//!
//! Generation, optimization and reservation commit report a 0-100
//! completion value to a [`ProgressSink`]. Values are non-decreasing and
//! every successful run ends with exactly one final `100`. There is no
//! cancellation.

/// Receives completion percentages.
pub trait ProgressSink {
    /// Called with a value in `0..=100`.
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// Converts `done / total` work units into monotonic percentages,
/// forwarding only changes.
pub(crate) struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    total: usize,
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, total: usize) -> Self {
        Self {
            sink,
            total,
            last: None,
        }
    }

    /// Reports `done` of `total` units, capped below 100 until [`finish`](Self::finish).
    pub(crate) fn update(&mut self, done: usize) {
        let percent = if self.total == 0 {
            0
        } else {
            ((done.min(self.total) * 100) / self.total).min(99) as u8
        };
        self.emit(percent);
    }

    pub(crate) fn finish(mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.sink.report(percent);
    }
}
