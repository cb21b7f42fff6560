//! Progress reporting for long-running operations.
//!
//! Operations accept an optional `&mut dyn Progress`. Any closure taking
//! `(percent, message)` works, as does a [`ProgressChannel`] for handing events
//! to another thread. Within one operation the reported percentages never
//! decrease, and a successful operation always ends with a 100 event.

use std::sync::mpsc::Sender;

/// One progress update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Completion in percent, 0 to 100 inclusive.
    pub percent: f64,
    /// Human-readable stage label.
    pub message: String,
}

impl ProgressEvent {
    /// Create a new event.
    pub fn new(percent: f64, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
        }
    }
}

/// Receiver of progress updates.
pub trait Progress {
    /// Called with each update of an operation.
    fn report(&mut self, percent: f64, message: &str);
}

impl<F> Progress for F
where
    F: FnMut(f64, &str),
{
    fn report(&mut self, percent: f64, message: &str) {
        self(percent, message);
    }
}

/// Forwards progress events over an `mpsc` channel.
///
/// Send failures (receiver dropped) are ignored.
#[derive(Debug, Clone)]
pub struct ProgressChannel(pub Sender<ProgressEvent>);

impl Progress for ProgressChannel {
    fn report(&mut self, percent: f64, message: &str) {
        let _ = self.0.send(ProgressEvent::new(percent, message));
    }
}

/// Wraps an optional sink and enforces the monotonic contract.
pub(crate) struct Tracker<'a> {
    sink: Option<&'a mut dyn Progress>,
    last: f64,
    last_message: String,
    /// Offset and span of this tracker within the caller's 0..100 range.
    base: f64,
    span: f64,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(sink: Option<&'a mut dyn Progress>) -> Self {
        Self {
            sink,
            last: 0.0,
            last_message: String::new(),
            base: 0.0,
            span: 100.0,
        }
    }

    /// Report `percent` of this stage, mapped into the caller's range.
    ///
    /// Updates that would move backwards are clamped; repeats of the same
    /// whole percentage and message are dropped.
    pub(crate) fn emit(&mut self, percent: f64, message: &str) {
        let Some(sink) = self.sink.as_deref_mut() else {
            return;
        };
        let scaled = self.base + percent.clamp(0.0, 100.0) * self.span / 100.0;
        let value = scaled.max(self.last);
        let first = self.last_message.is_empty();
        if !first && value.floor() == self.last.floor() && message == self.last_message {
            return;
        }
        sink.report(value, message);
        self.last = value;
        if self.last_message != message {
            self.last_message = message.to_string();
        }
    }

    /// Report progress capped below completion.
    pub(crate) fn emit_partial(&mut self, done: f64, total: f64, message: &str) {
        if total > 0.0 {
            self.emit((done / total * 100.0).min(99.0), message);
        }
    }

    /// Map subsequent updates into `[from, to]` of the caller's range.
    pub(crate) fn set_range(&mut self, from: f64, to: f64) {
        self.base = from;
        self.span = to - from;
    }

    /// Last reported percentage.
    #[cfg(test)]
    pub(crate) fn last(&self) -> f64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_is_monotonic() {
        let mut events: Vec<(f64, String)> = Vec::new();
        let mut sink = |p: f64, m: &str| events.push((p, m.to_string()));
        {
            let mut tracker = Tracker::new(Some(&mut sink));
            tracker.emit(0.0, "start");
            tracker.emit(40.0, "loading");
            tracker.emit(30.0, "loading");
            tracker.emit(40.5, "loading");
            tracker.emit(100.0, "done");
        }
        let percents: Vec<f64> = events.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![0.0, 40.0, 100.0]);
        assert_eq!(events.last().unwrap().1, "done");
    }

    #[test]
    fn test_partial_is_capped() {
        let mut events: Vec<f64> = Vec::new();
        let mut sink = |p: f64, _m: &str| events.push(p);
        {
            let mut tracker = Tracker::new(Some(&mut sink));
            tracker.emit_partial(10.0, 10.0, "work");
            tracker.emit_partial(1.0, 0.0, "work");
        }
        assert_eq!(events, vec![99.0]);
    }

    #[test]
    fn test_range_scaling() {
        let mut events: Vec<f64> = Vec::new();
        let mut sink = |p: f64, _m: &str| events.push(p);
        {
            let mut tracker = Tracker::new(Some(&mut sink));
            tracker.set_range(0.0, 90.0);
            tracker.emit(50.0, "load");
            tracker.emit(100.0, "load done");
            tracker.set_range(90.0, 100.0);
            tracker.emit(0.0, "write");
            tracker.emit(100.0, "write done");
        }
        assert_eq!(events, vec![45.0, 90.0, 90.0, 100.0]);
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut channel = ProgressChannel(tx);
        channel.report(12.0, "hello");
        assert_eq!(rx.recv().unwrap(), ProgressEvent::new(12.0, "hello"));
    }

    #[test]
    fn test_no_sink_is_noop() {
        let mut tracker = Tracker::new(None);
        tracker.emit(50.0, "ignored");
        assert_eq!(tracker.last(), 0.0);
    }
}
