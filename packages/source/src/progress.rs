//! Progress reporting for dataset loads.
//!
//! Fetching and normalizing a 20k-record file takes long enough to be worth
//! showing. [`ProgressCallback`] keeps the source crate free of any
//! rendering backend; the CLI plugs in `indicatif` bars, tests and library
//! callers use [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a dataset load.
///
/// Implementations must be `Send + Sync` so one handle can be shared with
/// the spawned fetch task.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of records expected.
    fn set_total(&self, total: u64);

    /// Advances by `delta` records.
    fn inc(&self, delta: u64);

    /// Updates the current stage label (e.g. `"fetching"`).
    fn set_message(&self, msg: String);

    /// Marks the load finished with a final message.
    fn finish(&self, msg: String);
}

/// Discards all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// Records what a load reported, for assertions.
    #[derive(Default)]
    pub struct RecordingProgress {
        pub total: AtomicU64,
        pub position: AtomicU64,
        pub messages: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }
        fn inc(&self, delta: u64) {
            self.position.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
        fn finish(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn recording_progress_tracks_position() {
        let progress = RecordingProgress::default();
        progress.set_total(3);
        progress.inc(1);
        progress.inc(2);
        progress.finish("done".to_string());
        assert_eq!(progress.total.load(Ordering::SeqCst), 3);
        assert_eq!(progress.position.load(Ordering::SeqCst), 3);
        assert_eq!(*progress.messages.lock().unwrap(), ["done"]);
    }
}
