//! Shared emission context.
//!
//! The reference design kept error state and file trackers in process-global
//! mutable state; here they are an explicit value threaded through emission.
//! One context serves a whole batch: targets may be emitted in parallel, each
//! with its own output buffer, while failure reporting and the file trackers
//! share this one lock.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use indexmap::IndexMap;
use tracing::error;

use crate::error::EmitError;
use crate::label::Label;
use crate::output_file::OutputFile;

#[derive(Debug, Default)]
struct TrackerState {
    errors: Vec<EmitError>,
    written_files: Vec<OutputFile>,
    generated_files: IndexMap<OutputFile, Label>,
}

/// Batch-wide emission state: the failure flag, recorded errors and the
/// written/generated file trackers.
#[derive(Debug, Default)]
pub struct EmitContext {
    failed: AtomicBool,
    work_count: AtomicUsize,
    state: Mutex<TrackerState>,
}

impl EmitContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any emission in this batch has failed. A stale `false` is
    /// possible under contention and only delays scheduling shutdown, so
    /// `Acquire` pairs with the `Release` store in [`EmitContext::fail`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Record a failure. The first error wins for [`EmitContext::first_error`];
    /// later errors from the same batch are still recorded.
    pub fn fail(&self, err: EmitError) {
        error!(%err, "emission failed");
        let mut state = self.state.lock().expect("emit context lock");
        state.errors.push(err);
        self.failed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn first_error(&self) -> Option<EmitError> {
        self.state
            .lock()
            .expect("emit context lock")
            .errors
            .first()
            .cloned()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<EmitError> {
        self.state.lock().expect("emit context lock").errors.clone()
    }

    /// Declare that a file was written and affected the build output.
    pub fn add_written_file(&self, file: OutputFile) {
        self.state
            .lock()
            .expect("emit context lock")
            .written_files
            .push(file);
    }

    #[must_use]
    pub fn written_files(&self) -> Vec<OutputFile> {
        self.state
            .lock()
            .expect("emit context lock")
            .written_files
            .clone()
    }

    /// Track a generated file together with the target producing it.
    pub fn add_generated_file(&self, file: OutputFile, target: Label) {
        self.state
            .lock()
            .expect("emit context lock")
            .generated_files
            .insert(file, target);
    }

    #[must_use]
    pub fn is_file_generated(&self, file: &OutputFile) -> bool {
        self.state
            .lock()
            .expect("emit context lock")
            .generated_files
            .contains_key(file)
    }

    /// Outstanding-work refcount, maintained by outer drivers.
    pub fn increment_work(&self) {
        self.work_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the remaining count after the decrement.
    pub fn decrement_work(&self) -> usize {
        self.work_count.fetch_sub(1, Ordering::Relaxed) - 1
    }
}
