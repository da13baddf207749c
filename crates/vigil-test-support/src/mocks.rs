//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use vigil_core::domain::{FrameResult, MetricSet, SessionRecord, SessionSummary};
use vigil_core::ports::{BaselineStore, LandmarkSource, ProgressEvent, ProgressSink, ResultOutput};

/// Mock implementation of `LandmarkSource` for testing.
///
/// Yields pre-built records (and injected read errors) and tracks iteration
/// for assertions.
pub struct MockLandmarkSource {
    name: String,
    records: Vec<Result<SessionRecord, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockLandmarkSource {
    /// Creates a new mock source with the given records.
    #[must_use]
    pub fn new(name: &str, records: Vec<SessionRecord>) -> Self {
        Self {
            name: name.to_string(),
            records: records.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self::new(name, vec![])
    }

    /// Appends a record that fails to read with `message`.
    #[must_use]
    pub fn with_error(mut self, message: &str) -> Self {
        self.records.push(Err(message.to_string()));
        self
    }

    /// Appends a record.
    #[must_use]
    pub fn with_record(mut self, record: SessionRecord) -> Self {
        self.records.push(Ok(record));
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl LandmarkSource for MockLandmarkSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn records(&self) -> Box<dyn Iterator<Item = anyhow::Result<SessionRecord>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(
            self.records
                .iter()
                .map(|r| r.clone().map_err(|message| anyhow::anyhow!(message))),
        )
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures frame results and summaries for later assertions.
pub struct MockResultOutput {
    frames: Arc<Mutex<Vec<(String, FrameResult)>>>,
    summaries: Arc<Mutex<Vec<SessionSummary>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            summaries: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured frame results.
    #[must_use]
    pub fn frames(&self) -> Vec<FrameResult> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Returns the source names frames were written for, in order.
    #[must_use]
    pub fn frame_sources(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    /// Returns all captured summaries.
    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write_frame(&self, source: &str, result: &FrameResult) -> anyhow::Result<()> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((source.to_string(), result.clone()));
        Ok(())
    }

    fn write_summary(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(summary.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// In-memory `BaselineStore` for testing.
pub struct MockBaselineStore {
    stored: Arc<Mutex<Option<MetricSet>>>,
    save_count: Arc<Mutex<usize>>,
}

impl MockBaselineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stored: Arc::new(Mutex::new(None)),
            save_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a store holding `baseline`.
    #[must_use]
    pub fn with_baseline(baseline: MetricSet) -> Self {
        let store = Self::new();
        *store.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(baseline);
        store
    }

    /// Returns the currently stored baseline.
    #[must_use]
    pub fn stored(&self) -> Option<MetricSet> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `save()` was called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self
            .save_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockBaselineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineStore for MockBaselineStore {
    fn load(&self) -> anyhow::Result<Option<MetricSet>> {
        Ok(self.stored())
    }

    fn save(&self, baseline: &MetricSet) -> anyhow::Result<()> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(baseline.clone());
        if let Ok(mut c) = self.save_count.lock() {
            *c += 1;
        }
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<bool> {
        Ok(self
            .stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some())
    }
}
