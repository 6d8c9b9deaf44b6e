//! Builder for [`PcmSink`].

use std::sync::Arc;
use std::thread;

use crate::queue::ChunkQueue;
use crate::segment::SegmentWriter;
use crate::sink::SharedStats;
use crate::{event_callback, BuildError, EventCallback, PcmSink, SinkConfig, SinkEvent};

/// Name of the spawned writer thread, visible in debuggers and profilers.
const WRITER_THREAD_NAME: &str = "pcm-spool-writer";

/// Builder for configuring and starting a [`PcmSink`].
///
/// Obtained via [`PcmSink::builder()`]. [`spawn()`](SinkBuilder::spawn)
/// validates the configuration and starts the writer thread immediately.
///
/// # Example
///
/// ```no_run
/// use pcm_spool::PcmSink;
///
/// # fn main() -> Result<(), pcm_spool::BuildError> {
/// let sink = PcmSink::builder()
///     .segment_size_bytes(4 * 1024 * 1024)
///     .path_template("session_{}.pcm")
///     .high_water_mark(32 * 1024 * 1024)
///     .on_event(|event| tracing::warn!(?event, "sink event"))
///     .spawn()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SinkBuilder {
    segment_size_bytes: u64,
    path_template: String,
    high_water_mark: Option<u64>,
    callback: Option<EventCallback>,
}

impl SinkBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the byte threshold at which a segment is closed after a flush.
    ///
    /// Must be at least 1.
    #[must_use]
    pub fn segment_size_bytes(mut self, bytes: u64) -> Self {
        self.segment_size_bytes = bytes;
        self
    }

    /// Sets the output path template.
    ///
    /// Must contain exactly one `{}` placeholder, which is replaced with
    /// the local wall-clock time (`YYYYMMDD_HHMMSS`) at each segment open.
    #[must_use]
    pub fn path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = template.into();
        self
    }

    /// Overrides the queued-bytes ceiling.
    ///
    /// Defaults to `4 * segment_size_bytes`. Above the ceiling the oldest
    /// queued chunk is dropped instead of blocking the producer.
    #[must_use]
    pub fn high_water_mark(mut self, bytes: u64) -> Self {
        self.high_water_mark = Some(bytes);
        self
    }

    /// Registers a callback for runtime [`SinkEvent`]s.
    ///
    /// Invoked from the writer thread only; keep it cheap and
    /// non-blocking. Every event is delivered before
    /// [`stop()`](crate::PcmSink::stop) returns.
    #[must_use]
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(SinkEvent) + Send + Sync + 'static,
    {
        self.callback = Some(event_callback(f));
        self
    }

    /// Validates the configuration and starts the writer thread.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidSegmentSize`] for a zero threshold,
    /// [`BuildError::InvalidPathTemplate`] unless the template carries
    /// exactly one placeholder, and [`BuildError::ThreadSpawn`] if the OS
    /// refuses the thread.
    pub fn spawn(self) -> Result<PcmSink, BuildError> {
        if self.segment_size_bytes < 1 {
            return Err(BuildError::InvalidSegmentSize);
        }

        let mut config = SinkConfig::new(self.segment_size_bytes, self.path_template);
        if let Some(mark) = self.high_water_mark {
            config.high_water_mark = mark;
        }

        let placeholders = config.placeholder_count();
        if placeholders != 1 {
            return Err(BuildError::InvalidPathTemplate {
                template: config.path_template,
                placeholders,
            });
        }

        let queue = Arc::new(ChunkQueue::new(config.high_water_mark));
        let stats = Arc::new(SharedStats::default());
        let segments = SegmentWriter::new(
            config.segment_size_bytes,
            config.path_template.clone(),
            self.callback.clone(),
        );

        tracing::debug!(
            segment_size_bytes = config.segment_size_bytes,
            high_water_mark = config.high_water_mark,
            path_template = %config.path_template,
            "starting sink writer thread"
        );

        let writer_queue = Arc::clone(&queue);
        let writer_stats = Arc::clone(&stats);
        let callback = self.callback;
        let handle = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || crate::writer::run(writer_queue, segments, writer_stats, callback))
            .map_err(BuildError::ThreadSpawn)?;

        Ok(PcmSink::new(queue, handle, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_segment_size_rejected() {
        let result = PcmSink::builder()
            .segment_size_bytes(0)
            .path_template("out_{}.pcm")
            .spawn();
        assert!(matches!(result, Err(BuildError::InvalidSegmentSize)));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let result = PcmSink::builder()
            .segment_size_bytes(1024)
            .path_template("out.pcm")
            .spawn();
        assert!(matches!(
            result,
            Err(BuildError::InvalidPathTemplate { placeholders: 0, .. })
        ));
    }

    #[test]
    fn test_template_with_two_placeholders_rejected() {
        let result = PcmSink::builder()
            .segment_size_bytes(1024)
            .path_template("{}_{}.pcm")
            .spawn();
        assert!(matches!(
            result,
            Err(BuildError::InvalidPathTemplate { placeholders: 2, .. })
        ));
    }

    #[test]
    fn test_missing_template_rejected() {
        let result = PcmSink::builder().segment_size_bytes(1024).spawn();
        assert!(matches!(
            result,
            Err(BuildError::InvalidPathTemplate { placeholders: 0, .. })
        ));
    }

    #[test]
    fn test_valid_config_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("out_{}.pcm").to_string_lossy().into_owned();
        let sink = PcmSink::builder()
            .segment_size_bytes(1024)
            .path_template(template)
            .spawn()
            .unwrap();
        assert!(sink.is_running());
        sink.stop();
    }
}
