//! Runtime events for monitoring sink health.
//!
//! Events are non-fatal notifications. The sink continues running after
//! every event - they exist for logging, metrics, and external indexing,
//! not for error handling in the `Result` sense.

use std::path::PathBuf;
use std::sync::Arc;

/// Runtime events emitted by a [`PcmSink`](crate::PcmSink).
///
/// The three failure kinds are each recoverable: recording continues until
/// [`stop()`](crate::PcmSink::stop) is called. After `stop()` returns, no
/// further events are emitted.
///
/// # Example
///
/// ```
/// use pcm_spool::SinkEvent;
///
/// fn handle_event(event: SinkEvent) {
///     match event {
///         SinkEvent::OpenFailed { path, error } => {
///             eprintln!("cannot open {}: {error}", path.display());
///         }
///         SinkEvent::ShortWrite { path, requested, written } => {
///             eprintln!("short write to {}: {written}/{requested}", path.display());
///         }
///         SinkEvent::Overflow { dropped_bytes, dropped_timestamp } => {
///             eprintln!("dropped {dropped_bytes} bytes captured at {dropped_timestamp}ms");
///         }
///         SinkEvent::SegmentClosed { path, first_timestamp, byte_length } => {
///             eprintln!("{}: {byte_length} bytes from {first_timestamp}ms", path.display());
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum SinkEvent {
    /// A segment file could not be created.
    ///
    /// The open is retried on the next flush; chunks drained during the
    /// failed flush are lost, not retried.
    OpenFailed {
        /// Path that could not be opened.
        path: PathBuf,
        /// Description of the underlying I/O error.
        error: String,
    },

    /// The OS wrote fewer bytes than requested.
    ///
    /// The segment stays open and the next flush proceeds at the new end
    /// offset.
    ShortWrite {
        /// Path of the affected segment.
        path: PathBuf,
        /// Bytes the writer asked for.
        requested: u64,
        /// Bytes the OS actually wrote.
        written: u64,
    },

    /// The producer outran the writer and the oldest queued chunk was
    /// dropped at the high-water mark.
    ///
    /// Dropping trades recorded continuity for bounded producer latency,
    /// which is the right trade for a real-time audio callback.
    Overflow {
        /// Payload size of the dropped chunk.
        dropped_bytes: u64,
        /// Capture timestamp of the dropped chunk.
        dropped_timestamp: u64,
    },

    /// A segment was flushed and closed.
    ///
    /// Carries the `(path, first_timestamp, byte_length)` triple a higher
    /// layer may persist into an index; this crate commits to no format.
    SegmentClosed {
        /// Path of the closed segment.
        path: PathBuf,
        /// Capture timestamp of the first chunk in the segment.
        first_timestamp: u64,
        /// Final size of the segment in bytes.
        byte_length: u64,
    },
}

/// Callback type for receiving runtime events.
///
/// Register via [`SinkBuilder::on_event()`]. The callback is invoked from
/// the writer thread only, so it must be cheap and must not block;
/// subscribers needing thread affinity should forward into their own
/// channel. Every event is delivered before
/// [`stop()`](crate::PcmSink::stop) returns.
///
/// [`SinkBuilder::on_event()`]: crate::SinkBuilder::on_event
pub type EventCallback = Arc<dyn Fn(SinkEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use pcm_spool::{event_callback, SinkEvent};
///
/// let callback = event_callback(|event| {
///     println!("sink event: {event:?}");
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(SinkEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
