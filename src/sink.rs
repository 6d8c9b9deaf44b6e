//! Producer-facing sink handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::queue::ChunkQueue;
use crate::PcmChunk;

/// Statistics about a sink's lifetime so far.
#[derive(Debug, Clone, Default)]
pub struct SinkStats {
    /// Chunks accepted by `submit` (rejected late submits not counted).
    pub chunks_submitted: u64,
    /// Payload bytes accepted by `submit`.
    pub bytes_submitted: u64,
    /// Chunks dropped at the high-water mark.
    pub chunks_dropped: u64,
    /// Segments flushed and closed.
    pub segments_closed: u64,
}

/// Counters shared between the facade and the writer thread.
#[derive(Default)]
pub(crate) struct SharedStats {
    pub(crate) chunks_submitted: AtomicU64,
    pub(crate) bytes_submitted: AtomicU64,
    pub(crate) chunks_dropped: AtomicU64,
    pub(crate) segments_closed: AtomicU64,
}

/// Handle to a running disk-buffering sink.
///
/// Created by [`SinkBuilder::spawn()`], which starts the writer thread
/// immediately. Producers call [`submit()`](PcmSink::submit) from the
/// capture callback; [`stop()`](PcmSink::stop) drains and joins the writer.
/// Dropping the sink without calling `stop()` performs the same shutdown.
///
/// # Example
///
/// ```no_run
/// use pcm_spool::PcmSink;
///
/// # fn main() -> Result<(), pcm_spool::BuildError> {
/// let sink = PcmSink::builder()
///     .segment_size_bytes(16 * 1024 * 1024)
///     .path_template("capture_{}.pcm")
///     .on_event(|e| tracing::warn!(?e, "sink event"))
///     .spawn()?;
///
/// // From the audio callback:
/// sink.submit(vec![0u8; 640], 0);
///
/// // Graceful shutdown: drains the queue, closes the last segment.
/// sink.stop();
/// # Ok(())
/// # }
/// ```
///
/// [`SinkBuilder::spawn()`]: crate::SinkBuilder::spawn
pub struct PcmSink {
    queue: Arc<ChunkQueue>,
    writer: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<SharedStats>,
}

impl PcmSink {
    /// Returns a builder for configuring and starting a sink.
    pub fn builder() -> crate::SinkBuilder {
        crate::SinkBuilder::new()
    }

    pub(crate) fn new(
        queue: Arc<ChunkQueue>,
        writer: JoinHandle<()>,
        stats: Arc<SharedStats>,
    ) -> Self {
        Self {
            queue,
            writer: Mutex::new(Some(writer)),
            stats,
        }
    }

    /// Appends a chunk to the queue and wakes the writer.
    ///
    /// Returns immediately: the only blocking is a bounded mutex-protected
    /// append, never disk I/O, so this is safe to call from a real-time
    /// audio callback. After [`stop()`](PcmSink::stop) the call is a silent
    /// no-op - late capture callbacks are tolerated.
    ///
    /// Backpressure is not an error here: if the queue exceeds its
    /// high-water mark the oldest chunk is dropped and the writer thread
    /// reports a [`SinkEvent::Overflow`] instead of blocking the producer.
    ///
    /// Zero-length chunks are legal and contribute nothing to a segment.
    ///
    /// [`SinkEvent::Overflow`]: crate::SinkEvent::Overflow
    pub fn submit(&self, bytes: Vec<u8>, capture_timestamp_ms: u64) {
        let chunk = PcmChunk::new(bytes, capture_timestamp_ms);
        let chunk_len = chunk.len() as u64;

        if !self.queue.push(chunk) {
            return;
        }

        self.stats.chunks_submitted.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_submitted
            .fetch_add(chunk_len, Ordering::Relaxed);
    }

    /// Requests shutdown and waits for the writer thread to drain and exit.
    ///
    /// Idempotent: a second call (from any thread) returns immediately and
    /// the writer is joined exactly once. After `stop()` returns, the last
    /// segment has been flushed and closed, no file handle remains open,
    /// and no further events will be emitted.
    pub fn stop(&self) {
        self.queue.shutdown();

        let handle = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("writer thread panicked");
            }
        }
    }

    /// Returns `true` until [`stop()`](PcmSink::stop) has been requested.
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Returns a snapshot of the sink's counters.
    pub fn stats(&self) -> SinkStats {
        SinkStats {
            chunks_submitted: self.stats.chunks_submitted.load(Ordering::Relaxed),
            bytes_submitted: self.stats.bytes_submitted.load(Ordering::Relaxed),
            chunks_dropped: self.stats.chunks_dropped.load(Ordering::Relaxed),
            segments_closed: self.stats.segments_closed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for PcmSink {
    fn drop(&mut self) {
        // Destruction without a prior stop() must not leave a dangling
        // writer thread.
        self.stop();
    }
}
