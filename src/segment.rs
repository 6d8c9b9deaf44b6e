//! Segment file writer.
//!
//! A segment is one contiguous raw PCM file. Segments are opened lazily on
//! the first byte that needs writing, cut once they reach the configured
//! size threshold, and never reopened after close.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::config::PATH_PLACEHOLDER;
use crate::{EventCallback, SinkEvent};

/// strftime pattern substituted into the path template at segment open.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// An open segment file, exclusively owned by the writer thread.
struct OpenSegment {
    file: File,
    path: PathBuf,
    first_timestamp: u64,
    byte_length: u64,
}

/// Writes drained chunk batches into segment files.
///
/// All I/O failures are surfaced through the event callback and treated as
/// recoverable: an open failure loses the current batch but is retried on
/// the next flush, and a short write leaves the segment open at the new
/// end offset. Partial capture beats no capture for real-time recording.
pub(crate) struct SegmentWriter {
    segment_size_bytes: u64,
    path_template: String,
    callback: Option<EventCallback>,
    current: Option<OpenSegment>,
}

impl SegmentWriter {
    pub(crate) fn new(
        segment_size_bytes: u64,
        path_template: String,
        callback: Option<EventCallback>,
    ) -> Self {
        Self {
            segment_size_bytes,
            path_template,
            callback,
            current: None,
        }
    }

    fn emit(&self, event: SinkEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// Derives the next segment path from the template and the current
    /// local wall clock.
    fn next_path(&self) -> PathBuf {
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        PathBuf::from(self.path_template.replacen(PATH_PLACEHOLDER, &stamp, 1))
    }

    /// Opens a new segment if none is open.
    ///
    /// Returns `false` on open failure; the segment stays closed and the
    /// next flush retries with a freshly derived path.
    fn ensure_open(&mut self, first_timestamp: u64) -> bool {
        if self.current.is_some() {
            return true;
        }

        let path = self.next_path();
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
        {
            Ok(file) => {
                tracing::debug!(path = %path.display(), first_timestamp, "opened segment");
                self.current = Some(OpenSegment {
                    file,
                    path,
                    first_timestamp,
                    byte_length: 0,
                });
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open segment");
                self.emit(SinkEvent::OpenFailed {
                    path,
                    error: e.to_string(),
                });
                false
            }
        }
    }

    /// Writes a drained batch as one contiguous write to the current
    /// segment, opening one lazily if needed.
    ///
    /// A batch that pushes the segment past the size threshold is still
    /// written in full; chunks are never split across segments. If no
    /// segment can be opened the batch is lost, not retried.
    pub(crate) fn write(&mut self, bytes: &[u8], first_timestamp: u64) {
        if bytes.is_empty() {
            return;
        }
        if !self.ensure_open(first_timestamp) {
            return;
        }

        let requested = bytes.len() as u64;
        let (written, short) = {
            let Some(segment) = self.current.as_mut() else {
                return;
            };
            let written = match segment.file.write(bytes) {
                Ok(n) => n as u64,
                Err(e) => {
                    tracing::warn!(
                        path = %segment.path.display(),
                        error = %e,
                        "segment write failed"
                    );
                    0
                }
            };
            segment.byte_length += written;

            // Push buffered bytes down to the OS; a full fsync is
            // deliberately not performed on the flush path.
            if let Err(e) = segment.file.flush() {
                tracing::warn!(path = %segment.path.display(), error = %e, "segment flush failed");
            }
            (written, written < requested)
        };

        if short {
            let path = self
                .current
                .as_ref()
                .map(|s| s.path.clone())
                .unwrap_or_default();
            self.emit(SinkEvent::ShortWrite {
                path,
                requested,
                written,
            });
        }
    }

    /// Returns `true` once the open segment has reached the size threshold.
    pub(crate) fn should_cut(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.byte_length >= self.segment_size_bytes)
    }

    /// Flushes and releases the current segment, if any.
    ///
    /// Emits [`SinkEvent::SegmentClosed`] with the triple an external index
    /// may persist. Returns `true` if a segment was actually closed.
    pub(crate) fn close(&mut self) -> bool {
        let Some(mut segment) = self.current.take() else {
            return false;
        };

        if let Err(e) = segment.file.flush() {
            tracing::warn!(path = %segment.path.display(), error = %e, "flush on close failed");
        }
        tracing::debug!(
            path = %segment.path.display(),
            byte_length = segment.byte_length,
            "closed segment"
        );
        self.emit(SinkEvent::SegmentClosed {
            path: segment.path,
            first_timestamp: segment.first_timestamp,
            byte_length: segment.byte_length,
        });
        true
    }
}
