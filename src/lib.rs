//! # pcm-spool
//!
//! Background disk-buffering sink for streaming PCM audio.
//!
//! `pcm-spool` accepts short PCM chunks annotated with capture timestamps
//! from a real-time producer (typically an audio capture callback),
//! accumulates them in a bounded in-memory queue, and flushes them to
//! segmented raw files on a dedicated writer thread. The producer never
//! waits on the disk: `submit` is a bounded mutex-protected append, and
//! when the disk falls behind, the oldest queued audio is dropped rather
//! than blocking the capture callback.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pcm_spool::PcmSink;
//!
//! # fn main() -> Result<(), pcm_spool::BuildError> {
//! let sink = PcmSink::builder()
//!     .segment_size_bytes(16 * 1024 * 1024)     // cut files at ~16 MiB
//!     .path_template("capture_{}.pcm")          // capture_20240117_143052.pcm
//!     .on_event(|e| tracing::warn!(?e, "sink event"))
//!     .spawn()?;
//!
//! // From the audio callback: non-blocking, no disk I/O.
//! sink.submit(vec![0u8; 640], 0);
//! sink.submit(vec![0u8; 640], 20);
//!
//! // Drains the queue, closes the last segment, joins the writer.
//! sink.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **Producer threads**: call [`PcmSink::submit`]; the only suspension
//!   point is a short critical section appending to the queue
//! - **Chunk queue**: mutex-protected FIFO with a condition variable and a
//!   soft high-water mark (drop-oldest on overflow)
//! - **Writer thread**: sleeps until data or shutdown, drains the queue in
//!   one atomic move, and writes segments outside the lock
//!
//! Chunks appear on disk in exactly the order they were accepted, chunks
//! are never split across segment files, and `stop()` guarantees the final
//! segment is flushed and closed before it returns.
//!
//! On-disk segments are raw concatenated PCM bytes with no header or
//! framing; sample rate and layout are the producer's responsibility. Each
//! segment close emits a [`SinkEvent::SegmentClosed`] carrying the
//! `(path, first_timestamp, byte_length)` triple a higher layer may index.

#![warn(missing_docs)]
// Byte counters cross usize/u64 boundaries at the I/O seam
#![allow(clippy::cast_possible_truncation)]
// unwrap/expect allowed in tests only
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod builder;
mod chunk;
mod config;
mod error;
mod event;
mod queue;
mod segment;
mod sink;
mod writer;

pub use builder::SinkBuilder;
pub use chunk::PcmChunk;
pub use config::SinkConfig;
pub use error::BuildError;
pub use event::{event_callback, EventCallback, SinkEvent};
pub use sink::{PcmSink, SinkStats};
