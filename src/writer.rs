//! Writer thread body.
//!
//! The writer sleeps on the queue condvar until data arrives or shutdown
//! is requested, drains everything in one atomic move, and flushes the
//! batch to the current segment outside the lock. There is no polling
//! interval: the thread wakes immediately on every enqueue.
//!
//! All events - I/O failures, overflow reports, segment closes - are
//! emitted from this thread and therefore strictly before the `stop()`
//! join returns.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::queue::{ChunkQueue, DroppedChunk};
use crate::segment::SegmentWriter;
use crate::sink::SharedStats;
use crate::{EventCallback, PcmChunk, SinkEvent};

/// Runs until shutdown is observed with an empty queue.
///
/// Per iteration: wait for work, drain the queue into a local batch,
/// release the lock, report any chunks evicted at the high-water mark,
/// then concatenate the batch and write it as one contiguous write,
/// cutting the segment if it reached the size threshold. The final drain
/// and segment close happen before the thread exits, so `stop()` can rely
/// on everything being on disk and every event delivered once the join
/// returns.
pub(crate) fn run(
    queue: Arc<ChunkQueue>,
    mut segments: SegmentWriter,
    stats: Arc<SharedStats>,
    callback: Option<EventCallback>,
) {
    let mut batch: Vec<PcmChunk> = Vec::new();
    let mut payload: Vec<u8> = Vec::new();
    let mut dropped: Vec<DroppedChunk> = Vec::new();

    loop {
        batch.clear();
        dropped.clear();
        let running = queue.wait_for_work(&mut batch, &mut dropped);

        for record in &dropped {
            stats.chunks_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                dropped_bytes = record.dropped_bytes,
                dropped_timestamp = record.dropped_timestamp,
                "queue over high-water mark, dropped oldest chunk"
            );
            if let Some(ref callback) = callback {
                callback(SinkEvent::Overflow {
                    dropped_bytes: record.dropped_bytes,
                    dropped_timestamp: record.dropped_timestamp,
                });
            }
        }

        if !batch.is_empty() {
            payload.clear();
            for chunk in &batch {
                payload.extend_from_slice(&chunk.bytes);
            }

            if !payload.is_empty() {
                // Timestamp of the first chunk carrying bytes; only used
                // when this flush opens a fresh segment.
                let first_timestamp = batch
                    .iter()
                    .find(|c| !c.is_empty())
                    .map_or(0, |c| c.capture_timestamp);

                tracing::trace!(
                    chunks = batch.len(),
                    bytes = payload.len(),
                    "flushing drained batch"
                );
                segments.write(&payload, first_timestamp);

                if segments.should_cut() && segments.close() {
                    stats.segments_closed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        if !running {
            break;
        }
    }

    if segments.close() {
        stats.segments_closed.fetch_add(1, Ordering::Relaxed);
    }
    tracing::debug!("writer thread exiting");
}
