//! Bounded FIFO shared between producer threads and the writer thread.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::PcmChunk;

/// Record of a chunk evicted at the high-water mark.
///
/// Evictions are recorded under the lock and drained by the writer thread
/// alongside the surviving chunks, so overflow reporting happens on the
/// writer thread like every other event.
pub(crate) struct DroppedChunk {
    pub(crate) dropped_bytes: u64,
    pub(crate) dropped_timestamp: u64,
}

/// State guarded by the queue mutex.
///
/// One mutex covers the chunk FIFO, the eviction records, and the
/// `running` flag so the writer can check "shutdown requested" and "data
/// available" under a single lock; one condvar signals both conditions and
/// the writer distinguishes them by rechecking the predicates.
struct QueueState {
    chunks: VecDeque<PcmChunk>,
    pending_bytes: u64,
    dropped: Vec<DroppedChunk>,
    running: bool,
}

/// Mutex-protected FIFO of chunks with a cached byte total.
///
/// Producers push from any thread; only the writer thread drains. The
/// queue carries a soft high-water mark: once `pending_bytes` exceeds it,
/// the oldest chunks are evicted at push time so the producer never blocks
/// on a slow disk.
pub(crate) struct ChunkQueue {
    state: Mutex<QueueState>,
    work_available: Condvar,
    high_water_mark: u64,
}

impl ChunkQueue {
    pub(crate) fn new(high_water_mark: u64) -> Self {
        Self {
            state: Mutex::new(QueueState {
                chunks: VecDeque::new(),
                pending_bytes: 0,
                dropped: Vec::new(),
                running: true,
            }),
            work_available: Condvar::new(),
            high_water_mark,
        }
    }

    /// Appends a chunk and wakes the writer.
    ///
    /// Returns `false` if the queue has been shut down (the chunk is
    /// silently discarded). Chunks evicted to stay under the high-water
    /// mark are recorded for the writer thread to report; nothing heavier
    /// than that bookkeeping happens under the lock - no I/O, no
    /// callbacks.
    pub(crate) fn push(&self, chunk: PcmChunk) -> bool {
        {
            let mut state = self.lock_state();
            if !state.running {
                return false;
            }

            state.pending_bytes += chunk.len() as u64;
            state.chunks.push_back(chunk);

            while state.pending_bytes > self.high_water_mark {
                // A chunk larger than the mark evicts everything up to and
                // including itself; the pop_front guard ends the loop once
                // the deque is empty.
                let Some(oldest) = state.chunks.pop_front() else {
                    break;
                };
                state.pending_bytes -= oldest.len() as u64;
                state.dropped.push(DroppedChunk {
                    dropped_bytes: oldest.len() as u64,
                    dropped_timestamp: oldest.capture_timestamp,
                });
            }
        }
        self.work_available.notify_one();
        true
    }

    /// Writer side: blocks until there is work or shutdown, then moves all
    /// queued chunks into `buf`, all eviction records into `dropped`, and
    /// resets `pending_bytes`.
    ///
    /// Returns the `running` flag as observed under the lock. A `false`
    /// return with non-empty output is the final drain.
    pub(crate) fn wait_for_work(
        &self,
        buf: &mut Vec<PcmChunk>,
        dropped: &mut Vec<DroppedChunk>,
    ) -> bool {
        let mut state = self.lock_state();
        while state.running && state.chunks.is_empty() && state.dropped.is_empty() {
            state = match self.work_available.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        buf.extend(state.chunks.drain(..));
        dropped.append(&mut state.dropped);
        state.pending_bytes = 0;
        state.running
    }

    /// Requests shutdown and wakes the writer.
    ///
    /// Already-queued chunks are still flushed before the writer exits.
    pub(crate) fn shutdown(&self) {
        self.lock_state().running = false;
        self.work_available.notify_all();
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock_state().running
    }

    #[cfg(test)]
    pub(crate) fn pending_bytes(&self) -> u64 {
        self.lock_state().pending_bytes
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.lock_state().chunks.is_empty()
    }

    /// A producer panicking mid-push leaves no partial state, so the data
    /// behind a poisoned mutex is still consistent.
    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn drain(queue: &ChunkQueue) -> (Vec<PcmChunk>, Vec<DroppedChunk>, bool) {
        let mut batch = Vec::new();
        let mut dropped = Vec::new();
        let running = queue.wait_for_work(&mut batch, &mut dropped);
        (batch, dropped, running)
    }

    #[test]
    fn test_push_and_drain_fifo_order() {
        let queue = ChunkQueue::new(u64::MAX);
        for ts in 0..5u64 {
            assert!(queue.push(PcmChunk::new(vec![ts as u8; 10], ts)));
        }
        assert_eq!(queue.pending_bytes(), 50);

        let (batch, dropped, running) = drain(&queue);
        assert!(running);
        assert!(dropped.is_empty());
        assert_eq!(batch.len(), 5);
        let timestamps: Vec<u64> = batch.iter().map(|c| c.capture_timestamp).collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.pending_bytes(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_high_water_evicts_oldest() {
        let queue = ChunkQueue::new(25);
        assert!(queue.push(PcmChunk::new(vec![0u8; 10], 0)));
        assert!(queue.push(PcmChunk::new(vec![0u8; 10], 1)));

        // 30 bytes pending > 25: the chunk with ts=0 goes.
        assert!(queue.push(PcmChunk::new(vec![0u8; 10], 2)));
        assert_eq!(queue.pending_bytes(), 20);

        let (batch, dropped, _) = drain(&queue);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].dropped_timestamp, 0);
        assert_eq!(dropped[0].dropped_bytes, 10);
        let timestamps: Vec<u64> = batch.iter().map(|c| c.capture_timestamp).collect();
        assert_eq!(timestamps, vec![1, 2]);
    }

    #[test]
    fn test_oversized_chunk_evicts_everything_older() {
        let queue = ChunkQueue::new(16);
        assert!(queue.push(PcmChunk::new(vec![0u8; 8], 0)));
        assert!(queue.push(PcmChunk::new(vec![0u8; 8], 1)));

        assert!(queue.push(PcmChunk::new(vec![0u8; 16], 2)));
        // The newest chunk itself stays even though it fills the mark.
        assert_eq!(queue.pending_bytes(), 16);

        let (batch, dropped, _) = drain(&queue);
        assert_eq!(dropped.len(), 2);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].capture_timestamp, 2);
    }

    #[test]
    fn test_push_after_shutdown_is_rejected() {
        let queue = ChunkQueue::new(u64::MAX);
        queue.shutdown();
        assert!(!queue.push(PcmChunk::new(vec![1, 2, 3], 0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_shutdown_wakes_idle_writer() {
        let queue = Arc::new(ChunkQueue::new(u64::MAX));
        let writer_queue = Arc::clone(&queue);

        let handle = std::thread::spawn(move || {
            let mut batch = Vec::new();
            let mut dropped = Vec::new();
            writer_queue.wait_for_work(&mut batch, &mut dropped)
        });

        // Give the writer time to park on the condvar.
        std::thread::sleep(Duration::from_millis(20));
        queue.shutdown();

        let running = handle.join().unwrap();
        assert!(!running);
    }

    #[test]
    fn test_final_drain_returns_pending_chunks() {
        let queue = ChunkQueue::new(u64::MAX);
        assert!(queue.push(PcmChunk::new(vec![0u8; 4], 0)));
        queue.shutdown();

        let (batch, _, running) = drain(&queue);
        assert!(!running);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_eviction_records_survive_an_emptied_deque() {
        // A chunk bigger than the mark evicts itself, leaving records but
        // no chunks; the writer must still wake to report them.
        let queue = ChunkQueue::new(8);
        assert!(queue.push(PcmChunk::new(vec![0u8; 32], 5)));
        assert!(queue.is_empty());

        let (batch, dropped, running) = drain(&queue);
        assert!(running);
        assert!(batch.is_empty());
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].dropped_timestamp, 5);
        assert_eq!(dropped[0].dropped_bytes, 32);
    }

    #[test]
    fn test_empty_chunks_carry_no_bytes() {
        let queue = ChunkQueue::new(10);
        for ts in 0..100 {
            assert!(queue.push(PcmChunk::new(vec![], ts)));
        }
        assert_eq!(queue.pending_bytes(), 0);

        let (batch, dropped, _) = drain(&queue);
        assert_eq!(batch.len(), 100);
        assert!(dropped.is_empty());
    }
}
