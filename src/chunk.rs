//! PCM data chunk with capture timestamp.

use std::sync::Arc;

/// An atomic unit of PCM bytes with a capture timestamp.
///
/// `PcmChunk` is the unit of data flowing from the producer into the queue
/// and out to disk. The payload is an opaque byte sequence - sample rate,
/// channel layout, and endianness are the producer's concern and are not
/// interpreted or recorded by this crate.
///
/// Payloads are stored in an `Arc<Vec<u8>>` so clones are cheap reference
/// count bumps rather than buffer copies.
///
/// # Example
///
/// ```
/// use pcm_spool::PcmChunk;
///
/// let chunk = PcmChunk::new(vec![0u8; 640], 120);
/// assert_eq!(chunk.len(), 640);
/// assert_eq!(chunk.capture_timestamp, 120);
///
/// let chunk2 = chunk.clone(); // shares the payload
/// ```
#[derive(Debug, Clone)]
pub struct PcmChunk {
    /// Raw PCM bytes, layout defined by the producer.
    pub bytes: Arc<Vec<u8>>,

    /// Monotonic capture time in milliseconds since an arbitrary epoch.
    pub capture_timestamp: u64,
}

impl PcmChunk {
    /// Creates a new chunk from owned bytes.
    pub fn new(bytes: Vec<u8>, capture_timestamp: u64) -> Self {
        Self {
            bytes: Arc::new(bytes),
            capture_timestamp,
        }
    }

    /// Creates a chunk from an already Arc-wrapped payload.
    pub fn from_arc(bytes: Arc<Vec<u8>>, capture_timestamp: u64) -> Self {
        Self {
            bytes,
            capture_timestamp,
        }
    }

    /// Returns the payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    ///
    /// Empty chunks are legal and contribute nothing to a segment.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len() {
        let chunk = PcmChunk::new(vec![1, 2, 3, 4], 0);
        assert_eq!(chunk.len(), 4);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_empty_chunk() {
        let chunk = PcmChunk::new(vec![], 50);
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
        assert_eq!(chunk.capture_timestamp, 50);
    }

    #[test]
    fn test_clone_shares_payload() {
        let chunk = PcmChunk::new(vec![0u8; 1024], 0);
        let cloned = chunk.clone();
        assert!(Arc::ptr_eq(&chunk.bytes, &cloned.bytes));
    }

    #[test]
    fn test_from_arc() {
        let payload = Arc::new(vec![9u8; 16]);
        let chunk = PcmChunk::from_arc(Arc::clone(&payload), 7);
        assert!(Arc::ptr_eq(&payload, &chunk.bytes));
    }
}
