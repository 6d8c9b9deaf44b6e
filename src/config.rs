//! Configuration for the disk-buffering sink.

/// Default high-water multiplier applied to the segment size when no
/// explicit queue ceiling is configured.
const DEFAULT_HIGH_WATER_FACTOR: u64 = 4;

/// Placeholder that the wall-clock timestamp is substituted into.
pub(crate) const PATH_PLACEHOLDER: &str = "{}";

/// Configuration for a [`PcmSink`](crate::PcmSink).
///
/// Usually built via [`PcmSink::builder()`](crate::PcmSink::builder) rather
/// than constructed directly.
///
/// # Example
///
/// ```
/// use pcm_spool::SinkConfig;
///
/// let config = SinkConfig::new(1024 * 1024, "capture_{}.pcm");
/// assert_eq!(config.high_water_mark, 4 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Byte threshold at which the current segment is closed after a flush.
    ///
    /// A flush that carries the segment past the threshold is still written
    /// in full; chunks are never split across segments.
    pub segment_size_bytes: u64,

    /// Output path template with exactly one `{}` placeholder.
    ///
    /// The placeholder is replaced with the local wall-clock time formatted
    /// as `YYYYMMDD_HHMMSS` when each segment is opened, e.g.
    /// `"capture_{}.pcm"` becomes `"capture_20240117_143052.pcm"`.
    pub path_template: String,

    /// Queued-bytes ceiling above which the oldest chunk is dropped.
    ///
    /// Dropping protects producer latency when the disk cannot keep up;
    /// each drop is surfaced as [`SinkEvent::Overflow`].
    ///
    /// [`SinkEvent::Overflow`]: crate::SinkEvent::Overflow
    pub high_water_mark: u64,
}

impl SinkConfig {
    /// Creates a config with the default high-water mark of
    /// `4 * segment_size_bytes`.
    pub fn new(segment_size_bytes: u64, path_template: impl Into<String>) -> Self {
        Self {
            segment_size_bytes,
            path_template: path_template.into(),
            high_water_mark: segment_size_bytes.saturating_mul(DEFAULT_HIGH_WATER_FACTOR),
        }
    }

    /// Counts `{}` placeholders in the path template.
    pub(crate) fn placeholder_count(&self) -> usize {
        self.path_template.matches(PATH_PLACEHOLDER).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_high_water_mark() {
        let config = SinkConfig::new(1024, "out_{}.pcm");
        assert_eq!(config.high_water_mark, 4096);
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(SinkConfig::new(1, "capture_{}.pcm").placeholder_count(), 1);
        assert_eq!(SinkConfig::new(1, "capture.pcm").placeholder_count(), 0);
        assert_eq!(SinkConfig::new(1, "{}_{}.pcm").placeholder_count(), 2);
    }

    #[test]
    fn test_high_water_saturates() {
        let config = SinkConfig::new(u64::MAX, "{}");
        assert_eq!(config.high_water_mark, u64::MAX);
    }
}
