//! Error types for pcm-spool.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`BuildError`]): Prevent the sink from being created
//! - **Recoverable events**: Runtime I/O issues surfaced via
//!   [`EventCallback`](crate::EventCallback)

/// Fatal errors that prevent a sink from starting.
///
/// These are returned from [`SinkBuilder::spawn()`] and indicate a caller
/// bug or an unusable environment. Runtime failures (open failures, short
/// writes, overflow) never surface here - they are reported through the
/// event callback while the sink keeps running.
///
/// [`SinkBuilder::spawn()`]: crate::SinkBuilder::spawn
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The segment size threshold must be at least one byte.
    #[error("segment size must be >= 1 byte")]
    InvalidSegmentSize,

    /// The path template must contain exactly one `{}` placeholder.
    #[error("path template '{template}' must contain exactly one {{}} placeholder (found {placeholders})")]
    InvalidPathTemplate {
        /// The template that failed validation.
        template: String,
        /// Number of placeholders actually found.
        placeholders: usize,
    },

    /// The writer thread could not be spawned.
    #[error("failed to spawn writer thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_display() {
        let err = BuildError::InvalidPathTemplate {
            template: "capture.pcm".to_string(),
            placeholders: 0,
        };
        assert_eq!(
            err.to_string(),
            "path template 'capture.pcm' must contain exactly one {} placeholder (found 0)"
        );
    }

    #[test]
    fn test_invalid_segment_size_display() {
        let err = BuildError::InvalidSegmentSize;
        assert!(err.to_string().contains(">= 1"));
    }
}
