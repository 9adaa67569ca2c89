//! Error types for facelink

use thiserror::Error;

/// Core facelink errors
#[derive(Error, Debug)]
pub enum FacelinkError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Blendshape count is {actual} but should be {expected}")]
    ChannelCount { expected: usize, actual: u8 },

    // Frame errors
    #[error("Only frame rates of at least 1 fps are allowed, got {0}")]
    InvalidFrameRate(u32),

    #[error("Filter size must be at least 1, got {0}")]
    InvalidFilterSize(usize),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    // Geometry errors
    #[error("Not enough landmarks: expected at least {expected}, got {actual}")]
    NotEnoughLandmarks { expected: usize, actual: usize },

    // Configuration errors
    #[error("Invalid configuration value: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl FacelinkError {
    /// True for errors that mean "this payload is not a well-formed frame"
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            FacelinkError::InvalidWireFormat(_)
                | FacelinkError::BufferTooShort { .. }
                | FacelinkError::ChannelCount { .. }
        )
    }
}

/// Result type for facelink operations
pub type FacelinkResult<T> = Result<T, FacelinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_count_message() {
        let err = FacelinkError::ChannelCount {
            expected: 61,
            actual: 52,
        };
        assert_eq!(
            err.to_string(),
            "Blendshape count is 52 but should be 61"
        );
        assert!(err.is_format_error());
    }

    #[test]
    fn test_frame_rate_is_not_format_error() {
        assert!(!FacelinkError::InvalidFrameRate(0).is_format_error());
    }
}
