//! Errors raised by the raster processor

/// Failure while decoding, resizing, encoding or compositing an image
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageError {
    #[error("source bytes are not a decodable image: {message}")]
    DecodeFailed { message: String },

    /// Declared dimensions would decode to more pixels than allowed
    #[error("{width}x{height} image ({pixels} pixels) is over the {max_pixels} pixel limit")]
    ImageBombDetected {
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },

    #[error("resize failed: {message}")]
    ResizeFailed { message: String },

    #[error("{format} encoding failed: {message}")]
    EncodeFailed { format: String, message: String },

    #[error("bad value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// The spawn_blocking task panicked or was cancelled
    #[error("image worker did not finish: {message}")]
    TaskFailed { message: String },
}

impl ImageError {
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        Self::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: &str, message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            format: format.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_param(param: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }

    pub fn image_bomb(width: u32, height: u32, max_pixels: u64) -> Self {
        Self::ImageBombDetected {
            width,
            height,
            pixels: u64::from(width) * u64::from(height),
            max_pixels,
        }
    }
}

impl From<tokio::task::JoinError> for ImageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message() {
        let err = ImageError::decode_failed("bad header");
        assert_eq!(
            err.to_string(),
            "source bytes are not a decodable image: bad header"
        );
    }

    #[test]
    fn test_image_bomb_reports_pixel_counts() {
        let msg = ImageError::image_bomb(20_000, 20_000, 100_000_000).to_string();
        assert!(msg.contains("20000x20000"));
        assert!(msg.contains("400000000 pixels"));
        assert!(msg.contains("100000000 pixel limit"));
    }

    #[test]
    fn test_encode_message_names_format() {
        let err = ImageError::encode_failed("avif", "out of memory");
        assert_eq!(err.to_string(), "avif encoding failed: out of memory");
    }

    #[tokio::test]
    async fn test_panicked_worker_becomes_task_failed() {
        let join_err = tokio::task::spawn_blocking(|| panic!("boom"))
            .await
            .unwrap_err();
        assert!(matches!(
            ImageError::from(join_err),
            ImageError::TaskFailed { .. }
        ));
    }
}
