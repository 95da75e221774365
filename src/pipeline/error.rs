// Pipeline errors - terminal outcomes of a transform request

use crate::image_optimizer::ImageError;
use crate::origin::OriginError;

/// Why the orchestrator could not produce an image
///
/// Cache faults never appear here: they degrade to a miss.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("source unavailable: {0}")]
    OriginUnavailable(#[source] OriginError),

    #[error("image processing failed: {0}")]
    Processing(#[source] ImageError),

    #[error("watermark unavailable: {0}")]
    WatermarkUnavailable(#[source] OriginError),
}

impl From<ImageError> for PipelineError {
    fn from(err: ImageError) -> Self {
        PipelineError::Processing(err)
    }
}
