//! Detection engine error taxonomy.

/// Failure modes of the detection engine adapter.
///
/// Neither variant is retried; both surface to the original caller once.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The input bytes are not a decodable image.
    #[error("could not decode uploaded image: {0}")]
    ImageDecode(String),

    /// The model artifact could not be loaded at startup.
    #[error("failed to load detection model from {path}: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: ort::Error,
    },

    /// The model invocation failed for any reason.
    #[error("inference failed: {0}")]
    Inference(String),
}
