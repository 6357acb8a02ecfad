use async_trait::async_trait;
use kinrec_matcher::Modality;
use thiserror::Error;

/// What an extractor produced from one raw capture.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Vector(Vec<f32>),

    /// The capture held nothing usable, e.g. no face was detected or the
    /// audio was too short. This is a normal outcome, not a failure.
    NoFeatures { reason: String },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("extract: model error: {0}")]
    Model(String),

    #[error("extract: {modality} extractor returned {got} dimensions, want {want}")]
    Dimension {
        modality: Modality,
        got: usize,
        want: usize,
    },
}

/// Turns raw captures of one modality into embedding vectors.
///
/// Implementations wrap a pretrained model (Facenet512 for faces, MFCC
/// statistics for voice) and must be safe for concurrent use. A returned
/// vector must have exactly [`dimension`](Self::dimension) components.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    fn modality(&self) -> Modality;

    fn dimension(&self) -> usize;

    async fn extract(&self, capture: &[u8]) -> Result<Extraction, ExtractError>;
}
