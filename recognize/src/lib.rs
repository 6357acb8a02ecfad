//! Recognition front end over the face and voice matchers.
//!
//! [`Recognizer`] owns one [`Matcher`](kinrec_matcher::Matcher) per
//! modality and, optionally, a [`FeatureExtractor`] per modality that
//! turns raw captures (images, audio) into embedding vectors. Vectors are
//! L2-normalized before they are stored or matched.
//!
//! Extraction failure ("no face in the image") is kept apart from
//! "nobody matched": [`Recognition::NoFeatures`] versus
//! [`Recognition::NotMatched`].

mod config;
mod error;
mod extract;
mod payload;
mod recognizer;

pub use config::{ModalitySettings, RecognitionConfig};
pub use error::RecognizeError;
pub use extract::{ExtractError, Extraction, FeatureExtractor};
pub use payload::decode_payload;
pub use recognizer::{Recognition, Recognizer};
