use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Facenet512 output size.
pub const FACE_DIMENSIONALITY: usize = 512;
pub const FACE_THRESHOLD: f32 = 0.60;

/// 40 MFCC bands x {mean, std, min, max} plus 40 delta bands x {mean, std}.
pub const VOICE_DIMENSIONALITY: usize = 240;
pub const VOICE_THRESHOLD: f32 = 0.75;

/// Biometric channel a vector was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Face,
    Voice,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Face, Modality::Voice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(Self::Face),
            "voice" => Ok(Self::Voice),
            other => Err(format!("unknown modality {other:?}, want face or voice")),
        }
    }
}

/// Matching parameters of one modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityConfig {
    /// Fixed vector length of the modality.
    pub dimensionality: usize,

    /// Minimum cosine similarity, in `[0, 1]`, for a match to be accepted.
    pub threshold: f32,
}

impl ModalityConfig {
    pub fn face() -> Self {
        Self {
            dimensionality: FACE_DIMENSIONALITY,
            threshold: FACE_THRESHOLD,
        }
    }

    pub fn voice() -> Self {
        Self {
            dimensionality: VOICE_DIMENSIONALITY,
            threshold: VOICE_THRESHOLD,
        }
    }

    /// Returns the default configuration of `modality`.
    pub fn for_modality(modality: Modality) -> Self {
        match modality {
            Modality::Face => Self::face(),
            Modality::Voice => Self::voice(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_dimensionality(mut self, dim: usize) -> Self {
        self.dimensionality = dim;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.dimensionality == 0 {
            return Err(MatchError::Config(
                "dimensionality must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::Config(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }
}
