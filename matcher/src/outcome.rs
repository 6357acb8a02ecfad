use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of one identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The best record cleared the threshold.
    Match { owner_id: String, confidence: f32 },

    /// Nobody cleared the threshold. `confidence` is the best similarity
    /// observed (0.0 for an empty partition), for diagnostics.
    NoMatch { confidence: f32 },
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Self::Match { owner_id, .. } => Some(owner_id),
            Self::NoMatch { .. } => None,
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            Self::Match { confidence, .. } | Self::NoMatch { confidence } => *confidence,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match {
                owner_id,
                confidence,
            } => write!(f, "match {owner_id} ({confidence:.3})"),
            Self::NoMatch { confidence } => write!(f, "no match (best {confidence:.3})"),
        }
    }
}

/// Result of a 1:1 check against a claimed identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub owner_id: String,
    pub verified: bool,
    /// Best similarity among the owner's records, 0.0 if it has none.
    pub score: f32,
    pub threshold: f32,
}
