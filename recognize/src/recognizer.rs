use std::sync::Arc;

use kinrec_embedstore::{EmbeddingStore, RecordId, StoreError, ValidationError};
use kinrec_matcher::{Matcher, Modality, Outcome, Verification};
use serde::{Deserialize, Serialize};

use crate::config::RecognitionConfig;
use crate::error::RecognizeError;
use crate::extract::{ExtractError, Extraction, FeatureExtractor};

/// Result of recognizing a raw capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recognition {
    Matched { owner_id: String, confidence: f32 },

    /// Features were extracted but no enrollment cleared the threshold.
    NotMatched { confidence: f32 },

    /// Nothing could be extracted from the capture.
    NoFeatures { reason: String },
}

impl Recognition {
    pub fn recognized(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Self::Matched { owner_id, .. } => Some(owner_id),
            _ => None,
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            Self::Matched { confidence, .. } | Self::NotMatched { confidence } => *confidence,
            Self::NoFeatures { .. } => 0.0,
        }
    }
}

impl From<Outcome> for Recognition {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Match {
                owner_id,
                confidence,
            } => Self::Matched {
                owner_id,
                confidence,
            },
            Outcome::NoMatch { confidence } => Self::NotMatched { confidence },
        }
    }
}

struct Channel {
    matcher: Matcher,
    extractor: Option<Arc<dyn FeatureExtractor>>,
}

/// Routes enrollments and queries to the matcher of their modality.
pub struct Recognizer {
    face: Channel,
    voice: Channel,
}

impl Recognizer {
    /// Creates a recognizer from one matcher per modality.
    pub fn new(face: Matcher, voice: Matcher) -> Result<Self, RecognizeError> {
        for (want, matcher) in [(Modality::Face, &face), (Modality::Voice, &voice)] {
            if matcher.modality() != want {
                return Err(RecognizeError::Config(format!(
                    "{want} slot given a {} matcher",
                    matcher.modality()
                )));
            }
        }
        Ok(Self {
            face: Channel {
                matcher: face,
                extractor: None,
            },
            voice: Channel {
                matcher: voice,
                extractor: None,
            },
        })
    }

    /// Builds both matchers from `cfg`. Each modality gets its own store
    /// so face and voice enrollments never meet in one partition.
    pub fn from_config(
        cfg: &RecognitionConfig,
        face_store: Arc<dyn EmbeddingStore>,
        voice_store: Arc<dyn EmbeddingStore>,
    ) -> Result<Self, RecognizeError> {
        cfg.validate()?;
        let face = Matcher::new(Modality::Face, cfg.face.clone(), face_store)?;
        let voice = Matcher::new(Modality::Voice, cfg.voice.clone(), voice_store)?;
        Self::new(face, voice)
    }

    /// Registers the extractor of `extractor.modality()`, replacing any
    /// previous one.
    pub fn with_extractor(
        mut self,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Result<Self, RecognizeError> {
        let modality = extractor.modality();
        let channel = self.channel_mut(modality);
        let want = channel.matcher.config().dimensionality;
        if extractor.dimension() != want {
            return Err(RecognizeError::Config(format!(
                "{modality} extractor produces {} dimensions, matcher wants {want}",
                extractor.dimension()
            )));
        }
        channel.extractor = Some(extractor);
        Ok(self)
    }

    fn channel(&self, modality: Modality) -> &Channel {
        match modality {
            Modality::Face => &self.face,
            Modality::Voice => &self.voice,
        }
    }

    fn channel_mut(&mut self, modality: Modality) -> &mut Channel {
        match modality {
            Modality::Face => &mut self.face,
            Modality::Voice => &mut self.voice,
        }
    }

    pub fn matcher(&self, modality: Modality) -> &Matcher {
        &self.channel(modality).matcher
    }

    /// Enrolls an already extracted vector for `owner_id` in `partition_key`.
    pub async fn enroll_vector(
        &self,
        modality: Modality,
        owner_id: &str,
        partition_key: &str,
        vector: &[f32],
    ) -> Result<RecordId, RecognizeError> {
        let matcher = self.matcher(modality);
        let want = matcher.config().dimensionality;
        if vector.is_empty() {
            return Err(ValidationError::EmptyVector.into());
        }
        if vector.len() != want {
            return Err(ValidationError::DimensionMismatch {
                got: vector.len(),
                want,
            }
            .into());
        }
        if let Some(index) = kinrec_vecmath::first_non_finite(vector) {
            return Err(ValidationError::NonFinite { index }.into());
        }

        let unit = kinrec_vecmath::normalized(vector);
        let id = matcher
            .store()
            .enroll(owner_id, partition_key, &unit)
            .await?;
        tracing::info!(%modality, %id, owner_id, partition_key, "recognize: enrolled");
        Ok(id)
    }

    /// Extracts features from `capture` and enrolls them.
    ///
    /// A capture without usable features is an error here: there is
    /// nothing to enroll.
    pub async fn enroll(
        &self,
        modality: Modality,
        owner_id: &str,
        partition_key: &str,
        capture: &[u8],
    ) -> Result<RecordId, RecognizeError> {
        match self.extract(modality, capture).await? {
            Extraction::Vector(vector) => {
                self.enroll_vector(modality, owner_id, partition_key, &vector)
                    .await
            }
            Extraction::NoFeatures { reason } => {
                tracing::warn!(%modality, owner_id, %reason, "recognize: enrollment has no features");
                Err(RecognizeError::NoFeatures { modality, reason })
            }
        }
    }

    /// Identifies the owner of an already extracted vector.
    pub async fn recognize_vector(
        &self,
        modality: Modality,
        partition_key: &str,
        vector: &[f32],
    ) -> Result<Outcome, RecognizeError> {
        let matcher = self.matcher(modality);
        matcher.check_query(vector).map_err(kinrec_matcher::MatchError::from)?;
        let unit = kinrec_vecmath::normalized(vector);
        Ok(matcher.identify(partition_key, &unit).await?)
    }

    /// Extracts features from `capture` and identifies their owner.
    pub async fn recognize(
        &self,
        modality: Modality,
        partition_key: &str,
        capture: &[u8],
    ) -> Result<Recognition, RecognizeError> {
        match self.extract(modality, capture).await? {
            Extraction::Vector(vector) => Ok(self
                .recognize_vector(modality, partition_key, &vector)
                .await?
                .into()),
            Extraction::NoFeatures { reason } => {
                tracing::warn!(%modality, partition_key, %reason, "recognize: capture has no features");
                Ok(Recognition::NoFeatures { reason })
            }
        }
    }

    /// Checks an already extracted vector against a claimed owner.
    pub async fn verify_vector(
        &self,
        modality: Modality,
        partition_key: &str,
        owner_id: &str,
        vector: &[f32],
    ) -> Result<Verification, RecognizeError> {
        let matcher = self.matcher(modality);
        matcher.check_query(vector).map_err(kinrec_matcher::MatchError::from)?;
        let unit = kinrec_vecmath::normalized(vector);
        Ok(matcher.verify(partition_key, owner_id, &unit).await?)
    }

    /// Removes every face and voice enrollment of `owner_id`.
    /// Returns the total number of records removed.
    ///
    /// Every modality store is tried even if an earlier one fails. On
    /// failure the error is [`RecognizeError::PartialRemoval`], carrying
    /// the first failing modality and the count that was removed anyway.
    pub async fn remove_owner(&self, owner_id: &str) -> Result<usize, RecognizeError> {
        let mut removed = 0;
        let mut failure: Option<(Modality, StoreError)> = None;
        for modality in Modality::ALL {
            match self.matcher(modality).store().remove_by_owner(owner_id).await {
                Ok(n) => removed += n,
                Err(e) => {
                    tracing::warn!(%modality, owner_id, error = %e, "recognize: remove failed");
                    if failure.is_none() {
                        failure = Some((modality, e));
                    }
                }
            }
        }
        if let Some((modality, source)) = failure {
            return Err(RecognizeError::PartialRemoval {
                removed,
                modality,
                source,
            });
        }
        tracing::info!(owner_id, removed, "recognize: removed owner");
        Ok(removed)
    }

    async fn extract(
        &self,
        modality: Modality,
        capture: &[u8],
    ) -> Result<Extraction, RecognizeError> {
        let extractor = self
            .channel(modality)
            .extractor
            .as_ref()
            .ok_or(RecognizeError::NoExtractor(modality))?;
        let extraction = extractor.extract(capture).await?;
        if let Extraction::Vector(v) = &extraction {
            let want = extractor.dimension();
            if v.len() != want {
                return Err(ExtractError::Dimension {
                    modality,
                    got: v.len(),
                    want,
                }
                .into());
            }
        }
        Ok(extraction)
    }
}
