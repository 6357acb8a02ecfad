use std::path::Path;

use kinrec_embedstore::StoreConfig;
use kinrec_matcher::{Modality, ModalityConfig};
use serde::{Deserialize, Serialize};

use crate::error::RecognizeError;

/// Per-modality overrides as written in a config file. Unset fields keep
/// the modality default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensionality: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl ModalitySettings {
    fn resolve(&self, modality: Modality) -> ModalityConfig {
        let mut cfg = ModalityConfig::for_modality(modality);
        if let Some(dim) = self.dimensionality {
            cfg.dimensionality = dim;
        }
        if let Some(threshold) = self.threshold {
            cfg.threshold = threshold;
        }
        cfg
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    face: ModalitySettings,
    #[serde(default)]
    voice: ModalitySettings,
    #[serde(default)]
    store: StoreConfig,
}

/// Effective recognition configuration.
///
/// Built once at startup and handed to [`Recognizer::from_config`](crate::Recognizer::from_config).
/// Example file:
///
/// ```yaml
/// face:
///   threshold: 0.6
/// voice:
///   dimensionality: 240
///   threshold: 0.75
/// store:
///   max_dimensionality: 4096
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionConfig {
    pub face: ModalityConfig,
    pub voice: ModalityConfig,
    pub store: StoreConfig,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            face: ModalityConfig::face(),
            voice: ModalityConfig::voice(),
            store: StoreConfig::default(),
        }
    }
}

impl RecognitionConfig {
    /// Parses a YAML document. Missing sections keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, RecognizeError> {
        let file: ConfigFile = if yaml.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| RecognizeError::Config(e.to_string()))?
        };
        let cfg = Self {
            face: file.face.resolve(Modality::Face),
            voice: file.voice.resolve(Modality::Voice),
            store: file.store,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecognizeError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| RecognizeError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_yaml(&data)
    }

    /// Applies `KINREC_*` overrides looked up through `lookup`.
    ///
    /// Recognized keys: `KINREC_FACE_THRESHOLD`, `KINREC_FACE_DIM`,
    /// `KINREC_VOICE_THRESHOLD`, `KINREC_VOICE_DIM`, `KINREC_MAX_DIM`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, RecognizeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var::<f32, _>(&lookup, "KINREC_FACE_THRESHOLD")? {
            self.face.threshold = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "KINREC_FACE_DIM")? {
            self.face.dimensionality = v;
        }
        if let Some(v) = parse_var::<f32, _>(&lookup, "KINREC_VOICE_THRESHOLD")? {
            self.voice.threshold = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "KINREC_VOICE_DIM")? {
            self.voice.dimensionality = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "KINREC_MAX_DIM")? {
            self.store.max_dimensionality = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Result<Self, RecognizeError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn modality(&self, modality: Modality) -> &ModalityConfig {
        match modality {
            Modality::Face => &self.face,
            Modality::Voice => &self.voice,
        }
    }

    pub fn validate(&self) -> Result<(), RecognizeError> {
        for modality in Modality::ALL {
            let cfg = self.modality(modality);
            cfg.validate()
                .map_err(|e| RecognizeError::Config(format!("{modality}: {e}")))?;
            if cfg.dimensionality > self.store.max_dimensionality {
                return Err(RecognizeError::Config(format!(
                    "{modality}: dimensionality {} exceeds store max {}",
                    cfg.dimensionality, self.store.max_dimensionality
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, RecognizeError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RecognizeError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
