//! Runtime settings: environment, optional JSON settings file and the
//! fixed length / quality presets offered to callers.

use crate::backend::BeamSettings;
use crate::error::ConfigError;
use crate::summarizer::Provider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Target summary length in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for LengthBounds {
    fn default() -> Self {
        LengthPreset::Medium.bounds()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPreset {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthPreset {
    pub fn bounds(self) -> LengthBounds {
        let (min_length, max_length) = match self {
            LengthPreset::Short => (60, 120),
            LengthPreset::Medium => (120, 200),
            LengthPreset::Long => (180, 360),
        };
        LengthBounds { min_length, max_length }
    }
}

impl FromStr for LengthPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(LengthPreset::Short),
            "medium" => Ok(LengthPreset::Medium),
            "long" => Ok(LengthPreset::Long),
            _ => Err(ConfigError::InvalidValue {
                field: "length",
                value: s.to_string(),
            }),
        }
    }
}

/// Speed/quality trade-off for the local backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Fast,
    #[default]
    Standard,
    High,
}

impl QualityPreset {
    pub fn beam_settings(self) -> BeamSettings {
        match self {
            QualityPreset::Fast => BeamSettings {
                num_beams: 2,
                no_repeat_ngram_size: 3,
                length_penalty: 1.0,
            },
            QualityPreset::Standard => BeamSettings::default(),
            QualityPreset::High => BeamSettings {
                num_beams: 8,
                no_repeat_ngram_size: 4,
                length_penalty: 1.2,
            },
        }
    }
}

impl FromStr for QualityPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(QualityPreset::Fast),
            "standard" => Ok(QualityPreset::Standard),
            "high" => Ok(QualityPreset::High),
            _ => Err(ConfigError::InvalidValue {
                field: "quality",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LengthPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LengthPreset::Short => "short",
            LengthPreset::Medium => "medium",
            LengthPreset::Long => "long",
        };
        f.write_str(label)
    }
}

/// Settings gathered from the environment and an optional settings file.
/// Every field is optional; unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Only ever read from the environment.
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: Option<String>,
    pub ollama_model: Option<String>,
    pub mode: Option<String>,
    pub provider: Option<Provider>,
    pub length: Option<LengthPreset>,
    pub quality: Option<QualityPreset>,
    pub temperature: Option<f32>,
    pub translate_to: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Settings {
            openai_api_key: var(OPENAI_API_KEY_VAR),
            openai_base_url: var("OPENAI_BASE_URL"),
            openai_model: var("OPENAI_MODEL"),
            ollama_model: var("OLLAMA_MODEL"),
            ..Settings::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Environment first, then the settings file on top of it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = Self::from_env();
        match path {
            Some(p) => Ok(env.merge(Self::from_file(p)?)),
            None => Ok(env),
        }
    }

    /// Fields set in `over` replace those in `self`.
    pub fn merge(self, over: Settings) -> Settings {
        Settings {
            openai_api_key: over.openai_api_key.or(self.openai_api_key),
            openai_base_url: over.openai_base_url.or(self.openai_base_url),
            openai_model: over.openai_model.or(self.openai_model),
            ollama_model: over.ollama_model.or(self.ollama_model),
            mode: over.mode.or(self.mode),
            provider: over.provider.or(self.provider),
            length: over.length.or(self.length),
            quality: over.quality.or(self.quality),
            temperature: over.temperature.or(self.temperature),
            translate_to: over.translate_to.or(self.translate_to),
        }
    }

    pub fn has_openai_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn openai_base_url(&self) -> &str {
        self.openai_base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    pub fn openai_model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn bounds(&self) -> LengthBounds {
        self.length.unwrap_or_default().bounds()
    }

    pub fn beam_settings(&self) -> BeamSettings {
        self.quality.unwrap_or_default().beam_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_length_presets() {
        assert_eq!(LengthPreset::Short.bounds(), LengthBounds { min_length: 60, max_length: 120 });
        assert_eq!(LengthPreset::Medium.bounds(), LengthBounds { min_length: 120, max_length: 200 });
        assert_eq!(LengthPreset::Long.bounds(), LengthBounds { min_length: 180, max_length: 360 });
        assert_eq!(LengthBounds::default(), LengthPreset::Medium.bounds());
    }

    #[test]
    fn test_quality_presets() {
        let fast = QualityPreset::Fast.beam_settings();
        assert_eq!((fast.num_beams, fast.no_repeat_ngram_size), (2, 3));
        assert_eq!(fast.length_penalty, 1.0);
        let high = QualityPreset::High.beam_settings();
        assert_eq!((high.num_beams, high.no_repeat_ngram_size), (8, 4));
        assert_eq!(QualityPreset::Standard.beam_settings(), BeamSettings::default());
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("Long".parse::<LengthPreset>().unwrap(), LengthPreset::Long);
        assert_eq!(" fast ".parse::<QualityPreset>().unwrap(), QualityPreset::Fast);
        let err = "tiny".parse::<LengthPreset>().unwrap_err();
        assert!(err.to_string().contains("tiny"));
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let vars: HashMap<&str, &str> =
            [("OPENAI_API_KEY", "   "), ("OLLAMA_MODEL", "gemma3:4b")].into_iter().collect();
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(!settings.has_openai_key());
        assert_eq!(settings.ollama_model.as_deref(), Some("gemma3:4b"));
        assert_eq!(settings.openai_model(), DEFAULT_OPENAI_MODEL);
        assert_eq!(settings.openai_base_url(), DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_file_overrides_environment() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{"provider": "local", "length": "short", "quality": "high", "ollama_model": "llama3"}}"#
        )?;

        let env = Settings {
            openai_api_key: Some("sk-test".into()),
            ollama_model: Some("mistral".into()),
            ..Settings::default()
        };
        let settings = env.merge(Settings::from_file(file.path())?);

        assert_eq!(settings.provider, Some(Provider::Local));
        assert_eq!(settings.bounds(), LengthPreset::Short.bounds());
        assert_eq!(settings.beam_settings().num_beams, 8);
        assert_eq!(settings.ollama_model.as_deref(), Some("llama3"));
        assert!(settings.has_openai_key());
        assert_eq!(settings.temperature(), DEFAULT_TEMPERATURE);
        Ok(())
    }

    #[test]
    fn test_file_rejects_unknown_fields() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"lenght": "short"}}"#)?;
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_file(Path::new("/nonexistent/docsum.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
