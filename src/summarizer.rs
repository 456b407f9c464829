//! Summarization entry point: picks the extractive or abstractive path and
//! normalizes every result through sentence deduplication.

use crate::abstractive::summarize_chunked;
use crate::backend::{BeamSettings, GenerationRequest, GenerativeBackend, Tuning};
use crate::config::{LengthBounds, DEFAULT_TEMPERATURE};
use crate::error::{ConfigError, SummarizeError};
use crate::nlp::chunking::ChunkConfig;
use crate::nlp::extractive::summarize_extractive;
use crate::nlp::sentences::deduplicate_sentences;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Which generative backend serves abstractive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Hosted chat-completion API, single call per document.
    #[serde(alias = "openai")]
    Hosted,
    /// Local model, fed window by window.
    #[default]
    #[serde(alias = "ollama")]
    Local,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Hosted => f.write_str("hosted"),
            Provider::Local => f.write_str("local"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosted" | "openai" => Ok(Provider::Hosted),
            "local" | "ollama" => Ok(Provider::Local),
            _ => Err(ConfigError::InvalidValue {
                field: "provider",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Extractive,
    Abstractive(Provider),
}

impl Mode {
    /// Resolve a mode name as written in settings files or on the command
    /// line. `provider` only matters for `"abstractive"`.
    pub fn parse(mode: &str, provider: Provider) -> Result<Self, SummarizeError> {
        match mode.trim().to_lowercase().as_str() {
            "extractive" => Ok(Mode::Extractive),
            "abstractive" => Ok(Mode::Abstractive(provider)),
            _ => Err(SummarizeError::InvalidMode(mode.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Extractive => f.write_str("extractive"),
            Mode::Abstractive(provider) => write!(f, "abstractive ({provider})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryOptions {
    pub bounds: LengthBounds,
    /// Hosted backend only.
    pub temperature: f32,
    /// Local backend only.
    pub beam: BeamSettings,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            bounds: LengthBounds::default(),
            temperature: DEFAULT_TEMPERATURE,
            beam: BeamSettings::default(),
        }
    }
}

/// Summarization facade. Backends are injected once by the host and reused
/// for every call; the facade itself keeps no state between calls.
#[derive(Default)]
pub struct Summarizer {
    hosted: Option<Box<dyn GenerativeBackend>>,
    local: Option<Box<dyn GenerativeBackend>>,
    chunking: ChunkConfig,
}

impl Summarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hosted(mut self, backend: impl GenerativeBackend + 'static) -> Self {
        self.hosted = Some(Box::new(backend));
        self
    }

    pub fn with_local(mut self, backend: impl GenerativeBackend + 'static) -> Self {
        self.local = Some(Box::new(backend));
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn has_provider(&self, provider: Provider) -> bool {
        self.backend(provider).is_some()
    }

    fn backend(&self, provider: Provider) -> Option<&dyn GenerativeBackend> {
        match provider {
            Provider::Hosted => self.hosted.as_deref(),
            Provider::Local => self.local.as_deref(),
        }
    }

    /// Summarize `text`. Blank input yields an empty summary without touching
    /// any backend.
    ///
    /// Only a failing hosted call is reported as an error; the local path
    /// recovers from backend failures on its own.
    pub fn summarize(
        &self,
        text: &str,
        mode: Mode,
        options: &SummaryOptions,
    ) -> Result<String, SummarizeError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("empty input, nothing to summarize");
            return Ok(String::new());
        }

        info!(%mode, words = text.split_whitespace().count(), "summarizing");
        match mode {
            Mode::Extractive => Ok(summarize_extractive(text, options.bounds)),
            Mode::Abstractive(provider) => {
                let backend = self
                    .backend(provider)
                    .ok_or(SummarizeError::BackendUnavailable(provider))?;
                match provider {
                    Provider::Hosted => {
                        let request = GenerationRequest {
                            text,
                            bounds: options.bounds,
                            tuning: Tuning::Sampling {
                                temperature: options.temperature,
                            },
                        };
                        let summary = backend.generate(&request)?;
                        Ok(deduplicate_sentences(summary.trim()))
                    }
                    Provider::Local => Ok(summarize_chunked(
                        backend,
                        text,
                        options.bounds,
                        options.beam,
                        self.chunking,
                    )),
                }
            }
        }
    }
}

/// Whitespace-separated word count, as reported to users.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
