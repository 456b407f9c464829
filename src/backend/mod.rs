//! Generative backends used by abstractive summarization.
//!
//! The core only sees [`GenerativeBackend`]: text plus target word range in,
//! text out. Concrete backends are constructed by the host application and
//! injected into [`crate::summarizer::Summarizer`].

pub mod ollama;
pub mod openai;

pub use ollama::OllamaBackend;
pub use openai::{OpenAiBackend, OpenAiClient};

use crate::config::LengthBounds;
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

/// Decoding controls for backends that search over candidate outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSettings {
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub length_penalty: f32,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            num_beams: 4,
            no_repeat_ngram_size: 3,
            length_penalty: 1.1,
        }
    }
}

impl BeamSettings {
    /// Same settings with at least `min_beams` beams.
    pub fn widened(self, min_beams: u32) -> Self {
        Self {
            num_beams: self.num_beams.max(min_beams),
            ..self
        }
    }
}

/// Backend-specific tuning carried with each request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tuning {
    Sampling { temperature: f32 },
    Beam(BeamSettings),
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub text: &'a str,
    pub bounds: LengthBounds,
    pub tuning: Tuning,
}

pub trait GenerativeBackend {
    /// Short label for logs.
    fn name(&self) -> &str;

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError>;
}
