//! docsum: extractive and abstractive document summarization.
//!
//! The extractive path is a word-frequency sentence ranker; the abstractive
//! path feeds overlapping word windows to an injected generative backend and
//! merges the partial summaries. Both end in sentence deduplication.

pub mod abstractive;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod nlp;
pub mod summarizer;
pub mod translate;

pub use backend::{BeamSettings, GenerationRequest, GenerativeBackend, Tuning};
pub use config::{LengthBounds, LengthPreset, QualityPreset, Settings};
pub use error::{BackendError, SummarizeError};
pub use summarizer::{Mode, Provider, SummaryOptions, Summarizer};
