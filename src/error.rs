//! Error types for the summarization core and its boundary adapters.

use crate::summarizer::Provider;
use std::path::PathBuf;

/// Failures of a generative or translation backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("backend process failed: {0}")]
    Process(String),

    #[error("backend returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("invalid mode: {0:?} (expected \"extractive\" or \"abstractive\")")]
    InvalidMode(String),

    #[error("no backend configured for provider {0}")]
    BackendUnavailable(Provider),

    #[error("summarization backend failed: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("target language must not be empty")]
    EmptyTarget,

    #[error("translation backend failed: {0}")]
    Backend(#[from] BackendError),
}
