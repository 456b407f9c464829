// Local generative backend driven through the `ollama` command line.
// The model is picked once, on first use: an explicit override wins, otherwise
// the smallest installed model (fastest to load) is probed from `ollama list`.
use crate::backend::{GenerationRequest, GenerativeBackend, Tuning};
use crate::config::Settings;
use crate::error::BackendError;
use parking_lot::Mutex;
use std::process::Command;
use tracing::{debug, info};

pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const OLLAMA_PROGRAM: &str = "ollama";

pub struct OllamaBackend {
    program: String,
    model_override: Option<String>,
    resolved: Mutex<Option<String>>,
}

impl OllamaBackend {
    pub fn new(model_override: Option<String>) -> Self {
        Self {
            program: OLLAMA_PROGRAM.to_string(),
            model_override,
            resolved: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.ollama_model.clone())
    }

    /// Run a different executable with the same arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Model in use, resolving it on the first call.
    pub fn model(&self) -> String {
        let mut resolved = self.resolved.lock();
        if let Some(model) = resolved.as_ref() {
            return model.clone();
        }
        let model = self
            .model_override
            .clone()
            .or_else(|| probe_smallest_model(&self.program))
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        info!(model = %model, "using local model");
        *resolved = Some(model.clone());
        model
    }
}

impl GenerativeBackend for OllamaBackend {
    fn name(&self) -> &str {
        OLLAMA_PROGRAM
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError> {
        let model = self.model();
        let prompt = build_prompt(request);
        debug!(model = %model, words = request.text.split_whitespace().count(), "ollama run");

        let output = Command::new(&self.program)
            .arg("run")
            .arg(&model)
            .arg(&prompt)
            .output()
            .map_err(|e| BackendError::Process(format!("failed to invoke {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Process(format!(
                "{} run {} failed ({}): {}",
                self.program,
                model,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text)
    }
}

fn build_prompt(request: &GenerationRequest<'_>) -> String {
    let mut prompt = format!(
        "Summarize the following text in {} to {} words.\n",
        request.bounds.min_length, request.bounds.max_length
    );
    if let Tuning::Beam(beam) = request.tuning {
        if beam.no_repeat_ngram_size > 0 {
            prompt.push_str(&format!(
                "Never repeat any sequence of {} or more words.\n",
                beam.no_repeat_ngram_size
            ));
        }
        if beam.length_penalty > 1.0 {
            prompt.push_str("Prefer the upper end of the word range.\n");
        } else if beam.length_penalty < 1.0 {
            prompt.push_str("Prefer the lower end of the word range.\n");
        }
        if beam.num_beams > 1 {
            prompt.push_str(&format!(
                "Draft {} candidate summaries silently and output only the best one.\n",
                beam.num_beams
            ));
        }
    }
    prompt.push_str("Reply with the summary only.\n\nText:\n");
    prompt.push_str(request.text);
    prompt
}

fn probe_smallest_model(program: &str) -> Option<String> {
    let output = Command::new(program).arg("list").output().ok()?;
    if !output.status.success() {
        return None;
    }
    smallest_model(&String::from_utf8_lossy(&output.stdout))
}

/// Pick the smallest model from `ollama list` output.
/// Rows look like `NAME  ID  SIZE UNIT  MODIFIED...`, e.g. `gemma3:4b  a2af6cc3eb7f  3.3 GB  2 weeks ago`.
pub fn smallest_model(list_output: &str) -> Option<String> {
    let mut best: Option<(String, f64)> = None;
    for line in list_output.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            continue;
        }
        let size = cols.windows(2).skip(1).find_map(|pair| {
            let value = pair[0].parse::<f64>().ok()?;
            let scale = match pair[1].to_uppercase().as_str() {
                "GB" => 1024.0 * 1024.0 * 1024.0,
                "MB" => 1024.0 * 1024.0,
                "KB" => 1024.0,
                _ => 1.0,
            };
            Some(value * scale)
        });
        if let Some(size) = size {
            match &best {
                Some((_, best_size)) if *best_size <= size => {}
                _ => best = Some((cols[0].to_string(), size)),
            }
        }
    }
    best.map(|(name, _)| name)
}
