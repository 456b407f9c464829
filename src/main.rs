// docsum command line: summarize a single document or a directory of documents.
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use docsum::backend::{OllamaBackend, OpenAiBackend, OpenAiClient};
use docsum::export::{to_pdf_bytes, to_txt_bytes};
use docsum::extract::{extract_text, is_supported};
use docsum::nlp::top_keywords;
use docsum::summarizer::word_count;
use docsum::translate::{language_code, OpenAiTranslator, Translator};
use docsum::{LengthPreset, Mode, Provider, QualityPreset, Settings, SummaryOptions, Summarizer};

const LOG_ENV: &str = "DOCSUM_LOG";
const KEYWORD_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "docsum", about = "Summarize documents with extractive or generative methods")]
struct Cli {
    /// JSON settings file applied on top of the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one document, the given text, or stdin
    Summarize {
        /// .txt, .md, .pdf or .docx file
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,
        #[arg(short, long)]
        text: Option<String>,
        #[command(flatten)]
        options: SummaryArgs,
        /// Translate the summary, e.g. `en`, `ko` or `Japanese (ja)`
        #[arg(long)]
        translate: Option<String>,
        /// Also list the summary's most frequent words
        #[arg(long)]
        keywords: bool,
        #[arg(long)]
        out_txt: Option<PathBuf>,
        #[arg(long)]
        out_pdf: Option<PathBuf>,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Summarize every supported document under a directory, one output file each
    Batch {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[command(flatten)]
        options: SummaryArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct SummaryArgs {
    /// `extractive` or `abstractive`
    #[arg(short, long)]
    mode: Option<String>,
    /// `hosted` (openai) or `local` (ollama)
    #[arg(short, long)]
    provider: Option<Provider>,
    /// short, medium or long
    #[arg(short, long)]
    length: Option<LengthPreset>,
    /// fast, standard or high (local model only)
    #[arg(short, long)]
    quality: Option<QualityPreset>,
    /// Sampling temperature (hosted model only)
    #[arg(long)]
    temperature: Option<f32>,
    /// Ollama model, e.g. gemma3:4b. Probed from `ollama list` when omitted.
    #[arg(long)]
    model: Option<String>,
}

impl SummaryArgs {
    fn apply(&self, settings: Settings) -> Settings {
        settings.merge(Settings {
            mode: self.mode.clone(),
            provider: self.provider,
            length: self.length,
            quality: self.quality,
            temperature: self.temperature,
            ollama_model: self.model.clone(),
            ..Settings::default()
        })
    }
}

#[derive(Serialize, Debug)]
struct Report {
    mode: String,
    length: LengthPreset,
    original_words: usize,
    summary_words: usize,
    elapsed_secs: f64,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    translation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn notice(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(stderr, "{}", message);
    let _ = stderr.reset();
}

/// Mode named in the settings, defaulting to the hosted model when a key is
/// configured. The flag is set when hosted was requested without a key and
/// the local model is used instead.
fn resolve_mode(settings: &Settings) -> Result<(Mode, bool)> {
    let has_key = settings.has_openai_key();
    let name = settings
        .mode
        .as_deref()
        .unwrap_or(if has_key { "abstractive" } else { "extractive" });
    let provider = settings
        .provider
        .unwrap_or(if has_key { Provider::Hosted } else { Provider::Local });

    let mode = Mode::parse(name, provider)?;
    if mode == Mode::Abstractive(Provider::Hosted) && !has_key {
        return Ok((Mode::Abstractive(Provider::Local), true));
    }
    Ok((mode, false))
}

fn summary_options(settings: &Settings) -> SummaryOptions {
    SummaryOptions {
        bounds: settings.bounds(),
        temperature: settings.temperature(),
        beam: settings.beam_settings(),
    }
}

fn build_summarizer(settings: &Settings) -> Result<Summarizer> {
    let mut summarizer = Summarizer::new().with_local(OllamaBackend::from_settings(settings));
    if settings.has_openai_key() {
        let client = OpenAiClient::from_settings(settings)?;
        summarizer = summarizer.with_hosted(OpenAiBackend::new(client));
    }
    Ok(summarizer)
}

fn read_input(input: Option<&Path>, text: Option<&str>) -> Result<String> {
    if let Some(path) = input {
        return extract_text(path).with_context(|| format!("failed to read {}", path.display()));
    }
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn translate_summary(settings: &Settings, summary: &str, target: &str) -> Option<String> {
    if !settings.has_openai_key() {
        notice("OPENAI_API_KEY is not set; skipping translation");
        return None;
    }
    let translated = OpenAiClient::from_settings(settings)
        .map(OpenAiTranslator::new)
        .map_err(Into::into)
        .and_then(|translator| translator.translate(summary, language_code(target)));
    match translated {
        Ok(text) => Some(text),
        Err(e) => {
            notice(&format!("translation failed: {e}"));
            None
        }
    }
}

fn print_report(report: &Report) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(stdout, "Summary ({}, {})", report.mode, report.length)?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        stdout,
        "original {} words -> summary {} words | {:.2}s",
        report.original_words, report.summary_words, report.elapsed_secs
    )?;
    stdout.reset()?;
    writeln!(stdout, "\n{}", report.summary)?;

    if !report.keywords.is_empty() {
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "\nKeywords: ")?;
        stdout.reset()?;
        writeln!(stdout, "{}", report.keywords.join(", "))?;
    }

    if let Some(translation) = &report.translation {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(stdout, "\nTranslation")?;
        stdout.reset()?;
        writeln!(stdout, "{}", translation)?;
    }
    Ok(())
}

fn run_summarize(
    settings: &Settings,
    input: Option<&Path>,
    text: Option<&str>,
    keywords: bool,
    out_txt: Option<&Path>,
    out_pdf: Option<&Path>,
    json: bool,
) -> Result<()> {
    let text = read_input(input, text)?;
    if text.trim().is_empty() {
        notice("nothing to summarize: pass --input, --text or pipe text on stdin");
        return Ok(());
    }

    let (mode, fell_back) = resolve_mode(settings)?;
    if fell_back {
        notice("OPENAI_API_KEY is not set; using the local model instead");
    }
    let options = summary_options(settings);
    let summarizer = build_summarizer(settings)?;

    let pb = spinner("summarizing")?;
    let start = Instant::now();
    let result = summarizer.summarize(&text, mode, &options);
    pb.finish_and_clear();
    let summary = result.context("summarization failed")?;
    let elapsed = start.elapsed();

    if summary.is_empty() {
        notice("the summary is empty");
        return Ok(());
    }
    info!(mode = %mode, elapsed_ms = elapsed.as_millis() as u64, "summary ready");

    let keywords = if keywords {
        top_keywords(&summary, KEYWORD_LIMIT)
    } else {
        Vec::new()
    };
    let translation = settings
        .translate_to
        .as_deref()
        .and_then(|target| translate_summary(settings, &summary, target));

    let report = Report {
        mode: mode.to_string(),
        length: settings.length.unwrap_or_default(),
        original_words: word_count(&text),
        summary_words: word_count(&summary),
        elapsed_secs: elapsed.as_secs_f64(),
        summary,
        translation,
        keywords,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report)?;
    }

    let final_text = report.translation.as_deref().unwrap_or(&report.summary);
    if let Some(path) = out_txt {
        fs::write(path, to_txt_bytes(final_text))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = out_pdf {
        match to_pdf_bytes(final_text) {
            Ok(bytes) => fs::write(path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?,
            Err(e) => notice(&format!("PDF export failed ({e}); only the text export is available")),
        }
    }
    Ok(())
}

fn collect_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_supported(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// `<out>/<relative dir>/<file name>.summary.txt`, so `a.txt` and `a.pdf` never collide.
fn summary_path(dir: &Path, out: &Path, document: &Path) -> PathBuf {
    let relative = document.strip_prefix(dir).unwrap_or(document);
    let name = relative
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
    out.join(parent).join(format!("{name}.summary.txt"))
}

fn run_batch(settings: &Settings, dir: &Path, out: &Path) -> Result<()> {
    let files = collect_documents(dir);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let docs: Vec<(PathBuf, String)> = files
        .par_iter()
        .filter_map(|p| {
            let extracted = extract_text(p);
            pb.inc(1);
            match extracted {
                Ok(text) => Some((p.clone(), text)),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "skipping unreadable document");
                    None
                }
            }
        })
        .collect();
    pb.finish_with_message("extracted");

    let (mode, fell_back) = resolve_mode(settings)?;
    if fell_back {
        notice("OPENAI_API_KEY is not set; using the local model instead");
    }
    let options = summary_options(settings);
    let summarizer = build_summarizer(settings)?;

    let mut written = 0usize;
    let mut failed = 0usize;
    for (path, text) in &docs {
        let summary = match summarizer.summarize(text, mode, &options) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "summarization failed");
                failed += 1;
                continue;
            }
        };
        if summary.is_empty() {
            continue;
        }
        let target = summary_path(dir, out, path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, to_txt_bytes(&summary))
            .with_context(|| format!("failed to write {}", target.display()))?;
        written += 1;
    }

    println!("Wrote {} summaries to {}", written, out.display());
    if failed > 0 {
        notice(&format!("{failed} documents could not be summarized"));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Summarize {
            input,
            text,
            options,
            translate,
            keywords,
            out_txt,
            out_pdf,
            json,
        } => {
            let mut settings = options.apply(settings);
            if translate.is_some() {
                settings.translate_to = translate;
            }
            run_summarize(
                &settings,
                input.as_deref(),
                text.as_deref(),
                keywords,
                out_txt.as_deref(),
                out_pdf.as_deref(),
                json,
            )?
        }
        Commands::Batch { dir, out, options } => {
            run_batch(&options.apply(settings), &dir, &out)?
        }
    }
    Ok(())
}
