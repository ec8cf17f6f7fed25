//! Sentiment Analysis Form - Main Entry Point
//!
//! Loads the model artifacts, then answers review text typed at the terminal
//! (or passed once with `--text`) with a sentiment notice.

use anyhow::Result;
use clap::Parser;
use sentiment_form::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    form::{self, Form, CREDIT, FOOTER},
    metrics::SessionMetrics,
    AnalysisType, InferenceService, Submission,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "sentiment-form",
    version,
    about = "Sentiment analysis over pre-trained artifacts"
)]
struct Cli {
    /// Configuration file (optional; environment overrides apply either way)
    #[arg(long, env = "SENTIMENT_FORM_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Analyze this text once and exit
    #[arg(long)]
    text: Option<String>,

    /// Show prediction confidence
    #[arg(long)]
    confidence: bool,

    /// Analysis type: product, service or general
    #[arg(long)]
    analysis_type: Option<AnalysisType>,

    /// Print each notice as a JSON line
    #[arg(long)]
    json: bool,

    /// Log level for this crate, overriding the configuration
    #[arg(long)]
    log_level: Option<String>,
}

/// Sidebar settings that persist across submissions
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    want_confidence: bool,
    analysis_type: AnalysisType,
    json: bool,
}

/// One line of interactive input
#[derive(Debug, PartialEq)]
enum Command {
    Submit(String),
    Clear,
    Confidence(bool),
    Type(AnalysisType),
    Help,
    Quit,
}

impl Command {
    /// Lines starting with a known `:name` are commands; anything else,
    /// including reviews like ":) loved it", is submitted as text.
    fn parse(line: &str) -> Result<Self, String> {
        let submit = || Ok(Command::Submit(line.to_string()));
        let Some(rest) = line.trim_start().strip_prefix(':') else {
            return submit();
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.collect::<Vec<_>>().join(" ");

        match name {
            "clear" => Ok(Command::Clear),
            "confidence" => match arg.as_str() {
                "on" => Ok(Command::Confidence(true)),
                "off" => Ok(Command::Confidence(false)),
                other => Err(format!("expected ':confidence on|off', got '{}'", other)),
            },
            "type" => arg.parse().map(Command::Type),
            "help" => Ok(Command::Help),
            "quit" | "q" => Ok(Command::Quit),
            _ => submit(),
        }
    }
}

const HELP: &str = "Type a review and press Enter.\n\
  :confidence on|off   toggle the confidence score\n\
  :type product|service|general\n\
  :clear               reset the form\n\
  :quit                exit";

fn init_logging(config: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or(config.level.as_str());
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("sentiment_form={}", level).parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format.as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.init(),
    }
    Ok(())
}

fn render_settings(settings: &Settings) -> String {
    format!(
        "Analysis type: {} | Confidence: {}",
        settings.analysis_type,
        if settings.want_confidence { "on" } else { "off" }
    )
}

/// Header, current settings and credit line
fn render_banner(settings: &Settings) -> String {
    format!(
        "{}\n{}\n{}\n",
        form::header(),
        render_settings(settings),
        CREDIT
    )
}

/// Read one line of raw input, replacing invalid UTF-8 rather than failing.
/// Returns `None` at end of input.
async fn read_review_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn submit(form: &Form, settings: &Settings, metrics: &SessionMetrics, text: &str) -> Result<()> {
    let start = Instant::now();
    let submission = Submission::new(text)
        .with_confidence(settings.want_confidence)
        .with_analysis_type(settings.analysis_type);
    let response = form.submit(&submission);
    metrics.record(response.notice.kind(), start.elapsed());

    if settings.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", response.notice);
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("✍️  > ");
    std::io::stdout().flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_path(&cli.config)?;
    init_logging(&config.logging, cli.log_level.as_deref())?;
    info!(config = %cli.config.display(), "Starting sentiment form");

    let service = InferenceService::from_config(&config.artifacts);
    if let Some(reason) = service.unavailable_reason() {
        warn!(reason = %reason, "Predictions disabled until model files are provided");
    }
    let form = Form::new(service);

    let mut settings = Settings {
        want_confidence: cli.confidence || config.form.show_confidence,
        analysis_type: cli.analysis_type.unwrap_or(config.form.analysis_type),
        json: cli.json,
    };
    let metrics = SessionMetrics::new();

    if let Some(text) = cli.text.as_deref() {
        return submit(&form, &settings, &metrics, text);
    }

    println!("{}", render_banner(&settings));
    prompt()?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    loop {
        let line = tokio::select! {
            line = read_review_line(&mut stdin, &mut buf) => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match Command::parse(&line) {
            Ok(Command::Submit(text)) => submit(&form, &settings, &metrics, &text)?,
            Ok(Command::Clear) => {
                print!("\x1B[2J\x1B[H");
                println!("{}", render_banner(&settings));
            }
            Ok(Command::Confidence(on)) => {
                settings.want_confidence = on;
                println!("{}", render_settings(&settings));
            }
            Ok(Command::Type(analysis_type)) => {
                settings.analysis_type = analysis_type;
                println!("{}", render_settings(&settings));
            }
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => break,
            Err(e) => println!("{}\n{}", e, HELP),
        }
        prompt()?;
    }

    println!("\n{}", FOOTER);
    info!("Sentiment form shutting down...");
    metrics.print_summary();

    Ok(())
}
