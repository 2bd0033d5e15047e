//! Summarize a file or stdin from the command line, without the web server
//! or the feedback database.
//!
//! Usage:
//!   cargo run --bin summarize -- article.txt
//!   cargo run --bin summarize -- --lang hi --min 20 --max 80 report.pdf
//!   cat notes.txt | cargo run --bin summarize -- --from fr
//!
//! Required environment variables:
//! - HF_TOKEN
//!
//! Optional: HF_API_URL, SUMMARIZATION_MODEL, TRANSLATION_MODEL,
//! REQUEST_TIMEOUT_SECS, GATEWAY_MAX_ATTEMPTS

use anyhow::{bail, Context, Result};
use multilingual_summarizer::{
    config::Config,
    extract::{extract_document_text, file_extension},
    i18n::LanguageCatalog,
    metrics::GatewayMetrics,
    pipeline::{SummarizationOutcome, SummarizationRequest, SummaryPipeline},
    summarizer::{LengthBounds, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH},
};
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

const UNSUPPORTED_EXIT_STATUS: u8 = 2;

const USAGE: &str = "Usage: summarize [--lang CODE] [--from CODE] [--min N] [--max N] [FILE]";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    output_language: Option<String>,
    input_language: Option<String>,
    min_length: Option<u32>,
    max_length: Option<u32>,
    file: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lang" => parsed.output_language = Some(flag_value(&mut iter, arg)?.to_string()),
            "--from" => parsed.input_language = Some(flag_value(&mut iter, arg)?.to_string()),
            "--min" => parsed.min_length = Some(parse_length(flag_value(&mut iter, arg)?)?),
            "--max" => parsed.max_length = Some(parse_length(flag_value(&mut iter, arg)?)?),
            other if other.starts_with("--") => bail!("Unknown option {}\n{}", other, USAGE),
            file => {
                if parsed.file.is_some() {
                    bail!("Only one input file is supported\n{}", USAGE);
                }
                parsed.file = Some(file.to_string());
            }
        }
    }

    Ok(parsed)
}

fn flag_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{} needs a value\n{}", flag, USAGE))
}

fn parse_length(value: &str) -> Result<u32> {
    value
        .parse()
        .with_context(|| format!("Invalid length '{}'", value))
}

/// Read the input text: documents go through the extractor, anything else
/// is read as UTF-8.
fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
            match file_extension(path).as_str() {
                "pdf" | "docx" => Ok(extract_document_text(path, &bytes)?),
                _ => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            }
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Process status for the outcome: 0 for a summary, 2 when it was unsupported.
fn exit_status(outcome: &SummarizationOutcome) -> u8 {
    if outcome.is_summary() {
        0
    } else {
        UNSUPPORTED_EXIT_STATUS
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout carries only the summary
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual_summarizer=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }
    let args = parse_args(&args)?;

    let config = Config::from_env()?;
    let text = read_input(args.file.as_deref())?;

    let bounds = LengthBounds::new(
        args.min_length.unwrap_or(DEFAULT_MIN_LENGTH),
        args.max_length.unwrap_or(DEFAULT_MAX_LENGTH),
    );
    let mut request = SummarizationRequest::new(text, bounds)?;
    if let Some(code) = args.output_language {
        request = request.with_output_language(code);
    }
    if let Some(code) = args.input_language {
        request = request.with_input_language(code);
    }

    let pipeline = SummaryPipeline::from_config(
        &config,
        config.http_client()?,
        Arc::new(LanguageCatalog::builtin()),
        Arc::new(GatewayMetrics::new()),
    );

    let detected = pipeline.source_language(&request);
    info!("Detected input language: {}", detected);

    let outcome = pipeline.produce_summary(&request).await;
    match &outcome {
        SummarizationOutcome::Summary { text, language } => {
            println!("\n========== SUMMARY ({}) ==========", language);
            println!("{}", text);
            println!("===================================\n");
        }
        SummarizationOutcome::Unsupported { .. } => {
            println!(
                "{}",
                outcome.message(pipeline.catalog()).unwrap_or_default()
            );
        }
    }

    let report = pipeline.metrics().report();
    info!(
        "Gateway calls: {} translation, {} summarization",
        report.translation_calls, report.summarization_calls
    );

    Ok(ExitCode::from(exit_status(&outcome)))
}
