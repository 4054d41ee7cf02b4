//! Amharic Translator CLI - Command line tool for translating English PDFs into Amharic.

use anyhow::{Context, Result};
use amharic_translator_core::{AppConfig, PdfTranslator, ProgressUpdate, is_pdf_path};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "amharic-translate")]
#[command(
    author,
    version,
    about = "Translate English PDF documents into Amharic",
    long_about = None
)]
struct Args {
    /// Input PDF file, or the text to translate with --text
    #[arg(required = true)]
    input: String,

    /// Treat INPUT as English text and print its translation
    #[arg(long)]
    text: bool,

    /// Output PDF file (default: translated_<input> beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ethiopic TrueType font to try before the configured ones (repeatable)
    #[arg(long = "font", value_name = "PATH")]
    fonts: Vec<PathBuf>,

    /// Maximum translation requests in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Merge command line overrides into the loaded configuration.
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(api_base) = &args.api_base {
        config.translator.api_base.clone_from(api_base);
    }
    if args.api_key.is_some() {
        config.translator.api_key.clone_from(&args.api_key);
    }
    if let Some(model) = &args.model {
        config.translator.model.clone_from(model);
    }
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    let mut fonts = args.fonts.clone();
    fonts.append(&mut config.layout.font_paths);
    config.layout.font_paths = fonts;
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Move the translated file to where the user asked for it.
fn move_output(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // Rename fails across filesystems
    std::fs::copy(from, to).context(format!("Failed to write output: {}", to.display()))?;
    std::fs::remove_file(from)
        .context(format!("Failed to remove intermediate file: {}", from.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    apply_overrides(&mut config, &args);

    let translator = PdfTranslator::new(config).context("Failed to initialize translator")?;
    info!("Using {} translator", translator.translator_info().name);

    if args.text {
        let translated = translator
            .translate_text(&args.input)
            .await
            .context("Failed to translate text")?;

        // CLI output is intentional
        #[allow(clippy::print_stdout)]
        {
            println!("{translated}");
        }
        return Ok(());
    }

    let input = PathBuf::from(&args.input);
    if !is_pdf_path(&input) {
        anyhow::bail!("Please provide a PDF file: {}", input.display());
    }

    let pb = progress_bar();
    let bar = pb.clone();
    let on_progress = move |update: &ProgressUpdate| {
        if update.is_failure() {
            bar.abandon_with_message(update.message.clone());
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = (update.fraction * 100.0).round() as u64;
            bar.set_position(percent);
            bar.set_message(update.message.clone());
        }
    };

    let written = translator
        .translate_pdf(&input, Some(&on_progress))
        .await
        .context(format!("Failed to translate {}", input.display()))?;
    pb.finish_with_message("Translation complete!");

    let output_path = match args.output {
        Some(output) if output != written => {
            move_output(&written, &output)?;
            output
        }
        _ => written,
    };

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Translated PDF saved to: {}", output_path.display());
    }

    Ok(())
}
