use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use focusflow_core::config_file;
use focusflow_core::{
    Document, ExtractOnly, FALLBACK_FILENAME, GuidanceLevel, ReadingSession, Settings,
};
use focusflow_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// FocusFlow - extract PDF pages and read documents one section at a time
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract per-page text from a PDF and print the document JSON
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the built-in sample document JSON
    Sample {
        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a document in the terminal reading view
    Read {
        /// Document JSON (as produced by `extract`); the sample when omitted
        document: Option<PathBuf>,

        /// 1-based section to highlight
        #[arg(long)]
        section: Option<usize>,

        /// Support level: light, medium or heavy (overrides the config file)
        #[arg(long)]
        guidance: Option<GuidanceLevel>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Dump the session state after the view
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            output,
            compact,
        } => extract(&file_path, output.as_deref(), compact),
        Command::Sample { output } => {
            write_document(&Document::sample(), output.as_deref(), false)
        }
        Command::Read {
            document,
            section,
            guidance,
            no_color,
            debug,
        } => read(document.as_deref(), section, guidance, no_color, debug),
    }
}

fn extract(file_path: &Path, output: Option<&Path>, compact: bool) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    let data = std::fs::read(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let pages = focusflow_core::extract_pages(&MupdfBackend::new(), &data)
        .with_context(|| format!("Error processing PDF {}", file_path.display()))?;

    let filename = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
    tracing::info!(filename = %filename, pages = pages.len(), "pdf extracted");

    let document = Document::from_pages_with(filename, pages, &ExtractOnly);
    write_document(&document, output, compact)
}

fn write_document(
    document: &Document,
    output: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(document)?
    } else {
        serde_json::to_string_pretty(document)?
    };

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )
    } else {
        Box::new(std::io::stdout())
    };
    writeln!(writer, "{}", json)?;
    Ok(())
}

fn load_document(path: Option<&Path>) -> anyhow::Result<Document> {
    let Some(path) = path else {
        return Ok(Document::sample());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Document = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a FocusFlow document", path.display()))?;
    document
        .validate()
        .with_context(|| format!("{} violates the document schema", path.display()))?;
    Ok(document)
}

fn read(
    path: Option<&Path>,
    section: Option<usize>,
    guidance: Option<GuidanceLevel>,
    no_color: bool,
    debug: bool,
) -> anyhow::Result<()> {
    let settings = Settings::resolve(&config_file::load_config(), |key| std::env::var(key).ok());
    let mut session = ReadingSession::with_preferences(settings.preferences);
    if let Some(guidance) = guidance {
        session.set_guidance(guidance);
    }
    session.set_debug_mode(debug);
    session.load_document(load_document(path)?);

    if let Some(section) = section {
        let index = section
            .checked_sub(1)
            .context("sections are numbered from 1")?;
        session.jump_to(index)?;
    }

    let color = ColorMode(!no_color);
    let mut stdout = std::io::stdout();
    output::print_session(&mut stdout, &session, color)?;

    if session.debug_mode() {
        eprintln!("{:#?}", session);
    }
    Ok(())
}
