use std::io::Write;

use focusflow_core::{Document, ReadingSession, ReadingView};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

const RULE: &str = "────────────────────────────────────────";

/// Print whatever the session's reading view currently is.
pub fn print_session(
    w: &mut dyn Write,
    session: &ReadingSession,
    color: ColorMode,
) -> std::io::Result<()> {
    match session.view() {
        ReadingView::Welcome => print_welcome(w, color),
        ReadingView::Reading { document, selected } => {
            print_document(w, document, selected, session, color)
        }
    }
}

fn print_welcome(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Load the sample document to get started.".cyan())?;
    } else {
        writeln!(w, "Load the sample document to get started.")?;
    }
    writeln!(w)?;
    writeln!(w, "FocusFlow's core loop:")?;
    writeln!(w, "  1. Upload a PDF document")?;
    writeln!(w, "  2. FocusFlow breaks it into small chunks")?;
    writeln!(w, "  3. You read one chunk at a time")?;
    writeln!(w, "  4. If you pause too long, FocusFlow offers a quick recap")?;
    Ok(())
}

fn print_document(
    w: &mut dyn Write,
    document: &Document,
    selected: usize,
    session: &ReadingSession,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = format!("Reading: {}", document.filename);
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }

    let preferences = session.preferences();
    let threshold = preferences.intervention_threshold.as_secs();
    writeln!(w, "Guidance: {}", preferences.guidance.label())?;
    if document.chunks.is_empty() {
        let pages = document.raw.as_deref().unwrap_or_default();
        writeln!(w, "{} pages with text (not yet chunked)", pages.len())?;
        for record in pages {
            writeln!(w, "{}", RULE)?;
            if color.enabled() {
                writeln!(w, "{}", format!("[page {}]", record.page).dimmed())?;
            } else {
                writeln!(w, "[page {}]", record.page)?;
            }
            writeln!(w, "{}", record.text)?;
        }
        return Ok(());
    }

    writeln!(
        w,
        "{} sections • pause threshold {}s",
        document.total_chunks, threshold
    )?;

    for (idx, chunk) in document.chunks.iter().enumerate() {
        let is_selected = idx == selected;
        writeln!(w, "{}", RULE)?;

        let prefix = if is_selected { "◎ " } else { "" };
        let title = format!("{}{}. {}", prefix, idx + 1, chunk.title);
        if color.enabled() && is_selected {
            writeln!(w, "{}", title.green().bold())?;
        } else if color.enabled() {
            writeln!(w, "{}", title.bold())?;
        } else {
            writeln!(w, "{}", title)?;
        }

        if color.enabled() {
            writeln!(w, "{} {}", "Key idea:".cyan(), chunk.key_idea)?;
        } else {
            writeln!(w, "Key idea: {}", chunk.key_idea)?;
        }
        writeln!(w)?;
        writeln!(w, "{}", chunk.content)?;
    }
    Ok(())
}
