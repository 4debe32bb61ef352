//! CSV and HTML export.

use std::io::Write;
use std::path::Path;

use birdwatch_core::Session;
use birdwatch_core::view;

use crate::cli::{ExportArgs, ExportFormat, GlobalOpts};
use crate::error::CliError;

use super::util;

/// Write `document` to `out`, or to stdout when no path was given.
fn emit(document: &str, out: Option<&Path>, quiet: bool) -> Result<(), CliError> {
    match out {
        Some(path) => {
            std::fs::write(path, document)?;
            if !quiet {
                eprintln!("✓ Wrote {}", path.display());
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub async fn handle(session: &Session, args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let birds = util::all_birds(session).await?;
    tracing::info!(records = birds.len(), "exporting");
    match args.format {
        ExportFormat::Csv { out } => emit(&view::export_csv(&birds), out.as_deref(), global.quiet),
        ExportFormat::Html { out, title } => emit(
            &view::export_html(&birds, &title),
            out.as_deref(),
            global.quiet,
        ),
    }
}
