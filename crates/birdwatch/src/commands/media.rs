//! Media command handlers: blob upload, URL resolution, file references.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;

use birdwatch_core::view::{self, GalleryItem};
use birdwatch_core::{Command as CoreCommand, FileReference, Session};

use crate::cli::{GlobalOpts, MediaArgs, MediaCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Hash")]
    hash: String,
}

impl From<&FileReference> for FileRow {
    fn from(f: &FileReference) -> Self {
        Self {
            path: f.path.clone(),
            hash: f.hash.clone(),
        }
    }
}

/// Gallery item with its resolved URL.
#[derive(Serialize)]
struct GalleryEntry {
    #[serde(flatten)]
    item: GalleryItem,
    url: Option<String>,
}

#[derive(Tabled)]
struct GalleryRow {
    #[tabled(rename = "Bird ID")]
    bird_id: String,
    #[tabled(rename = "Bird")]
    bird: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&GalleryEntry> for GalleryRow {
    fn from(e: &GalleryEntry) -> Self {
        Self {
            bird_id: e.item.bird_id.to_string(),
            bird: e.item.bird_name.clone(),
            path: e.item.path.clone(),
            url: e.url.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Storage path for an upload: `--as` when given, else the file name.
fn storage_path(file: &Path, explicit: Option<String>) -> Result<String, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: format!("'{}' has no file name; pass --as", file.display()),
        })
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: MediaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MediaCommand::Upload { file, path } => {
            util::require_admin(session, "media upload")?;
            let path = storage_path(&file, path)?;
            let bytes = Bytes::from(tokio::fs::read(&file).await?);

            let bar = spinner(format!("Uploading {path} ({} bytes)", bytes.len()), global.quiet);
            let result = session.upload_media(&path, bytes).await;
            bar.finish_and_clear();

            let reference = result?;
            let out = output::render_single(
                &global.output,
                &reference,
                |f| format!("Path: {}\nHash: {}", f.path, f.hash),
                |f| f.path.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MediaCommand::Url { path } => {
            let url = session
                .resolve_media_url(&path)
                .await
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "media file".into(),
                    identifier: path.clone(),
                    list_command: "media list".into(),
                })?;
            output::print_output(url.as_str(), global.quiet);
            Ok(())
        }

        MediaCommand::List => {
            let files = util::settled(session.file_references().await)?;
            let out = output::render_list(
                &global.output,
                &files,
                |f| FileRow::from(f),
                |f| f.path.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MediaCommand::Gallery => {
            let birds = util::all_birds(session).await?;
            let mut entries = Vec::new();
            for item in view::gallery(&birds) {
                let url = session
                    .resolve_media_url(&item.path)
                    .await
                    .map(String::from);
                entries.push(GalleryEntry { item, url });
            }
            let out = output::render_list(
                &global.output,
                &entries,
                |e| GalleryRow::from(e),
                |e| e.item.path.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MediaCommand::Drop { path } => {
            util::require_admin(session, "media drop")?;
            if session.file_reference(&path).await?.is_none() {
                return Err(CliError::NotFound {
                    resource_type: "media file".into(),
                    identifier: path,
                    list_command: "media list".into(),
                });
            }
            let prompt = format!("Unregister '{path}'? The blob itself is not deleted.");
            if !util::confirm(&prompt, "media drop", global.yes)? {
                return Ok(());
            }
            session
                .execute(CoreCommand::DropFileReference { path: path.clone() })
                .await?;
            if !global.quiet {
                eprintln!("✓ Dropped file reference {path}");
            }
            Ok(())
        }
    }
}
