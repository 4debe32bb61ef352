//! Bird command handlers.

use tabled::Tabled;

use birdwatch_core::{BirdRecord, BirdRequest, Command as CoreCommand, CommandResult, Session};

use crate::cli::{BirdFields, BirdsArgs, BirdsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BirdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Scientific Name")]
    scientific: String,
    #[tabled(rename = "Locations")]
    locations: usize,
    #[tabled(rename = "Images")]
    images: usize,
    #[tabled(rename = "Audio")]
    audio: String,
}

impl From<&BirdRecord> for BirdRow {
    fn from(b: &BirdRecord) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name().to_owned(),
            scientific: b.scientific_name.clone(),
            locations: b.locations.len(),
            images: b.images.len(),
            audio: if b.audio.is_some() { "yes" } else { "no" }.into(),
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn detail(b: &BirdRecord) -> String {
    let mut lines = vec![
        format!("ID:          {}", b.id),
        format!("Local:       {}", or_dash(&b.local_name)),
        format!("Arabic:      {}", or_dash(&b.arabic_name)),
        format!("English:     {}", or_dash(&b.english_name)),
        format!("Scientific:  {}", or_dash(&b.scientific_name)),
        format!("Description: {}", or_dash(&b.description)),
        format!("Notes:       {}", or_dash(&b.notes)),
        format!("Audio:       {}", b.audio.as_deref().unwrap_or("-")),
    ];
    for image in &b.images {
        lines.push(format!("Image:       {image}"));
    }
    for (idx, loc) in b.locations.iter().enumerate() {
        let coords = if loc.has_coordinate() {
            format!("{:.5}, {:.5}", loc.latitude, loc.longitude)
        } else {
            "no coordinate".into()
        };
        lines.push(format!(
            "Location #{idx}: {} / {} ({coords})",
            or_dash(&loc.place_name),
            or_dash(&loc.region)
        ));
    }
    lines.join("\n")
}

/// Overlay flag values onto `base`. `--from-file` replaces it entirely.
fn apply_fields(fields: BirdFields, base: BirdRequest) -> Result<BirdRequest, CliError> {
    let mut request = match fields.from_file {
        Some(ref path) => util::read_json_file(path)?,
        None => base,
    };
    let overrides = [
        (fields.local_name, &mut request.local_name),
        (fields.arabic_name, &mut request.arabic_name),
        (fields.english_name, &mut request.english_name),
        (fields.scientific_name, &mut request.scientific_name),
        (fields.description, &mut request.description),
        (fields.notes, &mut request.notes),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if !fields.images.is_empty() {
        request.images = fields.images;
    }
    if let Some(audio) = fields.audio {
        request.audio = (!audio.is_empty()).then_some(audio);
    }
    Ok(request)
}

/// The record a bird write returned.
fn written_bird(result: CommandResult) -> Result<BirdRecord, CliError> {
    match result {
        CommandResult::Bird(bird) => Ok(bird),
        other => Err(CliError::Internal(format!("bird write returned {other:?}"))),
    }
}

fn print_bird(result: CommandResult, global: &GlobalOpts) -> Result<(), CliError> {
    let bird = written_bird(result)?;
    let out = output::render_single(&global.output, &bird, detail, |b| b.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: BirdsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        BirdsCommand::List { name } => {
            let birds = util::all_birds(session).await?;
            let shown: Vec<&BirdRecord> = birds
                .iter()
                .filter(|b| name.as_deref().is_none_or(|n| b.matches_name(n)))
                .collect();
            let out = output::render_list(
                &global.output,
                &shown,
                |b| BirdRow::from(*b),
                |b| b.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BirdsCommand::Show { name } => {
            let found = util::settled(session.bird_details(&name).await)?;
            let bird = Option::as_ref(&found).ok_or_else(|| CliError::NotFound {
                resource_type: "bird".into(),
                identifier: name.clone(),
                list_command: "birds list".into(),
            })?;
            let out = output::render_single(&global.output, bird, detail, |b| b.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BirdsCommand::Add(fields) => {
            util::require_admin(session, "birds add")?;
            let request = apply_fields(fields, BirdRequest::default())?;
            let result = session.execute(CoreCommand::AddBird(request)).await?;
            print_bird(result, global)
        }

        BirdsCommand::Edit { id, fields } => {
            util::require_admin(session, "birds edit")?;
            let current = util::find_bird(session, &id).await?;
            let request = apply_fields(fields, BirdRequest::from(&current))?;
            let result = session
                .execute(CoreCommand::UpdateBird {
                    id: current.id,
                    bird: request,
                })
                .await?;
            print_bird(result, global)
        }

        BirdsCommand::Delete { id } => {
            util::require_admin(session, "birds delete")?;
            let bird = util::find_bird(session, &id).await?;
            let prompt = format!(
                "Delete '{}' and its {} location(s)?",
                bird.name(),
                bird.locations.len()
            );
            if !util::confirm(&prompt, "birds delete", global.yes)? {
                return Ok(());
            }
            session
                .execute(CoreCommand::DeleteBird { id: bird.id })
                .await?;
            if !global.quiet {
                eprintln!("✓ Deleted bird {id}");
            }
            Ok(())
        }
    }
}
