//! Location command handlers.

use tabled::Tabled;

use birdwatch_core::view::{self, BirdRow};
use birdwatch_core::{Command as CoreCommand, LocationEntry, Session};

use crate::cli::{GlobalOpts, LocationsArgs, LocationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "Bird ID")]
    bird_id: String,
    #[tabled(rename = "Bird")]
    bird: String,
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Place")]
    place: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lng")]
    lng: String,
}

impl From<&BirdRow> for LocationRow {
    fn from(r: &BirdRow) -> Self {
        let mapped = r.latitude.is_finite()
            && r.longitude.is_finite()
            && !(r.latitude == 0.0 && r.longitude == 0.0);
        let coord = |v: f64| if mapped { format!("{v:.5}") } else { "-".into() };
        Self {
            bird_id: r.bird_id.to_string(),
            bird: r.name.clone(),
            index: r.location_index.map(|i| i.to_string()).unwrap_or_default(),
            place: r.place_name.clone(),
            region: r.region.clone(),
            lat: coord(r.latitude),
            lng: coord(r.longitude),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LocationsCommand::List { name } => {
            let birds = util::all_birds(session).await?;
            // Birds without locations flatten to a sentinel row; skip those.
            let rows: Vec<BirdRow> = view::flatten(&birds)
                .into_iter()
                .filter(|r| r.location_index.is_some())
                .filter(|r| {
                    name.as_deref()
                        .is_none_or(|n| r.name.to_lowercase().contains(&n.to_lowercase()))
                })
                .collect();
            let out = output::render_list(&global.output, &rows, |r| LocationRow::from(r), |r| {
                format!(
                    "{}#{}",
                    r.bird_id,
                    r.location_index.unwrap_or_default()
                )
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LocationsCommand::Add {
            bird_id,
            lat,
            lng,
            place,
            region,
            landmarks,
            notes,
        } => {
            util::require_admin(session, "locations add")?;
            let bird = util::find_bird(session, &bird_id).await?;
            let location = LocationEntry {
                place_name: place,
                region,
                landmarks,
                notes,
                ..LocationEntry::new(lat, lng)
            };
            if !location.has_coordinate() {
                tracing::warn!(bird = %bird.id, "location stored without a coordinate");
            }
            session
                .execute(CoreCommand::AddLocation {
                    bird_id: bird.id,
                    location,
                })
                .await?;
            if !global.quiet {
                eprintln!("✓ Added location to bird {bird_id}");
            }
            Ok(())
        }

        LocationsCommand::Delete { bird_id, index } => {
            util::require_admin(session, "locations delete")?;
            let bird = util::find_bird(session, &bird_id).await?;
            let Some(location) = bird.locations.get(index) else {
                return Err(CliError::NotFound {
                    resource_type: "location".into(),
                    identifier: format!("{bird_id}#{index}"),
                    list_command: "locations list".into(),
                });
            };
            let label = if location.place_name.is_empty() {
                format!("#{index}")
            } else {
                format!("'{}'", location.place_name)
            };
            let prompt = format!("Remove location {label} from '{}'?", bird.name());
            if !util::confirm(&prompt, "locations delete", global.yes)? {
                return Ok(());
            }
            session
                .execute(CoreCommand::DeleteLocation {
                    bird_id: bird.id,
                    index,
                })
                .await?;
            if !global.quiet {
                eprintln!("✓ Removed location #{index} from bird {bird_id}");
            }
            Ok(())
        }
    }
}
