//! Collection statistics.

use std::fmt::Write as _;

use birdwatch_core::Session;
use birdwatch_core::view::{self, BirdStatistics};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &BirdStatistics) -> String {
    let mut out = format!(
        "Birds:            {}\n\
         With locations:   {}\n\
         With images:      {}\n\
         With audio:       {}\n\
         Locations:        {} ({} mapped)\n\
         Images:           {}",
        s.total_birds,
        s.birds_with_locations,
        s.birds_with_images,
        s.birds_with_audio,
        s.total_locations,
        s.mapped_locations,
        s.total_images,
    );
    if !s.by_hemisphere.is_empty() {
        out.push_str("\n\nBy hemisphere:");
        for (hemisphere, count) in &s.by_hemisphere {
            let _ = write!(out, "\n  {hemisphere:<12} {count}");
        }
    }
    if !s.by_zone.is_empty() {
        out.push_str("\n\nBy zone:");
        for (zone, count) in &s.by_zone {
            let _ = write!(out, "\n  {zone:<12} {count}");
        }
    }
    if !s.by_region.is_empty() {
        out.push_str("\n\nBy region:");
        for (region, count) in &s.by_region {
            let _ = write!(out, "\n  {region:<12} {count}");
        }
    }
    out
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let birds = util::all_birds(session).await?;
    let stats = view::statistics(&birds);
    let out = output::render_single(&global.output, &stats, detail, |s| {
        s.total_birds.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
