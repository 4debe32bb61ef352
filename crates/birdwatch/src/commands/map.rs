//! Map marker listing.

use tabled::Tabled;

use birdwatch_core::Session;
use birdwatch_core::view::{self, Hemisphere, MapMarker, MarkerFilter, Zone};

use crate::cli::{GlobalOpts, HemisphereArg, MapArgs, ZoneArg};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "Bird")]
    bird: String,
    #[tabled(rename = "Place")]
    place: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lng")]
    lng: String,
    #[tabled(rename = "Hemisphere")]
    hemisphere: String,
    #[tabled(rename = "Zone")]
    zone: String,
}

impl From<&MapMarker> for MarkerRow {
    fn from(m: &MapMarker) -> Self {
        Self {
            bird: m.bird_name.clone(),
            place: m.place_name.clone(),
            region: m.region.clone(),
            lat: format!("{:.5}", m.latitude),
            lng: format!("{:.5}", m.longitude),
            hemisphere: m.hemisphere.to_string(),
            zone: m.zone.to_string(),
        }
    }
}

impl From<HemisphereArg> for Hemisphere {
    fn from(arg: HemisphereArg) -> Self {
        match arg {
            HemisphereArg::North => Self::North,
            HemisphereArg::South => Self::South,
        }
    }
}

impl From<ZoneArg> for Zone {
    fn from(arg: ZoneArg) -> Self {
        match arg {
            ZoneArg::Tropical => Self::Tropical,
            ZoneArg::Temperate => Self::Temperate,
            ZoneArg::Subpolar => Self::Subpolar,
            ZoneArg::Polar => Self::Polar,
        }
    }
}

fn marker_filter(args: MapArgs) -> MarkerFilter {
    MarkerFilter {
        name: args.name,
        region: args.region,
        hemisphere: args.hemisphere.map(Hemisphere::from),
        zone: args.zone.map(Zone::from),
    }
}

pub async fn handle(session: &Session, args: MapArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let birds = util::all_birds(session).await?;
    let all = view::markers(&birds);
    let filter = marker_filter(args);
    let shown = view::filter_markers(&all, &filter);
    tracing::debug!(total = all.len(), shown = shown.len(), "map markers");

    let out = output::render_list(&global.output, &shown, |m| MarkerRow::from(m), |m| {
        format!("{},{}", m.latitude, m.longitude)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
