// ── Derived views ──
//
// Pure projections of `BirdRecord` lists into table rows, map markers,
// statistics, and export documents. No I/O, no shared state.

mod export;
mod gallery;
mod geo;
mod markers;
mod rows;
mod stats;

pub use export::{CSV_HEADER, escape_csv_field, escape_html, export_csv, export_fields, export_html};
pub use gallery::{GalleryItem, gallery};
pub use geo::{Hemisphere, Zone, hemisphere, zone};
pub use markers::{MapMarker, MarkerFilter, filter_markers, markers};
pub use rows::{BirdRow, flatten};
pub use stats::{BirdStatistics, statistics};
