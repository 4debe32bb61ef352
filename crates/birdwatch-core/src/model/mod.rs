// ── Domain model ──
//
// Strict, validated types produced by `convert` from the permissive wire
// shapes in `birdwatch_api::types`.

mod bird;
mod entity_id;
mod file;
mod location;
mod user;

pub use bird::{BirdRecord, UNNAMED};
pub use entity_id::EntityId;
pub use file::FileReference;
pub use location::LocationEntry;
pub use user::{Identity, UserProfile, UserRole};
