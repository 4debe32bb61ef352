//! Client-side data layer between `birdwatch-api` and UI consumers.
//!
//! This crate owns the domain model, the query cache, and the pure view
//! projections for the birdwatch workspace:
//!
//! - **[`Session`]**: central facade. [`connect()`](Session::connect) builds
//!   the HTTP clients from a [`SessionConfig`]; [`attach()`](Session::attach)
//!   accepts any [`BirdService`] implementation. Queries stay disabled until
//!   a backend is attached. [`Session::oneshot()`] wraps a single CLI call.
//!
//! - **[`DataStore`]**: one keyed [`QueryCache`] per payload type. Concurrent
//!   reads of the same key share one fetch; invalidation marks entries stale
//!   and refetches the ones somebody is observing.
//!
//! - **[`QueryObserver<T>`]**: subscription handle exposing `current()`,
//!   `latest()`, `changed()`, and a `Stream` adapter.
//!
//! - **[`Command`]**: typed mutations. Each variant declares the query
//!   families it invalidates once the backend accepts it.
//!
//! - **[`AdminGate`]**: fail-closed admin state machine driven by identity
//!   changes.
//!
//! - **[`view`]**: table rows, map markers, statistics, CSV and printable
//!   HTML exports, all computed from `&[BirdRecord]`.

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod gate;
pub mod model;
pub mod service;
pub mod session;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{BirdRequest, Command, CommandResult};
pub use config::{AuthCredentials, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use gate::{AdminGate, GateEvent, GateMachine, GateState};
pub use service::{BirdService, MediaStore};
pub use session::{ConnectionState, Session};
pub use store::{DataStore, QueryCache, QueryFamily, QueryKey, QueryResult};
pub use stream::QueryObserver;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BirdRecord, EntityId, FileReference, Identity, LocationEntry, UNNAMED, UserProfile, UserRole,
};
