//! Async client for the birdwatch data service.
//!
//! Two surfaces, both JSON/HTTP over a shared [`TransportConfig`]:
//!
//! - **[`BackendClient`]**: one async method per backend operation (bird
//!   CRUD, locations, file references, caller identity and role).
//! - **[`BlobClient`]**: media upload and URL resolution against the blob
//!   store. Resolution never fails for a missing file.
//!
//! Responses are returned as loosely-typed wire records ([`types`]); the
//! `birdwatch-core` crate validates them into the domain model.

pub mod auth;
pub mod backend;
pub mod blob;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use backend::BackendClient;
pub use blob::{BlobClient, UploadReceipt};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
