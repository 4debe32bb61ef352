// ── Keyed query store ──

mod data_store;
mod key;
mod query;

pub use data_store::DataStore;
pub use key::{QueryFamily, QueryKey};
pub use query::{Fetcher, PendingQuery, QueryCache, QueryResult, QueryState};
