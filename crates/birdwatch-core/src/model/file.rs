use serde::{Deserialize, Serialize};

/// An uploaded blob registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileReference {
    /// Blob storage path.
    pub path: String,
    /// Content hash recorded at upload time.
    pub hash: String,
}
