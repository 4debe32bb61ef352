// ── Backend seams ──
//
// `BirdService` is the typed remote actor: one async method per backend
// operation, returning domain types. `MediaStore` is the blob storage
// collaborator. Both are object-safe so a `Session` can hold either the
// HTTP clients or an in-memory stand-in.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use birdwatch_api::types::{BirdBody, FileReferenceBody, LocationBody, ProfileBody};
use birdwatch_api::{BackendClient, BlobClient, UploadReceipt};

use crate::command::BirdRequest;
use crate::convert::{birds_from_wire, locations_from_wire};
use crate::error::CoreError;
use crate::model::{BirdRecord, EntityId, FileReference, LocationEntry, UserProfile, UserRole};

/// Remote bird data service.
#[async_trait]
pub trait BirdService: Send + Sync {
    async fn all_birds(&self) -> Result<Vec<BirdRecord>, CoreError>;

    /// `Ok(None)` when no bird has that display name.
    async fn bird_details(&self, name: &str) -> Result<Option<BirdRecord>, CoreError>;

    async fn add_bird(&self, bird: &BirdRequest) -> Result<BirdRecord, CoreError>;

    async fn update_bird(
        &self,
        id: &EntityId,
        bird: &BirdRequest,
    ) -> Result<BirdRecord, CoreError>;

    async fn delete_bird(&self, id: &EntityId) -> Result<(), CoreError>;

    async fn add_location(
        &self,
        bird_id: &EntityId,
        location: &LocationEntry,
    ) -> Result<(), CoreError>;

    async fn delete_location(&self, bird_id: &EntityId, index: usize) -> Result<(), CoreError>;

    async fn all_locations(&self) -> Result<Vec<LocationEntry>, CoreError>;

    async fn register_file_reference(
        &self,
        path: &str,
        hash: &str,
    ) -> Result<FileReference, CoreError>;

    async fn file_reference(&self, path: &str) -> Result<Option<FileReference>, CoreError>;

    async fn file_references(&self) -> Result<Vec<FileReference>, CoreError>;

    async fn drop_file_reference(&self, path: &str) -> Result<(), CoreError>;

    async fn is_caller_admin(&self) -> Result<bool, CoreError>;

    async fn caller_profile(&self) -> Result<Option<UserProfile>, CoreError>;

    async fn save_caller_profile(&self, profile: &UserProfile) -> Result<(), CoreError>;

    async fn caller_role(&self) -> Result<UserRole, CoreError>;
}

/// Blob storage for bird images and audio.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<UploadReceipt, CoreError>;

    /// Displayable URL for `path`; `None` when the object is missing or
    /// storage is unreachable.
    async fn resolve_url(&self, path: &str) -> Option<Url>;
}

// ── HTTP implementations ─────────────────────────────────────────────

#[async_trait]
impl BirdService for BackendClient {
    async fn all_birds(&self) -> Result<Vec<BirdRecord>, CoreError> {
        birds_from_wire(self.get_all_bird_data().await?)
    }

    async fn bird_details(&self, name: &str) -> Result<Option<BirdRecord>, CoreError> {
        self.get_bird_details(name)
            .await?
            .map(BirdRecord::try_from)
            .transpose()
    }

    async fn add_bird(&self, bird: &BirdRequest) -> Result<BirdRecord, CoreError> {
        let body = BirdBody::from(bird);
        BirdRecord::try_from(BackendClient::add_bird(self, &body).await?)
    }

    async fn update_bird(
        &self,
        id: &EntityId,
        bird: &BirdRequest,
    ) -> Result<BirdRecord, CoreError> {
        let body = BirdBody::from(bird);
        BirdRecord::try_from(BackendClient::update_bird(self, &id.to_string(), &body).await?)
    }

    async fn delete_bird(&self, id: &EntityId) -> Result<(), CoreError> {
        BackendClient::delete_bird(self, &id.to_string()).await?;
        Ok(())
    }

    async fn add_location(
        &self,
        bird_id: &EntityId,
        location: &LocationEntry,
    ) -> Result<(), CoreError> {
        let body = LocationBody::from(location);
        BackendClient::add_location(self, &bird_id.to_string(), &body).await?;
        Ok(())
    }

    async fn delete_location(&self, bird_id: &EntityId, index: usize) -> Result<(), CoreError> {
        BackendClient::delete_location(self, &bird_id.to_string(), index).await?;
        Ok(())
    }

    async fn all_locations(&self) -> Result<Vec<LocationEntry>, CoreError> {
        locations_from_wire(self.get_all_locations().await?)
    }

    async fn register_file_reference(
        &self,
        path: &str,
        hash: &str,
    ) -> Result<FileReference, CoreError> {
        let body = FileReferenceBody {
            path: path.to_owned(),
            hash: hash.to_owned(),
        };
        FileReference::try_from(BackendClient::register_file_reference(self, &body).await?)
    }

    async fn file_reference(&self, path: &str) -> Result<Option<FileReference>, CoreError> {
        self.get_file_reference(path)
            .await?
            .map(FileReference::try_from)
            .transpose()
    }

    async fn file_references(&self) -> Result<Vec<FileReference>, CoreError> {
        self.list_file_references()
            .await?
            .into_iter()
            .map(FileReference::try_from)
            .collect()
    }

    async fn drop_file_reference(&self, path: &str) -> Result<(), CoreError> {
        BackendClient::drop_file_reference(self, path).await?;
        Ok(())
    }

    async fn is_caller_admin(&self) -> Result<bool, CoreError> {
        Ok(BackendClient::is_caller_admin(self).await?)
    }

    async fn caller_profile(&self) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.get_caller_user_profile().await?.map(UserProfile::from))
    }

    async fn save_caller_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        let body = ProfileBody {
            name: profile.name.clone(),
        };
        self.save_caller_user_profile(&body).await?;
        Ok(())
    }

    async fn caller_role(&self) -> Result<UserRole, CoreError> {
        Ok(UserRole::from(self.get_caller_user_role().await?))
    }
}

#[async_trait]
impl MediaStore for BlobClient {
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<UploadReceipt, CoreError> {
        Ok(BlobClient::upload(self, path, bytes).await?)
    }

    async fn resolve_url(&self, path: &str) -> Option<Url> {
        BlobClient::resolve_url(self, path).await
    }
}
