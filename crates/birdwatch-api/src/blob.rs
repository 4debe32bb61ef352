// Blob storage client for bird images and audio.
//
// Objects live at `{base}/{path}`. Uploads are a single PUT; resolution
// is a HEAD probe that degrades to `None` so views can render a
// placeholder instead of failing.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// What the blob store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Storage path, as later passed to [`BlobClient::resolve_url`].
    pub path: String,
    /// BLAKE3 content hash (hex), recorded on the backend file reference.
    pub hash: String,
    /// Guessed MIME type sent with the upload.
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct BlobClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BlobClient {
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(credentials.headers()?)?;
        Self::from_reqwest(base_url, http)
    }

    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));
        Ok(Self { http, base_url })
    }

    /// Public URL of an object, whether or not it exists.
    pub fn object_url(&self, path: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Upload `bytes` to `path`, overwriting any existing object.
    pub async fn upload(&self, path: &str, bytes: Bytes) -> Result<UploadReceipt, Error> {
        let url = self.object_url(path)?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        let hash = blake3::hash(&bytes).to_hex().to_string();

        debug!(%url, size = bytes.len(), %content_type, "PUT blob");

        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, &content_type)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Storage {
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
                status: status.as_u16(),
            });
        }

        Ok(UploadReceipt {
            path: path.to_owned(),
            hash,
            content_type,
        })
    }

    /// Resolve a storage path to a displayable URL.
    ///
    /// Returns `None` for a missing object and for any transport failure;
    /// this never errors.
    pub async fn resolve_url(&self, path: &str) -> Option<Url> {
        let url = self.object_url(path).ok()?;
        match self.http.head(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => Some(url),
            Ok(resp) => {
                trace!(%url, status = %resp.status(), "blob not resolvable");
                None
            }
            Err(e) => {
                debug!(%url, error = %e, "blob probe failed");
                None
            }
        }
    }
}
