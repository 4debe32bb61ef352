// Async HTTP client for the birdwatch data service.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <token>` when the caller has an identity.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types;

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the bird data service.
///
/// Every backend operation is one method. Writes are sent exactly once;
/// retry policy (if any) belongs to the caller.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, caller credentials, and transport config.
    ///
    /// Installs the `Authorization` header as a default header, so the
    /// client must be rebuilt when the identity changes.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(credentials.headers()?)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Normalize to `https://host[/prefix]/api/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The normalized base URL (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(segments)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(segments)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        let url = self.url(segments)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    async fn delete_with_params(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<(), Error> {
        let url = self.url(segments)?;
        debug!("DELETE {url} params={params:?}");

        let resp = self.http.delete(url).query(params).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let (message, code) = match parsed {
            Some(err) => (err.message.unwrap_or_else(|| status.to_string()), err.code),
            None if raw.is_empty() => (status.to_string(), None),
            None => (raw, None),
        };

        match status {
            reqwest::StatusCode::UNAUTHORIZED => Error::Authentication { message },
            reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
            _ => Error::Remote {
                message,
                code,
                status: status.as_u16(),
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Birds ────────────────────────────────────────────────────────

    pub async fn get_all_bird_data(&self) -> Result<Vec<types::BirdData>, Error> {
        self.get(&["v1", "birds"]).await
    }

    /// Fetch one bird by display name. `Ok(None)` when the backend has no
    /// bird by that name.
    pub async fn get_bird_details(&self, name: &str) -> Result<Option<types::BirdData>, Error> {
        match self.get(&["v1", "birds", "by-name", name]).await {
            Ok(bird) => Ok(Some(bird)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn add_bird(&self, body: &types::BirdBody) -> Result<types::BirdData, Error> {
        self.post(&["v1", "birds"], body).await
    }

    pub async fn update_bird(
        &self,
        id: &str,
        body: &types::BirdBody,
    ) -> Result<types::BirdData, Error> {
        self.put(&["v1", "birds", id], body).await
    }

    pub async fn delete_bird(&self, id: &str) -> Result<(), Error> {
        self.delete(&["v1", "birds", id]).await
    }

    // ── Locations ────────────────────────────────────────────────────

    pub async fn add_location(
        &self,
        bird_id: &str,
        body: &types::LocationBody,
    ) -> Result<(), Error> {
        self.post_no_response(&["v1", "birds", bird_id, "locations"], body)
            .await
    }

    pub async fn delete_location(&self, bird_id: &str, index: usize) -> Result<(), Error> {
        let index = index.to_string();
        self.delete(&["v1", "birds", bird_id, "locations", &index])
            .await
    }

    pub async fn get_all_locations(&self) -> Result<Vec<types::LocationData>, Error> {
        self.get(&["v1", "locations"]).await
    }

    // ── File references ──────────────────────────────────────────────

    pub async fn register_file_reference(
        &self,
        body: &types::FileReferenceBody,
    ) -> Result<types::FileReferenceData, Error> {
        self.post(&["v1", "files"], body).await
    }

    /// Look up a file reference by storage path. `Ok(None)` when unknown.
    pub async fn get_file_reference(
        &self,
        path: &str,
    ) -> Result<Option<types::FileReferenceData>, Error> {
        match self.get_with_params(&["v1", "files"], &[("path", path)]).await {
            Ok(reference) => Ok(Some(reference)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_file_references(&self) -> Result<Vec<types::FileReferenceData>, Error> {
        self.get(&["v1", "files", "all"]).await
    }

    pub async fn drop_file_reference(&self, path: &str) -> Result<(), Error> {
        self.delete_with_params(&["v1", "files"], &[("path", path)])
            .await
    }

    // ── Caller identity ──────────────────────────────────────────────

    pub async fn is_caller_admin(&self) -> Result<bool, Error> {
        let status: types::AdminStatus = self.get(&["v1", "me", "is-admin"]).await?;
        Ok(status.is_admin)
    }

    /// The caller's profile. `Ok(None)` when none has been saved yet.
    pub async fn get_caller_user_profile(&self) -> Result<Option<types::ProfileData>, Error> {
        match self.get(&["v1", "me", "profile"]).await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_caller_user_profile(&self, body: &types::ProfileBody) -> Result<(), Error> {
        self.put_no_response(&["v1", "me", "profile"], body).await
    }

    pub async fn get_caller_user_role(&self) -> Result<types::RoleData, Error> {
        self.get(&["v1", "me", "role"]).await
    }
}
