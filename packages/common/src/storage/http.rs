//! Client for the standalone file service that owns lesson blobs.
//!
//! Wire contract:
//! - `POST {base}` multipart with a `file` part; JSON response with `objectKey`
//! - `GET {base}/{key}` raw bytes
//! - `DELETE {base}/{key}`
//!
//! Requests carry `Authorization: Bearer <token>` when a token is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::error::StorageError;
use super::key::StorageKey;
use super::traits::BlobStore;

/// Upload response returned by the file service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileUploadResponse {
    object_key: Option<String>,
}

pub struct HttpBlobStore {
    base_url: String,
    client: Client,
    bearer_token: Option<String>,
}

impl HttpBlobStore {
    /// Create a client; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn object_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    StorageError::Transport(err.to_string())
}

fn ensure_success(response: Response, operation: &'static str) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StorageError::Status {
            status: status.as_u16(),
            operation,
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn store(&self, data: &[u8], filename: &str) -> Result<StorageKey, StorageError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorize(self.client.post(&self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response, "upload")?;

        let body: FileUploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("upload response: {e}")))?;

        let key = body
            .object_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StorageError::InvalidResponse("upload response has no objectKey".into()))?;

        let key = StorageKey::new(key)?;
        debug!(storage_key = %key, filename, size = data.len(), "Uploaded blob");
        Ok(key)
    }

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        let response = self
            .authorize(self.client.get(self.object_url(key)))
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let response = ensure_success(response, "fetch")?;

        let bytes = response.bytes().await.map_err(transport)?;
        if bytes.is_empty() {
            return Err(StorageError::InvalidResponse(format!(
                "empty body for key {key}"
            )));
        }
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let response = self
            .authorize(self.client.delete(self.object_url(key)))
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response, "delete")?;
        Ok(true)
    }
}
