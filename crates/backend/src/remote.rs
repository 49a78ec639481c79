//! Remote backend: HTTP client for the hosted document API.
//!
//! # Wire shape
//!
//! - `GET    /v1/{collection}/{key}`   -> `{"rev": n, "body": {...}}`, 404 when missing
//! - `PUT    /v1/{collection}/{key}`   -> replace write, body is the document
//! - `PATCH  /v1/{collection}/{key}`   -> merge write
//! - `DELETE /v1/{collection}/{key}`
//! - `GET    /v1/{collection}`         -> `{"documents": [{"key", "rev", "body"}]}`
//! - `POST   /v1/auth/verify|register` -> `{"id", "email"}`
//! - `PUT    /v1/media/{path}`         -> `{"url"}`
//! - `GET    /v1/health`
//!
//! The service has no push channel exposed to server-side clients, so
//! `watch` is a per-document polling task publishing into a watch channel;
//! the task stops as soon as the last receiver is dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, instrument};

use sokoni_core::Email;

use crate::config::RemoteConfig;
use crate::document::{DocumentRef, Snapshot, WriteMode};
use crate::store::{AuthError, Backend, DocumentWatch, Identity, StoreError};

/// Default interval between change polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct RemoteDocument {
    rev: u64,
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteCollection {
    documents: Vec<RemoteEntry>,
}

#[derive(Debug, Deserialize)]
struct RemoteEntry {
    key: String,
    rev: u64,
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RemoteMedia {
    url: String,
}

struct RemoteInner {
    client: reqwest::Client,
    base: String,
    api_key: String,
    poll_interval: Duration,
}

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct RemoteBackend {
    inner: Arc<RemoteInner>,
}

impl RemoteBackend {
    /// Create a client for the hosted document API.
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            inner: Arc::new(RemoteInner {
                client: reqwest::Client::new(),
                base: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
                poll_interval: config.poll_interval,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.inner.base)
    }

    fn doc_url(&self, doc: &DocumentRef) -> String {
        self.url(&format!("{}/{}", doc.collection(), doc.key()))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(&self.inner.api_key)
    }

    /// Turn an error-status response into [`StoreError::Api`], pulling the
    /// message out of the body when the service provides one.
    async fn api_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = match response.json::<RemoteError>().await {
            Ok(remote) => remote.error,
            Err(_) => "(no error details provided)".to_owned(),
        };
        StoreError::Api { status, message }
    }

    async fn fetch(&self, doc: &DocumentRef) -> Result<Snapshot, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.doc_url(doc))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Snapshot::missing());
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let remote: RemoteDocument = response.json().await?;
        Ok(Snapshot {
            rev: remote.rev,
            body: remote.body,
        })
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    #[instrument(skip(self), fields(doc = %doc))]
    async fn read(&self, doc: &DocumentRef) -> Result<Snapshot, StoreError> {
        self.fetch(doc).await
    }

    #[instrument(skip(self, body), fields(doc = %doc))]
    async fn write(
        &self,
        doc: &DocumentRef,
        body: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let method = match mode {
            WriteMode::Replace => reqwest::Method::PUT,
            WriteMode::Merge => reqwest::Method::PATCH,
        };
        let response = self
            .request(method, self.doc_url(doc))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(doc = %doc))]
    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, self.doc_url(doc))
            .send()
            .await?;
        // Deleting a missing document succeeds.
        if response.status() == reqwest::StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::api_error(response).await)
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Snapshot)>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.url(collection))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let remote: RemoteCollection = response.json().await?;
        Ok(remote
            .documents
            .into_iter()
            .map(|entry| {
                (
                    entry.key,
                    Snapshot {
                        rev: entry.rev,
                        body: entry.body,
                    },
                )
            })
            .collect())
    }

    async fn watch(&self, doc: &DocumentRef) -> Result<DocumentWatch, StoreError> {
        let initial = self.fetch(doc).await?;
        let (tx, rx) = watch::channel(initial);

        let this = self.clone();
        let doc = doc.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.inner.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                match this.fetch(&doc).await {
                    Ok(snapshot) => {
                        // Monotonic per document: never step a watcher backwards.
                        tx.send_if_modified(|current| {
                            if snapshot.rev > current.rev {
                                *current = snapshot;
                                true
                            } else {
                                false
                            }
                        });
                    }
                    Err(error) => {
                        debug!(%doc, %error, "change poll failed, keeping last snapshot");
                    }
                }
            }
            debug!(%doc, "watch torn down");
        });

        Ok(rx)
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.url("auth/verify"))
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(StoreError::from)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await.into());
        }
        let identity: Identity = response.json().await.map_err(StoreError::from)?;
        Ok(identity)
    }

    async fn register(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.url("auth/register"))
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(StoreError::from)?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(AuthError::AccountExists);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await.into());
        }
        let identity: Identity = response.json().await.map_err(StoreError::from)?;
        Ok(identity)
    }

    async fn store_media(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let response = self
            .request(reqwest::Method::PUT, self.url(&format!("media/{path}")))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let media: RemoteMedia = response.json().await?;
        Ok(media.url)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.url("health"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client(base: &str) -> RemoteBackend {
        RemoteBackend::new(&RemoteConfig {
            base_url: base.to_owned(),
            api_key: SecretString::from("k3y-f0r-t3sts-0nly"),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    #[test]
    fn test_document_urls() {
        let backend = client("https://api.sokoni.app");
        let doc = DocumentRef::new("carts", "buyer-1");
        assert_eq!(
            backend.doc_url(&doc),
            "https://api.sokoni.app/v1/carts/buyer-1"
        );
        assert_eq!(
            backend.url("sellers"),
            "https://api.sokoni.app/v1/sellers"
        );
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let backend = client("https://api.sokoni.app/");
        assert_eq!(
            backend.url("health"),
            "https://api.sokoni.app/v1/health"
        );
    }

    #[test]
    fn test_api_error_display() {
        let error = StoreError::Api {
            status: 503,
            message: "maintenance".to_owned(),
        };
        assert_eq!(error.to_string(), "api error (503): maintenance");
    }
}
