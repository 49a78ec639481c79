//! The backend capability trait and its error taxonomy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use sokoni_core::Email;

use crate::document::{DocumentRef, Snapshot, WriteMode};

/// Collection names used by the marketplace.
pub mod collections {
    /// One cart document per buyer, keyed by buyer id.
    pub const CARTS: &str = "carts";
    /// One profile document per seller, keyed by seller id.
    pub const SELLERS: &str = "sellers";
    /// One catalog document per seller, keyed by seller id.
    pub const CATALOGS: &str = "catalogs";
}

/// A live watch on one document.
///
/// The receiver always holds the latest [`Snapshot`]; intermediate
/// revisions may be skipped (latest-value-wins). Dropping every receiver
/// tears the underlying subscription down; an in-flight write is not
/// cancelled by that, its snapshot simply has nowhere to go.
pub type DocumentWatch = watch::Receiver<Snapshot>;

/// Errors from document and media operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The document API answered with an error status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The local data file could not be read or written.
    #[error("local data file error: {0}")]
    DataFile(#[from] std::io::Error),
}

/// Errors from credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not verify.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountExists,

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The authenticated principal, as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account id; doubles as the buyer/seller document key.
    pub id: String,
    /// The account's email address.
    pub email: Email,
}

/// The hosted data-store capability set.
///
/// Documents, realtime watches, credential verification, and media blobs.
/// Every call is a suspension point; callers must not assume completion
/// order between a write and a concurrently delivered watch snapshot.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the current snapshot of a document.
    ///
    /// A document that does not exist reads as [`Snapshot::missing`]
    /// rather than an error.
    async fn read(&self, doc: &DocumentRef) -> Result<Snapshot, StoreError>;

    /// Write a document body.
    ///
    /// [`WriteMode::Replace`] overwrites the whole document;
    /// [`WriteMode::Merge`] merges fields shallowly. Either mode creates
    /// a missing document. Last writer wins; there is no version check.
    async fn write(&self, doc: &DocumentRef, body: Value, mode: WriteMode)
    -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError>;

    /// List all documents in a collection as `(key, snapshot)` pairs.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Snapshot)>, StoreError>;

    /// Watch a document for changes.
    ///
    /// The returned receiver is primed with the current snapshot, so the
    /// first borrow never blocks on a delivery.
    async fn watch(&self, doc: &DocumentRef) -> Result<DocumentWatch, StoreError>;

    /// Verify an email/password pair, returning the account identity.
    async fn verify_credentials(&self, email: &Email, password: &str)
    -> Result<Identity, AuthError>;

    /// Create an account, returning the new identity.
    async fn register(&self, email: &Email, password: &str) -> Result<Identity, AuthError>;

    /// Store a media blob, returning the public URL it is served from.
    async fn store_media(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    /// Cheap reachability probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
