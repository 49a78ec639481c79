//! In-process backend.
//!
//! Backs tests and dev setups, and is the engine behind the local
//! file-backed backend. Every document carries its own watch channel, so
//! subscribers see writes immediately and in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use sokoni_core::Email;

use crate::document::{DocumentRef, Snapshot, WriteMode, merge_fields};
use crate::store::{AuthError, Backend, DocumentWatch, Identity, StoreError};

struct DocEntry {
    snapshot: Snapshot,
    tx: watch::Sender<Snapshot>,
}

impl DocEntry {
    fn new(snapshot: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(snapshot.clone());
        Self { snapshot, tx }
    }

    fn publish(&mut self, body: Option<Value>) {
        self.snapshot = Snapshot {
            rev: self.snapshot.rev + 1,
            body,
        };
        // Receivers may all be gone; that just means nobody is watching.
        self.tx.send_replace(self.snapshot.clone());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserEntry {
    id: String,
    // Dev fixture only: the hosted service verifies credentials itself and
    // never runs this code path, so no hashing here.
    password: String,
}

/// Serializable dump of the whole store, used by the local file backend.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StateDump {
    #[serde(default)]
    pub(crate) collections: HashMap<String, HashMap<String, Snapshot>>,
    #[serde(default)]
    users: HashMap<String, UserEntry>,
}

struct Inner {
    docs: Mutex<HashMap<String, HashMap<String, DocEntry>>>,
    users: Mutex<HashMap<String, UserEntry>>,
    media: Mutex<HashMap<String, Vec<u8>>>,
}

/// In-process implementation of [`Backend`].
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                docs: Mutex::new(HashMap::new()),
                users: Mutex::new(HashMap::new()),
                media: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn from_dump(dump: StateDump) -> Self {
        let docs = dump
            .collections
            .into_iter()
            .map(|(collection, docs)| {
                let entries = docs
                    .into_iter()
                    .map(|(key, snapshot)| (key, DocEntry::new(snapshot)))
                    .collect();
                (collection, entries)
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                docs: Mutex::new(docs),
                users: Mutex::new(dump.users),
                media: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn dump(&self) -> StateDump {
        let collections = lock(&self.inner.docs)
            .iter()
            .map(|(collection, docs)| {
                let snapshots = docs
                    .iter()
                    .map(|(key, entry)| (key.clone(), entry.snapshot.clone()))
                    .collect();
                (collection.clone(), snapshots)
            })
            .collect();

        StateDump {
            collections,
            users: lock(&self.inner.users).clone(),
        }
    }
}

// A poisoned lock means a panicking writer; the data itself is still the
// last consistent value, so recover the guard instead of unwrapping.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, doc: &DocumentRef) -> Result<Snapshot, StoreError> {
        let docs = lock(&self.inner.docs);
        let snapshot = docs
            .get(doc.collection())
            .and_then(|collection| collection.get(doc.key()))
            .map_or_else(Snapshot::missing, |entry| entry.snapshot.clone());
        Ok(snapshot)
    }

    async fn write(
        &self,
        doc: &DocumentRef,
        body: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let mut docs = lock(&self.inner.docs);
        let entry = docs
            .entry(doc.collection().to_owned())
            .or_default()
            .entry(doc.key().to_owned())
            .or_insert_with(|| DocEntry::new(Snapshot::missing()));

        let next = match mode {
            WriteMode::Replace => body,
            WriteMode::Merge => merge_fields(entry.snapshot.body.clone(), body),
        };
        entry.publish(Some(next));
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        let mut docs = lock(&self.inner.docs);
        if let Some(entry) = docs
            .get_mut(doc.collection())
            .and_then(|collection| collection.get_mut(doc.key()))
            && entry.snapshot.exists()
        {
            entry.publish(None);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Snapshot)>, StoreError> {
        let docs = lock(&self.inner.docs);
        let mut entries: Vec<(String, Snapshot)> = docs
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, entry)| entry.snapshot.exists())
                    .map(|(key, entry)| (key.clone(), entry.snapshot.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }

    async fn watch(&self, doc: &DocumentRef) -> Result<DocumentWatch, StoreError> {
        let mut docs = lock(&self.inner.docs);
        let entry = docs
            .entry(doc.collection().to_owned())
            .or_default()
            .entry(doc.key().to_owned())
            .or_insert_with(|| DocEntry::new(Snapshot::missing()));
        Ok(entry.tx.subscribe())
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let users = lock(&self.inner.users);
        let user = users
            .get(email.as_str())
            .filter(|user| user.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(Identity {
            id: user.id.clone(),
            email: email.clone(),
        })
    }

    async fn register(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let mut users = lock(&self.inner.users);
        if users.contains_key(email.as_str()) {
            return Err(AuthError::AccountExists);
        }
        let id = Uuid::new_v4().to_string();
        users.insert(
            email.as_str().to_owned(),
            UserEntry {
                id: id.clone(),
                password: password.to_owned(),
            },
        );
        Ok(Identity {
            id,
            email: email.clone(),
        })
    }

    async fn store_media(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        lock(&self.inner.media).insert(path.to_owned(), bytes);
        Ok(format!("memory://media/{path}"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
