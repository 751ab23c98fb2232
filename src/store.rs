//! In-memory document store.
//!
//! Documents are immutable once created; the only mutations are create and delete.
//! The store enforces the non-empty title/content invariant itself instead of
//! relying on callers.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::Document;
use crate::error::StoreError;

struct Stored {
  /// Insertion order, breaks ties between equal timestamps.
  seq: u64,
  doc: Document,
}

#[derive(Default)]
struct Inner {
  by_id: HashMap<String, Stored>,
  next_seq: u64,
}

#[derive(Default)]
pub struct DocumentStore {
  inner: RwLock<Inner>,
}

impl DocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "debug", skip(self, content), fields(%title, content_len = content.len(), %media_type))]
  pub async fn create(&self, title: &str, content: String, media_type: &str) -> Result<Document, StoreError> {
    if title.trim().is_empty() {
      return Err(StoreError::EmptyTitle);
    }
    if content.trim().is_empty() {
      return Err(StoreError::EmptyContent);
    }

    let doc = Document {
      id: Uuid::new_v4().to_string(),
      title: title.to_string(),
      content,
      media_type: media_type.to_string(),
      created_at: Utc::now(),
    };

    let mut inner = self.inner.write().await;
    let seq = inner.next_seq;
    inner.next_seq += 1;
    inner.by_id.insert(doc.id.clone(), Stored { seq, doc: doc.clone() });
    info!(target: "documents", id = %doc.id, %title, total = inner.by_id.len(), "Document stored");
    Ok(doc)
  }

  /// All documents, newest first.
  pub async fn list(&self) -> Vec<Document> {
    let inner = self.inner.read().await;
    let mut stored: Vec<&Stored> = inner.by_id.values().collect();
    stored.sort_by(|a, b| {
      b.doc
        .created_at
        .cmp(&a.doc.created_at)
        .then_with(|| b.seq.cmp(&a.seq))
    });
    stored.into_iter().map(|s| s.doc.clone()).collect()
  }

  pub async fn get(&self, id: &str) -> Result<Document, StoreError> {
    let inner = self.inner.read().await;
    inner
      .by_id
      .get(id)
      .map(|s| s.doc.clone())
      .ok_or_else(|| StoreError::NotFound(id.to_string()))
  }

  /// Removes and returns the document.
  #[instrument(level = "debug", skip(self))]
  pub async fn delete(&self, id: &str) -> Result<Document, StoreError> {
    let mut inner = self.inner.write().await;
    let removed = inner
      .by_id
      .remove(id)
      .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    info!(target: "documents", %id, total = inner.by_id.len(), "Document deleted");
    Ok(removed.doc)
  }

  pub async fn len(&self) -> usize {
    self.inner.read().await.by_id.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.inner.read().await.by_id.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn create_assigns_identity_and_keeps_fields() {
    let store = DocumentStore::new();
    let doc = store.create("notes.txt", "Paris".into(), "text/plain").await.unwrap();
    assert!(!doc.id.is_empty());
    assert_eq!(doc.title, "notes.txt");
    assert_eq!(doc.content, "Paris");
    assert_eq!(doc.media_type, "text/plain");
    assert_eq!(store.get(&doc.id).await.unwrap(), doc);
  }

  #[tokio::test]
  async fn empty_content_is_rejected() {
    let store = DocumentStore::new();
    assert_eq!(store.create("a.txt", "".into(), "text/plain").await, Err(StoreError::EmptyContent));
    assert_eq!(store.create("a.txt", " \n\t".into(), "text/plain").await, Err(StoreError::EmptyContent));
    assert_eq!(store.create(" ", "text".into(), "text/plain").await, Err(StoreError::EmptyTitle));
    assert!(store.is_empty().await);
  }

  #[tokio::test]
  async fn list_is_newest_first() {
    let store = DocumentStore::new();
    let a = store.create("a", "x".into(), "text/plain").await.unwrap();
    let b = store.create("b", "y".into(), "text/plain").await.unwrap();
    let c = store.create("c", "z".into(), "text/plain").await.unwrap();
    let ids: Vec<String> = store.list().await.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
  }

  #[tokio::test]
  async fn len_and_is_empty_track_contents() {
    let store = DocumentStore::new();
    assert!(store.is_empty().await);
    let doc = store.create("a", "x".into(), "text/plain").await.unwrap();
    assert_eq!(store.len().await, 1);
    assert!(!store.is_empty().await);
    store.delete(&doc.id).await.unwrap();
    assert!(store.is_empty().await);
  }

  #[tokio::test]
  async fn delete_unknown_is_not_found() {
    let store = DocumentStore::new();
    assert_eq!(store.delete("missing").await, Err(StoreError::NotFound("missing".into())));
  }

  #[tokio::test]
  async fn deleted_document_is_gone() {
    let store = DocumentStore::new();
    let doc = store.create("a", "x".into(), "text/plain").await.unwrap();
    assert_eq!(store.delete(&doc.id).await.unwrap().id, doc.id);
    assert_eq!(store.get(&doc.id).await, Err(StoreError::NotFound(doc.id.clone())));
    assert_eq!(store.delete(&doc.id).await, Err(StoreError::NotFound(doc.id)));
  }
}
