//! External document/CDN store for certificate artifacts.
//!
//! The engine owns only the operation contract: render-and-host a
//! certificate document, return its URL. Failures here are reported to
//! the caller but never unwind already-committed completion state.

use async_trait::async_trait;
use lernix_core::types::DbId;

/// Errors from the document store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    /// The store rejected the request.
    #[error("Document store rejected the request: {0}")]
    Rejected(String),

    /// The store is temporarily unreachable; the caller may retry.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// Provider seam for the certificate document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Render and host the certificate document for a (user, course)
    /// pair, returning the public URL of the artifact.
    async fn store_certificate(
        &self,
        user_id: DbId,
        course_id: DbId,
        code: &str,
    ) -> Result<String, DocumentStoreError>;
}

/// Document store backed by the platform CDN.
///
/// Artifact URLs are deterministic per certificate code, so a retried
/// issuance produces the same URL.
pub struct CdnDocumentStore {
    base_url: String,
}

impl CdnDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

#[async_trait]
impl DocumentStore for CdnDocumentStore {
    async fn store_certificate(
        &self,
        user_id: DbId,
        course_id: DbId,
        code: &str,
    ) -> Result<String, DocumentStoreError> {
        Ok(format!(
            "{}/{course_id}/{user_id}/{code}.pdf",
            self.base_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cdn_urls_are_deterministic() {
        let store = CdnDocumentStore::new("https://cdn.example.com/certs/");
        let a = store.store_certificate(3, 7, "ABCD-EFGH-JKLM").await.unwrap();
        let b = store.store_certificate(3, 7, "ABCD-EFGH-JKLM").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "https://cdn.example.com/certs/7/3/ABCD-EFGH-JKLM.pdf");
    }
}
