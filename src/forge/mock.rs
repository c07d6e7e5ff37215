//! Mock pull request source for deterministic testing.
//!
//! Pages are served from memory using the same stop rules as the real
//! client, and every page request is recorded for verification.
//!
//! ```
//! use git_release_notes::forge::{ChangeRequestSource, MockChangeRequestSource};
//! use git_release_notes::domain::{epoch, ChangeRequest};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let merged_at = "2024-05-01T10:00:00Z".parse().unwrap();
//! let source = MockChangeRequestSource::new().with_page(vec![
//!     ChangeRequest::new(1, "Fix", "https://example.com/1").with_merged_at(merged_at),
//! ]);
//!
//! let merged = source.fetch_merged("develop", epoch()).await.unwrap();
//! assert_eq!(merged.len(), 1);
//! assert_eq!(source.requested_pages(), vec![1]);
//! # });
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use super::{retain_page, ChangeRequestSource};
use crate::domain::ChangeRequest;
use crate::error::{ReleaseError, Result};

/// Configuration for how the mock should fail.
#[derive(Debug, Clone, PartialEq)]
pub enum FailWith {
    /// Non-success status with the given body
    Upstream { status: u16, body: String },
    /// Network failure
    Transport(String),
    /// Unparsable response
    Decode(String),
}

impl FailWith {
    fn to_error(&self) -> ReleaseError {
        match self {
            FailWith::Upstream { status, body } => ReleaseError::upstream(*status, body.clone()),
            FailWith::Transport(msg) => ReleaseError::transport(msg.clone()),
            FailWith::Decode(msg) => ReleaseError::decode(msg.clone()),
        }
    }
}

/// Mock source for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share the
/// recorded requests.
#[derive(Debug, Clone, Default)]
pub struct MockChangeRequestSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Debug, Default)]
struct MockSourceInner {
    /// Page `n` is `pages[n - 1]`; pages past the end are empty.
    pages: Vec<Vec<ChangeRequest>>,
    fail_with: Option<FailWith>,
    /// (base branch, page number) for every page served
    requests: Vec<(String, u32)>,
}

impl MockChangeRequestSource {
    /// Create a source with no pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of records
    pub fn with_page(self, page: Vec<ChangeRequest>) -> Self {
        self.lock().pages.push(page);
        self
    }

    /// Fail every fetch with the given error
    pub fn failing(self, fail_with: FailWith) -> Self {
        self.lock().fail_with = Some(fail_with);
        self
    }

    /// Page numbers requested so far, in order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.lock().requests.iter().map(|(_, page)| *page).collect()
    }

    /// Base branches requested so far, in order
    pub fn requested_bases(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|(base, _)| base.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockSourceInner> {
        // A poisoned lock only means another test thread panicked mid-update.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn serve_page(&self, base: &str, page: u32) -> Result<Vec<ChangeRequest>> {
        let mut inner = self.lock();
        if let Some(fail_with) = &inner.fail_with {
            return Err(fail_with.to_error());
        }
        inner.requests.push((base.to_string(), page));

        let index = (page as usize).saturating_sub(1);
        Ok(inner.pages.get(index).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ChangeRequestSource for MockChangeRequestSource {
    async fn fetch_merged(&self, base: &str, since: DateTime<Utc>) -> Result<Vec<ChangeRequest>> {
        let mut merged = Vec::new();
        let mut page: u32 = 1;

        loop {
            let records = self.serve_page(base, page)?;
            let (kept, more) = retain_page(records, since);
            merged.extend(kept);

            if !more {
                break;
            }
            page += 1;
        }

        Ok(merged)
    }
}
