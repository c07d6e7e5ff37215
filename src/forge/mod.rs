//! Merged pull request retrieval
//!
//! [`ChangeRequestSource`] is the seam between the release pipeline and the
//! hosting platform. [`github::GitHubClient`] talks to the REST API;
//! [`mock::MockChangeRequestSource`] serves canned pages in tests.
//!
//! Both follow the same pagination rules (see [`retain_page`]): pages are
//! requested one after another, newest first, and retrieval stops at the first
//! empty page, the first short page, or the first page without any pull
//! request merged inside the release window.

pub mod github;
pub mod mock;

pub use github::GitHubClient;
pub use mock::MockChangeRequestSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ChangeRequest;
use crate::error::Result;

/// Records requested per page
pub const PAGE_SIZE: usize = 100;

/// Source of closed pull requests for a repository
#[async_trait]
pub trait ChangeRequestSource: Send + Sync {
    /// Fetch pull requests merged into `base` at or after `since`.
    ///
    /// The result is not guaranteed to be in chronological order.
    ///
    /// # Errors
    /// * [`crate::ReleaseError::Upstream`] - The platform answered with a non-success status
    /// * [`crate::ReleaseError::Decode`] - A response body was not the expected JSON
    /// * [`crate::ReleaseError::Transport`] - The platform could not be reached
    async fn fetch_merged(&self, base: &str, since: DateTime<Utc>) -> Result<Vec<ChangeRequest>>;
}

/// Keep the records of one page that were merged inside the window.
///
/// Returns the kept records and whether another page should be requested.
/// Pages arrive newest first, so a page with nothing inside the window means
/// the rest of the history is older.
pub fn retain_page(
    page: Vec<ChangeRequest>,
    since: DateTime<Utc>,
) -> (Vec<ChangeRequest>, bool) {
    let page_len = page.len();
    let kept: Vec<ChangeRequest> = page
        .into_iter()
        .filter(|request| request.merged_since(since))
        .collect();

    let more = !kept.is_empty() && page_len >= PAGE_SIZE;
    (kept, more)
}
