//! Git operations abstraction layer
//!
//! The release pipeline only needs a narrow, read-mostly view of git: which
//! tags exist (newest first), when the commit behind a tag was authored, and
//! what a file looked like at a tag. [`TagStore`] captures exactly that.
//!
//! - [repository::Git2TagStore]: a real implementation using the `git2` crate
//! - [mock::MockTagStore]: an in-memory implementation for testing
//!
//! ```rust
//! # use git_release_notes::git::TagStore;
//! # fn example<T: TagStore>(tags: &T) -> git_release_notes::Result<()> {
//! if let Some(tag) = tags.latest_tag()? {
//!     let changelog = tags.read_file_at_tag(&tag, "CHANGELOG.md")?;
//!     println!("{} has changelog: {}", tag, changelog.is_some());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockTagStore;
pub use repository::Git2TagStore;

use crate::error::Result;
use chrono::{DateTime, FixedOffset};

/// Read access to tags and tagged content
///
/// Implementations map their underlying failures to
/// [crate::error::ReleaseError::VersionControl]. Callers in the pipeline treat
/// those failures as "no prior release" rather than aborting.
pub trait TagStore {
    /// Fetch all tags from a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// List tag names sorted by creation date, newest first
    ///
    /// Annotated tags use the tagger date, lightweight tags the committer
    /// date of the tagged commit.
    fn list_tags_by_creation(&self) -> Result<Vec<String>>;

    /// The most recently created tag, if any
    fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.list_tags_by_creation()?.into_iter().next())
    }

    /// Read a file as it was recorded at a tag
    ///
    /// # Returns
    /// * `Ok(Some(content))` - The file exists at that tag
    /// * `Ok(None)` - The file does not exist at that tag
    /// * `Err` - The tag cannot be resolved or git fails
    fn read_file_at_tag(&self, tag: &str, path: &str) -> Result<Option<String>>;

    /// Author date of the commit a tag points at, with its original offset
    fn tag_commit_date(&self, tag: &str) -> Result<DateTime<FixedOffset>>;
}
