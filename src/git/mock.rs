use crate::error::{ReleaseError, Result};
use crate::git::TagStore;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Mock tag store for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockTagStore {
    tags: Vec<(String, DateTime<FixedOffset>)>,
    files: HashMap<(String, String), String>,
    fail_fetch: bool,
    fail_reads: bool,
}

impl MockTagStore {
    /// Create a new empty mock tag store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag whose commit was authored at `date`.
    ///
    /// Tags are ordered by this date when listed.
    pub fn add_tag(&mut self, name: impl Into<String>, date: DateTime<FixedOffset>) {
        self.tags.push((name.into(), date));
    }

    /// Record file content as of a tag
    pub fn add_file(
        &mut self,
        tag: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.files.insert((tag.into(), path.into()), content.into());
    }

    /// Make `fetch_tags` fail
    pub fn fail_fetch(&mut self) {
        self.fail_fetch = true;
    }

    /// Make every read operation fail
    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads {
            return Err(ReleaseError::VersionControl(git2::Error::from_str(
                "mock read failure",
            )));
        }
        Ok(())
    }

    fn find_tag(&self, tag: &str) -> Result<&DateTime<FixedOffset>> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, date)| date)
            .ok_or_else(|| {
                ReleaseError::VersionControl(git2::Error::from_str(&format!(
                    "tag not found: {}",
                    tag
                )))
            })
    }
}

impl TagStore for MockTagStore {
    fn fetch_tags(&self, remote: &str) -> Result<()> {
        if self.fail_fetch {
            return Err(ReleaseError::VersionControl(git2::Error::from_str(
                &format!("remote '{}' unreachable", remote),
            )));
        }
        Ok(())
    }

    fn list_tags_by_creation(&self) -> Result<Vec<String>> {
        self.check_reads()?;
        let mut tags = self.tags.clone();
        tags.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(tags.into_iter().map(|(name, _)| name).collect())
    }

    fn read_file_at_tag(&self, tag: &str, path: &str) -> Result<Option<String>> {
        self.check_reads()?;
        self.find_tag(tag)?;
        Ok(self
            .files
            .get(&(tag.to_string(), path.to_string()))
            .cloned())
    }

    fn tag_commit_date(&self, tag: &str) -> Result<DateTime<FixedOffset>> {
        self.check_reads()?;
        self.find_tag(tag).copied()
    }
}
