use chrono::{DateTime, Utc};

/// A merged (or closed) pull request as seen by the release pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub url: String,
}

impl ChangeRequest {
    /// Create a change request with no body, labels or merge time
    pub fn new(number: u64, title: impl Into<String>, url: impl Into<String>) -> Self {
        ChangeRequest {
            number,
            title: title.into(),
            body: None,
            merged_at: None,
            labels: Vec::new(),
            url: url.into(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_merged_at(mut self, merged_at: DateTime<Utc>) -> Self {
        self.merged_at = Some(merged_at);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// True when the request was merged at or after `since`
    pub fn merged_since(&self, since: DateTime<Utc>) -> bool {
        self.merged_at.is_some_and(|at| at >= since)
    }
}

/// Bounds which merged change requests belong to the next release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseWindow {
    pub since: DateTime<Utc>,
    pub last_tag: Option<String>,
}

impl ReleaseWindow {
    pub fn new(since: DateTime<Utc>, last_tag: Option<String>) -> Self {
        ReleaseWindow { since, last_tag }
    }

    /// Window used when the repository has no tags yet
    pub fn from_epoch() -> Self {
        ReleaseWindow {
            since: epoch(),
            last_tag: None,
        }
    }
}

/// `1970-01-01T00:00:00Z`
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}
