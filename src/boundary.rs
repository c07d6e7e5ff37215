use std::fmt;

/// Non-fatal conditions met while resolving the previous release.
/// Each one has a safe fallback; they are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Tags could not be fetched from the remote; local tags are used
    TagFetchFailed { remote: String, reason: String },
    /// The tag list could not be read; the repository is treated as untagged
    TagsUnavailable { reason: String },
    /// The date of the latest tag could not be read; the window starts at epoch
    TagDateUnavailable { tag: String, reason: String },
    /// A manifest at the latest tag could not be read or parsed
    ManifestUnreadable {
        tag: String,
        path: String,
        reason: String,
    },
    /// The changelog at the latest tag could not be read; it is treated as empty
    ChangelogUnavailable { tag: String, reason: String },
    /// The working tree manifest is not valid JSON; the version file was written instead
    ManifestInvalid {
        path: String,
        fallback: String,
        reason: String,
    },
    /// The version tool failed and the manifest was edited directly
    VersionToolFailed { reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::TagFetchFailed { remote, reason } => {
                write!(f, "Failed to fetch tags from '{}': {}", remote, reason)
            }
            BoundaryWarning::TagsUnavailable { reason } => {
                write!(f, "Cannot list tags, assuming no previous release: {}", reason)
            }
            BoundaryWarning::TagDateUnavailable { tag, reason } => {
                write!(
                    f,
                    "Cannot read date of tag '{}', using 1970-01-01: {}",
                    tag, reason
                )
            }
            BoundaryWarning::ManifestUnreadable { tag, path, reason } => {
                write!(f, "Cannot read {} from tag '{}': {}", path, tag, reason)
            }
            BoundaryWarning::ChangelogUnavailable { tag, reason } => {
                write!(
                    f,
                    "Could not retrieve changelog from tag '{}': {}",
                    tag, reason
                )
            }
            BoundaryWarning::ManifestInvalid {
                path,
                fallback,
                reason,
            } => {
                write!(f, "Cannot update {}, wrote {} instead: {}", path, fallback, reason)
            }
            BoundaryWarning::VersionToolFailed { reason } => {
                write!(f, "Version tool failed, edited manifest directly: {}", reason)
            }
        }
    }
}
