use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted `major.minor.patch` string.
    ///
    /// Only the first three components are read; anything after them is ignored.
    /// Each component must be a run of ASCII digits, so signs, prefixes like `v`
    /// and pre-release suffixes are rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.trim().split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;

        Some(Version::new(major, minor, patch))
    }

    /// Parse a version, falling back to `0.0.0` when the input is malformed.
    pub fn parse_lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_default()
    }

    /// Bump version according to bump type
    pub fn bump(&self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Version {
                major: self.major.saturating_add(1),
                minor: 0,
                patch: 0,
            },
            BumpKind::Minor => Version {
                major: self.major,
                minor: self.minor.saturating_add(1),
                patch: 0,
            },
            BumpKind::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.saturating_add(1),
            },
        }
    }
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<u64>().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which version component a release increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(ReleaseError::InvalidBumpKind(other.to_string())),
        }
    }
}

/// Bump a version given as text by a bump type given as text.
///
/// A malformed `current` is treated as `0.0.0` before bumping, so
/// `bump_version_str("not-a-version", "patch")` yields `"0.0.1"`.
///
/// # Errors
/// Returns [`ReleaseError::InvalidBumpKind`] when `kind` is not one of
/// `major`, `minor` or `patch`.
pub fn bump_version_str(current: &str, kind: &str) -> Result<String> {
    let kind = kind.parse::<BumpKind>()?;
    Ok(Version::parse_lenient(current).bump(kind).to_string())
}
