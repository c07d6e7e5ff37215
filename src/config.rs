use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Name of the settings file looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "release-notes.toml";

/// Environment variable holding the `owner/name` repository slug
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// Environment variable holding the API access token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Represents the complete configuration for git-release-notes.
///
/// Contains the release settings (branch, remote, file names) and the hosting
/// API settings. Credentials are not part of the file; see [`Credentials`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

fn default_base_branch() -> String {
    "develop".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_manifest_file() -> String {
    "package.json".to_string()
}

fn default_version_file() -> String {
    "version.txt".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Settings for what a release reads and writes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Branch whose merged pull requests make up a release
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Remote to fetch tags from
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    /// Primary manifest holding a `version` field
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Plain-text fallback holding only the version string
    #[serde(default = "default_version_file")]
    pub version_file: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            base_branch: default_base_branch(),
            remote: default_remote(),
            changelog_file: default_changelog_file(),
            manifest_file: default_manifest_file(),
            version_file: default_version_file(),
        }
    }
}

/// Settings for the hosting API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_base: default_api_base(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-notes.toml` in current directory
/// 3. `release-notes.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Errors
/// Returns [`ReleaseError::Config`] if a file exists but cannot be read or parsed.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let path = if let Some(path) = config_path {
        Path::new(path).to_path_buf()
    } else if local.exists() {
        local
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(CONFIG_FILE_NAME);
        if user_path.exists() {
            user_path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse an `owner/name` slug.
    ///
    /// # Errors
    /// Returns [`ReleaseError::Config`] unless the input has exactly two
    /// non-empty segments.
    pub fn parse(slug: &str) -> Result<Self> {
        let mut parts = slug.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoSlug {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ReleaseError::config(format!(
                "Invalid repository '{}': expected owner/name",
                slug
            ))),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository and token supplied through the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub repo: RepoSlug,
    pub token: String,
}

// Keep the token out of debug output
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `GITHUB_REPOSITORY` and `GITHUB_TOKEN`.
    ///
    /// # Errors
    /// Returns [`ReleaseError::Config`] when either is missing or empty, or the
    /// repository is not an `owner/name` slug.
    pub fn from_env() -> Result<Self> {
        Self::from_values(env::var(REPOSITORY_ENV).ok(), env::var(TOKEN_ENV).ok())
    }

    pub fn from_values(repo: Option<String>, token: Option<String>) -> Result<Self> {
        let (repo, token) = match (non_empty(repo), non_empty(token)) {
            (Some(repo), Some(token)) => (repo, token),
            _ => {
                return Err(ReleaseError::config(format!(
                    "Set {} and {} env vars",
                    REPOSITORY_ENV, TOKEN_ENV
                )))
            }
        };

        Ok(Credentials {
            repo: RepoSlug::parse(&repo)?,
            token,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
