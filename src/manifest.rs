//! Project manifest handling.
//!
//! The current version lives in a primary manifest (`package.json` by default,
//! a JSON object with a `version` field) or, when there is none, in a
//! plain-text file holding only the version string.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Lockfile-aware tool used to bump the primary manifest
pub const DEFAULT_VERSION_TOOL: &str = "npm";

/// Read the `version` field of a JSON manifest.
///
/// # Returns
/// * `Ok(Some(version))` - The manifest has a string `version` field
/// * `Ok(None)` - The field is missing, empty, or not a string
/// * `Err` - The content is not JSON
pub fn version_from_manifest(content: &str) -> Result<Option<String>> {
    let manifest: Value = serde_json::from_str(content)
        .map_err(|e| ReleaseError::manifest(format!("Invalid JSON manifest: {}", e)))?;

    Ok(manifest
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}

/// Read a plain-text version file, ignoring surrounding whitespace
pub fn version_from_text(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Replace the `version` field of a JSON manifest, keeping key order
pub fn set_manifest_version(content: &str, version: &Version) -> Result<String> {
    let mut manifest: Value = serde_json::from_str(content)
        .map_err(|e| ReleaseError::manifest(format!("Invalid JSON manifest: {}", e)))?;

    let object = manifest
        .as_object_mut()
        .ok_or_else(|| ReleaseError::manifest("Manifest is not a JSON object"))?;
    object.insert("version".to_string(), Value::String(version.to_string()));

    let mut out = serde_json::to_string_pretty(&manifest)
        .map_err(|e| ReleaseError::manifest(format!("Cannot serialize manifest: {}", e)))?;
    out.push('\n');
    Ok(out)
}

/// How the working tree version was updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestUpdate {
    /// The primary manifest already held the version
    Unchanged,
    /// The version tool updated the manifest (and its lockfile)
    UpdatedByTool,
    /// The manifest's `version` field was rewritten directly
    RewroteManifest { tool_error: Option<String> },
    /// The fallback file was written. `manifest_error` is set when a primary
    /// manifest exists but could not be parsed.
    WroteVersionFile { manifest_error: Option<String> },
}

/// The working tree manifest as found before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestState {
    Missing,
    Invalid { reason: String },
    Valid {
        content: String,
        version: Option<String>,
    },
}

/// File name the version tool knows how to update
const TOOL_MANIFEST_NAME: &str = "package.json";

/// Writes the next version into the working tree.
#[derive(Debug, Clone)]
pub struct ManifestUpdater {
    root: PathBuf,
    manifest_file: String,
    version_file: String,
    tool: Option<String>,
}

impl ManifestUpdater {
    pub fn new(
        root: impl Into<PathBuf>,
        manifest_file: impl Into<String>,
        version_file: impl Into<String>,
    ) -> Self {
        ManifestUpdater {
            root: root.into(),
            manifest_file: manifest_file.into(),
            version_file: version_file.into(),
            tool: Some(DEFAULT_VERSION_TOOL.to_string()),
        }
    }

    /// Never run the version tool; edit the manifest directly
    pub fn without_tool(mut self) -> Self {
        self.tool = None;
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }

    pub fn version_file_path(&self) -> PathBuf {
        self.root.join(&self.version_file)
    }

    /// Directory the version tool runs in, `None` when the tool cannot
    /// update the configured manifest
    pub fn tool_workdir(&self) -> Option<PathBuf> {
        let path = self.manifest_path();
        if path.file_name()? != TOOL_MANIFEST_NAME {
            return None;
        }
        path.parent().map(Path::to_path_buf)
    }

    /// Read and parse the working tree manifest without changing anything.
    ///
    /// # Errors
    /// Only I/O failures; unparsable content is [`ManifestState::Invalid`].
    pub fn inspect(&self) -> Result<ManifestState> {
        let manifest_path = self.manifest_path();
        if !manifest_path.exists() {
            return Ok(ManifestState::Missing);
        }

        let content = fs::read_to_string(&manifest_path)?;
        Ok(match version_from_manifest(&content) {
            Ok(version) => ManifestState::Valid { content, version },
            Err(e) => ManifestState::Invalid {
                reason: e.to_string(),
            },
        })
    }

    /// Record `version` in the primary manifest if present, else in the fallback file.
    pub fn write_version(&self, version: &Version) -> Result<ManifestUpdate> {
        let state = self.inspect()?;
        self.apply(&state, version)
    }

    /// Record `version` given a state obtained from [`ManifestUpdater::inspect`]
    pub fn apply(&self, state: &ManifestState, version: &Version) -> Result<ManifestUpdate> {
        let (content, current) = match state {
            ManifestState::Missing => {
                self.write_version_file(version)?;
                return Ok(ManifestUpdate::WroteVersionFile {
                    manifest_error: None,
                });
            }
            ManifestState::Invalid { reason } => {
                self.write_version_file(version)?;
                return Ok(ManifestUpdate::WroteVersionFile {
                    manifest_error: Some(reason.clone()),
                });
            }
            ManifestState::Valid { content, version } => (content, version),
        };

        if current.as_deref() == Some(version.to_string().as_str()) {
            return Ok(ManifestUpdate::Unchanged);
        }

        let tool_error = match (&self.tool, self.tool_workdir()) {
            (Some(tool), Some(workdir)) => match run_version_tool(tool, &workdir, version) {
                Ok(()) => return Ok(ManifestUpdate::UpdatedByTool),
                Err(e) => Some(e.to_string()),
            },
            _ => None,
        };

        write_atomic(&self.manifest_path(), &set_manifest_version(content, version)?)?;
        Ok(ManifestUpdate::RewroteManifest { tool_error })
    }

    fn write_version_file(&self, version: &Version) -> Result<()> {
        write_atomic(&self.version_file_path(), &format!("{}\n", version))
    }
}

/// `npm version {v} --no-git-tag-version` in `workdir`
fn run_version_tool(tool: &str, workdir: &Path, version: &Version) -> Result<()> {
    let status = Command::new(tool)
        .args(["version", &version.to_string(), "--no-git-tag-version"])
        .current_dir(workdir)
        .status()
        .map_err(|e| ReleaseError::manifest(format!("Cannot run {}: {}", tool, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(ReleaseError::manifest(format!(
            "{} version exited with {}",
            tool, status
        )))
    }
}

/// Write a file through a sibling temporary file and a rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ReleaseError::manifest(format!("Not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_from_manifest() {
        let content = r#"{"name": "app", "version": "1.4.2"}"#;
        assert_eq!(version_from_manifest(content).unwrap(), Some("1.4.2".to_string()));
    }

    #[test]
    fn test_version_from_manifest_missing_field() {
        assert_eq!(version_from_manifest(r#"{"name": "app"}"#).unwrap(), None);
        assert_eq!(version_from_manifest(r#"{"version": 3}"#).unwrap(), None);
        assert_eq!(version_from_manifest(r#"{"version": ""}"#).unwrap(), None);
    }

    #[test]
    fn test_version_from_manifest_invalid_json() {
        assert!(matches!(
            version_from_manifest("{not json"),
            Err(ReleaseError::Manifest(_))
        ));
    }

    #[test]
    fn test_version_from_text() {
        assert_eq!(version_from_text("2.0.1\n"), Some("2.0.1".to_string()));
        assert_eq!(version_from_text("  \n"), None);
    }

    #[test]
    fn test_set_manifest_version_keeps_key_order() {
        let content = "{\n  \"name\": \"app\",\n  \"version\": \"1.0.0\",\n  \"private\": true\n}\n";
        let updated = set_manifest_version(content, &Version::new(1, 1, 0)).unwrap();
        assert_eq!(
            updated,
            "{\n  \"name\": \"app\",\n  \"version\": \"1.1.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn test_set_manifest_version_rejects_non_object() {
        assert!(set_manifest_version("[1, 2]", &Version::new(1, 0, 0)).is_err());
    }

    #[test]
    fn test_write_version_file_when_no_manifest() {
        let dir = TempDir::new().unwrap();
        let updater = ManifestUpdater::new(dir.path(), "package.json", "version.txt").without_tool();

        let update = updater.write_version(&Version::new(0, 0, 1)).unwrap();

        assert_eq!(
            update,
            ManifestUpdate::WroteVersionFile {
                manifest_error: None
            }
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("version.txt")).unwrap(),
            "0.0.1\n"
        );
        assert!(!dir.path().join("package.json").exists());
    }

    #[test]
    fn test_write_version_rewrites_manifest_without_tool() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "version": "1.0.0"}"#,
        )
        .unwrap();
        let updater = ManifestUpdater::new(dir.path(), "package.json", "version.txt").without_tool();

        let update = updater.write_version(&Version::new(1, 1, 0)).unwrap();

        assert_eq!(update, ManifestUpdate::RewroteManifest { tool_error: None });
        let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(version_from_manifest(&content).unwrap(), Some("1.1.0".to_string()));
        assert!(!dir.path().join("version.txt").exists());
    }

    #[test]
    fn test_write_version_falls_back_when_tool_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"version": "1.0.0"}"#).unwrap();
        let mut updater = ManifestUpdater::new(dir.path(), "package.json", "version.txt");
        updater.tool = Some("definitely-not-an-installed-tool".to_string());

        let update = updater.write_version(&Version::new(2, 0, 0)).unwrap();

        assert!(matches!(
            update,
            ManifestUpdate::RewroteManifest { tool_error: Some(_) }
        ));
        let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(version_from_manifest(&content).unwrap(), Some("2.0.0".to_string()));
    }

    #[test]
    fn test_write_version_unchanged() {
        let dir = TempDir::new().unwrap();
        let original = r#"{"version": "1.0.0"}"#;
        fs::write(dir.path().join("package.json"), original).unwrap();
        let updater = ManifestUpdater::new(dir.path(), "package.json", "version.txt");

        let update = updater.write_version(&Version::new(1, 0, 0)).unwrap();

        assert_eq!(update, ManifestUpdate::Unchanged);
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            original
        );
    }

    #[test]
    fn test_invalid_manifest_falls_back_to_version_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{broken").unwrap();
        let updater = ManifestUpdater::new(dir.path(), "package.json", "version.txt").without_tool();

        let state = updater.inspect().unwrap();
        assert!(matches!(state, ManifestState::Invalid { .. }));

        let update = updater.apply(&state, &Version::new(0, 2, 0)).unwrap();

        assert!(matches!(
            update,
            ManifestUpdate::WroteVersionFile {
                manifest_error: Some(_)
            }
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("version.txt")).unwrap(),
            "0.2.0\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{broken"
        );
    }

    #[test]
    fn test_tool_runs_next_to_nested_manifest() {
        let dir = TempDir::new().unwrap();
        let updater = ManifestUpdater::new(dir.path(), "app/package.json", "version.txt");

        assert_eq!(updater.tool_workdir(), Some(dir.path().join("app")));
    }

    #[test]
    fn test_tool_skipped_for_other_manifest_names() {
        let dir = TempDir::new().unwrap();
        let updater = ManifestUpdater::new(dir.path(), "app/manifest.json", "version.txt");

        assert_eq!(updater.tool_workdir(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_nested_non_package_manifest_rewritten_directly() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("package.json"), r#"{"version": "1.0.0"}"#).unwrap();
        fs::write(
            dir.path().join("app/manifest.json"),
            r#"{"version": "1.0.0"}"#,
        )
        .unwrap();
        // `true` accepts any arguments and succeeds without touching files
        let mut updater = ManifestUpdater::new(dir.path(), "app/manifest.json", "version.txt");
        updater.tool = Some("true".to_string());

        let update = updater.write_version(&Version::new(1, 1, 0)).unwrap();

        assert_eq!(update, ManifestUpdate::RewroteManifest { tool_error: None });
        let nested = fs::read_to_string(dir.path().join("app/manifest.json")).unwrap();
        assert_eq!(version_from_manifest(&nested).unwrap(), Some("1.1.0".to_string()));
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            r#"{"version": "1.0.0"}"#
        );
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join(".CHANGELOG.md.tmp").exists());
    }
}
