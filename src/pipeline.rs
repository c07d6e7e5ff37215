//! Release computation pipeline
//!
//! Runs the release stages in a fixed order:
//!
//! 1. fetch remote tags (best effort)
//! 2. resolve the release window from the newest tag
//! 3. read the version recorded at that tag
//! 4. fetch pull requests merged since then (none: stop)
//! 5. sort them by merge time
//! 6. classify the bump and compute the next version
//! 7. render the changelog entry
//! 8. stop if the changelog at the tag already has that version
//! 9. write the changelog and the version (apply mode only)
//!
//! Git read failures fall back to "no previous release" and are reported as
//! [`BoundaryWarning`]s. Hosting API failures abort the run; re-running is
//! safe because of step 8.

use std::cell::RefCell;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use crate::analyzer::classify;
use crate::boundary::BoundaryWarning;
use crate::changelog::{contains_version_heading, prepend_entry, render};
use crate::config::ReleaseConfig;
use crate::domain::{epoch, BumpKind, ChangeRequest, ReleaseWindow, Version};
use crate::error::Result;
use crate::forge::ChangeRequestSource;
use crate::git::TagStore;
use crate::manifest::{version_from_manifest, version_from_text, write_atomic};
use crate::manifest::{ManifestUpdate, ManifestUpdater};
use crate::ui;

/// Whether a run persists its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write the changelog and the version
    Apply,
    /// Only print the rendered changelog entry
    Preview,
}

/// Everything the pipeline needs besides its collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub base_branch: String,
    pub remote: String,
    pub changelog_file: String,
    pub manifest_file: String,
    pub version_file: String,
    /// Working tree the changelog and version are written to
    pub workdir: PathBuf,
    pub mode: RunMode,
    /// Date printed under the version heading
    pub release_date: NaiveDate,
}

impl PipelineSettings {
    /// Settings from the `[release]` config section, dated today (UTC)
    pub fn from_config(config: &ReleaseConfig, workdir: impl Into<PathBuf>, mode: RunMode) -> Self {
        PipelineSettings {
            base_branch: config.base_branch.clone(),
            remote: config.remote.clone(),
            changelog_file: config.changelog_file.clone(),
            manifest_file: config.manifest_file.clone(),
            version_file: config.version_file.clone(),
            workdir: workdir.into(),
            mode,
            release_date: Utc::now().date_naive(),
        }
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = date;
        self
    }
}

/// The computed release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    pub current: Version,
    pub bump: BumpKind,
    pub next: Version,
    pub window: ReleaseWindow,
    /// Pull requests in the release, oldest merge first
    pub requests: Vec<ChangeRequest>,
    /// Rendered changelog entry for `next`
    pub entry: String,
}

/// How a run ended. Every variant is a success.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// Nothing was merged since the last release; nothing written
    NoMergedChanges,
    /// The changelog at the last tag already has this version; nothing written
    AlreadyReleased { version: Version },
    /// Preview mode; nothing written
    Previewed(ReleasePlan),
    /// Changelog and version written
    Applied {
        plan: ReleasePlan,
        manifest: ManifestUpdate,
    },
}

/// Orchestrates one release run over a tag store and a pull request source
pub struct ReleasePipeline<'a, T: TagStore + ?Sized, S: ChangeRequestSource + ?Sized> {
    tags: &'a T,
    source: &'a S,
    settings: PipelineSettings,
    updater: ManifestUpdater,
    warnings: RefCell<Vec<BoundaryWarning>>,
}

impl<'a, T: TagStore + ?Sized, S: ChangeRequestSource + ?Sized> ReleasePipeline<'a, T, S> {
    pub fn new(tags: &'a T, source: &'a S, settings: PipelineSettings) -> Self {
        let updater = ManifestUpdater::new(
            settings.workdir.clone(),
            settings.manifest_file.clone(),
            settings.version_file.clone(),
        );

        ReleasePipeline {
            tags,
            source,
            settings,
            updater,
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Replace the manifest updater (e.g. to disable the version tool)
    pub fn with_updater(mut self, updater: ManifestUpdater) -> Self {
        self.updater = updater;
        self
    }

    /// Warnings reported so far
    pub fn warnings(&self) -> Vec<BoundaryWarning> {
        self.warnings.borrow().clone()
    }

    fn warn(&self, warning: BoundaryWarning) {
        ui::display_boundary_warning(&warning);
        self.warnings.borrow_mut().push(warning);
    }

    /// Run all stages.
    ///
    /// # Errors
    /// Hosting API failures and failures writing the working tree. Git read
    /// failures are downgraded to warnings.
    pub async fn run(&self) -> Result<ReleaseOutcome> {
        self.sync_tags();

        let window = self.resolve_window();
        ui::display_release_window(&window);

        let current = self.current_version(window.last_tag.as_deref());

        let mut requests = self
            .source
            .fetch_merged(&self.settings.base_branch, window.since)
            .await?;

        if requests.is_empty() {
            ui::display_status("No merged PRs found.");
            return Ok(ReleaseOutcome::NoMergedChanges);
        }

        requests.sort_by_key(|request| request.merged_at);

        let bump = classify(&requests);
        let next = current.bump(bump);
        ui::display_release_plan(&current, bump, &next, &requests);

        let entry = render(&next, self.settings.release_date, &requests);
        let previous = self.previous_changelog(window.last_tag.as_deref());

        if contains_version_heading(&previous, &next) {
            ui::display_status(&format!(
                "Changelog for version {} already exists in previous release.",
                next
            ));
            return Ok(ReleaseOutcome::AlreadyReleased { version: next });
        }

        let plan = ReleasePlan {
            current,
            bump,
            next,
            window,
            requests,
            entry,
        };

        match self.settings.mode {
            RunMode::Preview => {
                ui::display_changelog_preview(&plan.entry);
                Ok(ReleaseOutcome::Previewed(plan))
            }
            RunMode::Apply => {
                let manifest = self.commit(&plan, &previous)?;
                Ok(ReleaseOutcome::Applied { plan, manifest })
            }
        }
    }

    /// Stage 1: bring remote tags in; failure only warns
    pub fn sync_tags(&self) {
        match self.tags.fetch_tags(&self.settings.remote) {
            Ok(()) => ui::display_success("Fetched latest tags from remote"),
            Err(e) => self.warn(BoundaryWarning::TagFetchFailed {
                remote: self.settings.remote.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Stage 2: since-timestamp and last tag
    pub fn resolve_window(&self) -> ReleaseWindow {
        let tag = match self.tags.latest_tag() {
            Ok(Some(tag)) => tag,
            Ok(None) => return ReleaseWindow::from_epoch(),
            Err(e) => {
                self.warn(BoundaryWarning::TagsUnavailable {
                    reason: e.to_string(),
                });
                return ReleaseWindow::from_epoch();
            }
        };

        match self.tags.tag_commit_date(&tag) {
            Ok(date) => ReleaseWindow::new(date.with_timezone(&Utc), Some(tag)),
            Err(e) => {
                self.warn(BoundaryWarning::TagDateUnavailable {
                    tag: tag.clone(),
                    reason: e.to_string(),
                });
                ReleaseWindow::new(epoch(), Some(tag))
            }
        }
    }

    /// Stage 3: version recorded at the last tag, `0.0.0` when unknown
    pub fn current_version(&self, last_tag: Option<&str>) -> Version {
        let Some(tag) = last_tag else {
            return Version::default();
        };

        if let Some(version) = self.manifest_version_at(tag) {
            return Version::parse_lenient(&version);
        }

        match self.tags.read_file_at_tag(tag, &self.settings.version_file) {
            Ok(Some(content)) => version_from_text(&content)
                .map(|v| Version::parse_lenient(&v))
                .unwrap_or_default(),
            Ok(None) => Version::default(),
            Err(e) => {
                self.warn(BoundaryWarning::ManifestUnreadable {
                    tag: tag.to_string(),
                    path: self.settings.version_file.clone(),
                    reason: e.to_string(),
                });
                Version::default()
            }
        }
    }

    fn manifest_version_at(&self, tag: &str) -> Option<String> {
        let path = &self.settings.manifest_file;
        let unreadable = |reason: String| BoundaryWarning::ManifestUnreadable {
            tag: tag.to_string(),
            path: path.clone(),
            reason,
        };

        match self.tags.read_file_at_tag(tag, path) {
            Ok(Some(content)) => match version_from_manifest(&content) {
                Ok(version) => version,
                Err(e) => {
                    self.warn(unreadable(e.to_string()));
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.warn(unreadable(e.to_string()));
                None
            }
        }
    }

    /// Changelog content as of the last tag, empty when unknown
    pub fn previous_changelog(&self, last_tag: Option<&str>) -> String {
        let Some(tag) = last_tag else {
            return String::new();
        };

        match self.tags.read_file_at_tag(tag, &self.settings.changelog_file) {
            Ok(content) => content.unwrap_or_default(),
            Err(e) => {
                self.warn(BoundaryWarning::ChangelogUnavailable {
                    tag: tag.to_string(),
                    reason: e.to_string(),
                });
                String::new()
            }
        }
    }

    /// Stage 9: write the changelog, then the version.
    ///
    /// The manifest is read before anything is written, so an unreadable
    /// manifest aborts with the working tree untouched.
    fn commit(&self, plan: &ReleasePlan, previous: &str) -> Result<ManifestUpdate> {
        let manifest_state = self.updater.inspect()?;

        let changelog_path = self.settings.workdir.join(&self.settings.changelog_file);
        write_atomic(&changelog_path, &prepend_entry(&plan.entry, previous))?;
        ui::display_success(&format!("Updated {}", self.settings.changelog_file));

        let update = self.updater.apply(&manifest_state, &plan.next)?;
        match &update {
            ManifestUpdate::Unchanged => ui::display_status(&format!(
                "Version is already {}, no update needed.",
                plan.next
            )),
            ManifestUpdate::UpdatedByTool => ui::display_success(&format!(
                "Updated {} and lockfile to version {}",
                self.settings.manifest_file, plan.next
            )),
            ManifestUpdate::RewroteManifest { tool_error } => {
                if let Some(reason) = tool_error {
                    self.warn(BoundaryWarning::VersionToolFailed {
                        reason: reason.clone(),
                    });
                }
                ui::display_success(&format!(
                    "Updated {} to version {}",
                    self.settings.manifest_file, plan.next
                ));
            }
            ManifestUpdate::WroteVersionFile { manifest_error } => {
                if let Some(reason) = manifest_error {
                    self.warn(BoundaryWarning::ManifestInvalid {
                        path: self.settings.manifest_file.clone(),
                        fallback: self.settings.version_file.clone(),
                        reason: reason.clone(),
                    });
                }
                ui::display_success(&format!(
                    "Wrote version {} to {}",
                    plan.next, self.settings.version_file
                ));
            }
        }

        Ok(update)
    }
}
