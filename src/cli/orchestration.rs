//! Main workflow orchestration logic
//!
//! Wires the concrete git and GitHub collaborators from configuration and the
//! environment, then runs the release pipeline. Keeping this out of `main.rs`
//! lets the workflow be called without going through clap.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{load_config, Config, Credentials};
use crate::forge::GitHubClient;
use crate::git::Git2TagStore;
use crate::pipeline::{PipelineSettings, ReleaseOutcome, ReleasePipeline, RunMode};
use crate::ui;

/// Arguments for the release workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Overrides `release.base_branch`
    pub base_branch: Option<String>,

    /// Repository working tree, defaults to the current directory
    pub repo_dir: Option<PathBuf>,

    /// Preview mode - print the changelog entry, write nothing
    pub dry_run: bool,
}

impl ReleaseWorkflowArgs {
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::Preview
        } else {
            RunMode::Apply
        }
    }
}

/// Resolve pipeline settings from the loaded config and CLI overrides
pub fn resolve_settings(args: &ReleaseWorkflowArgs, config: &Config) -> PipelineSettings {
    let workdir = args.repo_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut settings = PipelineSettings::from_config(&config.release, workdir, args.mode());

    if let Some(branch) = &args.base_branch {
        settings.base_branch = branch.clone();
    }

    settings
}

/// Main release workflow
///
/// 1. Load configuration
/// 2. Read credentials from the environment
/// 3. Open the repository and build the API client
/// 4. Run the release pipeline
///
/// # Errors
///
/// Configuration, credential, repository, API and file-write failures. Each
/// one should end the process with a non-zero status.
pub async fn run_release_workflow(args: ReleaseWorkflowArgs) -> Result<ReleaseOutcome> {
    let config = load_config(args.config_path.as_deref())?;
    let credentials = Credentials::from_env()?;
    let settings = resolve_settings(&args, &config);

    if settings.mode == RunMode::Preview {
        ui::display_status("Running in dry-run mode...");
    }
    ui::display_status(&format!(
        "Collecting pull requests merged into '{}' of {}",
        settings.base_branch, credentials.repo
    ));

    let tags = Git2TagStore::open(&settings.workdir)
        .with_context(|| format!("Not a git repository: {}", settings.workdir.display()))?
        .with_token(credentials.token.clone());

    let client = GitHubClient::new(
        credentials.token,
        credentials.repo.owner,
        credentials.repo.name,
    )
    .with_api_base(config.github.api_base.clone());

    let pipeline = ReleasePipeline::new(&tags, &client, settings);
    let outcome = pipeline.run().await?;

    Ok(outcome)
}
