use std::path::PathBuf;

use clap::Parser;

use git_release_notes::cli::{run_release_workflow, ReleaseWorkflowArgs};
use git_release_notes::pipeline::ReleaseOutcome;
use git_release_notes::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-release-notes",
    version,
    about = "Compute the next version and changelog entry from merged pull requests"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Branch whose merged pull requests are released")]
    base_branch: Option<String>,

    #[arg(long, help = "Repository directory (defaults to the current directory)")]
    repo_dir: Option<PathBuf>,

    #[arg(long, help = "Preview the changelog entry without changing any files")]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let workflow_args = ReleaseWorkflowArgs {
        config_path: args.config,
        base_branch: args.base_branch,
        repo_dir: args.repo_dir,
        dry_run: args.dry_run,
    };

    match run_release_workflow(workflow_args).await {
        Ok(outcome) => report(&outcome),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn report(outcome: &ReleaseOutcome) {
    match outcome {
        // Already reported by the pipeline
        ReleaseOutcome::NoMergedChanges | ReleaseOutcome::AlreadyReleased { .. } => {}
        ReleaseOutcome::Previewed(_) => {
            ui::display_success("Dry-run complete. No files were changed.");
        }
        ReleaseOutcome::Applied { plan, .. } => {
            println!(
                "\n{} Released version {} ({} pull requests)\n",
                console::style("✓").green(),
                plan.next,
                plan.requests.len()
            );
        }
    }
}
