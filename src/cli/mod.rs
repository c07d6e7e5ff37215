pub mod orchestration;

pub use orchestration::{resolve_settings, run_release_workflow, ReleaseWorkflowArgs};
