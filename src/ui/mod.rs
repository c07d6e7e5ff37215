//! User interface module - console reporting for release runs.
//!
//! The tool runs unattended (typically in CI), so there are no prompts; all
//! output goes through the formatting functions in [`formatter`].

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_changelog_preview, display_error, display_release_plan,
    display_release_window, display_status, display_success, format_release_plan,
    format_release_window,
};
