//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text; `display_*` functions print it.
//! Styling goes through `console`, which drops colors when the output is not a
//! terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::{BumpKind, ChangeRequest, ReleaseWindow, Version};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Describe the release window in one line.
pub fn format_release_window(window: &ReleaseWindow) -> String {
    match &window.last_tag {
        Some(tag) => format!(
            "Last release tag: {}, date: {}",
            tag,
            window.since.to_rfc3339()
        ),
        None => format!(
            "No previous release tag, including everything since {}",
            window.since.to_rfc3339()
        ),
    }
}

/// Display the release window.
pub fn display_release_window(window: &ReleaseWindow) {
    display_status(&format_release_window(window));
}

/// Describe the version change in one line.
pub fn format_release_plan(current: &Version, bump: BumpKind, next: &Version) -> String {
    format!(
        "Current version: {}, bump: {}, next version: {}",
        current, bump, next
    )
}

/// Display the version change and the pull requests going into the release.
///
/// Lists up to 10 pull requests; longer lists end with a count of the rest.
pub fn display_release_plan(
    current: &Version,
    bump: BumpKind,
    next: &Version,
    requests: &[ChangeRequest],
) {
    println!(
        "\n{}",
        style(format!("{} merged pull requests", requests.len())).bold()
    );
    for request in requests.iter().take(10) {
        println!("  #{} {}", request.number, request.title);
    }
    if requests.len() > 10 {
        println!("  ... and {} more", requests.len() - 10);
    }

    println!(
        "\n{}",
        style(format_release_plan(current, bump, next)).bold()
    );
}

/// Display the rendered changelog entry in preview mode.
pub fn display_changelog_preview(entry: &str) {
    println!("\n{}\n", style("Changelog Preview:").bold().underlined());
    println!("{}", entry);
}
