use crate::domain::{BumpKind, ChangeRequest};

/// Label that forces a major release
pub const MAJOR_LABEL: &str = "major";
/// Label that requests at least a minor release
pub const MINOR_LABEL: &str = "minor";

/// Derive the bump type from the labels on a set of change requests.
///
/// Labels are compared case-insensitively. A `major` label anywhere wins
/// immediately; otherwise any `minor` label upgrades the result; everything
/// else (including an empty input) is a patch release.
pub fn classify(requests: &[ChangeRequest]) -> BumpKind {
    let mut bump = BumpKind::Patch;

    for request in requests {
        let labels: Vec<String> = request.labels.iter().map(|l| l.to_lowercase()).collect();

        if labels.iter().any(|l| l == MAJOR_LABEL) {
            return BumpKind::Major;
        }
        if labels.iter().any(|l| l == MINOR_LABEL) {
            bump = BumpKind::Minor;
        }
    }

    bump
}
