//! Domain logic - pure release rules independent of git and the hosting API

pub mod change_request;
pub mod version;

pub use change_request::{epoch, ChangeRequest, ReleaseWindow};
pub use version::{bump_version_str, BumpKind, Version};
