pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod forge;
pub mod git;
pub mod manifest;
pub mod pipeline;
pub mod ui;

pub use error::{ReleaseError, Result};
