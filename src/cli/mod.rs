//! CLI module for crm-tools
//!
//! Argument parsing for the `folder-iam` and `project-search` binaries.

pub mod args;

pub use args::{normalize_flag_style, CommonArgs, FolderIamArgs, ProjectSearchArgs, Verbosity};
