//! crm-tools - Cloud Resource Manager folder IAM and project search utilities
//!
//! # Architecture
//!
//! - **api**: `ResourceManager` service trait and its REST client
//! - **auth**: Application Default Credentials chain
//! - **folders**: breadth-first folder hierarchy walker
//! - **iam**: folder policy reporter and binding mutator
//! - **projects**: project search and grouping by parent

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod folders;
pub mod iam;
pub mod logging;
pub mod projects;

// Re-export commonly used types
pub use api::{HttpResourceManager, ResourceManager};
pub use errors::{CrmError, Result};
