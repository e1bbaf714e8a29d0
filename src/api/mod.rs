//! API client module for the GitHub REST backend.

mod client;

pub use client::{parse_repo_ref, ApiClient, FetchLimits};
