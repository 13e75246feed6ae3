//! Source-control host
//!
//! Answers one question per namespace: does the branch it was built from
//! still exist?

mod github;
mod traits;

pub use github::GithubClient;
pub use traits::{BranchHost, BranchState};
