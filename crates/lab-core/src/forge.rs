// crates/lab-core/src/forge.rs - Remote API interface
//
// The hosted forge is reached through the `Forge` trait. The CLI provides the
// HTTP implementation; tests provide recording fakes. Every method is a single
// blocking round trip with no retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discussion::{Author, Discussion};
use crate::target::TargetRef;

/// Errors returned by a forge client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    #[error("GitLab returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("cannot resolve remote '{remote}': {reason}")]
    Remote { remote: String, reason: String },
}

/// Result type for forge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Operations against the hosted forge
///
/// Issue and merge request variants share one shape; the container kind in
/// `TargetRef` selects the route.
pub trait Forge {
    /// All discussion threads on the container, in creation order
    fn list_discussions(&self, target: &TargetRef) -> ForgeResult<Vec<Discussion>>;

    /// Create a new top-level note and return its web URL
    fn create_note(&self, target: &TargetRef, body: &str) -> ForgeResult<String>;

    /// Add a note to an existing thread and return its web URL
    fn create_discussion_reply(
        &self,
        target: &TargetRef,
        discussion_id: &str,
        body: &str,
    ) -> ForgeResult<String>;

    /// Fetch a merge request by its project-scoped id
    fn merge_request(&self, remote: &str, iid: u64) -> ForgeResult<MergeRequest>;

    /// Fetch a project by its numeric id
    fn project(&self, project_id: u64) -> ForgeResult<Project>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub sha: Option<String>,
    pub target_project_id: u64,
    pub author: Author,
    #[serde(default)]
    pub assignee: Option<Author>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub web_url: String,
}

impl MergeRequest {
    /// Human-readable state ("opened" -> "Open")
    pub fn status_label(&self) -> &str {
        match self.state.as_str() {
            "opened" => "Open",
            "closed" => "Closed",
            "merged" => "Merged",
            "locked" => "Locked",
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub ssh_url_to_repo: String,
    #[serde(default)]
    pub http_url_to_repo: String,
    pub web_url: String,
}
