// crates/lab-cli/src/services/mod.rs - Service layer modules
pub mod editor;
pub mod git;
pub mod gitlab;

pub use editor::EditorService;
pub use git::GitService;
pub use gitlab::GitLabClient;
