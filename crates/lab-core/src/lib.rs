//! # lab-core
//!
//! Note addressing, composition and reply threading for the `lab` GitLab
//! client. Everything that talks to the network, git or an editor sits
//! behind the [`forge::Forge`] and [`compose::Editor`] traits, so the logic
//! here runs unchanged against fakes in tests.

pub mod compose;
pub mod config;
pub mod discussion;
pub mod forge;
pub mod remote;
pub mod target;
pub mod workflow;

pub use compose::Editor;
pub use config::{ConfigError, ConfigManager, LabConfig};
pub use discussion::{Author, Discussion, Note, find_note};
pub use forge::{Forge, ForgeError, ForgeResult, MergeRequest, Project};
pub use target::{ContainerKind, IdError, NoteAddress, ReplyTarget, TargetRef};
pub use workflow::{NoteError, NoteRequest, post_note};
