// crates/lab-core/src/workflow.rs - Posting a note
//
// One invocation posts at most one note:
//
//   address has a reply target?
//     no:  compose -> create top-level note
//     yes, body from -m/-F: compose -> list discussions -> find note -> reply
//     yes, body from editor: list discussions -> find note -> (quote) -> edit -> reply
//
// Nothing is written to the forge until a non-empty body exists. A -m or -F
// body is checked before any request at all; only the editor path reads the
// discussions first, since --quote needs the replied-to note.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::compose::{self, Editor};
use crate::discussion;
use crate::forge::{Forge, ForgeError};
use crate::target::{ReplyTarget, TargetRef};

/// Errors that abort a note before or during submission
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("aborting note due to empty note message")]
    EmptyMessage,

    #[error("cannot read message file {path}: {source}")]
    MessageFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("edit session failed: {0}")]
    Edit(#[from] io::Error),

    #[error(transparent)]
    Remote(#[from] ForgeError),

    #[error("note {note_id} not found on {target}")]
    NoteNotFound { target: TargetRef, note_id: u64 },
}

/// Result type for note operations
pub type NoteResult<T> = Result<T, NoteError>;

/// Everything one note invocation needs, built once from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRequest {
    pub target: TargetRef,
    pub reply: Option<ReplyTarget>,
    /// -m paragraphs, in the order given
    pub messages: Vec<String>,
    /// -F file; when set it is the whole body and -m is ignored
    pub file: Option<PathBuf>,
    /// Seed the editor with the replied-to note as a blockquote
    pub quote: bool,
    /// End every line with two spaces
    pub force_linebreak: bool,
}

impl NoteRequest {
    pub fn new(target: TargetRef) -> Self {
        Self {
            target,
            reply: None,
            messages: Vec::new(),
            file: None,
            quote: false,
            force_linebreak: false,
        }
    }

    /// Whether the body comes from -F or -m rather than an editor session
    pub fn has_explicit_body(&self) -> bool {
        self.file.is_some() || !self.messages.is_empty()
    }
}

/// Compose the note described by `request` and submit it
///
/// Returns the web URL of the created note.
pub fn post_note<F, E>(forge: &F, editor: &E, request: &NoteRequest) -> NoteResult<String>
where
    F: Forge + ?Sized,
    E: Editor + ?Sized,
{
    let target = &request.target;

    // Top-level note: nothing to look up, compose and create
    let Some(reply) = request.reply else {
        if request.quote {
            tracing::warn!("--quote has no effect without a note id to reply to");
        }
        let body = compose_body(editor, request, "")?;
        tracing::info!(container = %target, "creating note");
        return Ok(forge.create_note(target, &body)?);
    };

    // -F and -m bodies never see the quote seed, so they are resolved (and
    // rejected when empty) before the forge is contacted
    let early_body = if request.has_explicit_body() {
        if request.quote {
            tracing::warn!("--quote only seeds the editor; ignored with -m or -F");
        }
        Some(compose_body(editor, request, "")?)
    } else {
        None
    };

    // Find the thread that holds the replied-to note
    let discussions = forge.list_discussions(target)?;
    tracing::debug!(container = %target, count = discussions.len(), "fetched discussions");

    let located = discussion::find_note(&discussions, reply.note_id).ok_or_else(|| {
        NoteError::NoteNotFound {
            target: target.clone(),
            note_id: reply.note_id,
        }
    })?;

    // Editor path: optionally seed the buffer with the quoted note
    let body = match early_body {
        Some(body) => body,
        None => {
            let seed = if request.quote {
                compose::quote(&located.note.body)
            } else {
                String::new()
            };
            compose_body(editor, request, &seed)?
        }
    };

    tracing::info!(container = %target, discussion = %located.discussion.id, "replying to note {}", reply.note_id);
    Ok(forge.create_discussion_reply(target, &located.discussion.id, &body)?)
}

/// Resolve the body from file, messages or editor, then apply formatting
fn compose_body<E>(editor: &E, request: &NoteRequest, seed: &str) -> NoteResult<String>
where
    E: Editor + ?Sized,
{
    let body = match &request.file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| NoteError::MessageFile {
            path: path.clone(),
            source,
        })?,
        None => compose::resolve_message(&request.messages, seed, request.target.kind, editor)?,
    };

    if body.trim().is_empty() {
        return Err(NoteError::EmptyMessage);
    }

    if request.force_linebreak {
        Ok(compose::force_linebreaks(&body))
    } else {
        Ok(body)
    }
}
