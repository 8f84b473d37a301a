// crates/lab-core/src/discussion.rs - Discussion threads and reply-target lookup
//
// A discussion is an ordered thread of notes as returned by the forge. Field
// names match the REST API's JSON so the types deserialize directly from a
// response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user who wrote a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// A single comment, possibly part of a threaded discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    /// Automated notes (label changes, pushes, ...) are never reply targets
    #[serde(default)]
    pub system: bool,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// An ordered thread of notes sharing a remote-assigned thread id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    /// True for a standalone comment that was never replied to
    #[serde(default)]
    pub individual_note: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Discussion {
    /// Notes created strictly after `since`, in thread order, paired with
    /// their position in the thread (0 is the note that opened it)
    ///
    /// With no cutoff every note is returned.
    pub fn notes_since(&self, since: Option<DateTime<Utc>>) -> impl Iterator<Item = (usize, &Note)> {
        self.notes
            .iter()
            .enumerate()
            .filter(move |(_, note)| since.is_none_or(|cutoff| note.created_at > cutoff))
    }
}

/// A reply target found in a list of discussions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedNote<'a> {
    pub discussion: &'a Discussion,
    pub note: &'a Note,
}

/// Find the user-authored note with the given id
///
/// Discussions are scanned in the order the forge returned them and notes in
/// thread order. System notes are skipped even when their id matches. Ids are
/// unique per forge, so the first match is the only match.
pub fn find_note(discussions: &[Discussion], note_id: u64) -> Option<LocatedNote<'_>> {
    discussions.iter().find_map(|discussion| {
        discussion
            .notes
            .iter()
            .filter(|note| !note.system)
            .find(|note| note.id == note_id)
            .map(|note| LocatedNote { discussion, note })
    })
}
