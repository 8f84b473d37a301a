// crates/lab-core/src/target.rs - Note addressing: which container, which thread
//
// Every note command is pointed at a container (an issue or a merge request)
// with a positional argument of the shape `<id>[:<note_id>]`. The part before
// the colon is the container's project-scoped number (its "iid"); the optional
// part after it names an existing note to reply to.
//
// EXAMPLES:
// ```text
// 42        -> container 42, new top-level note
// 42:1337   -> container 42, reply in the thread that holds note 1337
// 42:0      -> container 42, new top-level note (zero means "no reply")
// 42:abc    -> error, malformed note id
// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the container id and the reply-target note id
pub const REPLY_SEPARATOR: char = ':';

/// Errors that can occur while parsing a note address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Empty ID not allowed")]
    EmptyId,

    #[error("Malformed ID '{input}': '{segment}' is not a number")]
    MalformedId { input: String, segment: String },

    #[error("Malformed ID '{0}': expected <id>[:<note_id>]")]
    TooManySeparators(String),
}

/// Result type for ID operations
pub type IdResult<T> = Result<T, IdError>;

/// The kind of container a note attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Issue,
    MergeRequest,
}

impl ContainerKind {
    /// Collection name used in REST routes and web URLs
    pub fn api_segment(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::MergeRequest => "merge_requests",
        }
    }

    /// Tag that names the interactive edit buffer for this kind.
    ///
    /// Issue and merge request notes use different buffers so that editing
    /// one never clobbers an in-progress edit of the other.
    pub fn edit_tag(self) -> &'static str {
        match self {
            Self::Issue => "ISSUE_NOTE",
            Self::MergeRequest => "MR_NOTE",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::MergeRequest => write!(f, "merge request"),
        }
    }
}

/// The note being replied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyTarget {
    pub note_id: u64,
}

/// A parsed `<id>[:<note_id>]` positional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteAddress {
    pub primary_id: u64,
    pub reply: Option<ReplyTarget>,
}

impl NoteAddress {
    /// Parse an address string (e.g., "42" or "42:1337")
    ///
    /// Both segments must be base-10 numbers. A reply segment of `0` is
    /// accepted and means "no reply target", same as omitting it.
    pub fn parse<S: AsRef<str>>(s: S) -> IdResult<Self> {
        let s = s.as_ref();
        if s.is_empty() {
            return Err(IdError::EmptyId);
        }

        let (primary, reply) = match s.split_once(REPLY_SEPARATOR) {
            Some((primary, reply)) => {
                if reply.contains(REPLY_SEPARATOR) {
                    return Err(IdError::TooManySeparators(s.to_string()));
                }
                (primary, Some(reply))
            }
            None => (s, None),
        };

        let primary_id = parse_segment(s, primary)?;
        let reply = match reply {
            Some(segment) => match parse_segment(s, segment)? {
                0 => None,
                note_id => Some(ReplyTarget { note_id }),
            },
            None => None,
        };

        Ok(Self { primary_id, reply })
    }

    /// Whether this address points at an existing note
    pub fn is_reply(&self) -> bool {
        self.reply.is_some()
    }
}

impl fmt::Display for NoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reply {
            Some(reply) => write!(f, "{}{}{}", self.primary_id, REPLY_SEPARATOR, reply.note_id),
            None => write!(f, "{}", self.primary_id),
        }
    }
}

impl FromStr for NoteAddress {
    type Err = IdError;

    fn from_str(s: &str) -> IdResult<Self> {
        Self::parse(s)
    }
}

/// Identifies which container on which remote a note attaches to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: ContainerKind,
    pub remote: String,
    pub primary_id: u64,
}

impl TargetRef {
    pub fn new<S: Into<String>>(kind: ContainerKind, remote: S, primary_id: u64) -> Self {
        Self {
            kind,
            remote: remote.into(),
            primary_id,
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}#{}", self.kind, self.remote, self.primary_id)
    }
}

fn parse_segment(input: &str, segment: &str) -> IdResult<u64> {
    // u64::from_str accepts a leading '+', which is not a valid id
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::MalformedId {
            input: input.to_string(),
            segment: segment.to_string(),
        });
    }

    segment.parse().map_err(|_| IdError::MalformedId {
        input: input.to_string(),
        segment: segment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_id() {
        let addr = NoteAddress::parse("42").unwrap();
        assert_eq!(addr.primary_id, 42);
        assert_eq!(addr.reply, None);
        assert!(!addr.is_reply());
    }

    #[test]
    fn test_reply_id() {
        let addr = NoteAddress::parse("7:15").unwrap();
        assert_eq!(addr.primary_id, 7);
        assert_eq!(addr.reply, Some(ReplyTarget { note_id: 15 }));
        assert!(addr.is_reply());
    }

    #[test]
    fn test_zero_reply_means_no_reply() {
        let addr = NoteAddress::parse("7:0").unwrap();
        assert_eq!(addr.primary_id, 7);
        assert_eq!(addr.reply, None);
    }

    #[test]
    fn test_malformed_ids() {
        assert_eq!(NoteAddress::parse(""), Err(IdError::EmptyId));
        assert!(matches!(
            NoteAddress::parse("abc"),
            Err(IdError::MalformedId { .. })
        ));
        assert!(matches!(
            NoteAddress::parse("7:abc"),
            Err(IdError::MalformedId { ref segment, .. }) if segment == "abc"
        ));
        assert!(matches!(
            NoteAddress::parse("7:"),
            Err(IdError::MalformedId { .. })
        ));
        assert!(matches!(
            NoteAddress::parse(":15"),
            Err(IdError::MalformedId { .. })
        ));
        assert!(matches!(
            NoteAddress::parse("+7"),
            Err(IdError::MalformedId { .. })
        ));
        assert_eq!(
            NoteAddress::parse("7:15:3"),
            Err(IdError::TooManySeparators("7:15:3".to_string()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(NoteAddress::parse("42").unwrap().to_string(), "42");
        assert_eq!(NoteAddress::parse("42:9").unwrap().to_string(), "42:9");

        let target = TargetRef::new(ContainerKind::MergeRequest, "origin", 3);
        assert_eq!(target.to_string(), "merge request origin#3");
    }

    #[test]
    fn test_container_kind_names() {
        assert_eq!(ContainerKind::Issue.api_segment(), "issues");
        assert_eq!(ContainerKind::MergeRequest.api_segment(), "merge_requests");
        assert_ne!(
            ContainerKind::Issue.edit_tag(),
            ContainerKind::MergeRequest.edit_tag()
        );
    }

    proptest! {
        #[test]
        fn prop_reply_address_round_trips(a in any::<u64>(), b in 1u64..) {
            let addr: NoteAddress = format!("{a}:{b}").parse().unwrap();
            prop_assert_eq!(addr.primary_id, a);
            prop_assert_eq!(addr.reply, Some(ReplyTarget { note_id: b }));
        }

        #[test]
        fn prop_plain_address_has_no_reply(a in any::<u64>()) {
            let addr: NoteAddress = a.to_string().parse().unwrap();
            prop_assert_eq!(addr.primary_id, a);
            prop_assert_eq!(addr.reply, None);
        }
    }
}
