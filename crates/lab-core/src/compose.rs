// crates/lab-core/src/compose.rs - Note body composition
//
// This module turns user input into the text that gets submitted as a note.
// The body comes from one of three places, in priority order:
//
// 1. A file given with -F (read verbatim, handled by the workflow)
// 2. One or more -m messages, joined as paragraphs
// 3. An interactive editor session seeded with a commented template
//
// EDIT TEMPLATE:
// ```text
// >quoted line of the note being replied to     <- seed (only with --quote)
//
// # Write a message for this note. Commented lines are discarded.
// ```
//
// Everything here except `resolve_message` is a pure string transform.

use std::io;

use crate::target::ContainerKind;

/// Comment character git uses when nothing else is configured
pub const DEFAULT_COMMENT_CHAR: char = '#';

/// Separator placed between -m paragraphs
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Interactive editing capability
///
/// Implementations own the temp buffer and the editor process. The core only
/// decides what goes into the buffer and how the result is cleaned up, which
/// lets tests substitute a fake that returns canned text.
pub trait Editor {
    /// Character that marks discardable lines in the edit buffer
    fn comment_char(&self) -> char;

    /// Let the user edit `text` in a buffer named after `tag` and return the
    /// raw buffer contents once the editor exits
    fn edit(&self, tag: &str, text: &str) -> io::Result<String>;
}

/// Join -m messages into paragraphs, preserving their order
pub fn join_messages<S: AsRef<str>>(messages: &[S]) -> String {
    messages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Build the edit buffer: the seed followed by one instructional comment line
pub fn note_template(seed: &str, comment_char: char) -> String {
    format!("{seed}\n{comment_char} Write a message for this note. Commented lines are discarded.")
}

/// Drop every line that starts with the comment character
///
/// Surrounding whitespace is trimmed from what is left, so a buffer that only
/// held the template comes back empty.
pub fn strip_comments(text: &str, comment_char: char) -> String {
    text.lines()
        .filter(|line| !line.starts_with(comment_char))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Blockquote a note body: every line gets a `>` prefix and the block ends
/// with a newline so the reply starts on a fresh line
pub fn quote(body: &str) -> String {
    format!(">{}\n", body.replace('\n', "\n>"))
}

/// Append two spaces to every line so markdown renders hard line breaks
///
/// Line endings are kept as they were; for CRLF the spaces go before `\r`.
pub fn force_linebreaks(body: &str) -> String {
    let mut out = body
        .split_terminator('\n')
        .map(|line| match line.strip_suffix('\r') {
            Some(line) => format!("{line}  \r"),
            None => format!("{line}  "),
        })
        .collect::<Vec<_>>()
        .join("\n");
    if body.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Produce a note body from -m messages, or from an editor session when
/// there are none
///
/// `seed` only matters for the editor path; explicit messages are used as-is.
/// The result may be empty; callers decide whether that is an error.
pub fn resolve_message<S, E>(
    messages: &[S],
    seed: &str,
    kind: ContainerKind,
    editor: &E,
) -> io::Result<String>
where
    S: AsRef<str>,
    E: Editor + ?Sized,
{
    if !messages.is_empty() {
        return Ok(join_messages(messages));
    }

    let comment_char = editor.comment_char();
    let buffer = note_template(seed, comment_char);
    tracing::debug!(tag = kind.edit_tag(), "opening note in editor");
    let edited = editor.edit(kind.edit_tag(), &buffer)?;

    Ok(strip_comments(&edited, comment_char))
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::cell::RefCell;

    /// Editor that records what it was shown and returns a canned buffer
    pub struct CannedEditor {
        pub comment_char: char,
        pub reply: Option<String>,
        pub sessions: RefCell<Vec<(String, String)>>,
    }

    impl CannedEditor {
        /// Returns the buffer unchanged, as if the user saved without typing
        pub fn untouched() -> Self {
            Self {
                comment_char: DEFAULT_COMMENT_CHAR,
                reply: None,
                sessions: RefCell::new(Vec::new()),
            }
        }

        pub fn returning(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                ..Self::untouched()
            }
        }
    }

    impl Editor for CannedEditor {
        fn comment_char(&self) -> char {
            self.comment_char
        }

        fn edit(&self, tag: &str, text: &str) -> io::Result<String> {
            self.sessions
                .borrow_mut()
                .push((tag.to_string(), text.to_string()));
            Ok(self.reply.clone().unwrap_or_else(|| text.to_string()))
        }
    }

    /// Editor whose buffer cannot be written
    pub struct BrokenEditor;

    impl Editor for BrokenEditor {
        fn comment_char(&self) -> char {
            DEFAULT_COMMENT_CHAR
        }

        fn edit(&self, _tag: &str, _text: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only git dir"))
        }
    }
}
