// crates/lab-cli/src/commands/note.rs - Note Commands
//
// `lab issue note` and `lab mr note` share one handler; only the container
// kind differs. The address is parsed before anything touches git, the
// editor or the network, so a typo fails fast.

use anyhow::Result;
use std::io::{self, Write};

use lab_core::{ContainerKind, Editor, Forge, NoteAddress, NoteRequest, TargetRef, post_note};

use super::split_remote;
use crate::cli::NoteArgs;
use crate::context::Context;

/// Handle `issue note` / `mr note`
pub fn handle(ctx: &Context, kind: ContainerKind, args: NoteArgs) -> Result<()> {
    // A malformed address fails here, before git, the editor or the network
    let request = build_request(kind, args, ctx.default_remote())?;
    tracing::debug!(?request, "note request");

    // Real implementations of the two capabilities post_note is written against
    let forge = ctx.forge()?;
    let editor = ctx.editor();
    run(&forge, &editor, &request, &mut io::stdout().lock())
}

/// Turn command-line arguments into a note request
fn build_request(kind: ContainerKind, args: NoteArgs, default_remote: &str) -> Result<NoteRequest> {
    let positionals = split_remote(&args.args, default_remote)?;
    let address = NoteAddress::parse(positionals.id)?;

    let mut request = NoteRequest::new(TargetRef::new(kind, positionals.remote, address.primary_id));
    request.reply = address.reply;
    request.messages = args.messages;
    // `-F ""` behaves as if no file was given
    request.file = args.file.filter(|path| !path.as_os_str().is_empty());
    request.quote = args.quote;
    request.force_linebreak = args.force_linebreak;
    Ok(request)
}

/// Post the note and print its URL
fn run<F, E, W>(forge: &F, editor: &E, request: &NoteRequest, out: &mut W) -> Result<()>
where
    F: Forge + ?Sized,
    E: Editor + ?Sized,
    W: Write,
{
    let url = post_note(forge, editor, request)?;
    writeln!(out, "{url}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::{Author, Discussion, ForgeResult, MergeRequest, Note, NoteError, Project};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Serves one discussion and records what gets posted
    struct FakeForge {
        discussions: Vec<Discussion>,
        posted: RefCell<Vec<(Option<String>, String)>>,
    }

    impl FakeForge {
        fn new() -> Self {
            let note = Note {
                id: 15,
                body: "first line\nsecond line".to_string(),
                system: false,
                author: Author {
                    username: "lab-testing".to_string(),
                    name: String::new(),
                },
                created_at: chrono::DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            };
            Self {
                discussions: vec![Discussion {
                    id: "d1".to_string(),
                    individual_note: true,
                    notes: vec![note],
                }],
                posted: RefCell::new(Vec::new()),
            }
        }
    }

    impl Forge for FakeForge {
        fn list_discussions(&self, _target: &TargetRef) -> ForgeResult<Vec<Discussion>> {
            Ok(self.discussions.clone())
        }

        fn create_note(&self, target: &TargetRef, body: &str) -> ForgeResult<String> {
            self.posted.borrow_mut().push((None, body.to_string()));
            Ok(format!("https://gitlab.com/lab-testing/test/-/{}/{}#note_100", target.kind.api_segment(), target.primary_id))
        }

        fn create_discussion_reply(&self, target: &TargetRef, discussion_id: &str, body: &str) -> ForgeResult<String> {
            self.posted
                .borrow_mut()
                .push((Some(discussion_id.to_string()), body.to_string()));
            Ok(format!("https://gitlab.com/lab-testing/test/-/{}/{}#note_101", target.kind.api_segment(), target.primary_id))
        }

        fn merge_request(&self, _remote: &str, _iid: u64) -> ForgeResult<MergeRequest> {
            unimplemented!("not used by note commands")
        }

        fn project(&self, _project_id: u64) -> ForgeResult<Project> {
            unimplemented!("not used by note commands")
        }
    }

    /// Editor that types a fixed reply over whatever it is given
    struct TypingEditor(&'static str);

    impl Editor for TypingEditor {
        fn comment_char(&self) -> char {
            '#'
        }

        fn edit(&self, _tag: &str, text: &str) -> io::Result<String> {
            Ok(format!("{}\n{text}", self.0))
        }
    }

    fn note_args(positionals: &[&str]) -> NoteArgs {
        NoteArgs {
            args: positionals.iter().map(|s| s.to_string()).collect(),
            messages: Vec::new(),
            file: None,
            force_linebreak: false,
            quote: false,
        }
    }

    #[test]
    fn test_build_request_from_reply_address() {
        let mut args = note_args(&["upstream", "7:15"]);
        args.quote = true;
        args.file = Some(PathBuf::new());

        let request = build_request(ContainerKind::Issue, args, "origin").unwrap();

        assert_eq!(request.target, TargetRef::new(ContainerKind::Issue, "upstream", 7));
        assert_eq!(request.reply.map(|r| r.note_id), Some(15));
        assert!(request.quote);
        assert_eq!(request.file, None);
    }

    #[test]
    fn test_build_request_rejects_malformed_id() {
        let err = build_request(ContainerKind::MergeRequest, note_args(&["4:abc"]), "origin").unwrap_err();
        assert!(err.to_string().contains("Malformed ID"));
    }

    #[test]
    fn test_run_prints_note_url() {
        let forge = FakeForge::new();
        let mut request = build_request(ContainerKind::MergeRequest, note_args(&["4"]), "origin").unwrap();
        request.messages = vec!["LGTM".to_string()];
        let mut out = Vec::new();

        run(&forge, &TypingEditor("unused"), &request, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://gitlab.com/lab-testing/test/-/merge_requests/4#note_100\n"
        );
        assert_eq!(*forge.posted.borrow(), vec![(None, "LGTM".to_string())]);
    }

    #[test]
    fn test_run_quoted_reply_through_editor() {
        let forge = FakeForge::new();
        let mut args = note_args(&["7:15"]);
        args.quote = true;
        let request = build_request(ContainerKind::Issue, args, "origin").unwrap();
        let mut out = Vec::new();

        run(&forge, &TypingEditor("agreed"), &request, &mut out).unwrap();

        let posted = forge.posted.borrow();
        assert_eq!(posted[0].0.as_deref(), Some("d1"));
        assert_eq!(posted[0].1, "agreed\n>first line\n>second line");
        assert!(String::from_utf8(out).unwrap().ends_with("#note_101\n"));
    }

    #[test]
    fn test_run_reports_unknown_reply_target() {
        let forge = FakeForge::new();
        let request = build_request(ContainerKind::Issue, note_args(&["7:99"]), "origin").unwrap();
        let mut out = Vec::new();

        let err = run(&forge, &TypingEditor("text"), &request, &mut out).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<NoteError>(),
            Some(NoteError::NoteNotFound { note_id: 99, .. })
        ));
        assert!(out.is_empty());
        assert!(forge.posted.borrow().is_empty());
    }
}
