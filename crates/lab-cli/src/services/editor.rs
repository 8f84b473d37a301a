// crates/lab-cli/src/services/editor.rs - Editor Integration Service
//
// Implements the core `Editor` capability with a real editor process. The
// buffer lives in the repository's git directory the same way git keeps
// COMMIT_EDITMSG, so an editor configured for commit messages (syntax,
// spell-check, wrap width) behaves the same for notes.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use lab_core::Editor;

use super::git::GitService;

/// Opens note buffers in the user's editor
///
/// EDITOR SELECTION HIERARCHY:
/// 1. [editor] command in lab.toml, or LAB_EDITOR
/// 2. GIT_EDITOR environment variable
/// 3. git config core.editor
/// 4. VISUAL, then EDITOR
/// 5. vi (notepad on Windows)
pub struct EditorService {
    configured: Option<String>,
    buffer_dir: PathBuf,
    comment_char: char,
}

impl EditorService {
    /// Editor service for the current repository
    ///
    /// Outside a repository buffers go to the system temp directory.
    pub fn new(configured: Option<String>, git_dir: Option<&Path>) -> Self {
        let buffer_dir = git_dir.map_or_else(env::temp_dir, Path::to_path_buf);
        Self::with_buffer_dir(configured, buffer_dir, GitService::comment_char())
    }

    pub fn with_buffer_dir(configured: Option<String>, buffer_dir: PathBuf, comment_char: char) -> Self {
        Self {
            configured,
            buffer_dir,
            comment_char,
        }
    }

    /// Get the editor command to use for note buffers
    pub fn get_editor_command(&self) -> String {
        select_editor(
            self.configured.clone(),
            |name| env::var(name).ok(),
            || GitService::config_value("core.editor"),
        )
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        })
    }

    /// Path of the buffer for a given tag, e.g. `.git/MR_NOTE_EDITMSG`
    pub fn buffer_path(&self, tag: &str) -> PathBuf {
        self.buffer_dir.join(format!("{tag}_EDITMSG"))
    }

    /// Launch the editor on `path` and wait for it to exit
    ///
    /// The command is split with shell quoting rules, so values like
    /// `code --wait` or `"/opt/My Editor/bin/edit" -n` work.
    fn open_file(&self, path: &Path) -> io::Result<()> {
        let editor = self.get_editor_command();
        let words = shell_words::split(&editor).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot parse editor command '{editor}': {e}"),
            )
        })?;
        let Some((program, args)) = words.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty"));
        };

        tracing::debug!(%editor, file = %path.display(), "launching editor");
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "failed to launch editor '{editor}': {e}\n\nTips:\n- Check that '{program}' is installed and in PATH\n- Set LAB_EDITOR, GIT_EDITOR or EDITOR"
                    ),
                )
            })?;

        if !status.success() {
            return Err(io::Error::other(format!(
                "editor '{editor}' exited with {status}; note discarded"
            )));
        }

        Ok(())
    }
}

impl Editor for EditorService {
    fn comment_char(&self) -> char {
        self.comment_char
    }

    fn edit(&self, tag: &str, text: &str) -> io::Result<String> {
        let path = self.buffer_path(tag);
        fs::write(&path, text)?;

        // The buffer goes away whether or not the session succeeded
        let edited = self.open_file(&path).and_then(|()| fs::read_to_string(&path));
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(file = %path.display(), "could not remove edit buffer: {e}");
        }

        edited
    }
}

/// First non-blank editor in selection order; unset and blank values are
/// both skipped
fn select_editor<V, C>(configured: Option<String>, var: V, core_editor: C) -> Option<String>
where
    V: Fn(&str) -> Option<String>,
    C: FnOnce() -> Option<String>,
{
    let usable = |editor: &String| !editor.trim().is_empty();

    configured
        .filter(usable)
        .or_else(|| var("GIT_EDITOR").filter(usable))
        .or_else(|| core_editor().filter(usable))
        .or_else(|| var("VISUAL").filter(usable))
        .or_else(|| var("EDITOR").filter(usable))
}
