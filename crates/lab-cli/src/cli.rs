use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "lab")]
#[command(about = "A git-aware command-line client for GitLab issues and merge requests")]
#[command(version)]
pub struct Cli {
    /// Config file (replaces the global and repository lab.toml)
    #[arg(long, global = true, env = "LAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level command categories
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with issues
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Work with merge requests
    #[command(subcommand)]
    Mr(MrCommands),
}

/// Issue subcommands
#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Add a note or comment to an issue
    #[command(visible_aliases = ["comment", "reply"])]
    Note(NoteArgs),
}

/// Merge request subcommands
#[derive(Subcommand, Debug)]
pub enum MrCommands {
    /// Add a note or comment to a merge request
    #[command(visible_aliases = ["comment", "reply"])]
    Note(NoteArgs),

    /// Describe a merge request
    #[command(visible_alias = "get")]
    Show(ShowArgs),
}

/// Arguments shared by `issue note` and `mr note`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NoteArgs {
    /// [remote] <id>[:<note_id>]; with a note id the note is posted as a reply
    #[arg(required = true, num_args = 1..=2, value_name = "[REMOTE] ID[:NOTE_ID]")]
    pub args: Vec<String>,

    /// Use the given message; multiple -m are concatenated as separate paragraphs
    #[arg(short, long = "message", value_name = "MSG")]
    pub messages: Vec<String>,

    /// Use the given file as the message
    #[arg(short = 'F', long)]
    pub file: Option<PathBuf>,

    /// Append 2 spaces to the end of each line to force markdown linebreaks
    #[arg(long)]
    pub force_linebreak: bool,

    /// Quote the replied-to note (only used with <id>:<note_id>)
    #[arg(long)]
    pub quote: bool,
}

/// Arguments for `mr show`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// [remote] <id>
    #[arg(required = true, num_args = 1..=2, value_name = "[REMOTE] ID")]
    pub args: Vec<String>,

    /// Show comments for the merge request
    #[arg(short, long)]
    pub comments: bool,

    /// Show comments since the given time (e.g. 2020-08-21 14:57:46.808 +0000 UTC)
    #[arg(short, long, requires = "comments")]
    pub since: Option<String>,

    /// Show the merge request's commits as patches
    #[arg(short, long)]
    pub patch: bool,

    /// Show patches oldest first
    #[arg(long, requires = "patch")]
    pub reverse: bool,
}
