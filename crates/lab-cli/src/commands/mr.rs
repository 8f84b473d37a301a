// crates/lab-cli/src/commands/mr.rs - Merge Request Commands
//
// `lab mr show [remote] <id>` prints a summary of the merge request, or with
// --patch its commits as patches, optionally followed by the discussion
// threads (--comments, narrowed with --since).

use anyhow::{Context as AnyhowContext, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use std::io::{self, Write};

use lab_core::remote::url_matches_project;
use lab_core::{ContainerKind, Discussion, Forge, MergeRequest, NoteAddress, Project, TargetRef};

use super::split_remote;
use crate::cli::ShowArgs;
use crate::context::Context;
use crate::services::GitService;

const TITLE_RULE: &str = "===================================";
const SECTION_RULE: &str = "-----------------------------------";
const REPLY_INDENT: &str = "    ";

/// Handle `mr show`
pub fn show(ctx: &Context, args: ShowArgs) -> Result<()> {
    // Validate everything the user typed before any git or network work
    let positionals = split_remote(&args.args, ctx.default_remote())?;
    let address = NoteAddress::parse(positionals.id)?;
    if address.is_reply() {
        bail!("mr show takes a merge request id, not <id>:<note_id>");
    }
    let iid = address.primary_id;
    let since = args.since.as_deref().map(parse_since).transpose()?;

    let forge = ctx.forge()?;
    let mr = forge.merge_request(positionals.remote, iid)?;

    if args.patch {
        // Patch mode replaces the summary. Without an explicit remote, use
        // whichever local remote fetches from the target project
        let remote = if positionals.explicit {
            positionals.remote.to_string()
        } else {
            find_local_remote(&forge, mr.target_project_id)?
        };
        let sha = mr
            .sha
            .as_deref()
            .with_context(|| format!("merge request !{iid} has no head commit"))?;

        // The head commit may only exist on the remote, so fetch it first
        GitService::fetch(&remote, sha)?;
        GitService::log_patches(&format!("{remote}/{}..{sha}", mr.target_branch), args.reverse)?;
    } else {
        // The summary names the target project, which the MR only gives by id
        let project = forge.project(mr.target_project_id)?;
        print_mr(&mut io::stdout().lock(), &mr, &project.path_with_namespace)?;
    }

    if args.comments {
        let target = TargetRef::new(ContainerKind::MergeRequest, positionals.remote, iid);
        let discussions = forge.list_discussions(&target)?;
        print_discussions(&mut io::stdout().lock(), &discussions, since)?;
    }

    Ok(())
}

/// Name of the local remote that fetches from the merge request's target
/// project
fn find_local_remote<F: Forge + ?Sized>(forge: &F, project_id: u64) -> Result<String> {
    let project = forge.project(project_id)?;
    let remotes = GitService::remotes()?;

    matching_remote(&remotes, &project)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "remote for {} not found in local remotes",
                project.path_with_namespace
            )
        })
}

fn matching_remote<'a>(remotes: &'a [(String, String)], project: &Project) -> Option<&'a str> {
    remotes
        .iter()
        .find(|(_, url)| {
            *url == project.ssh_url_to_repo
                || *url == project.http_url_to_repo
                || url_matches_project(url, &project.path_with_namespace)
        })
        .map(|(name, _)| name.as_str())
}

fn print_mr<W: Write>(out: &mut W, mr: &MergeRequest, project: &str) -> io::Result<()> {
    let assignee = mr
        .assignee
        .as_ref()
        .map(|a| a.username.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("None");
    let milestone = mr.milestone.as_ref().map_or("None", |m| m.title.as_str());
    let labels = if mr.labels.is_empty() {
        "None".to_string()
    } else {
        mr.labels.join(", ")
    };

    writeln!(out)?;
    writeln!(out, "#{} {}", mr.iid, mr.title)?;
    writeln!(out, "{TITLE_RULE}")?;
    writeln!(out, "{}", mr.description.as_deref().unwrap_or_default())?;
    writeln!(out, "{SECTION_RULE}")?;
    writeln!(out, "Project: {project}")?;
    writeln!(out, "Branches: {}->{}", mr.source_branch, mr.target_branch)?;
    writeln!(out, "Status: {}", mr.status_label())?;
    writeln!(out, "Assignee: {assignee}")?;
    writeln!(out, "Author: {}", mr.author.username)?;
    writeln!(out, "Milestone: {milestone}")?;
    writeln!(out, "Labels: {labels}")?;
    writeln!(out, "WebURL: {}", mr.web_url)
}

/// Print every thread with notes after `since`
///
/// Replies are indented under the note that started their thread. User notes
/// carry their id so it can be passed back as `<id>:<note_id>`.
fn print_discussions<W: Write>(
    out: &mut W,
    discussions: &[Discussion],
    since: Option<DateTime<Utc>>,
) -> io::Result<()> {
    for discussion in discussions {
        let mut notes = discussion.notes_since(since).peekable();
        if notes.peek().is_none() {
            continue;
        }

        writeln!(out, "{SECTION_RULE}")?;
        for (position, note) in notes {
            let indent = if position == 0 { "" } else { REPLY_INDENT };
            let at = note.created_at.format("%Y-%m-%d %H:%M:%S %Z");

            if note.system {
                writeln!(out, "{indent}* {} {} at {at}", note.author.username, note.body)?;
                continue;
            }

            let verb = if position == 0 { "commented" } else { "replied" };
            writeln!(out, "{indent}{} {verb} at {at} [#{}]", note.author.username, note.id)?;
            for line in note.body.lines() {
                writeln!(out, "{indent}  {line}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Parse a --since value
///
/// Accepts RFC 3339, the `2020-08-21 14:57:46.808 +0000 UTC` form printed by
/// many tools (the trailing zone name is optional), or a bare date meaning
/// midnight UTC.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let value = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let without_zone_name = value.strip_suffix(" UTC").unwrap_or(value);
    if let Ok(parsed) = DateTime::parse_from_str(without_zone_name, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    bail!(
        "invalid --since value '{input}': expected e.g. '2020-08-21 14:57:46.808 +0000 UTC', '2020-08-21T14:57:46Z' or '2020-08-21'"
    )
}
