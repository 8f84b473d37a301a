// crates/lab-cli/src/commands/mod.rs - Command Handler Modules
//
// - note: `issue note` and `mr note` (top-level notes and threaded replies)
// - mr: merge-request-only commands (`mr show`)

pub mod mr;
pub mod note;

use anyhow::{Result, bail};

/// Split `[remote] <id>` positionals into (remote, id)
///
/// `explicit` is false when the remote fell back to the default, which
/// `mr show --patch` uses to decide whether to look for a matching remote.
pub struct Positionals<'a> {
    pub remote: &'a str,
    pub id: &'a str,
    pub explicit: bool,
}

pub fn split_remote<'a>(args: &'a [String], default_remote: &'a str) -> Result<Positionals<'a>> {
    match args {
        [id] => Ok(Positionals {
            remote: default_remote,
            id,
            explicit: false,
        }),
        [remote, id] => Ok(Positionals {
            remote,
            id,
            explicit: true,
        }),
        [] => bail!("missing <id> argument"),
        _ => bail!("too many arguments"),
    }
}
