// crates/lab-cli/src/services/gitlab.rs - GitLab REST client
//
// Blocking implementation of `Forge` against the GitLab v4 API. A remote
// name is turned into a project path by reading its URL from git; the path
// is then used (URL-encoded as one segment) in every project route.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use lab_core::config::CoreConfig;
use lab_core::remote::project_path_from_url;
use lab_core::{Discussion, Forge, ForgeError, ForgeResult, MergeRequest, Project, TargetRef};

use super::git::GitService;

const PER_PAGE: &str = "100";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Note as returned by the create endpoints; only the id is needed
#[derive(Debug, Deserialize)]
struct CreatedNote {
    id: u64,
}

/// Resolves a git remote name to a project path
type RemoteLookup = fn(&str) -> ForgeResult<String>;

pub struct GitLabClient {
    http: Client,
    host: Url,
    token: Option<String>,
    lookup: RemoteLookup,
}

impl GitLabClient {
    pub fn new(config: &CoreConfig) -> ForgeResult<Self> {
        Self::with_lookup(config, project_path_for_remote)
    }

    fn with_lookup(config: &CoreConfig, lookup: RemoteLookup) -> ForgeResult<Self> {
        let host = Url::parse(&config.host)
            .map_err(|e| ForgeError::Transport(format!("invalid host '{}': {e}", config.host)))?;
        let http = Client::builder()
            .user_agent(concat!("lab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForgeError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            host,
            token: config.token.clone(),
            lookup,
        })
    }

    /// `<host>/api/v4/<segments...>`, each segment percent-encoded
    fn api_url(&self, segments: &[&str]) -> ForgeResult<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| ForgeError::Transport(format!("host '{}' cannot be a base URL", self.host)))?
            .pop_if_empty()
            .extend(["api", "v4"])
            .extend(segments);
        Ok(url)
    }

    /// Web URL of a note, e.g. `https://gitlab.com/g/p/-/issues/7#note_15`
    fn note_web_url(&self, project: &str, target: &TargetRef, note_id: u64) -> String {
        format!(
            "{}/{}/-/{}/{}#note_{}",
            self.host.as_str().trim_end_matches('/'),
            project,
            target.kind.api_segment(),
            target.primary_id,
            note_id
        )
    }

    fn container_url(&self, project: &str, target: &TargetRef, rest: &[&str]) -> ForgeResult<Url> {
        let iid = target.primary_id.to_string();
        let mut segments = vec!["projects", project, target.kind.api_segment(), iid.as_str()];
        segments.extend_from_slice(rest);
        self.api_url(&segments)
    }

    fn execute(&self, request: RequestBuilder) -> ForgeResult<Response> {
        let request = match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        };

        let response = request
            .send()
            .map_err(|e| ForgeError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(ForgeError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    fn decode<T: DeserializeOwned>(response: Response) -> ForgeResult<T> {
        response.json().map_err(|e| ForgeError::Decode(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, url: Url) -> ForgeResult<T> {
        tracing::debug!(%url, "GET");
        Self::decode(self.execute(self.http.get(url))?)
    }

    fn post_note(&self, url: Url, body: &str) -> ForgeResult<CreatedNote> {
        tracing::debug!(%url, "POST");
        Self::decode(self.execute(self.http.post(url).json(&json!({ "body": body })))?)
    }
}

impl Forge for GitLabClient {
    fn list_discussions(&self, target: &TargetRef) -> ForgeResult<Vec<Discussion>> {
        let project = (self.lookup)(&target.remote)?;
        let mut discussions = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut url = self.container_url(&project, target, &["discussions"])?;
            url.query_pairs_mut()
                .append_pair("per_page", PER_PAGE)
                .append_pair("page", &page.to_string());

            tracing::debug!(%url, "GET");
            let response = self.execute(self.http.get(url))?;
            let next = next_page(&response);
            let mut batch: Vec<Discussion> = Self::decode(response)?;
            discussions.append(&mut batch);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(discussions)
    }

    fn create_note(&self, target: &TargetRef, body: &str) -> ForgeResult<String> {
        let project = (self.lookup)(&target.remote)?;
        let url = self.container_url(&project, target, &["notes"])?;
        let note = self.post_note(url, body)?;
        Ok(self.note_web_url(&project, target, note.id))
    }

    fn create_discussion_reply(
        &self,
        target: &TargetRef,
        discussion_id: &str,
        body: &str,
    ) -> ForgeResult<String> {
        let project = (self.lookup)(&target.remote)?;
        let url = self.container_url(&project, target, &["discussions", discussion_id, "notes"])?;
        let note = self.post_note(url, body)?;
        Ok(self.note_web_url(&project, target, note.id))
    }

    fn merge_request(&self, remote: &str, iid: u64) -> ForgeResult<MergeRequest> {
        let project = (self.lookup)(remote)?;
        let iid = iid.to_string();
        self.get(self.api_url(&["projects", &project, "merge_requests", &iid])?)
    }

    fn project(&self, project_id: u64) -> ForgeResult<Project> {
        let id = project_id.to_string();
        self.get(self.api_url(&["projects", &id])?)
    }
}

/// Read the remote's URL from git and recover the project path from it
fn project_path_for_remote(remote: &str) -> ForgeResult<String> {
    let url = GitService::remote_url(remote).map_err(|e| ForgeError::Remote {
        remote: remote.to_string(),
        reason: format!("{e:#}"),
    })?;

    project_path_from_url(&url).ok_or_else(|| ForgeError::Remote {
        remote: remote.to_string(),
        reason: format!("'{url}' does not name a GitLab project"),
    })
}

fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Best human-readable message from an error response body
///
/// GitLab sends `{"message": "..."}`, `{"message": {"field": [..]}}` or
/// `{"error": "..."}`; anything else falls back to the raw body or the
/// status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = parsed
        .as_ref()
        .and_then(|value| value.get("message").or_else(|| value.get("error")));

    match field {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}
