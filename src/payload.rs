//! Typed views over GitHub webhook payloads.
//!
//! The dispatcher passes payloads around as opaque [`serde_json::Value`]s;
//! each handler deserializes the view it needs. Only the fields octohook
//! renders are modelled, everything else GitHub sends is ignored.

use serde::Deserialize;

/// The user that triggered the event.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Sender {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Repository {
    #[serde(default)]
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Repository {
    /// Web URL of the repository, derived from `full_name` when GitHub
    /// omitted `html_url`.
    pub fn url(&self) -> String {
        if self.html_url.is_empty() {
            format!("https://github.com/{}", self.full_name)
        } else {
            self.html_url.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CommitAuthor {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub author: CommitAuthor,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl Commit {
    /// First seven characters of the commit sha.
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub compare: Option<String>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    pub repository: Repository,
    pub sender: Sender,
}

impl PushPayload {
    /// Branch or tag name with the `refs/heads/` or `refs/tags/` prefix removed.
    pub fn ref_name(&self) -> &str {
        self.git_ref
            .strip_prefix("refs/heads/")
            .or_else(|| self.git_ref.strip_prefix("refs/tags/"))
            .unwrap_or(&self.git_ref)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Assignee {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: IssueState,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssuesPayload {
    #[serde(default)]
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
    pub sender: Sender,
}

impl IssuesPayload {
    /// The webhook action, or one implied by the issue state when it is absent.
    pub fn action(&self) -> &str {
        match (self.action.as_str(), self.issue.state) {
            ("", IssueState::Open) => "opened",
            ("", IssueState::Closed) => "closed",
            (action, _) => action,
        }
    }
}

/// Status shared by workflow runs and jobs.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Requested,
    Queued,
    Waiting,
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub run_started_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowRunPayload {
    #[serde(default)]
    pub action: String,
    pub workflow_run: WorkflowRun,
    pub repository: Repository,
    pub sender: Sender,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JobStep {
    pub name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowJob {
    pub id: u64,
    pub name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub runner_name: Option<String>,
    #[serde(default)]
    pub steps: Vec<JobStep>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowJobPayload {
    #[serde(default)]
    pub action: String,
    pub workflow_job: WorkflowJob,
    pub repository: Repository,
    pub sender: Sender,
}

/// Payload of the `ping` event GitHub sends when a hook is created.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct PingPayload {
    #[serde(default)]
    pub zen: Option<String>,
    #[serde(default)]
    pub hook_id: Option<u64>,
    #[serde(default)]
    pub repository: Option<Repository>,
}
