use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
/// Upstream issue snapshot as delivered by the REST listing and by webhook
/// payloads. Immutable for the lifetime of one event.
pub struct UpstreamIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    #[serde(default)]
    pub assignees: Vec<IssueActor>,
    #[serde(default)]
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
/// Upstream actor reference. Only the account id is carried by issue
/// payloads; email and display name require a profile lookup.
pub struct IssueActor {
    pub id: u64,
}
