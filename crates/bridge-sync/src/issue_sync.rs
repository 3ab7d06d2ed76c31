//! Issue synchronization: maps upstream issue snapshots and events onto
//! idempotent downstream mutations.

use anyhow::{anyhow, bail, Result};

use bridge_core::issue::{IssueActor, UpstreamIssue};
use bridge_core::issue_body::issue_description;
use bridge_core::link_key::RepoRef;
use bridge_core::status::MirrorStatus;
use bridge_github::GithubClient;
use bridge_youtrack::tag_reconciler::ensure_tag_assigned_to_all;
use bridge_youtrack::{IssueFieldPayload, YoutrackClient, YoutrackGroup, YoutrackProject, YoutrackUser};

use crate::assignee_resolver::resolve_assignee_set;

/// Name of the downstream custom field holding the cross-system link value.
pub const LINK_FIELD_NAME: &str = "GitHub Key";

/// Downstream context fetched once per event. Never cached across events:
/// users, groups, and the project are re-read on every delivery.
pub struct SyncContext {
    pub users: Vec<YoutrackUser>,
    pub groups: Vec<YoutrackGroup>,
    pub project: YoutrackProject,
}

pub async fn fetch_sync_context(
    youtrack: &YoutrackClient,
    project_name: &str,
) -> Result<SyncContext> {
    let users = youtrack.list_users().await?;
    let groups = youtrack.list_groups().await?;
    let project = youtrack
        .find_project(project_name)
        .await?
        .ok_or_else(|| anyhow!("youtrack project '{project_name}' not found"))?;
    Ok(SyncContext {
        users,
        groups,
        project,
    })
}

/// One mirror-ready downstream representation of an upstream issue.
#[derive(Debug, Clone)]
struct MirrorIssue {
    link_key: String,
    summary: String,
    description: String,
    status: MirrorStatus,
    assignee_ids: Vec<String>,
    tag_names: Vec<String>,
}

pub struct IssueSynchronizer<'a> {
    github: &'a GithubClient,
    youtrack: &'a YoutrackClient,
    repo: &'a RepoRef,
}

impl<'a> IssueSynchronizer<'a> {
    pub fn new(github: &'a GithubClient, youtrack: &'a YoutrackClient, repo: &'a RepoRef) -> Self {
        Self {
            github,
            youtrack,
            repo,
        }
    }

    /// Creates mirrors for every issue not yet known downstream. The link
    /// value query is the sole deduplication mechanism. Issues are created
    /// strictly sequentially, each one's tags reconciled before the next
    /// issue starts; a failed tag is logged and skipped so it cannot take
    /// the remaining tags or issues down with it.
    pub async fn create_missing(
        &self,
        ctx: &SyncContext,
        issues: &[UpstreamIssue],
    ) -> Result<usize> {
        let mut pending: Vec<MirrorIssue> = Vec::new();
        for issue in issues {
            let key = self.repo.issue_link_key(issue.number);
            if self
                .youtrack
                .find_issue_by_link(LINK_FIELD_NAME, &key)
                .await?
                .is_some()
            {
                tracing::debug!(key = key.as_str(), "issue already mirrored, skipping");
                continue;
            }
            pending.push(self.build_mirror(ctx, issue).await?);
        }

        for mirror in &pending {
            let fields = [
                IssueFieldPayload::link(LINK_FIELD_NAME, &mirror.link_key),
                IssueFieldPayload::state_on_create(mirror.status),
                IssueFieldPayload::assignees(mirror.assignee_ids.clone()),
            ];
            let created = self
                .youtrack
                .create_issue(
                    &ctx.project.id,
                    &mirror.summary,
                    &mirror.description,
                    &fields,
                )
                .await?;

            for tag_name in &mirror.tag_names {
                if let Err(error) =
                    ensure_tag_assigned_to_all(self.youtrack, tag_name, &ctx.groups, &created.id)
                        .await
                {
                    let detail = format!("{error:#}");
                    tracing::error!(
                        key = mirror.link_key.as_str(),
                        tag = tag_name.as_str(),
                        error = detail.as_str(),
                        "tag reconciliation failed"
                    );
                }
            }
            tracing::info!(
                key = mirror.link_key.as_str(),
                issue_id = created.id.as_str(),
                "mirrored issue created"
            );
        }
        Ok(pending.len())
    }

    pub async fn mark_done(&self, key: &str) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        self.youtrack
            .update_issue_fields(&issue_id, &[IssueFieldPayload::state_update(MirrorStatus::Done)])
            .await
    }

    pub async fn mark_open(&self, key: &str) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        self.youtrack
            .update_issue_fields(&issue_id, &[IssueFieldPayload::state_update(MirrorStatus::Open)])
            .await
    }

    /// Overwrites summary and description from the event snapshot. The
    /// description goes through the same body conversion as creation.
    pub async fn apply_edit(&self, key: &str, issue: &UpstreamIssue) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        let description =
            issue_description(issue.body.as_deref(), issue.body_html.as_deref()).unwrap_or_default();
        self.youtrack
            .update_issue_text(&issue_id, &issue.title, &description)
            .await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        self.youtrack.delete_issue(&issue_id).await
    }

    /// Recomputes the downstream assignee set from the event's current
    /// assignee list and replaces the field wholesale. Unresolvable actors
    /// are omitted, never fatal.
    pub async fn replace_assignees(
        &self,
        ctx: &SyncContext,
        key: &str,
        actors: &[IssueActor],
    ) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        let ids = resolve_assignee_set(self.github, actors, &ctx.users).await?;
        self.youtrack
            .update_issue_fields(&issue_id, &[IssueFieldPayload::assignees(ids)])
            .await
    }

    pub async fn apply_label(&self, ctx: &SyncContext, key: &str, label: &str) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        ensure_tag_assigned_to_all(self.youtrack, label, &ctx.groups, &issue_id).await?;
        Ok(())
    }

    /// Removes the tag matching the label name if the issue carries it.
    /// An absent tag is a silent no-op, not an error.
    pub async fn remove_label(&self, key: &str, label: &str) -> Result<()> {
        let issue_id = self.require_mirrored(key).await?;
        let tags = self.youtrack.list_issue_tags(&issue_id).await?;
        match tags.into_iter().find(|tag| tag.name == label) {
            Some(tag) => self.youtrack.remove_tag(&issue_id, &tag.id).await,
            None => {
                tracing::debug!(key = key, tag = label, "tag not present, nothing to remove");
                Ok(())
            }
        }
    }

    async fn require_mirrored(&self, key: &str) -> Result<String> {
        match self
            .youtrack
            .find_issue_by_link(LINK_FIELD_NAME, key)
            .await?
        {
            Some(issue_id) => Ok(issue_id),
            None => bail!("no mirrored issue found for '{key}'"),
        }
    }

    async fn build_mirror(&self, ctx: &SyncContext, issue: &UpstreamIssue) -> Result<MirrorIssue> {
        let description =
            issue_description(issue.body.as_deref(), issue.body_html.as_deref()).unwrap_or_default();
        let assignee_ids = resolve_assignee_set(self.github, &issue.assignees, &ctx.users).await?;
        Ok(MirrorIssue {
            link_key: self.repo.issue_link_key(issue.number),
            summary: issue.title.clone(),
            description,
            status: MirrorStatus::from_issue_state(&issue.state),
            assignee_ids,
            tag_names: issue.labels.iter().map(|label| label.name.clone()).collect(),
        })
    }
}
