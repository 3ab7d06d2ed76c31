//! Routes one upstream webhook event to the matching synchronizer
//! operation.

use anyhow::{anyhow, Result};

use bridge_core::webhook::parse_webhook_event;
use bridge_github::GithubClient;
use bridge_youtrack::YoutrackClient;

use crate::config::BridgeConfig;
use crate::issue_sync::{fetch_sync_context, IssueSynchronizer};

/// Handles one raw webhook delivery end to end: decode the envelope, fetch
/// the shared downstream context (users, groups, project) for this event,
/// and invoke the operation matching the event's action. Unrecognized
/// actions are a silent no-op.
pub async fn handle_webhook_event(
    github: &GithubClient,
    youtrack: &YoutrackClient,
    config: &BridgeConfig,
    body: &str,
) -> Result<()> {
    let event = parse_webhook_event(body)?;
    let key = config.repo.issue_link_key(event.issue.number);
    let ctx = fetch_sync_context(youtrack, &config.youtrack_project).await?;
    let sync = IssueSynchronizer::new(github, youtrack, &config.repo);

    match event.action.as_str() {
        "opened" => {
            sync.create_missing(&ctx, std::slice::from_ref(&event.issue))
                .await?;
        }
        "closed" => sync.mark_done(&key).await?,
        "reopened" => sync.mark_open(&key).await?,
        "edited" => sync.apply_edit(&key, &event.issue).await?,
        "deleted" => sync.delete(&key).await?,
        "assigned" | "unassigned" => {
            sync.replace_assignees(&ctx, &key, &event.issue.assignees)
                .await?;
        }
        "labeled" => {
            let label = event
                .label
                .as_ref()
                .ok_or_else(|| anyhow!("labeled event without a label field"))?;
            sync.apply_label(&ctx, &key, &label.name).await?;
        }
        "unlabeled" => {
            let label = event
                .label
                .as_ref()
                .ok_or_else(|| anyhow!("unlabeled event without a label field"))?;
            sync.remove_label(&key, &label.name).await?;
        }
        other => {
            tracing::debug!(action = other, key = key.as_str(), "ignoring unsupported webhook action");
        }
    }
    Ok(())
}
