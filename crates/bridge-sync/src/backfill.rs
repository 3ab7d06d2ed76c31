//! Startup backfill: mirrors the repository's existing issues before
//! incremental webhook processing takes over.

use anyhow::Result;

use bridge_github::GithubClient;
use bridge_youtrack::field_provisioner::ensure_field_attached;
use bridge_youtrack::fields::ASSIGNEES_FIELD_NAME;
use bridge_youtrack::{CustomFieldSpec, YoutrackClient};

use crate::config::BridgeConfig;
use crate::issue_sync::{fetch_sync_context, IssueSynchronizer, LINK_FIELD_NAME};

/// Lists every upstream issue, provisions the link and assignee custom
/// fields on the project, then mirrors whatever is not mirrored yet.
/// Returns the number of issues created.
pub async fn run_initial_import(
    github: &GithubClient,
    youtrack: &YoutrackClient,
    config: &BridgeConfig,
) -> Result<usize> {
    let issues = github.list_issues().await?;
    let ctx = fetch_sync_context(youtrack, &config.youtrack_project).await?;

    ensure_field_attached(
        youtrack,
        &CustomFieldSpec::simple_text(LINK_FIELD_NAME),
        &ctx.project.id,
    )
    .await?;
    ensure_field_attached(
        youtrack,
        &CustomFieldSpec::multi_user(ASSIGNEES_FIELD_NAME),
        &ctx.project.id,
    )
    .await?;

    let sync = IssueSynchronizer::new(github, youtrack, &config.repo);
    let created = sync.create_missing(&ctx, &issues).await?;
    tracing::info!(
        listed = issues.len(),
        created = created,
        "initial import complete"
    );
    Ok(created)
}
