//! Cross-tracker identity resolution for issue assignees.
//!
//! There is no stored mapping between the two user directories; each actor
//! is resolved live against the downstream user list, by email first and
//! display name second. A miss is a legitimate outcome, not an error: the
//! actor is simply omitted from the downstream assignee set.

use anyhow::Result;

use bridge_core::issue::IssueActor;
use bridge_github::GithubClient;
use bridge_youtrack::YoutrackUser;

/// Resolves one upstream actor to a downstream user id, or `None` when
/// neither email nor display name matches. When several downstream users
/// share an email or name, the first match in list order wins.
pub async fn resolve_assignee(
    github: &GithubClient,
    actor: &IssueActor,
    users: &[YoutrackUser],
) -> Result<Option<String>> {
    let profile = github.user_profile(actor.id).await?;

    if let Some(email) = profile.email.as_deref().filter(|value| !value.is_empty()) {
        if let Some(user) = users
            .iter()
            .find(|user| user.email.as_deref() == Some(email))
        {
            return Ok(Some(user.id.clone()));
        }
    }

    if let Some(name) = profile.name.as_deref().filter(|value| !value.is_empty()) {
        if let Some(user) = users.iter().find(|user| user.name.as_deref() == Some(name)) {
            return Ok(Some(user.id.clone()));
        }
    }

    Ok(None)
}

/// Resolves a full assignee set, dropping actors that resolve to nothing.
pub async fn resolve_assignee_set(
    github: &GithubClient,
    actors: &[IssueActor],
    users: &[YoutrackUser],
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for actor in actors {
        if let Some(id) = resolve_assignee(github, actor, users).await? {
            ids.push(id);
        }
    }
    Ok(ids)
}
