//! Tag reconciliation: ensure a tag exists, is visible to everyone, and is
//! assigned to a target issue, tolerating prior partial creation.

use anyhow::{anyhow, bail, Result};

use crate::client::{CreateOutcome, YoutrackClient, YoutrackGroup, YoutrackTag};

/// Locates the all-users visibility group in a groups snapshot. The type
/// tag is authoritative; the case-insensitive name match covers instances
/// that renamed the builtin group. Absence is a configuration failure.
pub fn find_all_users_group(groups: &[YoutrackGroup]) -> Result<&YoutrackGroup> {
    groups
        .iter()
        .find(|group| group.type_tag.as_deref() == Some("AllUsersGroup"))
        .or_else(|| {
            groups
                .iter()
                .find(|group| group.name.eq_ignore_ascii_case("all users"))
        })
        .ok_or_else(|| anyhow!("all users group does not exist"))
}

/// Ensures a tag named `name` exists, is visible to the all-users group,
/// and is assigned to `issue_id`. A rejected creation resolves to the
/// existing tag via lookup; creation failing AND the lookup coming back
/// empty is fatal. The visibility update and the assignment are both
/// idempotent on the tracker side.
pub async fn ensure_tag_assigned_to_all(
    client: &YoutrackClient,
    name: &str,
    groups: &[YoutrackGroup],
    issue_id: &str,
) -> Result<YoutrackTag> {
    let tag = match client.create_tag(name).await? {
        CreateOutcome::Created(tag) => tag,
        CreateOutcome::Rejected(status) => match client.lookup_tag(name).await? {
            Some(tag) => tag,
            None => bail!(
                "could not resolve tag '{name}': creation failed with status {} and lookup returned nothing",
                status.as_u16()
            ),
        },
    };

    let all_users = find_all_users_group(groups)?;
    client.set_tag_visibility(&tag.id, &all_users.id).await?;
    client.assign_tag(issue_id, &tag.id).await?;
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::{ensure_tag_assigned_to_all, find_all_users_group};
    use crate::client::{YoutrackClient, YoutrackGroup};

    fn group(id: &str, name: &str, type_tag: Option<&str>) -> YoutrackGroup {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "$type": type_tag,
        }))
        .expect("group")
    }

    fn test_groups() -> Vec<YoutrackGroup> {
        vec![
            group("g-1", "Developers", Some("UserGroup")),
            group("g-all", "Everyone", Some("AllUsersGroup")),
        ]
    }

    #[test]
    fn unit_find_all_users_group_prefers_type_tag_over_name() {
        let groups = vec![
            group("g-1", "All Users", Some("UserGroup")),
            group("g-2", "Everyone", Some("AllUsersGroup")),
        ];
        assert_eq!(find_all_users_group(&groups).expect("group").id, "g-2");
    }

    #[test]
    fn unit_find_all_users_group_falls_back_to_case_insensitive_name() {
        let groups = vec![
            group("g-1", "Developers", Some("UserGroup")),
            group("g-2", "ALL USERS", None),
        ];
        assert_eq!(find_all_users_group(&groups).expect("group").id, "g-2");
    }

    #[test]
    fn unit_find_all_users_group_reports_missing_group() {
        let groups = vec![group("g-1", "Developers", Some("UserGroup"))];
        let error = find_all_users_group(&groups).expect_err("missing group");
        assert!(error.to_string().contains("all users group does not exist"));
    }

    #[tokio::test]
    async fn functional_ensure_tag_creates_updates_visibility_and_assigns() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/tags").json_body(json!({ "name": "urgent" }));
            then.status(200).json_body(json!({ "id": "t-1", "name": "urgent" }));
        });
        let visibility = server.mock(|when, then| {
            when.method(POST)
                .path("/api/tags/t-1")
                .json_body(json!({ "visibleFor": { "id": "g-all" } }));
            then.status(200).json_body(json!({ "id": "t-1", "name": "urgent" }));
        });
        let assign = server.mock(|when, then| {
            when.method(POST)
                .path("/api/issues/ISS-1/tags")
                .json_body(json!({ "id": "t-1" }));
            then.status(200).json_body(json!({ "id": "t-1", "name": "urgent" }));
        });

        let client = YoutrackClient::new(&server.base_url(), "token").expect("client");
        let tag = ensure_tag_assigned_to_all(&client, "urgent", &test_groups(), "ISS-1")
            .await
            .expect("ensure tag");
        assert_eq!(tag.id, "t-1");
        create.assert();
        visibility.assert();
        assign.assert();
    }

    #[tokio::test]
    async fn functional_ensure_tag_resolves_existing_tag_when_create_is_rejected() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/tags");
            then.status(409).body("tag already exists");
        });
        let lookup = server.mock(|when, then| {
            when.method(GET).path("/api/tags").query_param("query", "urgent");
            then.status(200)
                .json_body(json!([{ "id": "t-7", "name": "urgent" }]));
        });
        let visibility = server.mock(|when, then| {
            when.method(POST).path("/api/tags/t-7");
            then.status(200).json_body(json!({ "id": "t-7", "name": "urgent" }));
        });
        let assign = server.mock(|when, then| {
            when.method(POST).path("/api/issues/ISS-1/tags");
            then.status(200).json_body(json!({ "id": "t-7", "name": "urgent" }));
        });

        let client = YoutrackClient::new(&server.base_url(), "token").expect("client");
        let tag = ensure_tag_assigned_to_all(&client, "urgent", &test_groups(), "ISS-1")
            .await
            .expect("ensure tag");
        assert_eq!(tag.id, "t-7");
        create.assert();
        lookup.assert();
        visibility.assert();
        assign.assert();
    }

    #[tokio::test]
    async fn functional_ensure_tag_yields_same_id_across_repeat_calls() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/tags");
            then.status(409).body("tag already exists");
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/tags");
            then.status(200)
                .json_body(json!([{ "id": "t-7", "name": "urgent" }]));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/tags/t-7");
            then.status(200).json_body(json!({ "id": "t-7", "name": "urgent" }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/issues/ISS-1/tags");
            then.status(200).json_body(json!({ "id": "t-7", "name": "urgent" }));
        });

        let client = YoutrackClient::new(&server.base_url(), "token").expect("client");
        let first = ensure_tag_assigned_to_all(&client, "urgent", &test_groups(), "ISS-1")
            .await
            .expect("first call");
        let second = ensure_tag_assigned_to_all(&client, "urgent", &test_groups(), "ISS-1")
            .await
            .expect("second call");
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn regression_ensure_tag_fails_when_create_and_lookup_both_miss() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/tags");
            then.status(500).body("boom");
        });
        let lookup = server.mock(|when, then| {
            when.method(GET).path("/api/tags");
            then.status(200).json_body(json!([]));
        });

        let client = YoutrackClient::new(&server.base_url(), "token").expect("client");
        let error = ensure_tag_assigned_to_all(&client, "urgent", &test_groups(), "ISS-1")
            .await
            .expect_err("should fail");
        lookup.assert();
        assert!(error.to_string().contains("could not resolve tag 'urgent'"));
        assert!(error.to_string().contains("500"));
    }

    #[tokio::test]
    async fn regression_ensure_tag_fails_without_all_users_group() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/tags");
            then.status(200).json_body(json!({ "id": "t-1", "name": "urgent" }));
        });
        let visibility = server.mock(|when, then| {
            when.method(POST).path("/api/tags/t-1");
            then.status(200).json_body(json!({ "id": "t-1", "name": "urgent" }));
        });

        let groups = vec![group("g-1", "Developers", Some("UserGroup"))];
        let client = YoutrackClient::new(&server.base_url(), "token").expect("client");
        let error = ensure_tag_assigned_to_all(&client, "urgent", &groups, "ISS-1")
            .await
            .expect_err("should fail");
        assert!(error.to_string().contains("all users group does not exist"));
        assert_eq!(visibility.hits(), 0);
    }
}
