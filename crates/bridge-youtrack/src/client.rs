//! Thin REST client over the downstream tracker's HTTP API.
//!
//! Methods map one-to-one onto endpoints and stay policy-free; the
//! reconcilers own the idempotency rules. Calls are single-shot, no retry.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use bridge_core::text::truncate_for_error;

use crate::fields::{CustomFieldSpec, FieldTypeRef, IssueFieldPayload};

const TAG_FIELDS: &str = "id,name,owner(id,name),visibleFor(id,name),updateableBy(id,name)";

#[derive(Debug, Clone, Deserialize)]
pub struct YoutrackUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutrackGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "$type", default)]
    pub type_tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutrackProject {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutrackTag {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "fieldType", default)]
    pub field_type: Option<FieldTypeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachedField {
    pub id: String,
    #[serde(default)]
    pub field: Option<FieldRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Result of a creation attempt on an endpoint that conflates "already
/// exists" with other rejections. The raw status is preserved so callers
/// can classify the rejection instead of string-matching an error.
#[derive(Debug, Clone)]
pub enum CreateOutcome<T> {
    Created(T),
    Rejected(StatusCode),
}

#[derive(Clone)]
pub struct YoutrackClient {
    http: reqwest::Client,
    base_url: String,
}

impl YoutrackClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid youtrack authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create youtrack api client")?;
        Ok(Self {
            http: client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<YoutrackUser>> {
        self.request_json(
            "list users",
            self.http
                .get(format!("{}/api/users", self.base_url))
                .query(&[("fields", "id,name,email")]),
        )
        .await
    }

    pub async fn list_groups(&self) -> Result<Vec<YoutrackGroup>> {
        self.request_json(
            "list groups",
            self.http
                .get(format!("{}/api/groups", self.base_url))
                .query(&[("fields", "id,name,$type")]),
        )
        .await
    }

    /// First project matching `name`, or `None` when the query is empty.
    pub async fn find_project(&self, name: &str) -> Result<Option<YoutrackProject>> {
        let projects: Vec<YoutrackProject> = self
            .request_json(
                "find project",
                self.http
                    .get(format!("{}/api/admin/projects", self.base_url))
                    .query(&[("fields", "id,name"), ("query", name)]),
            )
            .await?;
        Ok(projects.into_iter().next())
    }

    /// Queries for any issue whose link field equals `key`. A `Some` result
    /// is the sole signal that an upstream issue is already mirrored.
    pub async fn find_issue_by_link(&self, field_name: &str, key: &str) -> Result<Option<String>> {
        let query = format!("has: {{{field_name}}} and \"{key}\"");
        let matches: Vec<IssueRef> = self
            .request_json(
                "find issue by link",
                self.http
                    .get(format!("{}/api/issues", self.base_url))
                    .query(&[("query", query.as_str()), ("fields", "id")]),
            )
            .await?;
        Ok(matches.into_iter().next().map(|issue| issue.id))
    }

    pub async fn create_issue(
        &self,
        project_id: &str,
        summary: &str,
        description: &str,
        custom_fields: &[IssueFieldPayload],
    ) -> Result<IssueRef> {
        self.request_json(
            "create issue",
            self.http
                .post(format!("{}/api/issues", self.base_url))
                .query(&[("fields", "id")])
                .json(&json!({
                    "project": { "id": project_id },
                    "summary": summary,
                    "description": description,
                    "customFields": custom_fields,
                })),
        )
        .await
    }

    pub async fn update_issue_text(
        &self,
        issue_id: &str,
        summary: &str,
        description: &str,
    ) -> Result<()> {
        self.request_unit(
            "update issue",
            self.http
                .post(format!("{}/api/issues/{issue_id}", self.base_url))
                .json(&json!({ "summary": summary, "description": description })),
        )
        .await
    }

    pub async fn update_issue_fields(
        &self,
        issue_id: &str,
        custom_fields: &[IssueFieldPayload],
    ) -> Result<()> {
        self.request_unit(
            "update issue fields",
            self.http
                .post(format!("{}/api/issues/{issue_id}", self.base_url))
                .json(&json!({ "customFields": custom_fields })),
        )
        .await
    }

    pub async fn delete_issue(&self, issue_id: &str) -> Result<()> {
        self.request_unit(
            "delete issue",
            self.http
                .delete(format!("{}/api/issues/{issue_id}", self.base_url)),
        )
        .await
    }

    pub async fn list_issue_tags(&self, issue_id: &str) -> Result<Vec<YoutrackTag>> {
        self.request_json(
            "list issue tags",
            self.http
                .get(format!("{}/api/issues/{issue_id}/tags", self.base_url))
                .query(&[("fields", "id,name")]),
        )
        .await
    }

    pub async fn assign_tag(&self, issue_id: &str, tag_id: &str) -> Result<()> {
        self.request_unit(
            "assign tag",
            self.http
                .post(format!("{}/api/issues/{issue_id}/tags", self.base_url))
                .query(&[("fields", "id,name")])
                .json(&json!({ "id": tag_id })),
        )
        .await
    }

    pub async fn remove_tag(&self, issue_id: &str, tag_id: &str) -> Result<()> {
        self.request_unit(
            "remove tag",
            self.http.delete(format!(
                "{}/api/issues/{issue_id}/tags/{tag_id}",
                self.base_url
            )),
        )
        .await
    }

    /// Attempts tag creation. Any non-success status is reported as a
    /// rejection for the reconciler to resolve through lookup.
    pub async fn create_tag(&self, name: &str) -> Result<CreateOutcome<YoutrackTag>> {
        self.request_create(
            "create tag",
            self.http
                .post(format!("{}/api/tags", self.base_url))
                .query(&[("fields", TAG_FIELDS)])
                .json(&json!({ "name": name })),
        )
        .await
    }

    pub async fn lookup_tag(&self, name: &str) -> Result<Option<YoutrackTag>> {
        let tags: Vec<YoutrackTag> = self
            .request_json(
                "lookup tag",
                self.http
                    .get(format!("{}/api/tags", self.base_url))
                    .query(&[("fields", TAG_FIELDS), ("query", name)]),
            )
            .await?;
        Ok(tags.into_iter().next())
    }

    pub async fn set_tag_visibility(&self, tag_id: &str, group_id: &str) -> Result<()> {
        self.request_unit(
            "update tag visibility",
            self.http
                .post(format!("{}/api/tags/{tag_id}", self.base_url))
                .query(&[("fields", "id,name,visibleFor(id,name),updateableBy(id,name)")])
                .json(&json!({ "visibleFor": { "id": group_id } })),
        )
        .await
    }

    /// Attempts custom-field creation, returning the new field id on
    /// success and the raw rejection status otherwise.
    pub async fn create_custom_field(
        &self,
        spec: &CustomFieldSpec,
    ) -> Result<CreateOutcome<String>> {
        let outcome: CreateOutcome<FieldRef> = self
            .request_create(
                "create custom field",
                self.http
                    .post(format!(
                        "{}/api/admin/customFieldSettings/customFields",
                        self.base_url
                    ))
                    .query(&[("fields", "id")])
                    .json(spec),
            )
            .await?;
        Ok(match outcome {
            CreateOutcome::Created(field) => CreateOutcome::Created(field.id),
            CreateOutcome::Rejected(status) => CreateOutcome::Rejected(status),
        })
    }

    pub async fn list_custom_fields(&self, query: &str) -> Result<Vec<CustomFieldRecord>> {
        self.request_json(
            "list custom fields",
            self.http
                .get(format!(
                    "{}/api/admin/customFieldSettings/customFields",
                    self.base_url
                ))
                .query(&[("fields", "id,name,fieldType(id)"), ("query", query)]),
        )
        .await
    }

    pub async fn list_attached_fields(&self, project_id: &str) -> Result<Vec<AttachedField>> {
        self.request_json(
            "list attached fields",
            self.http
                .get(format!(
                    "{}/api/admin/projects/{project_id}/customFields",
                    self.base_url
                ))
                .query(&[("fields", "id,field(id,name)")]),
        )
        .await
    }

    pub async fn attach_custom_field(
        &self,
        project_id: &str,
        type_tag: &str,
        field_id: &str,
    ) -> Result<()> {
        self.request_unit(
            "attach custom field",
            self.http
                .post(format!(
                    "{}/api/admin/projects/{project_id}/customFields",
                    self.base_url
                ))
                .query(&[("fields", "id,field(id,name)")])
                .json(&json!({
                    "$type": type_tag,
                    "field": { "id": field_id },
                    "canBeEmpty": true,
                })),
        )
        .await
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("youtrack api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "youtrack api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode youtrack {operation}"))
    }

    async fn request_unit(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request
            .send()
            .await
            .with_context(|| format!("youtrack api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "youtrack api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        Ok(())
    }

    async fn request_create<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<CreateOutcome<T>>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("youtrack api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            return Ok(CreateOutcome::Rejected(status));
        }
        let created = response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode youtrack {operation}"))?;
        Ok(CreateOutcome::Created(created))
    }
}
