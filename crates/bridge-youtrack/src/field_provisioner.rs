//! Custom-field provisioning: ensure an instance-level field exists and is
//! attached to a project, reclassifying the tracker's duplicate signal.

use anyhow::{anyhow, bail, Result};
use reqwest::StatusCode;

use crate::client::{CreateOutcome, YoutrackClient};
use crate::fields::CustomFieldSpec;

/// Ensures the field described by `spec` exists and is attached to
/// `project_id`, returning the field id.
///
/// The settings endpoint reports a duplicate name as a plain 400, so only a
/// bad-request rejection is re-checked against the field list (exact name
/// and field type); a rejection with any other status is immediately fatal,
/// and so is a 400 whose follow-up lookup finds no match. Attachment is
/// skipped when the project already carries the field.
pub async fn ensure_field_attached(
    client: &YoutrackClient,
    spec: &CustomFieldSpec,
    project_id: &str,
) -> Result<String> {
    let field_id = match client.create_custom_field(spec).await? {
        CreateOutcome::Created(id) => id,
        CreateOutcome::Rejected(status) if status == StatusCode::BAD_REQUEST => {
            let candidates = client.list_custom_fields(&spec.name).await?;
            candidates
                .into_iter()
                .find(|field| {
                    field.name == spec.name
                        && field.field_type.as_ref() == Some(&spec.field_type)
                })
                .map(|field| field.id)
                .ok_or_else(|| {
                    anyhow!(
                        "custom field '{}' was rejected as duplicate but lookup found no match",
                        spec.name
                    )
                })?
        }
        CreateOutcome::Rejected(status) => bail!(
            "creation of custom field '{}' failed with status {}",
            spec.name,
            status.as_u16()
        ),
    };

    let attached = client.list_attached_fields(project_id).await?;
    let already_attached = attached
        .iter()
        .any(|entry| entry.field.as_ref().map(|field| field.id.as_str()) == Some(field_id.as_str()));
    if already_attached {
        return Ok(field_id);
    }

    client
        .attach_custom_field(project_id, spec.type_tag, &field_id)
        .await?;
    Ok(field_id)
}
