use serde::{Deserialize, Serialize};

use bridge_core::status::MirrorStatus;

pub const STATE_FIELD_NAME: &str = "State";
pub const ASSIGNEES_FIELD_NAME: &str = "Assignees";

/// Closed set of issue custom-field payload shapes accepted by the issues
/// endpoint. The `$type` tag selects the server-side field implementation.
/// The tracker wants `StateIssueCustomField` when a state value rides along
/// with issue creation but `SingleEnumIssueCustomField` when the same field
/// is updated in place, so both variants exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$type")]
pub enum IssueFieldPayload {
    #[serde(rename = "SimpleIssueCustomField")]
    Simple { name: String, value: String },
    #[serde(rename = "StateIssueCustomField")]
    State { name: String, value: FieldValueName },
    #[serde(rename = "SingleEnumIssueCustomField")]
    SingleEnum { name: String, value: FieldValueName },
    #[serde(rename = "MultiUserIssueCustomField")]
    MultiUser { name: String, value: Vec<UserRef> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub id: String,
}

impl IssueFieldPayload {
    /// Link-field payload carrying the cross-system key.
    pub fn link(field_name: &str, key: &str) -> Self {
        Self::Simple {
            name: field_name.to_string(),
            value: key.to_string(),
        }
    }

    pub fn state_on_create(status: MirrorStatus) -> Self {
        Self::State {
            name: STATE_FIELD_NAME.to_string(),
            value: FieldValueName {
                name: status.as_str().to_string(),
            },
        }
    }

    pub fn state_update(status: MirrorStatus) -> Self {
        Self::SingleEnum {
            name: STATE_FIELD_NAME.to_string(),
            value: FieldValueName {
                name: status.as_str().to_string(),
            },
        }
    }

    pub fn assignees(ids: Vec<String>) -> Self {
        Self::MultiUser {
            name: ASSIGNEES_FIELD_NAME.to_string(),
            value: ids.into_iter().map(|id| UserRef { id }).collect(),
        }
    }
}

/// Instance-level custom field definition posted to the settings endpoint.
/// `type_tag` doubles as the `$type` of the project attachment record.
#[derive(Debug, Clone, Serialize)]
pub struct CustomFieldSpec {
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub name: String,
    #[serde(rename = "fieldType")]
    pub field_type: FieldTypeRef,
    #[serde(rename = "isAutoAttached")]
    pub auto_attach: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTypeRef {
    pub id: String,
}

impl CustomFieldSpec {
    pub fn simple_text(name: &str) -> Self {
        Self {
            type_tag: "SimpleProjectCustomField",
            name: name.to_string(),
            field_type: FieldTypeRef {
                id: "string".to_string(),
            },
            auto_attach: false,
        }
    }

    pub fn multi_user(name: &str) -> Self {
        Self {
            type_tag: "UserProjectCustomField",
            name: name.to_string(),
            field_type: FieldTypeRef {
                id: "user[*]".to_string(),
            },
            auto_attach: false,
        }
    }
}
