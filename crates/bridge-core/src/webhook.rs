use anyhow::{Context, Result};
use serde::Deserialize;

use crate::issue::{IssueLabel, UpstreamIssue};

/// Outer webhook envelope. The upstream delivery wraps the event in a
/// `payload` field holding a JSON string, not a nested JSON object.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
/// One upstream issue event, decoded from the envelope's inner payload.
pub struct WebhookEvent {
    pub action: String,
    pub issue: UpstreamIssue,
    #[serde(default)]
    pub label: Option<IssueLabel>,
}

/// Decodes a raw webhook request body down to the issue event.
pub fn parse_webhook_event(body: &str) -> Result<WebhookEvent> {
    let envelope: WebhookEnvelope =
        serde_json::from_str(body).context("failed to decode webhook envelope")?;
    serde_json::from_str(&envelope.payload).context("failed to decode webhook payload")
}

#[cfg(test)]
mod tests {
    use super::parse_webhook_event;

    fn envelope_with(payload: &str) -> String {
        serde_json::to_string(&serde_json::json!({ "payload": payload })).expect("encode envelope")
    }

    #[test]
    fn unit_parse_webhook_event_decodes_double_encoded_payload() {
        let body = envelope_with(
            r#"{"action":"opened","issue":{"number":42,"title":"Bug","state":"open","labels":[{"name":"urgent"}],"assignees":[]}}"#,
        );
        let event = parse_webhook_event(&body).expect("parse event");
        assert_eq!(event.action, "opened");
        assert_eq!(event.issue.number, 42);
        assert_eq!(event.issue.labels[0].name, "urgent");
        assert!(event.label.is_none());
    }

    #[test]
    fn unit_parse_webhook_event_carries_label_field_for_label_events() {
        let body = envelope_with(
            r#"{"action":"labeled","label":{"name":"urgent"},"issue":{"number":42,"title":"Bug"}}"#,
        );
        let event = parse_webhook_event(&body).expect("parse event");
        assert_eq!(event.label.expect("label").name, "urgent");
    }

    #[test]
    fn unit_parse_webhook_event_rejects_bodies_without_envelope() {
        let error = parse_webhook_event(r#"{"action":"opened"}"#).expect_err("missing payload");
        assert!(error.to_string().contains("webhook envelope"));

        let body = envelope_with("not json");
        let error = parse_webhook_event(&body).expect_err("inner payload not json");
        assert!(error.to_string().contains("webhook payload"));
    }
}
