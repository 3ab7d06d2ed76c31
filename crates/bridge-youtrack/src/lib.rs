//! Downstream (YouTrack) REST client and reconciliation components.
//!
//! The client wraps the tracker's issue, tag, custom-field, user, group,
//! and project endpoints. The reconcilers layer the idempotency rules on
//! top: tag creation that resolves already-exists races through lookup, and
//! custom-field provisioning that reclassifies the tracker's bad-request
//! duplicate signal as the success path.

pub mod client;
pub mod field_provisioner;
pub mod fields;
pub mod tag_reconciler;

pub use client::{CreateOutcome, YoutrackClient, YoutrackGroup, YoutrackProject, YoutrackTag, YoutrackUser};
pub use field_provisioner::ensure_field_attached;
pub use fields::{CustomFieldSpec, IssueFieldPayload};
pub use tag_reconciler::{ensure_tag_assigned_to_all, find_all_users_group};
