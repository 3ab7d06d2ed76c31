//! Synchronization engine for the GitHub to YouTrack issue bridge.
//!
//! One webhook event flows through here as a single sequential chain:
//! the dispatcher decodes the event and pre-fetches downstream context,
//! the synchronizer maps it onto idempotent downstream mutations, and the
//! identity resolver and reconcilers in the client crates handle the
//! cross-system identity gaps. The webhook server runtime and the startup
//! backfill live here as well.

pub mod assignee_resolver;
pub mod backfill;
pub mod config;
pub mod dispatcher;
pub mod issue_sync;
pub mod server;


pub use config::BridgeConfig;
pub use issue_sync::LINK_FIELD_NAME;
pub use server::run_bridge_server;
