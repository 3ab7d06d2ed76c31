use bridge_core::link_key::RepoRef;

#[derive(Debug, Clone)]
/// Immutable process configuration. Built once at startup from flags and
/// environment, then shared by reference; nothing mutates it afterwards.
pub struct BridgeConfig {
    pub github_api_base: String,
    pub github_token: String,
    pub repo: RepoRef,
    pub youtrack_url: String,
    pub youtrack_token: String,
    pub youtrack_project: String,
    pub bind: String,
    pub skip_initial_import: bool,
}
