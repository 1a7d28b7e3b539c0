//! Redmine side of the external tracker and wiki linkage.
use serde::{Deserialize, Serialize};

/// Redmine configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct RedmineConfig {
    /// Base URL of the Redmine instance
    pub url: Option<String>,
}

/// External tracker and wiki URLs derived from a Redmine project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLinkage {
    /// URL of the project's issue list
    pub tracker_url: String,

    /// Per-issue URL format, with the `{index}` placeholder the platform
    /// substitutes for the issue number
    pub tracker_format: String,

    /// URL of the project's wiki
    pub wiki_url: String,
}

impl ExternalLinkage {
    /// Derive the linkage URLs for a project on the given Redmine instance.
    pub fn new(redmine_url: &str, project: &str) -> Self {
        let base = redmine_url.trim_end_matches('/');
        Self {
            tracker_url: format!("{base}/projects/{project}/issues"),
            tracker_format: format!("{base}/issues/{{index}}"),
            wiki_url: format!("{base}/projects/{project}/wiki"),
        }
    }
}
