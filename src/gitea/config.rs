//! Gitea configuration
use serde::{Deserialize, Serialize};

/// Gitea configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GiteaConfig {
    /// Base URL of the Gitea API, e.g. `https://git.example.com/api/v1`
    pub api_url: Option<String>,

    /// Gitea API token
    pub api_token: Option<String>,
}
