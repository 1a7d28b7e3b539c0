//! Core domain types for the provisioning flow.
use serde::{Deserialize, Serialize};

use crate::errors::{ProvisionError, ProvisionErrorKind};

/// A repository path of at most two `/`-separated segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath {
    /// Organization segment, present when the path is `org/repo`.
    pub org: Option<String>,

    /// Repository name, always the last segment.
    pub name: String,
}

impl RepoPath {
    /// Parse an `org/repo` or `repo` path.
    /// # Errors
    /// `PathTooDeep` for more than two segments, `InvalidPath` for an empty
    /// path or an empty segment.
    pub fn parse(path: &str) -> Result<Self, ProvisionError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() > 2 {
            return Err(ProvisionError::new(ProvisionErrorKind::PathTooDeep)
                .with_text(&format!("path '{path}' too deep")));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ProvisionError::new(ProvisionErrorKind::InvalidPath)
                .with_text(&format!("path '{path}' has an empty segment")));
        }
        let mut segments = segments.into_iter();
        let first = segments.next().map(ToString::to_string);
        let second = segments.next().map(ToString::to_string);
        match (first, second) {
            (Some(org), Some(name)) => Ok(RepoPath {
                org: Some(org),
                name,
            }),
            (Some(name), None) => Ok(RepoPath { org: None, name }),
            _ => Err(ProvisionError::new(ProvisionErrorKind::InvalidPath)
                .with_text(&format!("path '{path}' is empty"))),
        }
    }
}

/// Repository information
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct Repository {
    /// Numeric id assigned by the platform
    pub id: u64,

    /// Name of the repository
    pub name: String,

    /// Username of the owning user or organization
    pub owner: Option<String>,

    /// SSH clone URL
    pub ssh_url: String,

    /// Whether the repository is private
    pub private: bool,

    /// URL of the external issue tracker, when configured
    pub external_tracker_url: Option<String>,

    /// URL of the external wiki, when configured
    pub external_wiki_url: Option<String>,
}

impl Repository {
    /// Merge a linkage update response over this repository object.
    /// Fields carried by the response win; gaps fall back to `self`.
    pub fn merged_with(self, patched: Repository) -> Repository {
        Repository {
            id: if patched.id == 0 { self.id } else { patched.id },
            name: if patched.name.is_empty() {
                self.name
            } else {
                patched.name
            },
            owner: patched.owner.or(self.owner),
            ssh_url: if patched.ssh_url.is_empty() {
                self.ssh_url
            } else {
                patched.ssh_url
            },
            private: patched.private,
            external_tracker_url: patched.external_tracker_url.or(self.external_tracker_url),
            external_wiki_url: patched.external_wiki_url.or(self.external_wiki_url),
        }
    }
}

/// Organization information
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct Organization {
    /// Numeric id assigned by the platform
    pub id: u64,

    /// Username of the organization
    pub username: String,
}
