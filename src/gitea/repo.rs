//! Gitea wire types.
use serde::{Deserialize, Serialize};

use super::{COLLABORATOR_PERMISSION, TRACKER_STYLE};
use crate::redmine::ExternalLinkage;
use crate::utils::{Organization, Repository};

/// Gitea repository object (the subset this tool reads)
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GiteaRepo {
    /// Repository id
    pub id: u64,

    /// Repository name
    pub name: String,

    /// Owning user or organization
    pub owner: Option<GiteaUser>,

    /// SSH clone URL
    #[serde(default)]
    pub ssh_url: String,

    /// Repository visibility
    #[serde(default)]
    pub private: bool,

    /// External issue tracker configuration
    pub external_tracker: Option<ExternalTrackerOption>,

    /// External wiki configuration
    pub external_wiki: Option<ExternalWikiOption>,
}

impl From<GiteaRepo> for Repository {
    fn from(repo: GiteaRepo) -> Self {
        Repository {
            id: repo.id,
            name: repo.name,
            owner: repo.owner.map(|owner| owner.username),
            ssh_url: repo.ssh_url,
            private: repo.private,
            external_tracker_url: repo.external_tracker.map(|t| t.external_tracker_url),
            external_wiki_url: repo.external_wiki.map(|w| w.external_wiki_url),
        }
    }
}

/// Gitea user object
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GiteaUser {
    /// User id
    pub id: u64,

    /// Username (`login` on newer API versions)
    #[serde(alias = "login")]
    pub username: String,
}

/// Gitea organization object
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GiteaOrg {
    /// Organization id
    pub id: u64,

    /// Organization username
    pub username: String,
}

impl From<GiteaOrg> for Organization {
    fn from(org: GiteaOrg) -> Self {
        Organization {
            id: org.id,
            username: org.username,
        }
    }
}

/// Body of an organization creation request
#[derive(Serialize, Debug, Clone)]
pub struct CreateOrgOption {
    /// Organization description
    pub description: String,

    /// Organization full name
    pub full_name: String,

    /// Organization location
    pub location: String,

    /// Whether repository admins may change team access
    pub repo_admin_change_team_access: bool,

    /// Organization username
    pub username: String,

    /// Organization visibility
    pub visibility: String,

    /// Organization website
    pub website: String,
}

impl CreateOrgOption {
    /// Fixed private-by-default payload for a new organization.
    pub fn private(username: &str) -> Self {
        Self {
            description: String::new(),
            full_name: String::new(),
            location: String::new(),
            repo_admin_change_team_access: true,
            username: username.to_string(),
            visibility: "private".to_string(),
            website: String::new(),
        }
    }
}

/// Body of a repository creation request
#[derive(Serialize, Debug, Clone)]
pub struct CreateRepoOption {
    /// Whether to create an initial commit
    pub auto_init: bool,

    /// Repository description
    pub description: String,

    /// Gitignore templates
    pub gitignores: String,

    /// Issue label set
    pub issue_labels: String,

    /// License template
    pub license: String,

    /// Repository name
    pub name: String,

    /// Repository visibility
    pub private: bool,

    /// Readme template
    pub readme: String,
}

impl CreateRepoOption {
    /// Fixed empty/private payload for a new repository.
    pub fn empty_private(name: &str) -> Self {
        Self {
            auto_init: false,
            description: String::new(),
            gitignores: String::new(),
            issue_labels: String::new(),
            license: String::new(),
            name: name.to_string(),
            private: true,
            readme: String::new(),
        }
    }
}

/// External issue tracker configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExternalTrackerOption {
    /// URL of the external issue list
    pub external_tracker_url: String,

    /// Per-issue URL format
    pub external_tracker_format: String,

    /// Issue reference style
    pub external_tracker_style: String,
}

/// External wiki configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExternalWikiOption {
    /// URL of the external wiki
    pub external_wiki_url: String,
}

/// Body of the repository PATCH that wires issues and wiki to the
/// external project
#[derive(Serialize, Debug, Clone)]
pub struct EditRepoOption {
    /// Keep the issue tracker enabled
    pub has_issues: bool,

    /// External issue tracker configuration
    pub external_tracker: ExternalTrackerOption,

    /// Keep the wiki enabled
    pub has_wiki: bool,

    /// External wiki configuration
    pub external_wiki: ExternalWikiOption,
}

impl EditRepoOption {
    /// Build the PATCH body pointing issues and wiki at the given linkage.
    pub fn linkage(linkage: &ExternalLinkage) -> Self {
        Self {
            has_issues: true,
            external_tracker: ExternalTrackerOption {
                external_tracker_url: linkage.tracker_url.clone(),
                external_tracker_format: linkage.tracker_format.clone(),
                external_tracker_style: TRACKER_STYLE.to_string(),
            },
            has_wiki: true,
            external_wiki: ExternalWikiOption {
                external_wiki_url: linkage.wiki_url.clone(),
            },
        }
    }
}

/// Body of a collaborator grant request
#[derive(Serialize, Debug, Clone)]
pub struct CollaboratorOption {
    /// Granted permission level
    pub permission: String,
}

impl CollaboratorOption {
    /// The fixed write-permission grant.
    pub fn write() -> Self {
        Self {
            permission: COLLABORATOR_PERMISSION.to_string(),
        }
    }
}
