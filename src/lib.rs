//! # gitea-provision
//!
//! Provision a Gitea repository for a Redmine project: ensure the owning
//! organization and the repository exist, point the repository's issue
//! tracker and wiki at the Redmine project, and grant a list of users
//! write access.
//!
//! ## Usage
//!
//! ```txt
//! Usage: gitea-provision [OPTIONS] [PROJECT] [PATH] [ON_BEHALF_OF] [USERS]
//!
//! Arguments:
//!   [PROJECT]       Redmine project identifier used in issue and wiki links
//!   [PATH]          Repository path, `org/repo` or `repo`
//!   [ON_BEHALF_OF]  Owner of the repository when no organization applies
//!   [USERS]         Comma separated users granted write access
//!
//! Options:
//!   -c, --config <CONFIG>  Custom configuration file path
//!       --show-config-path Show the current config path
//!   -v, --verbose...       Verbose mode (-v, -vv, -vvv)
//!   -h, --help             Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod platform;
pub(crate) mod provision;
pub(crate) mod redmine;
pub(crate) mod retry;
pub(crate) mod utils;

mod gitea;

pub use cli::{gitea_provision_main, GiteaProvisionCli};
pub use config::{ConfigData, GiteaProvisionConfig, ProvisionSettings};
pub use errors::{ProvisionError, ProvisionErrorKind};
pub use gitea::config::GiteaConfig;
pub use gitea::platform::GiteaPlatform;
pub use platform::{OrgCreation, Platform};
pub use provision::{ensure_repo, ProvisionRequest};
pub use redmine::{ExternalLinkage, RedmineConfig};
pub use retry::{Backoff, RetryPolicy};
pub use utils::{Organization, RepoPath, Repository};
