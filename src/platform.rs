//! Remote platform abstraction used by the provisioning flow.
use std::pin::Pin;

use crate::errors::ProvisionError;
use crate::redmine::ExternalLinkage;
use crate::utils::{Organization, Repository};

/// Outcome of an organization creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgCreation {
    /// The organization was created.
    Created(Organization),

    /// The name belongs to an existing user account; repository creation
    /// must go through the on-behalf-of path instead.
    NameTakenByUser,
}

/// Remote operations needed to provision a repository.
pub trait Platform: Sync + Send {
    /// Look up an organization by name, `None` when it does not exist.
    fn get_org(
        &self,
        name: &str,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<Option<Organization>, ProvisionError>>
                + Send
                + '_,
        >,
    >;

    /// Create a private organization with fixed defaults.
    fn create_org(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<OrgCreation, ProvisionError>> + Send + '_>>;

    /// List the repositories owned by an organization.
    fn get_org_repos(
        &self,
        org: &str,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>> + Send + '_>,
    >;

    /// List the repositories owned by a user.
    fn get_user_repos(
        &self,
        user: &str,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>> + Send + '_>,
    >;

    /// Create an empty private repository under an organization.
    fn create_org_repo(
        &self,
        org: &str,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>;

    /// Create an empty private repository under the acting user.
    fn create_user_repo(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>;

    /// Create an empty private repository for another user through the
    /// admin endpoint.
    fn create_repo_on_behalf(
        &self,
        user: &str,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>;

    /// Point the repository's issue tracker and wiki at the given linkage,
    /// returning the updated repository object.
    fn update_linkage(
        &self,
        owner: &str,
        repo: &str,
        linkage: &ExternalLinkage,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>;

    /// Grant a user write access to the repository.
    fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        user: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), ProvisionError>> + Send + '_>>;

    /// Username of the acting token's user.
    fn get_username(&self) -> &str;
}
