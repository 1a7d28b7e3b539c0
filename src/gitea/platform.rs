//! Gitea platform implementation
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::pin::Pin;
use urlencoding::encode;

use super::repo::{
    CollaboratorOption, CreateOrgOption, CreateRepoOption, EditRepoOption, GiteaOrg, GiteaRepo,
    GiteaUser,
};
use super::REPO_PAGE_LIMIT;
use crate::config::ProvisionSettings;
use crate::errors::{ProvisionError, ProvisionErrorKind};
use crate::platform::{OrgCreation, Platform};
use crate::redmine::ExternalLinkage;
use crate::utils::{Organization, Repository};

/// Response body Gitea sends when an organization name collides with an
/// existing user account
const USER_EXISTS_MARKER: &str = "user already exists";

/// Gitea platform
#[derive(Default, Debug, Clone)]
pub struct GiteaPlatform {
    /// Base URL of the Gitea API
    api_url: String,

    /// Gitea API token
    token: String,

    /// Username of the acting token's user
    username: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GiteaPlatform {
    /// Create a new Gitea platform with a known acting username.
    pub fn new(api_url: String, token: String, username: String) -> Self {
        Self {
            api_url,
            token,
            username,
            client: reqwest::Client::new(),
        }
    }

    /// Create a new Gitea platform, resolving the acting user from the token.
    /// # Errors
    /// Error if the identity lookup fails
    pub async fn try_new(settings: &ProvisionSettings) -> Result<Self, ProvisionError> {
        let client = reqwest::Client::new();
        let url = format!("{}/user", settings.api_url);
        let request = client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", settings.api_token))
            .header(ACCEPT, "application/json")
            .send();

        let response = request.await?;
        if !response.status().is_success() {
            let text = response.text().await?;
            return Err(ProvisionError::new(ProvisionErrorKind::Whoami).with_text(&text));
        }
        let user: GiteaUser = response.json().await?;
        log::debug!("acting as gitea user '{}'", user.username);
        Ok(Self {
            api_url: settings.api_url.clone(),
            token: settings.api_token.clone(),
            username: user.username,
            client,
        })
    }

    /// POST a fixed empty/private repository creation payload.
    async fn post_repo(&self, url: String, name: String) -> Result<Repository, ProvisionError> {
        let json_body = CreateRepoOption::empty_private(&name);
        let request = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&json_body)
            .send();

        let response = request.await?;
        if !response.status().is_success() {
            let text = response.text().await?;
            return Err(ProvisionError::new(ProvisionErrorKind::RepoCreation).with_text(&text));
        }
        let repo: GiteaRepo = response.json().await?;
        Ok(repo.into())
    }

    /// GET a paginated repository listing until an empty page comes back.
    async fn list_repos(&self, url: String) -> Result<Vec<Repository>, ProvisionError> {
        let mut page: usize = 1;
        let mut all_repos = Vec::new();
        loop {
            let request = self
                .client
                .get(&url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/json")
                .query(&[
                    ("page", &page.to_string()),
                    ("limit", &REPO_PAGE_LIMIT.to_string()),
                ])
                .send();

            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(ProvisionError::new(ProvisionErrorKind::RepoListing).with_text(&text));
            }
            let text = response.text().await?;
            let repos: Vec<GiteaRepo> = serde_json::from_str(&text)?;
            let mut page_repos: Vec<Repository> = repos.into_iter().map(|r| r.into()).collect();
            if page_repos.is_empty() {
                break;
            }
            log::debug!("listed {} repositories (page {})", page_repos.len(), page);
            all_repos.append(&mut page_repos);
            page += 1;
        }
        Ok(all_repos)
    }
}

impl Platform for GiteaPlatform {
    fn get_username(&self) -> &str {
        &self.username
    }

    fn get_org(
        &self,
        name: &str,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<Option<Organization>, ProvisionError>>
                + Send
                + '_,
        >,
    > {
        let url = format!("{}/orgs/{}", self.api_url, encode(name));
        Box::pin(async move {
            let request = self
                .client
                .get(&url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/json")
                .send();

            let response = request.await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(ProvisionError::new(ProvisionErrorKind::OrgLookup).with_text(&text));
            }
            let org: GiteaOrg = response.json().await?;
            Ok(Some(org.into()))
        })
    }

    fn create_org(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<OrgCreation, ProvisionError>> + Send + '_>>
    {
        let url = format!("{}/orgs", self.api_url);
        let json_body = CreateOrgOption::private(name);
        Box::pin(async move {
            let request = self
                .client
                .post(&url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&json_body)
                .send();

            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                if text.contains(USER_EXISTS_MARKER) {
                    return Ok(OrgCreation::NameTakenByUser);
                }
                return Err(ProvisionError::new(ProvisionErrorKind::OrgCreation).with_text(&text));
            }
            let org: GiteaOrg = response.json().await?;
            Ok(OrgCreation::Created(org.into()))
        })
    }

    fn get_org_repos(
        &self,
        org: &str,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>> + Send + '_>,
    > {
        let url = format!("{}/orgs/{}/repos", self.api_url, encode(org));
        Box::pin(async move { self.list_repos(url).await })
    }

    fn get_user_repos(
        &self,
        user: &str,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>> + Send + '_>,
    > {
        let url = format!("{}/users/{}/repos", self.api_url, encode(user));
        Box::pin(async move { self.list_repos(url).await })
    }

    fn create_org_repo(
        &self,
        org: &str,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>
    {
        let url = format!("{}/org/{}/repos", self.api_url, encode(org));
        let name = name.to_string();
        Box::pin(async move { self.post_repo(url, name).await })
    }

    fn create_user_repo(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>
    {
        let url = format!("{}/user/repos", self.api_url);
        let name = name.to_string();
        Box::pin(async move { self.post_repo(url, name).await })
    }

    fn create_repo_on_behalf(
        &self,
        user: &str,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>
    {
        let url = format!("{}/admin/users/{}/repos", self.api_url, encode(user));
        let name = name.to_string();
        Box::pin(async move { self.post_repo(url, name).await })
    }

    fn update_linkage(
        &self,
        owner: &str,
        repo: &str,
        linkage: &ExternalLinkage,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>>
    {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_url,
            encode(owner),
            encode(repo)
        );
        let json_body = EditRepoOption::linkage(linkage);
        Box::pin(async move {
            let request = self
                .client
                .patch(&url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&json_body)
                .send();

            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(
                    ProvisionError::new(ProvisionErrorKind::LinkageUpdate).with_text(&text)
                );
            }
            let patched: GiteaRepo = response.json().await?;
            Ok(patched.into())
        })
    }

    fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        user: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), ProvisionError>> + Send + '_>> {
        let url = format!(
            "{}/repos/{}/{}/collaborators/{}",
            self.api_url,
            encode(owner),
            encode(repo),
            encode(user)
        );
        let json_body = CollaboratorOption::write();
        Box::pin(async move {
            let request = self
                .client
                .put(&url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&json_body)
                .send();

            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(
                    ProvisionError::new(ProvisionErrorKind::CollaboratorGrant).with_text(&text)
                );
            }
            Ok(())
        })
    }
}
