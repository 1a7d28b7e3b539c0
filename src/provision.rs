//! Provisioning orchestration: ensure the organization and repository
//! exist, point issues and wiki at the Redmine project, grant write access.
use log::{info, warn};

use crate::errors::{ProvisionError, ProvisionErrorKind};
use crate::platform::{OrgCreation, Platform};
use crate::redmine::ExternalLinkage;
use crate::retry::RetryPolicy;
use crate::utils::{RepoPath, Repository};

/// One repository provisioning request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Redmine project identifier used in the issue and wiki URLs.
    pub project: String,

    /// Repository path, `org/repo` or `repo`.
    pub path: String,

    /// Target owner of the repository when no organization applies.
    pub on_behalf_of: String,

    /// Users granted write access.
    pub users: Vec<String>,
}

/// Ensure the requested repository exists, wire its issue tracker and wiki
/// to the Redmine project and grant write access to the listed users.
/// Returns the repository object merged with the linkage update response.
/// # Errors
/// `PathTooDeep`/`InvalidPath` before any remote call for a bad path,
/// `OwnerResolution` when the repository carries no owner, `RetryExhausted`
/// when the linkage never becomes visible, and the platform's own errors
/// for failed remote operations.
pub async fn ensure_repo(
    platform: &dyn Platform,
    redmine_url: &str,
    request: &ProvisionRequest,
    retry: &RetryPolicy,
) -> Result<Repository, ProvisionError> {
    let path = RepoPath::parse(&request.path)?;

    let mut org = None;
    let mut existing = Vec::new();
    if let Some(org_name) = &path.org {
        match platform.get_org(org_name).await? {
            Some(found) => {
                info!("existing organization: {}", found.username);
                existing = platform.get_org_repos(org_name).await?;
                org = Some(org_name.clone());
            }
            None => match platform.create_org(org_name).await? {
                OrgCreation::Created(created) => {
                    info!("created organization: {}", created.username);
                    org = Some(org_name.clone());
                }
                OrgCreation::NameTakenByUser => {
                    info!("'{org_name}' is a user account, creating on behalf of the target user");
                }
            },
        }
    } else {
        existing = platform.get_user_repos(&request.on_behalf_of).await?;
    }

    let repo = match existing.into_iter().find(|repo| repo.name == path.name) {
        Some(found) => {
            info!("existing repository: {}", found.name);
            found
        }
        None => {
            let created = match &org {
                Some(org_name) => platform.create_org_repo(org_name, &path.name).await?,
                None if platform.get_username() != request.on_behalf_of => {
                    platform
                        .create_repo_on_behalf(&request.on_behalf_of, &path.name)
                        .await?
                }
                None => platform.create_user_repo(&path.name).await?,
            };
            info!("created repository: {}", created.name);
            created
        }
    };

    let owner = match repo.owner.clone() {
        Some(owner) => owner,
        None => {
            return Err(ProvisionError::new(ProvisionErrorKind::OwnerResolution)
                .with_text(&format!("repository '{}' has no owner", repo.name)));
        }
    };

    let linkage = ExternalLinkage::new(redmine_url, &request.project);
    let patched = update_linkage_with_retry(platform, &owner, &path.name, &linkage, retry).await?;

    for user in &request.users {
        platform.add_collaborator(&owner, &path.name, user).await?;
        info!("granted write access to {user}");
    }

    Ok(repo.merged_with(patched))
}

/// PATCH the linkage until the response carries the external wiki field,
/// bounded by the retry policy.
async fn update_linkage_with_retry(
    platform: &dyn Platform,
    owner: &str,
    repo: &str,
    linkage: &ExternalLinkage,
    retry: &RetryPolicy,
) -> Result<Repository, ProvisionError> {
    for attempt in 0..retry.max_attempts {
        let patched = platform.update_linkage(owner, repo, linkage).await?;
        if patched.external_wiki_url.is_some() {
            return Ok(patched);
        }
        warn!(
            "linkage update not yet visible (attempt {}/{})",
            attempt + 1,
            retry.max_attempts
        );
        // no point backing off after the attempt that exhausts the budget
        if attempt + 1 < retry.max_attempts {
            retry.pause(attempt).await;
        }
    }
    Err(ProvisionError::new(ProvisionErrorKind::RetryExhausted).with_text(&format!(
        "external wiki still missing after {} attempts",
        retry.max_attempts
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {

    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::retry::Backoff;
    use crate::utils::Organization;

    /// One recorded remote call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        GetOrg(String),
        CreateOrg(String),
        GetOrgRepos(String),
        GetUserRepos(String),
        CreateOrgRepo(String, String),
        CreateUserRepo(String),
        CreateRepoOnBehalf(String, String),
        UpdateLinkage(String, String),
        AddCollaborator(String, String, String),
    }

    /// Scripted platform that records every call it receives.
    #[derive(Default)]
    struct MockPlatform {
        /// Acting user.
        username: String,

        /// Organizations that already exist.
        orgs: Vec<Organization>,

        /// Repositories listed for any organization.
        org_repos: Vec<Repository>,

        /// Repositories listed for any user.
        user_repos: Vec<Repository>,

        /// Fail organization creation with the name-is-a-user signal.
        org_name_taken: bool,

        /// Linkage attempt (1-based) whose response first carries the
        /// external wiki field; `None` means it never appears.
        wiki_visible_at: Option<u32>,

        /// Number of linkage PATCH calls so far.
        patches: Mutex<u32>,

        /// Recorded calls, in order.
        calls: Mutex<Vec<Call>>,
    }

    impl MockPlatform {
        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn repo(name: &str, owner: Option<&str>) -> Repository {
            Repository {
                id: 12,
                name: name.to_string(),
                owner: owner.map(ToString::to_string),
                ssh_url: match owner {
                    Some(owner) => format!("git@git.example.com:{owner}/{name}.git"),
                    None => String::new(),
                },
                private: true,
                external_tracker_url: None,
                external_wiki_url: None,
            }
        }

        fn ready<T: Send + 'static>(
            value: Result<T, ProvisionError>,
        ) -> Pin<Box<dyn std::future::Future<Output = Result<T, ProvisionError>> + Send>> {
            Box::pin(async move { value })
        }
    }

    impl Platform for MockPlatform {
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
            self.record(Call::GetOrg(name.to_string()));
            let found = self.orgs.iter().find(|org| org.username == name).cloned();
            Self::ready(Ok(found))
        }

        fn create_org(
            &self,
            name: &str,
        ) -> Pin<
            Box<dyn std::future::Future<Output = Result<OrgCreation, ProvisionError>> + Send + '_>,
        > {
            self.record(Call::CreateOrg(name.to_string()));
            let result = if self.org_name_taken {
                OrgCreation::NameTakenByUser
            } else {
                OrgCreation::Created(Organization {
                    id: 7,
                    username: name.to_string(),
                })
            };
            Self::ready(Ok(result))
        }

        fn get_org_repos(
            &self,
            org: &str,
        ) -> Pin<
            Box<
                dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>>
                    + Send
                    + '_,
            >,
        > {
            self.record(Call::GetOrgRepos(org.to_string()));
            Self::ready(Ok(self.org_repos.clone()))
        }

        fn get_user_repos(
            &self,
            user: &str,
        ) -> Pin<
            Box<
                dyn std::future::Future<Output = Result<Vec<Repository>, ProvisionError>>
                    + Send
                    + '_,
            >,
        > {
            self.record(Call::GetUserRepos(user.to_string()));
            Self::ready(Ok(self.user_repos.clone()))
        }

        fn create_org_repo(
            &self,
            org: &str,
            name: &str,
        ) -> Pin<
            Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>,
        > {
            self.record(Call::CreateOrgRepo(org.to_string(), name.to_string()));
            Self::ready(Ok(Self::repo(name, Some(org))))
        }

        fn create_user_repo(
            &self,
            name: &str,
        ) -> Pin<
            Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>,
        > {
            self.record(Call::CreateUserRepo(name.to_string()));
            Self::ready(Ok(Self::repo(name, Some(self.username.as_str()))))
        }

        fn create_repo_on_behalf(
            &self,
            user: &str,
            name: &str,
        ) -> Pin<
            Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>,
        > {
            self.record(Call::CreateRepoOnBehalf(user.to_string(), name.to_string()));
            Self::ready(Ok(Self::repo(name, Some(user))))
        }

        fn update_linkage(
            &self,
            owner: &str,
            repo: &str,
            linkage: &ExternalLinkage,
        ) -> Pin<
            Box<dyn std::future::Future<Output = Result<Repository, ProvisionError>> + Send + '_>,
        > {
            self.record(Call::UpdateLinkage(owner.to_string(), repo.to_string()));
            let attempt = {
                let mut patches = self.patches.lock().unwrap();
                *patches += 1;
                *patches
            };
            let visible = self.wiki_visible_at.is_some_and(|at| attempt >= at);
            let mut patched = Self::repo(repo, Some(owner));
            patched.ssh_url = String::new();
            patched.external_tracker_url = Some(linkage.tracker_url.clone());
            patched.external_wiki_url = visible.then(|| linkage.wiki_url.clone());
            Self::ready(Ok(patched))
        }

        fn add_collaborator(
            &self,
            owner: &str,
            repo: &str,
            user: &str,
        ) -> Pin<Box<dyn std::future::Future<Output = Result<(), ProvisionError>> + Send + '_>>
        {
            self.record(Call::AddCollaborator(
                owner.to_string(),
                repo.to_string(),
                user.to_string(),
            ));
            Self::ready(Ok(()))
        }
    }

    /// Mock whose linkage update succeeds on the first attempt.
    fn platform() -> MockPlatform {
        MockPlatform {
            username: "gitea-admin".to_string(),
            wiki_visible_at: Some(1),
            ..Default::default()
        }
    }

    fn request(path: &str, users: &[&str]) -> ProvisionRequest {
        ProvisionRequest {
            project: "webapp".to_string(),
            path: path.to_string(),
            on_behalf_of: "alice".to_string(),
            users: users.iter().map(ToString::to_string).collect(),
        }
    }

    const REDMINE: &str = "https://redmine.example.com";

    #[tokio::test]
    async fn too_deep_path_makes_no_calls() {
        let platform = platform();
        let result = ensure_repo(
            &platform,
            REDMINE,
            &request("acme/tools/site", &[]),
            &RetryPolicy::default(),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.kind(), &ProvisionErrorKind::PathTooDeep);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn fresh_org_and_repo_call_order() {
        let platform = platform();
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &["bob"]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(
            platform.calls(),
            vec![
                Call::GetOrg("acme".to_string()),
                Call::CreateOrg("acme".to_string()),
                Call::CreateOrgRepo("acme".to_string(), "site".to_string()),
                Call::UpdateLinkage("acme".to_string(), "site".to_string()),
                Call::AddCollaborator("acme".to_string(), "site".to_string(), "bob".to_string()),
            ]
        );
        assert_eq!(repo.ssh_url, "git@git.example.com:acme/site.git");
        assert_eq!(
            repo.external_wiki_url.as_deref(),
            Some("https://redmine.example.com/projects/webapp/wiki")
        );
    }

    #[tokio::test]
    async fn org_name_taken_switches_to_on_behalf_creation() {
        let platform = MockPlatform {
            org_name_taken: true,
            ..platform()
        };
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("alice/site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(
            platform.calls(),
            vec![
                Call::GetOrg("alice".to_string()),
                Call::CreateOrg("alice".to_string()),
                Call::CreateRepoOnBehalf("alice".to_string(), "site".to_string()),
                Call::UpdateLinkage("alice".to_string(), "site".to_string()),
            ]
        );
        assert_eq!(repo.owner.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn existing_repo_is_reused() {
        let platform = MockPlatform {
            orgs: vec![Organization {
                id: 3,
                username: "acme".to_string(),
            }],
            org_repos: vec![MockPlatform::repo("site", Some("acme"))],
            ..platform()
        };
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &["bob"]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        let calls = platform.calls();
        assert!(!calls.iter().any(|call| matches!(
            call,
            Call::CreateOrg(_)
                | Call::CreateOrgRepo(_, _)
                | Call::CreateUserRepo(_)
                | Call::CreateRepoOnBehalf(_, _)
        )));
        assert!(calls.contains(&Call::UpdateLinkage(
            "acme".to_string(),
            "site".to_string()
        )));
        // the pre-existing ssh_url survives the merge with the patch response
        assert_eq!(repo.ssh_url, "git@git.example.com:acme/site.git");
    }

    #[tokio::test]
    async fn end_to_end_existing_org_and_repo() {
        let platform = MockPlatform {
            orgs: vec![Organization {
                id: 3,
                username: "acme".to_string(),
            }],
            org_repos: vec![MockPlatform::repo("site", Some("acme"))],
            ..platform()
        };
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &["bob", "carol"]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(
            platform.calls(),
            vec![
                Call::GetOrg("acme".to_string()),
                Call::GetOrgRepos("acme".to_string()),
                Call::UpdateLinkage("acme".to_string(), "site".to_string()),
                Call::AddCollaborator("acme".to_string(), "site".to_string(), "bob".to_string()),
                Call::AddCollaborator("acme".to_string(), "site".to_string(), "carol".to_string()),
            ]
        );
        assert_eq!(
            repo.external_tracker_url.as_deref(),
            Some("https://redmine.example.com/projects/webapp/issues")
        );
    }

    #[tokio::test]
    async fn single_segment_path_lists_target_user_repos() {
        let platform = platform();
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        // acting user differs from the target, so creation goes through the
        // admin endpoint
        assert_eq!(
            platform.calls(),
            vec![
                Call::GetUserRepos("alice".to_string()),
                Call::CreateRepoOnBehalf("alice".to_string(), "site".to_string()),
                Call::UpdateLinkage("alice".to_string(), "site".to_string()),
            ]
        );
        assert_eq!(repo.owner.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn single_segment_path_for_the_acting_user() {
        let platform = MockPlatform {
            username: "alice".to_string(),
            ..platform()
        };
        ensure_repo(
            &platform,
            REDMINE,
            &request("site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert!(platform
            .calls()
            .contains(&Call::CreateUserRepo("site".to_string())));
    }

    #[tokio::test]
    async fn linkage_retry_is_bounded_by_the_policy() {
        let platform = MockPlatform {
            wiki_visible_at: None,
            ..platform()
        };
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff: Backoff::None,
        };
        let err = ensure_repo(&platform, REDMINE, &request("acme/site", &[]), &policy)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ProvisionErrorKind::RetryExhausted);
        let patches = platform
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::UpdateLinkage(_, _)))
            .count();
        assert_eq!(patches, 5);
    }

    #[tokio::test]
    async fn linkage_retry_stops_once_visible() {
        let platform = MockPlatform {
            wiki_visible_at: Some(3),
            ..platform()
        };
        let repo = ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        let patches = platform
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::UpdateLinkage(_, _)))
            .count();
        assert_eq!(patches, 3);
        assert!(repo.external_wiki_url.is_some());
    }

    #[tokio::test]
    async fn empty_user_list_grants_nothing() {
        let platform = platform();
        ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert!(!platform
            .calls()
            .iter()
            .any(|call| matches!(call, Call::AddCollaborator(_, _, _))));
    }

    #[tokio::test]
    async fn one_grant_per_listed_user() {
        let platform = platform();
        ensure_repo(
            &platform,
            REDMINE,
            &request("acme/site", &["bob", "carol"]),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        let grants: Vec<Call> = platform
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::AddCollaborator(_, _, _)))
            .collect();
        assert_eq!(
            grants,
            vec![
                Call::AddCollaborator("acme".to_string(), "site".to_string(), "bob".to_string()),
                Call::AddCollaborator("acme".to_string(), "site".to_string(), "carol".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_owner_is_an_error() {
        let platform = MockPlatform {
            user_repos: vec![MockPlatform::repo("site", None)],
            ..platform()
        };
        let err = ensure_repo(
            &platform,
            REDMINE,
            &request("site", &[]),
            &RetryPolicy::default(),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), &ProvisionErrorKind::OwnerResolution);
        // nothing runs past owner resolution
        assert!(!platform
            .calls()
            .iter()
            .any(|call| matches!(call, Call::UpdateLinkage(_, _))));
    }
}
