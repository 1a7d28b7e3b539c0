//! Error handling for the gitea-provision crate.
use std::{error::Error as StdError, fmt};

/// Error type for the gitea-provision crate.
#[derive(Debug)]
pub struct ProvisionError {
    /// Inner error.
    inner: Box<Inner>,
}

impl ProvisionError {
    /// Create a new error.
    pub(crate) fn new(kind: ProvisionErrorKind) -> Self {
        Self {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    /// Create a new error with a text description and an underlying source.
    pub(crate) fn new_with_source<E>(text: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Config,
                source: Some(Box::new(std::io::Error::other(format!("{text}: {source}")))),
            }),
        }
    }

    /// Attach a text description to the error.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text)));
        self
    }

    /// The kind of failure this error represents.
    pub fn kind(&self) -> &ProvisionErrorKind {
        &self.inner.kind
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the gitea-provision crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: ProvisionErrorKind,

    /// Source error.
    source: Option<BoxError>,
}

/// Kinds of failure surfaced by the provisioning flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionErrorKind {
    /// Error reading or parsing the configuration.
    Config,

    /// Required configuration keys are missing.
    MissingConfig,

    /// The repository path has more than two segments.
    PathTooDeep,

    /// The repository path is empty or has an empty segment.
    InvalidPath,

    /// Error looking up an organization.
    OrgLookup,

    /// Error creating an organization.
    OrgCreation,

    /// Error listing existing repositories.
    RepoListing,

    /// Error creating a repository.
    RepoCreation,

    /// The repository object carries no owner username.
    OwnerResolution,

    /// Error updating the external tracker and wiki linkage.
    LinkageUpdate,

    /// The linkage update never became visible within the retry budget.
    RetryExhausted,

    /// Error granting a collaborator write access.
    CollaboratorGrant,

    /// Error resolving the acting token's identity.
    Whoami,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner.kind)?;
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for ProvisionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for ProvisionError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Reqwest,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Serde,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<toml::de::Error> for ProvisionError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Config,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(e: std::io::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Config,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<url::ParseError> for ProvisionError {
    fn from(e: url::ParseError) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: ProvisionErrorKind::Config,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<&str> for ProvisionError {
    fn from(s: &str) -> Self {
        Self::new(ProvisionErrorKind::Config).with_text(s)
    }
}
