//! Configuration handling
use std::{
    fs::{create_dir_all, read_to_string, File},
    io::Write,
    path::PathBuf,
};

use home::home_dir;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    cli::GiteaProvisionCli,
    errors::{ProvisionError, ProvisionErrorKind},
    gitea::config::GiteaConfig,
    redmine::RedmineConfig,
};

/// Configuration data
#[derive(Deserialize, Default, Clone, Debug)]
pub struct GiteaProvisionConfig {
    /// path to the configuration file
    pub config_path: PathBuf,

    /// actual configuration data
    pub config_data: ConfigData,

    /// CLI arguments
    pub cli_args: GiteaProvisionCli,
}

/// On-disk configuration data
#[derive(Deserialize, Serialize, Default, Clone, Debug)]
pub struct ConfigData {
    /// Gitea configuration
    pub gitea: Option<GiteaConfig>,

    /// Redmine configuration
    pub redmine: Option<RedmineConfig>,
}

/// Settings resolved from the configuration, validated before any work
/// starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Base URL of the Gitea API, without a trailing slash
    pub api_url: String,

    /// Gitea API token
    pub api_token: String,

    /// Base URL of the Redmine instance, without a trailing slash
    pub redmine_url: String,
}

impl GiteaProvisionConfig {
    /// Create a new config object from the CLI arguments, reading the file
    /// they point at or the default path.
    /// # Errors
    /// Error if the config file can't be opened or parsed
    pub fn try_new(cli_args: GiteaProvisionCli) -> Result<Self, ProvisionError> {
        let config_path = match cli_args.config.clone() {
            Some(path_str) => PathBuf::from(path_str),
            None => Self::get_config_path()?,
        };
        let contents = read_to_string(config_path.clone())
            .map_err(|e| ProvisionError::new_with_source("Unable to open", e))?;
        let config_data = toml::from_str(&contents)?;
        Ok(GiteaProvisionConfig {
            config_path,
            cli_args,
            config_data,
        })
    }

    /// Get the path to the config file, creating an empty one if missing.
    /// # Errors
    /// Error if the home directory can't be found
    pub fn get_config_path() -> Result<PathBuf, ProvisionError> {
        let home_dir = match home_dir() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err("Unable to get your home dir! home::home_dir() isn't working".into()),
        };
        let config_directory = home_dir.join(".config").join(".gitea-provision");
        let config_path = config_directory.join("config.toml");
        create_dir_all(config_directory)
            .map_err(|e| ProvisionError::new_with_source("Unable to create config dir", e))?;
        if !config_path.exists() {
            let mut file = File::create(&config_path)
                .map_err(|e| ProvisionError::new_with_source("Unable to create config file", e))?;
            file.write_all(b"")
                .map_err(|e| ProvisionError::new_with_source("Unable to write to config file", e))?;
        }
        Ok(config_path)
    }

    /// Resolve the settings needed for provisioning, collecting every
    /// missing key into one error.
    /// # Errors
    /// `MissingConfig` naming the absent keys, or a config error for an
    /// unparsable URL
    pub fn resolve(&self) -> Result<ProvisionSettings, ProvisionError> {
        self.config_data.resolve()
    }
}

impl ConfigData {
    /// Resolve the settings needed for provisioning.
    /// # Errors
    /// `MissingConfig` naming the absent keys, or a config error for an
    /// unparsable URL
    pub fn resolve(&self) -> Result<ProvisionSettings, ProvisionError> {
        let gitea = self.gitea.clone().unwrap_or_default();
        let redmine = self.redmine.clone().unwrap_or_default();
        let mut lacking = Vec::new();
        if gitea.api_url.is_none() {
            lacking.push("gitea.api_url");
        }
        if gitea.api_token.is_none() {
            lacking.push("gitea.api_token");
        }
        if redmine.url.is_none() {
            lacking.push("redmine.url");
        }
        match (gitea.api_url, gitea.api_token, redmine.url) {
            (Some(api_url), Some(api_token), Some(redmine_url)) => {
                let api_url = api_url.trim_end_matches('/').to_string();
                let redmine_url = redmine_url.trim_end_matches('/').to_string();
                Url::parse(&api_url)
                    .map_err(|e| ProvisionError::new_with_source("Invalid gitea.api_url", e))?;
                Url::parse(&redmine_url)
                    .map_err(|e| ProvisionError::new_with_source("Invalid redmine.url", e))?;
                Ok(ProvisionSettings {
                    api_url,
                    api_token,
                    redmine_url,
                })
            }
            _ => Err(ProvisionError::new(ProvisionErrorKind::MissingConfig)
                .with_text(&format!("Lacking config keys: {}", lacking.join(", ")))),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn resolve_complete_config() {
        let data: ConfigData = match toml::from_str(
            r#"
            [gitea]
            api_url = "https://git.example.com/api/v1/"
            api_token = "secret"

            [redmine]
            url = "https://redmine.example.com"
            "#,
        ) {
            Ok(data) => data,
            Err(e) => panic!("config did not parse: {e}"),
        };
        let settings = match data.resolve() {
            Ok(settings) => settings,
            Err(e) => panic!("resolution failed: {e}"),
        };
        assert_eq!(settings.api_url, "https://git.example.com/api/v1");
        assert_eq!(settings.api_token, "secret");
        assert_eq!(settings.redmine_url, "https://redmine.example.com");
    }

    #[test]
    fn resolve_names_every_missing_key() {
        let data = ConfigData::default();
        let err = match data.resolve() {
            Err(e) => e,
            Ok(_) => panic!("empty config should not resolve"),
        };
        assert_eq!(err.kind(), &ProvisionErrorKind::MissingConfig);
        let text = err.to_string();
        assert!(text.contains("gitea.api_url"));
        assert!(text.contains("gitea.api_token"));
        assert!(text.contains("redmine.url"));
    }

    #[test]
    fn resolve_rejects_invalid_url() {
        let data: ConfigData = match toml::from_str(
            r#"
            [gitea]
            api_url = "not a url"
            api_token = "secret"

            [redmine]
            url = "https://redmine.example.com"
            "#,
        ) {
            Ok(data) => data,
            Err(e) => panic!("config did not parse: {e}"),
        };
        assert!(data.resolve().is_err());
    }
}
