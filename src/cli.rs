//! Command line options for the gitea-provision tool
use clap::Parser;
use serde::Deserialize;

use crate::{
    config::GiteaProvisionConfig,
    errors::ProvisionError,
    gitea::platform::GiteaPlatform,
    provision::{ensure_repo, ProvisionRequest},
    retry::RetryPolicy,
};

/// gitea-provision - Provision a Gitea repository for a Redmine project
#[derive(Parser, Deserialize, Default, Clone, Debug)]
pub struct GiteaProvisionCli {
    /// Redmine project identifier used in issue and wiki links
    #[arg(required_unless_present = "show_config_path")]
    pub project: Option<String>,

    /// Repository path, `org/repo` or `repo`
    #[arg(required_unless_present = "show_config_path")]
    pub path: Option<String>,

    /// Owner of the repository when no organization applies
    #[arg(required_unless_present = "show_config_path")]
    pub on_behalf_of: Option<String>,

    /// Comma separated users granted write access
    pub users: Option<String>,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the gitea-provision tool with the provided command line options.
/// On success the repository's SSH clone URL is the only stdout output.
/// # Errors
/// Error if the configuration is invalid or any provisioning step fails
pub async fn gitea_provision_main() -> Result<(), ProvisionError> {
    let args = GiteaProvisionCli::parse();
    init_logging(args.verbose);
    let config = GiteaProvisionConfig::try_new(args.clone())?;
    if config.cli_args.show_config_path {
        println!("{}", config.config_path.display());
        return Ok(());
    }
    let settings = config.resolve()?;
    let (project, path, on_behalf_of) = match (args.project, args.path, args.on_behalf_of) {
        (Some(project), Some(path), Some(on_behalf_of)) => (project, path, on_behalf_of),
        _ => return Err("Missing required arguments".into()),
    };
    let platform = GiteaPlatform::try_new(&settings).await?;
    let request = ProvisionRequest {
        project,
        path,
        on_behalf_of,
        users: split_users(args.users.as_deref().unwrap_or_default()),
    };
    let repo = ensure_repo(
        &platform,
        &settings.redmine_url,
        &request,
        &RetryPolicy::default(),
    )
    .await?;
    println!("{}", repo.ssh_url);
    Ok(())
}

/// Split the comma separated user list, dropping empty entries.
fn split_users(users: &str) -> Vec<String> {
    users
        .split(',')
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Initialize logging on stderr at a level matching the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .init();
}
