//! CLI command definitions and execution
//!
//! Every command returns a typed `Result`; [`execute`] is the one place that
//! turns a failure into an error message and an exit code.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use pl_core::{
    Authenticator, Config, ConfigManager, HttpAuthenticator, PartitionDimension, PartitionPath,
    PathSpec, Result, SessionManager, StoreProvider, build_paths,
};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod auth;
mod load;
mod ls;
mod paths;

/// partload - fetch partitioned datasets from S3
///
/// Derives `type=/date=/experiment=|event=` prefixes under an account's base
/// path and lists or downloads them, exchanging an access token for
/// short-lived storage credentials when one is given.
#[derive(Parser, Debug)]
#[command(name = "partload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange the access token for temporary credentials and print them
    Auth(auth::AuthArgs),

    /// Print the storage paths selected by the data options
    Paths(paths::PathsArgs),

    /// List objects under each selected path
    Ls(ls::LsArgs),

    /// Download each selected path into a local directory
    Load(load::LoadArgs),
}

/// Options locating the account and selecting partitions
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Bucket holding the datasets
    #[arg(long, env = "PARTLOAD_BUCKET")]
    pub bucket: Option<String>,

    /// Account whose data to access
    #[arg(long, env = "PARTLOAD_ACCOUNT_ID")]
    pub account_id: Option<String>,

    #[command(flatten)]
    pub token: TokenArgs,

    /// Dataset type: decisions or events
    #[arg(long = "type", value_name = "TYPE")]
    pub dataset_type: Option<String>,

    /// First date to select (YYYY-MM-DD)
    #[arg(long, visible_alias = "date", value_name = "DATE")]
    pub start: Option<String>,

    /// Last date to select, inclusive (defaults to --start)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Restrict to one experiment (cannot be combined with --event)
    #[arg(long, value_name = "ID")]
    pub experiment: Option<String>,

    /// Restrict to one event
    #[arg(long, value_name = "NAME")]
    pub event: Option<String>,
}

/// Options controlling the token exchange
#[derive(Args, Debug, Clone, Default)]
pub struct TokenArgs {
    /// Access token to exchange for storage credentials
    #[arg(long, env = "PARTLOAD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Token exchange endpoint
    #[arg(long, env = "PARTLOAD_AUTH_URL", hide = true)]
    pub auth_url: Option<String>,
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config.clone());

    let result = match cli.command {
        Commands::Auth(args) => auth::execute(args, &formatter).await,
        Commands::Paths(args) => paths::execute(args, &formatter).await,
        Commands::Ls(args) => ls::execute(args, &formatter).await,
        Commands::Load(args) => load::execute(args, &formatter, output_config).await,
    };

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

/// Configuration plus the session built from it
pub(crate) struct Context {
    pub config: Config,
    pub session: SessionManager<HttpAuthenticator>,
}

impl Context {
    pub fn load(token: &TokenArgs) -> Result<Self> {
        let config = ConfigManager::new()?.load()?;
        let url = token
            .auth_url
            .clone()
            .unwrap_or_else(|| config.auth.url.clone());
        let authenticator =
            HttpAuthenticator::new(url, Duration::from_secs(config.auth.timeout_secs))?;
        let session = SessionManager::new(token.token.clone(), authenticator);
        Ok(Self { config, session })
    }

    /// Derive the partition paths selected by `args`
    ///
    /// Validates the options before touching the network, then resolves the
    /// base path (which may authenticate).
    pub async fn resolve_paths(&self, args: &DataArgs) -> Result<Vec<PartitionPath>> {
        let partition =
            PartitionDimension::from_options(args.experiment.as_deref(), args.event.as_deref())?;
        let spec = PathSpec::new(
            "",
            args.dataset_type.as_deref(),
            args.start.as_deref(),
            args.end.as_deref(),
            partition,
        )?;

        let bucket = args.bucket.as_deref().or(self.config.defaults.bucket.as_deref());
        let account_id = args
            .account_id
            .as_deref()
            .or(self.config.defaults.account_id.as_deref());
        let base_path = self
            .session
            .resolve_base_path(Timestamp::now(), bucket, account_id)
            .await?;

        let spec = spec.with_base_path(&base_path);
        let paths = build_paths(&spec);
        tracing::debug!(base_path = %spec.base_path(), count = paths.len(), "Derived paths");
        Ok(paths)
    }
}

/// Store for the next object-store call, authenticating first if needed
pub(crate) async fn fresh_store<'a, A, P>(
    session: &SessionManager<A>,
    stores: &'a mut P,
) -> Result<&'a P::Store>
where
    A: Authenticator,
    P: StoreProvider,
{
    let credential = session.ensure_valid(Timestamp::now()).await?;
    stores.store(credential.as_ref()).await
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_data_options() {
        let cli = Cli::try_parse_from([
            "partload",
            "paths",
            "--bucket",
            "b",
            "--account-id",
            "1",
            "--type",
            "decisions",
            "--date",
            "2020-07-01",
            "--experiment",
            "56789",
        ])
        .unwrap();

        let Commands::Paths(args) = cli.command else {
            panic!("expected paths command");
        };
        assert_eq!(args.data.bucket.as_deref(), Some("b"));
        assert_eq!(args.data.account_id.as_deref(), Some("1"));
        assert_eq!(args.data.dataset_type.as_deref(), Some("decisions"));
        assert_eq!(args.data.start.as_deref(), Some("2020-07-01"));
        assert_eq!(args.data.experiment.as_deref(), Some("56789"));
    }

    #[tokio::test]
    async fn test_experiment_with_event_is_a_validation_error() {
        let cli = Cli::try_parse_from([
            "partload",
            "paths",
            "--bucket",
            "b",
            "--account-id",
            "1",
            "--experiment",
            "1",
            "--event",
            "click",
        ])
        .unwrap();
        let Commands::Paths(args) = cli.command else {
            panic!("expected paths command");
        };

        let authenticator =
            HttpAuthenticator::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        let ctx = Context {
            config: Config::default(),
            session: SessionManager::new(None, authenticator),
        };
        let err = ctx.resolve_paths(&args.data).await.unwrap_err();
        assert!(matches!(err, pl_core::Error::Validation(_)));
        assert_eq!(ExitCode::from(&err), ExitCode::Failure);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["partload", "ls", "--json", "--verbose"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }
}
