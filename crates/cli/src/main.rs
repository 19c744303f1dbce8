//! bunnystoragectl - command line interface for bunny.net Edge Storage

mod commands;
mod exit_code;
mod output;
mod profile;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bunny_storage::{Application, Client, Config, Endpoint};
use clap::{ArgAction, Args, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use commands::Commands;
use exit_code::ExitCode;
use output::{Formatter, OutputConfig};
use profile::{APP_NAME, Profile};

const HOMEPAGE: &str = "https://github.com/bunny-storage/bunnystoragectl";

#[derive(Parser, Debug)]
#[command(
    name = APP_NAME,
    version,
    about = "A command line interface for bunny.net Edge Storage",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

/// Options accepted by every subcommand
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Storage zone name
    #[arg(short = 'z', long, env = "BUNNY_STORAGE_ZONE", global = true)]
    storage_zone: Option<String>,

    /// Storage zone password (read-write key)
    #[arg(short, long, env = "BUNNY_KEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Read-only key, used for list and download
    #[arg(long, env = "BUNNY_READ_ONLY_KEY", hide_env_values = true, global = true)]
    read_only_key: Option<String>,

    /// Storage endpoint URL
    #[arg(short, long, env = "BUNNY_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "BUNNY_TIMEOUT", value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Settings file (defaults to <config dir>/bunnystoragectl/config.toml)
    #[arg(long, env = "BUNNYSTORAGECTL_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print progress messages
    #[arg(short = 'V', long, global = true)]
    verbose: bool,

    /// Log HTTP traffic (keys are redacted)
    #[arg(long, global = true)]
    debug: bool,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let Cli { global, command, .. } = Cli::parse();
    init_logging(global.debug);

    run(global, command).await.into()
}

async fn run(global: GlobalArgs, command: Commands) -> ExitCode {
    let formatter = Formatter::new(OutputConfig {
        json: global.json,
        no_color: global.no_color,
        quiet: global.quiet,
        verbose: global.verbose,
    });

    let command = match command {
        Commands::Completions(args) => return commands::completions::execute(args, Cli::command()),
        Commands::Storage(command) => command,
    };

    let client = match build_client(&global) {
        Ok(client) => client,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return match e.downcast_ref::<bunny_storage::Error>() {
                Some(err) => ExitCode::from_error(err),
                None => ExitCode::UsageError,
            };
        }
    };

    // Ctrl-C stops retries and in-flight requests
    let cancel = client.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    commands::execute(command, &client, &formatter).await
}

fn init_logging(debug: bool) {
    let default = if debug {
        "warn,bunny_core=debug,bunny_storage=debug,bunnystoragectl=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(debug)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Resolve settings (flags and environment, then profile) into a client
fn build_client(global: &GlobalArgs) -> anyhow::Result<Client> {
    let profile = Profile::resolve(global.config.as_deref()).context("Failed to load settings")?;

    let storage_zone = non_empty(global.storage_zone.clone())
        .or(non_empty(profile.storage_zone))
        .context("storage zone is required (--storage-zone or BUNNY_STORAGE_ZONE)")?;
    let key = non_empty(global.key.clone())
        .or(non_empty(profile.key))
        .context("key is required (--key or BUNNY_KEY)")?;
    let read_only_key = non_empty(global.read_only_key.clone()).or(non_empty(profile.read_only_key));
    let endpoint = non_empty(global.endpoint.clone()).or(non_empty(profile.endpoint));
    let timeout = global.timeout.or(profile.timeout);

    let (endpoint, endpoint_url) = resolve_endpoint(endpoint.as_deref())?;

    let mut builder = Config::builder()
        .application(Application::new(
            APP_NAME,
            env!("CARGO_PKG_VERSION"),
            HOMEPAGE,
        ))
        .storage_zone(storage_zone)
        .key(key)
        .endpoint(endpoint)
        .debug(global.debug);

    if let Some(read_only_key) = read_only_key {
        builder = builder.read_only_key(read_only_key);
    }
    if let Some(url) = endpoint_url {
        builder = builder.endpoint_url(url);
    }
    if let Some(seconds) = timeout {
        builder = builder.timeout(Duration::from_secs(seconds));
    }

    let client = Client::new(builder.build()?)?;
    tracing::debug!(endpoint = %endpoint, "Resolved settings");
    Ok(client)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Map an endpoint URL onto a known region.
///
/// URLs that do not match a region exactly (custom host or port) are kept
/// as a base URL override.
fn resolve_endpoint(raw: Option<&str>) -> anyhow::Result<(Endpoint, Option<Url>)> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok((Endpoint::PRIMARY, None));
    };

    let url = Url::parse(raw).with_context(|| format!("invalid endpoint URL: '{raw}'"))?;
    let endpoint = Endpoint::parse(raw);
    let known = endpoint.url();

    if url.host_str() == known.host_str()
        && url.port_or_known_default() == known.port_or_known_default()
    {
        Ok((endpoint, None))
    } else {
        Ok((endpoint, Some(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::StorageCommand;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_aliases_and_globals() {
        let cli = Cli::try_parse_from([
            APP_NAME, "-z", "zone", "-k", "secret", "ls", "-p", "/testdata", "--json",
        ])
        .unwrap();

        assert_eq!(cli.global.storage_zone.as_deref(), Some("zone"));
        assert!(cli.global.json);
        match cli.command {
            Commands::Storage(StorageCommand::List(args)) => assert_eq!(args.path, "/testdata"),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            APP_NAME, "dl", "-f", "a.txt", "-o", "/tmp/a.txt", "-F", "-V",
        ])
        .unwrap();
        assert!(cli.global.verbose);
        match cli.command {
            Commands::Storage(StorageCommand::Download(args)) => {
                assert!(args.force);
                assert_eq!(args.path, "/");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_endpoint() {
        assert_eq!(resolve_endpoint(None).unwrap(), (Endpoint::PRIMARY, None));
        assert_eq!(
            resolve_endpoint(Some("https://ny.storage.bunnycdn.com")).unwrap(),
            (Endpoint::NewYork, None)
        );
        assert_eq!(
            resolve_endpoint(Some("https://uk.storage.bunnycdn.com/")).unwrap(),
            (Endpoint::London, None)
        );

        let (endpoint, url) = resolve_endpoint(Some("http://127.0.0.1:8080")).unwrap();
        assert_eq!(endpoint, Endpoint::PRIMARY);
        assert_eq!(url.unwrap().as_str(), "http://127.0.0.1:8080/");

        assert!(resolve_endpoint(Some("not a url")).is_err());
    }

    #[test]
    fn test_build_client_requires_zone_and_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");

        let cli = Cli::try_parse_from([
            APP_NAME,
            "--config",
            config.to_str().unwrap(),
            "-k",
            "secret",
            "ls",
        ])
        .unwrap();
        let global = GlobalArgs {
            storage_zone: None,
            ..cli.global
        };
        let err = build_client(&global).unwrap_err();
        assert!(err.to_string().contains("storage zone is required"));
    }

    #[test]
    fn test_build_client_fills_from_profile() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            "storage_zone = \"profile-zone\"\nkey = \"profile-key\"\ntimeout = 5\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([APP_NAME, "--config", config.to_str().unwrap(), "ls"])
            .unwrap();
        let global = GlobalArgs {
            storage_zone: None,
            key: None,
            read_only_key: None,
            endpoint: None,
            timeout: None,
            ..cli.global
        };

        let client = build_client(&global).unwrap();
        assert_eq!(client.config().storage_zone, "profile-zone");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(client.config().endpoint, Some(Endpoint::PRIMARY));
        assert!(
            client
                .config()
                .user_agent
                .as_deref()
                .is_some_and(|agent| agent.starts_with("bunnystoragectl/"))
        );
    }
}
