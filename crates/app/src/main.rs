//! Unilogin - Main Entry Point
//!
//! Runs one social login from the terminal: the authorization URL is
//! printed, the user pastes back the redirect URL, and the normalized
//! login result is written to stdout as JSON.

mod console;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use unilogin_application::{ApplicationContext, HostContext, LoginCoordinator};
use unilogin_domain::{CallbackEvent, LoginResult, ProviderType};
use unilogin_infrastructure::{
    LoginSettings, OAuthSessionFactory, ReqwestIdentityClient, SdkBootstrapper, spec,
};
use url::Url;

use crate::console::ConsoleLauncher;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Social login from the command line
#[derive(Parser)]
#[command(name = "unilogin", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported providers and whether they are configured
    Providers,

    /// Sign in with a provider
    Login {
        /// Provider id, e.g. `github` or `kakao`
        provider: ProviderType,

        /// Seconds to wait for the provider after the redirect is pasted
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the result.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Providers => list_providers(cli.config),
        Commands::Login { provider, timeout } => {
            login(cli.config, provider, Duration::from_secs(timeout)).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn list_providers(config: Option<PathBuf>) -> CliResult<()> {
    let settings = LoginSettings::load(config.as_deref())?;
    let configured: Vec<ProviderType> = settings
        .providers()?
        .into_iter()
        .map(|(provider, _)| provider)
        .collect();

    for provider in ProviderType::ALL {
        let marker = if configured.contains(&provider) { "*" } else { " " };
        println!(
            "{marker} {:<11} {:<12} {:>6}  {}",
            provider.as_str(),
            provider.display_name(),
            provider.request_code(),
            spec(provider).authorization_endpoint
        );
    }
    Ok(())
}

async fn login(config: Option<PathBuf>, provider: ProviderType, timeout: Duration) -> CliResult<()> {
    let settings = LoginSettings::load(config.as_deref())?;
    let client = ReqwestIdentityClient::new(&settings.http)?;

    let mut coordinator = LoginCoordinator::new(
        Arc::new(OAuthSessionFactory::new(Arc::new(client))),
        Arc::new(SdkBootstrapper::new()),
    );
    coordinator.init(ApplicationContext::new(settings.application_id.clone()));
    for (configured, provider_config) in settings.providers()? {
        coordinator.set_config(configured, provider_config)?;
    }

    let host = HostContext::new("console", Arc::new(ConsoleLauncher::stderr()));
    coordinator.initialize_sessions(&host)?;
    coordinator.on_result(
        Arc::new(|result: &LoginResult| {
            info!(provider = %result.provider, success = result.success, "login finished");
        }),
        None,
    )?;
    let mut results = coordinator.observe_results(None)?;

    coordinator.login(provider)?;
    eprintln!("Paste the URL the provider redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let event = CallbackEvent::from_redirect_url(&Url::parse(line.trim())?)?;

    let outcome = coordinator.dispatch_callback(&event);
    if !outcome.is_claimed() {
        warn!(request_code = event.request_code, "redirect matched no session");
        return Err(format!("no {provider} login is waiting for this redirect").into());
    }

    let result = tokio::time::timeout(timeout, results.next())
        .await
        .map_err(|_| format!("no result from {provider} within {}s", timeout.as_secs()))?
        .ok_or("result stream closed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    coordinator.release_host();
    host.tear_down();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_login_parses_provider_and_global_config() {
        let cli = Cli::try_parse_from(["unilogin", "login", "Kakao", "--config", "u.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("u.toml")));
        match cli.command {
            Commands::Login { provider, timeout } => {
                assert_eq!(provider, ProviderType::Kakao);
                assert_eq!(timeout, 60);
            }
            Commands::Providers => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["unilogin", "login", "myspace"]).is_err());
    }
}
