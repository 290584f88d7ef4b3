//! `consentctl` entry-point: loads settings, wires the REST adapters and runs
//! one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Report, Result, eyre};
use consent_client::ClientSettings;
use consent_client::domain::ports::ConsentStore;
use consent_client::domain::{AccessToken, ConsentService, DirectoryService};
use consent_client::inbound::cli::{Cli, CliContext, render_error, run};
use consent_client::outbound::http::MarketplaceHttpClient;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("consentctl")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;

    let base_url = match cli.api_base_url.as_deref() {
        Some(raw) => Url::parse(raw).wrap_err_with(|| format!("invalid --api-base-url `{raw}`"))?,
        None => settings.api_base_url()?,
    };
    let timeout = cli
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map_or_else(|| settings.request_timeout(), Duration::from_secs);
    let token = cli
        .token
        .clone()
        .and_then(AccessToken::new)
        .or_else(|| settings.access_token());

    let client = Arc::new(
        MarketplaceHttpClient::new(base_url, timeout).wrap_err("failed to build http client")?,
    );
    let store: Arc<dyn ConsentStore> = client.clone();
    let context = CliContext::new(
        ConsentService::new(store),
        DirectoryService::new(client.clone(), client.clone(), client),
        token,
        settings.poll_interval(),
        Arc::new(DefaultClock),
    );

    let mut stdout = io::stdout().lock();
    if let Err(error) = run(cli.command, &context, &mut stdout).await {
        render_error(&mut io::stderr().lock(), &error).wrap_err("failed to report error")?;
        return Err(Report::new(error).wrap_err("command failed"));
    }
    Ok(())
}
