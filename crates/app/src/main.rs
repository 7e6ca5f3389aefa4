//! AgriSky client - command line entry point.
//!
//! Logging: set `RUST_LOG=agrisky=debug` to see gateway events on stderr.

mod cli;

use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use agrisky_application::{
    Gateway, GatewayError, ListTasks, Login, Logout, RefreshSession, RequestOptions, SessionState,
};
use agrisky_domain::{Credentials, token_preview};
use agrisky_infrastructure::{
    ClientConfig, FileSessionStorage, LoginNavigator, ReqwestTransport, TracingNotifier,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agrisky=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let bypass_error = cli.bypass_error;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !was_notified(&err, bypass_error) {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Whether the gateway already showed this error to the user.
fn was_notified(err: &anyhow::Error, bypass_error: bool) -> bool {
    if bypass_error {
        return false;
    }
    err.downcast_ref::<GatewayError>().is_some_and(|e| {
        !matches!(
            e,
            GatewayError::Storage(_) | GatewayError::Encode(_) | GatewayError::Cancelled
        )
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let session_file = config.session_file()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api_base_url,
        session = %session_file.display(),
        "starting AgriSky client"
    );

    let storage = Arc::new(FileSessionStorage::new(&session_file));
    let session = Arc::new(
        SessionState::load(storage)
            .await
            .with_context(|| format!("reading session from {}", session_file.display()))?,
    );
    let transport = Arc::new(ReqwestTransport::from_config(&config)?);
    let gateway = Arc::new(
        Gateway::new(
            transport,
            session,
            Arc::new(TracingNotifier::new()),
            Arc::new(LoginNavigator::new()),
        )
        .with_coalesced_refresh(config.coalesce_refresh),
    );

    let options = || {
        if cli.bypass_error {
            RequestOptions::bypassing_errors()
        } else {
            RequestOptions::new()
        }
    };

    match cli.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let credentials = Credentials::new(username, password)?;
            Login::new(gateway).execute(&credentials).await?;
            info!(username = %credentials.username, "session stored");
            println!("Logged in as {}", credentials.username);
        }
        Command::Logout => {
            Logout::new(gateway).execute().await?;
            println!("Logged out");
        }
        Command::Refresh => {
            let token = RefreshSession::new(gateway).execute().await?;
            println!("Access token renewed ({})", token_preview(&token.access_token));
        }
        Command::Status => {
            let session = gateway.session();
            println!("api:      {}", config.api_base_url);
            println!("session:  {}", session_file.display());
            match session.current_access_token().await {
                Some(token) => println!("access:   {}", token_preview(&token)),
                None => println!("access:   (none)"),
            }
            match session.current_refresh_token().await {
                Some(token) => println!("refresh:  {}", token_preview(&token)),
                None => println!("refresh:  (none)"),
            }
        }
        Command::Tasks => {
            let tasks = ListTasks::new(gateway).execute(options()).await?;
            debug!(count = tasks.len(), "tasks loaded");
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                let kind = task.kind.map_or_else(String::new, |k| k.to_string());
                let label = task.name.or(task.description).unwrap_or_default();
                println!("{:>6}  {:<8}  {:<9}  {label}", task.id, task.status, kind);
            }
        }
        Command::Get { path } => {
            let payload: Value = gateway.get(&path, options()).await?;
            print_json(&payload)?;
        }
        Command::Post { path, body } => {
            let body = parse_body(&body)?;
            let payload: Value = gateway.post(&path, &body, options()).await?;
            print_json(&payload)?;
        }
        Command::Put { path, body } => {
            let body = parse_body(&body)?;
            let payload: Value = gateway.put(&path, &body, options()).await?;
            print_json(&payload)?;
        }
        Command::Delete { path } => {
            let payload: Value = gateway.delete(&path, options()).await?;
            print_json(&payload)?;
        }
    }

    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    eprint!("password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_body(body: &str) -> anyhow::Result<Value> {
    serde_json::from_str(body).context("--body is not valid JSON")
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
