//! One-shot commands that run without the terminal UI.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use opsdeck_core::auth::token_store_for;
use opsdeck_core::{ApiClient, Config, SessionStore};

use crate::host::{StderrNavigator, StderrNotifier};

const USAGE: &str = "\
Usage: opsdeck [COMMAND]

Commands:
  (none)            Start the terminal UI
  login [USERNAME]  Sign in and store the access token
  logout            Forget the stored access token
  whoami            Show the signed-in user
  status            Check backend reachability and session state
  help              Show this message

Environment:
  OPSDECK_API_URL   Backend base URL (default http://localhost:8000/api)
  OPSDECK_USERNAME  Username for login
  OPSDECK_PASSWORD  Password for login
  RUST_LOG          Log filter (default warn)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<String>),
    Logout,
    Whoami,
    Status,
    Help,
}

impl Command {
    /// Parse arguments, excluding the program name. `None` means no
    /// command was given and the terminal UI should start.
    pub fn parse(args: &[String]) -> Result<Option<Self>> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None => return Ok(None),
            Some("login") => Command::Login(args.next().map(str::to_string)),
            Some("logout") => Command::Logout,
            Some("whoami") => Command::Whoami,
            Some("status") => Command::Status,
            Some("help" | "-h" | "--help") => Command::Help,
            Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
        };
        if let Some(extra) = args.next() {
            bail!("Unexpected argument '{}'\n\n{}", extra, USAGE);
        }
        Ok(Some(command))
    }
}

fn restore_session(config: &Config) -> Result<SessionStore> {
    let storage = token_store_for(config)?;
    let api = ApiClient::new(
        config,
        storage.clone(),
        Arc::new(StderrNotifier),
        Arc::new(StderrNavigator),
    )?;
    Ok(SessionStore::restore(api, storage))
}

pub async fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Login(username) => login(&mut config, username).await?,
        Command::Logout => {
            restore_session(&config)?.logout();
            println!("Logged out.");
        }
        Command::Whoami => whoami(&config).await?,
        Command::Status => status(&config).await?,
    }
    Ok(())
}

async fn login(config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username
        .or_else(|| std::env::var("OPSDECK_USERNAME").ok())
        .or_else(|| config.last_username.clone())
    {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => prompt_username()?,
    };
    let password = match std::env::var("OPSDECK_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?,
    };

    let session = restore_session(config)?;
    if !session.login(&username, &password).await {
        bail!("Login failed");
    }
    if !session.is_authenticated() {
        bail!("Login failed: could not load the user profile");
    }

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
    }

    let name = session
        .user()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();
    println!("Logged in as {}.", name);
    Ok(())
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim().to_string();
    if username.is_empty() {
        bail!("Username required");
    }
    Ok(username)
}

async fn whoami(config: &Config) -> Result<()> {
    let session = restore_session(config)?;
    if !session.wait_ready().await {
        bail!("Not logged in");
    }
    match session.user() {
        Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
        None => bail!("Not logged in"),
    }
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let session = restore_session(config)?;
    println!("Backend: {}", session.api().base_url());

    match session.api().health().await {
        Ok(health) if health.is_healthy() => println!("Health:  healthy"),
        Ok(health) => println!("Health:  {}", health.status),
        Err(e) => println!("Health:  unreachable ({})", e),
    }

    if session.wait_ready().await {
        let name = session
            .user()
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        println!("Session: signed in as {}", name);
    } else {
        println!("Session: not signed in");
    }
    Ok(())
}
