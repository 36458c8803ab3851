//! Command implementations.

use anyhow::{Context as _, Result, bail};
use bastion_application::AuthService;
use bastion_domain::{HttpMethod, LoginCredentials, RequestOptions};
use bastion_infrastructure::{ClientConfig, ReqwestTransport, connect};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};

type Service = AuthService<ReqwestTransport>;

/// Loads the configuration, restores the session and runs the command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::load(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;
    debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "configuration loaded");

    let auth = connect(&config).context("failed to set up the client")?;
    auth.initialize()
        .await
        .context("failed to read the stored session")?;

    match cli.command {
        Command::Login { email, password } => login(&auth, email, password).await,
        Command::Logout => logout(&auth).await,
        Command::Whoami => whoami(&auth).await,
        Command::Status => status(&auth).await,
        Command::Request {
            method,
            path,
            data,
            headers,
        } => request(&auth, method, &path, data.as_deref(), headers).await,
    }
}

async fn login(auth: &Service, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("failed to read password")?,
    };

    let user = auth.login(&LoginCredentials::new(email, password)).await?;
    println!("Logged in as {} ({})", user.display_name(), user.role);
    Ok(())
}

async fn logout(auth: &Service) -> Result<()> {
    if !auth.is_authenticated().await {
        println!("Not logged in");
        return Ok(());
    }
    auth.logout().await?;
    println!("Logged out");
    Ok(())
}

async fn whoami(auth: &Service) -> Result<()> {
    if !auth.is_authenticated().await {
        bail!("not logged in; run `bastion login` first");
    }
    let user = auth.fetch_current_user().await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn status(auth: &Service) -> Result<()> {
    if !auth.is_authenticated().await {
        println!("Not logged in");
        return Ok(());
    }

    match auth.current_user().await {
        Some(user) => {
            println!("Logged in as {} <{}>", user.display_name(), user.email);
            println!("Role: {}", user.role);
            if !user.permissions.is_empty() {
                println!("Permissions: {}", user.permissions.join(", "));
            }
        }
        None => println!("Logged in"),
    }
    Ok(())
}

async fn request(
    auth: &Service,
    method: HttpMethod,
    path: &str,
    data: Option<&str>,
    headers: Vec<(String, String)>,
) -> Result<()> {
    let body = request_body(method, data)?;

    let options = headers
        .into_iter()
        .fold(RequestOptions::new(), |options, (name, value)| {
            options.header(name, value)
        });

    let payload: Value = auth
        .client()
        .send(method, path, body.as_ref(), &options)
        .await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Parses `--data`, refusing it for methods that carry no body.
fn request_body(method: HttpMethod, data: Option<&str>) -> Result<Option<Value>> {
    let Some(data) = data else {
        return Ok(None);
    };
    if !method.has_body() {
        bail!("--data cannot be used with {method}");
    }
    serde_json::from_str(data)
        .map(Some)
        .context("--data is not valid JSON")
}
