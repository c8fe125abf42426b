use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use session_guard::config::ConfigError;
use session_guard::router::routes::RouterError;
use session_guard::{ApiClient, ApiError, AuthError, AuthStore, ClientConfig, FileStorage, RequestOptions, Router};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Router(#[from] RouterError),
    #[error("not logged in; run `auth-cli login` first")]
    NotLoggedIn,
    #[error("missing permission `{0}`")]
    MissingPermission(String),
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid header `{0}`; expected NAME:VALUE")]
    InvalidHeader(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "auth-cli", about = "Session, permission and guarded-navigation client for the auth API")]
struct Cli {
    /// API origin. Falls back to the built-in default when unset.
    #[arg(long, env = "AUTH_API_BASE_URL")]
    base_url: Option<String>,

    /// File the session token is persisted to.
    #[arg(long, env = "AUTH_TOKEN_FILE", default_value = ".session-guard.json")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value_t = false)]
        remember_me: bool,
    },
    /// Forget the persisted session.
    Logout,
    /// Print the current user profile.
    Me,
    /// Check whether the current session holds a permission.
    Can { permission: String },
    /// Run the navigation guard for a path and print where it lands.
    Navigate { path: String },
    /// Send an arbitrary API request with the session token attached.
    Request {
        path: String,
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        #[arg(long)]
        data: Option<String>,
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
}

/// Environment config with the `--base-url` flag layered on top.
fn client_config(base_url: Option<String>) -> Result<ClientConfig, CliError> {
    let config = ClientConfig::from_env()?;
    Ok(match base_url {
        Some(base_url) => config.with_base_url(base_url),
        None => config,
    })
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = client_config(cli.base_url)?;

    let api = ApiClient::new(&config)?;
    tracing::debug!(base_url = %config.base_url, token_file = %cli.token_file.display(), "session store ready");
    let mut store = AuthStore::new(api, Box::new(FileStorage::new(cli.token_file)));

    match cli.command {
        Command::Login { email, password, remember_me } => run_login(&mut store, &email, &password, remember_me).await,
        Command::Logout => {
            store.logout();
            println!("logged out");
            Ok(())
        }
        Command::Me => run_me(&mut store).await,
        Command::Can { permission } => run_can(&mut store, &permission).await,
        Command::Navigate { path } => run_navigate(&mut store, &path).await,
        Command::Request { path, method, data, headers } => run_request(&store, &path, &method, data, &headers).await,
    }
}

async fn run_login(store: &mut AuthStore, email: &str, password: &str, remember_me: bool) -> Result<(), CliError> {
    let session = store.login(email, password, remember_me).await?;
    let user = serde_json::to_value(&session.user)?;
    print_json(&user)
}

async fn run_me(store: &mut AuthStore) -> Result<(), CliError> {
    store.fetch_me().await;
    let user = store.user().ok_or(CliError::NotLoggedIn)?;
    print_json(&serde_json::to_value(user)?)
}

async fn run_can(store: &mut AuthStore, permission: &str) -> Result<(), CliError> {
    store.fetch_me().await;
    if !store.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    if !store.has_perm(permission) {
        return Err(CliError::MissingPermission(permission.to_owned()));
    }
    println!("yes");
    Ok(())
}

async fn run_navigate(store: &mut AuthStore, path: &str) -> Result<(), CliError> {
    let router: Router = Router::default();
    let route = router.navigate(store, path).await?;
    println!("{} ({:?})", route.path, route.component);
    Ok(())
}

async fn run_request(
    store: &AuthStore,
    path: &str,
    method: &str,
    data: Option<String>,
    headers: &[String],
) -> Result<(), CliError> {
    let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| CliError::InvalidMethod(method.to_owned()))?;

    let mut options = RequestOptions::get().method(method);
    for raw in headers {
        let (name, value) = raw.split_once(':').ok_or_else(|| CliError::InvalidHeader(raw.clone()))?;
        options = options.header(name.trim(), value.trim());
    }
    if let Some(data) = data {
        options = options.json(serde_json::from_str::<Value>(&data)?);
    }

    let json = store.request(path, options).await?;
    print_json(&json)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
