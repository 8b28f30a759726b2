use clap::{Parser, Subcommand};
use clientdesk::config::{ClientConfig, ConfigError};
use clientdesk::error::{ApiError, RefreshError, TransportError};
use clientdesk::handlers::notify_error;
use clientdesk::locale::Locale;
use clientdesk::router::{Location, Navigation};
use clientdesk::session::AuthToken;
use clientdesk::state::AppContext;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("http client: {0}")]
    Transport(#[from] TransportError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("refresh failed: {0}")]
    Refresh(#[from] RefreshError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "clientdesk", about = "Client management API CLI")]
struct Cli {
    /// Overrides `CLIENTDESK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    locale: Option<Locale>,

    #[arg(long, env = "CLIENTDESK_ACCESS_TOKEN")]
    access_token: Option<String>,

    #[arg(long, env = "CLIENTDESK_REFRESH_TOKEN")]
    refresh_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET an authenticated path and print the JSON body.
    Get { path: String },
    /// Exchange the refresh token for a new token pair.
    Refresh,
    /// Show where navigation to `path` would end up.
    Guard { path: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match cli.base_url.as_deref() {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env()?,
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    let ctx = AppContext::new(&config)?;
    if cli.access_token.is_some() || cli.refresh_token.is_some() {
        ctx.session.set_auth(AuthToken {
            access_token: cli.access_token.unwrap_or_default(),
            refresh_token: cli.refresh_token.unwrap_or_default(),
            expires_in: 0.0,
            authorities: Vec::new(),
        });
    }

    match cli.command {
        Command::Get { path } => run_get(&ctx, &path).await,
        Command::Refresh => run_refresh(&ctx).await,
        Command::Guard { path } => {
            run_guard(&ctx, &path);
            Ok(())
        }
    }
}

async fn run_get(ctx: &AppContext, path: &str) -> Result<(), CliError> {
    let response = match ctx.api.authenticated.get(path).await {
        Ok(response) => response,
        Err(err) => {
            let result = notify_error(err, &ctx.notifications);
            for note in ctx.notifications.messages() {
                eprintln!("{}", serde_json::to_string(&note)?);
            }
            return result.map_err(CliError::from);
        }
    };

    let rendered = match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => serde_json::to_string_pretty(&value)?,
        Err(_) => response.body,
    };
    println!("{rendered}");
    Ok(())
}

async fn run_refresh(ctx: &AppContext) -> Result<(), CliError> {
    let access_token = ctx.api.refresh().await?;
    let out = json!({
        "accessToken": access_token,
        "refreshToken": ctx.session.refresh_token(),
        "expiresIn": ctx.session.expires_in(),
        "authorities": ctx.session.authorities(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_guard(ctx: &AppContext, path: &str) {
    let location = Location::parse(path);
    let route = ctx
        .guard
        .routes()
        .resolve(&location.path)
        .and_then(|m| m.name().map(str::to_owned));
    match ctx.guard.before_each(&location) {
        Navigation::Proceed => println!("proceed {} ({})", location.full_path(), route.as_deref().unwrap_or("-")),
        nav @ Navigation::Redirect { .. } => {
            println!("redirect {}", nav.href().unwrap_or_default());
        }
    }
}
