//! Start command - launches the webca server.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use webca_config::WebcaConfig;
use webca_server::{Server, ServerConfig, UserAccount};
use webca_session::{LoggedUser, SessionConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log every session in as a fixed development user
    #[arg(long)]
    pub faked_login: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let loaded = webca_config::load_config(ctx.config_path.as_deref())
        .context("Failed to load configuration")?;

    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    for path in loaded.loaded_from() {
        info!(path = %path.display(), "Loaded config");
    }

    let config = server_config(&loaded.config, &args)?;

    if config.faked_login {
        warn!("Faked login enabled: every session is logged in as a development user");
    }
    if config.users.is_empty() && !config.faked_login {
        warn!("No [[users]] configured: nobody can log in");
    }

    // ── Serve ───────────────────────────────────────────────────────────

    info!(
        address = %config.bind_address,
        max_age_secs = config.session.max_age.as_secs(),
        users = config.users.len(),
        "Starting webca"
    );

    Server::new(config)
        .run_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Merge the loaded file config with CLI overrides.
fn server_config(file: &WebcaConfig, args: &StartArgs) -> Result<ServerConfig> {
    let mut server = file.server();
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(ref bind) = args.bind {
        server.bind = bind.clone();
    }
    let bind_address: SocketAddr = server.socket_addr()?;

    let session = file.session();
    let session = SessionConfig::new()
        .with_max_age(session.max_age())
        .with_cleanup_interval(session.cleanup_interval())
        .with_cookie_name(session.cookie_name);

    let mut config = ServerConfig::new()
        .with_bind_address(bind_address)
        .with_session(session)
        .with_faked_login(server.faked_login || args.faked_login)
        .with_request_logging(server.request_logging);

    for user in &file.users {
        config = config.with_user(UserAccount::new(
            LoggedUser::new(&user.username, &user.full_name, &user.email),
            &user.password_sha256,
        ));
    }

    Ok(config)
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
