//! Standalone server: serves a site with the user management middleware in front.
//!
//! Usage: `manageusers-server [route] [htpasswd file] [user info file]`

use std::env;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod config;
mod health;
mod reload;

use crate::config::Config;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("manageusers-server {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    let config = Config::load(&args).map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml and MANAGEUSERS__* environment variables.",
            e
        )
    })?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        route = %config.manage_users.route,
        htpasswd_file = %config.manage_users.htpasswd_file.display(),
        user_info_file = ?config.manage_users.user_info_file,
        "Starting manageusers-server {}",
        VERSION
    );

    let (updates, manage_users) = watch::channel(config.manage_users.clone());

    // Must be in place before the first SIGUSR1 arrives.
    #[cfg(unix)]
    reload::spawn_listener(args, updates)?;
    #[cfg(not(unix))]
    drop(updates);

    let app = app::build_router(&config, manage_users);

    let addr = config.listen_addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
