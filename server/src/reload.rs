//! Configuration reload on SIGUSR1.
//!
//! The middleware signals the process after every user change; the listener
//! re-reads the configuration and hands the middleware section to the
//! running handler.

use config::ConfigError;
use manageusers::ManageUsersConfig;
use tokio::sync::watch;

use crate::config::Config;

/// Load the configuration again and publish its middleware section.
///
/// On failure the running configuration is kept.
pub fn reload_config(args: &[String], updates: &watch::Sender<ManageUsersConfig>) -> bool {
    apply(Config::load(args), updates)
}

fn apply(
    loaded: Result<Config, ConfigError>,
    updates: &watch::Sender<ManageUsersConfig>,
) -> bool {
    match loaded {
        Ok(config) => {
            let previous = updates.send_replace(config.manage_users);
            let current = updates.borrow();
            if *current == previous {
                tracing::info!("Configuration reloaded, unchanged");
            } else {
                tracing::info!(
                    route = %current.route,
                    htpasswd_file = %current.htpasswd_file.display(),
                    user_info_file = ?current.user_info_file,
                    "Configuration reloaded"
                );
            }
            true
        }
        Err(e) => {
            tracing::error!("Failed to reload configuration: {}", e);
            false
        }
    }
}

/// Re-read the configuration each time SIGUSR1 is received.
#[cfg(unix)]
pub fn spawn_listener(
    args: Vec<String>,
    updates: watch::Sender<ManageUsersConfig>,
) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut reloads = signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while reloads.recv().await.is_some() {
            tracing::info!("Reloading configuration");
            reload_config(&args, &updates);
        }
    });
    Ok(())
}
