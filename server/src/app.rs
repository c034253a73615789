//! Router assembly.

use axum::Router;
use manageusers::{ManageUsers, ManageUsersConfig, NoopReloader, SignalReloader};
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::health;

/// Build the site router with the user management middleware in front of it.
///
/// The middleware follows `manage_users`, so reloads take effect without a restart.
pub fn build_router(config: &Config, manage_users: watch::Receiver<ManageUsersConfig>) -> Router {
    let site = match config.site.root {
        Some(ref root) => health::router().fallback_service(ServeDir::new(root)),
        None => health::router(),
    };

    let app = if config.server.reload_signal {
        ManageUsers::with_config_updates(manage_users, SignalReloader).attach(site)
    } else {
        ManageUsers::with_config_updates(manage_users, NoopReloader).attach(site)
    };

    app.layer(TraceLayer::new_for_http())
}
