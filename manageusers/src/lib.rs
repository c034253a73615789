//! HTTP middleware that manages an htpasswd file and an optional user
//! metadata file.
//!
//! The middleware answers on a single route prefix and passes every other
//! request to the next handler of the host router.
//!
//! # Example
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use manageusers::{ManageUsers, ManageUsersConfig, SignalReloader};
//!
//! let config = ManageUsersConfig::from_directive_args(["/manageusers", "./.htpasswd", "./users.json"]);
//! let app: Router = ManageUsers::new(config, SignalReloader)
//!     .attach(Router::new().route("/", get(|| async { "hello" })));
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod handler;
pub mod merge;
pub mod models;
pub mod reload;
pub mod userinfo;

pub use config::ManageUsersConfig;
pub use error::{Error, Result};
pub use handler::{manage_users, ManageUsers};
pub use merge::merge_users;
pub use models::user::{User, UserForm};
pub use models::user_info::{Claims, UserInfo};
pub use reload::{NoopReloader, ReloadNotifier, SignalReloader};
