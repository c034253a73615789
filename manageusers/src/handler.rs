//! The user management middleware.
//!
//! Requests whose path starts with the configured route are answered here:
//! - `GET` lists users
//! - `POST` adds a user or changes its password and metadata
//! - `DELETE <route>/<username>` removes a user
//!
//! Every other request is passed on to the next handler. Paths are
//! percent-decoded and cleaned before they are compared with the route.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::sync::watch;
use tokio::task::JoinError;

use crate::config::ManageUsersConfig;
use crate::credentials;
use crate::error::{Error, Result};
use crate::merge::merge_users;
use crate::models::user::{User, UserForm};
use crate::models::user_info::UserInfo;
use crate::reload::ReloadNotifier;
use crate::userinfo;

/// Upper bound on the size of a create-or-update body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Handler state: the current configuration and the reload hook.
pub struct ManageUsers {
    config: watch::Receiver<ManageUsersConfig>,
    notifier: Arc<dyn ReloadNotifier>,
}

impl ManageUsers {
    /// A handler with a fixed configuration.
    pub fn new(config: ManageUsersConfig, notifier: impl ReloadNotifier + 'static) -> Self {
        let (_, config) = watch::channel(config);
        Self::with_config_updates(config, notifier)
    }

    /// A handler that serves whatever configuration was last sent on the
    /// channel. Requests already in flight finish with the one they started with.
    pub fn with_config_updates(
        config: watch::Receiver<ManageUsersConfig>,
        notifier: impl ReloadNotifier + 'static,
    ) -> Self {
        Self {
            config,
            notifier: Arc::new(notifier),
        }
    }

    /// Install the middleware around every route and the fallback of `router`.
    pub fn attach<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(Arc::new(self), manage_users))
    }

    fn current_config(&self) -> ManageUsersConfig {
        self.config.borrow().clone()
    }

    async fn handle(
        &self,
        config: ManageUsersConfig,
        method: Method,
        path: &str,
        body: Body,
    ) -> Response {
        match method {
            Method::GET => self.list(config).await,
            Method::POST => self.create_or_update(config, body).await,
            Method::DELETE => self.delete(config, last_path_segment(path)).await,
            _ => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response(),
        }
    }

    /// GET - every user in the password file, enriched with metadata when configured.
    async fn list(&self, config: ManageUsersConfig) -> Response {
        let result = tokio::task::spawn_blocking(move || collect_users(&config)).await;

        match joined(result) {
            Ok(users) => Json(users).into_response(),
            Err(e) => {
                tracing::warn!("Failed to read password file: {}", e);
                (StatusCode::BAD_REQUEST, "password file unreadable").into_response()
            }
        }
    }

    /// POST - set the password and, when configured, the metadata of a user.
    async fn create_or_update(&self, config: ManageUsersConfig, body: Body) -> Response {
        let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };
        let form: UserForm = match serde_json::from_slice(&bytes) {
            Ok(form) => form,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };

        let username = form.username.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<()> {
            credentials::set_password(&config.htpasswd_file, &form.username, &form.password)?;
            if let Some(ref path) = config.user_info_file {
                userinfo::upsert_user_info(path, UserInfo::from(&form))?;
            }
            Ok(())
        })
        .await;

        match joined(result) {
            Ok(()) => {
                tracing::info!(username = %username, "User added or altered");
                self.notifier.notify_reload();
                (StatusCode::OK, format!("User {} added or altered", username)).into_response()
            }
            Err(e) => {
                tracing::warn!(username = %username, "Failed to add or alter user: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Error adding or altering user {}", username),
                )
                    .into_response()
            }
        }
    }

    /// DELETE - drop a user from the password file and the metadata file.
    ///
    /// The password file is handled on one extra task while this one takes
    /// care of the metadata; both must succeed. Nothing is rolled back.
    async fn delete(&self, config: ManageUsersConfig, username: &str) -> Response {
        let target = username.to_string();
        let htpasswd_file = config.htpasswd_file;
        let credentials = tokio::task::spawn_blocking(move || {
            credentials::remove_user(&htpasswd_file, &target)
        });

        // Runs on this task, overlapped with the credential removal.
        let metadata = match config.user_info_file {
            Some(ref path) => userinfo::remove_user_info(path, username),
            None => Ok(()),
        };
        let credentials = joined(credentials.await);

        match (credentials, metadata) {
            (Ok(()), Ok(())) => {
                tracing::info!(username = %username, "User deleted");
                self.notifier.notify_reload();
                (StatusCode::OK, format!("User {} deleted", username)).into_response()
            }
            (credentials, metadata) => {
                if let Err(e) = credentials {
                    tracing::warn!(username = %username, "Failed to remove credentials: {}", e);
                }
                if let Err(e) = metadata {
                    tracing::warn!(username = %username, "Failed to remove user info: {}", e);
                }
                (StatusCode::BAD_REQUEST, format!("Error deleting user {}", username))
                    .into_response()
            }
        }
    }
}

/// Middleware entry point; see [`ManageUsers::attach`].
pub async fn manage_users(
    State(handler): State<Arc<ManageUsers>>,
    request: Request,
    next: Next,
) -> Response {
    let config = handler.current_config();
    let path = request_path(request.uri().path());
    if !route_matches(&config.route, &path) {
        tracing::debug!(path = %request.uri().path(), "Passing request through");
        return next.run(request).await;
    }

    let method = request.method().clone();
    handler.handle(config, method, &path, request.into_body()).await
}

/// Users from the password file, with metadata merged in when configured.
fn collect_users(config: &ManageUsersConfig) -> Result<BTreeMap<String, User>> {
    let mut users: BTreeMap<String, User> = credentials::list_users(&config.htpasswd_file)?
        .into_iter()
        .map(|username| {
            let user = User::bare(&username);
            (username, user)
        })
        .collect();

    if let Some(ref path) = config.user_info_file {
        match userinfo::read_user_infos(path) {
            Ok(infos) => {
                if let Err(e) = merge_users(&mut users, &infos) {
                    tracing::debug!("Skipping user info merge: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Listing users without metadata: {}", e);
            }
        }
    }

    Ok(users)
}

fn joined<T>(result: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("Blocking task failed: {}", e);
        Err(Error::TaskFailed(e.to_string()))
    })
}

/// Whether the cleaned `path` falls under `route`; `""` and `"/"` cover everything.
fn route_matches(route: &str, path: &str) -> bool {
    if route.is_empty() || route == "/" {
        return true;
    }
    path.starts_with(clean_path(route).as_str())
}

/// Percent-decoded, cleaned form of a request path.
///
/// A path that does not decode to UTF-8 is cleaned as is.
fn request_path(raw: &str) -> String {
    let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
    clean_path(&decoded)
}

/// Lexically clean a URL path: collapse repeated slashes, drop `.` segments
/// and resolve `..` against the previous segment. The result is rooted and
/// keeps a trailing slash when the input had one.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let mut cleaned = format!("/{}", segments.join("/"));
    if path.ends_with('/') && cleaned != "/" {
        cleaned.push('/');
    }
    cleaned
}

/// Last non-empty segment of a URL path.
fn last_path_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_prefix_matching() {
        let matches = |path: &str| route_matches("/manageusers", &request_path(path));
        assert!(matches("/manageusers"));
        assert!(matches("/manageusers/tester"));
        assert!(matches("/manageusersfoo"));
        assert!(!matches("/"));
        assert!(!matches("/index.html"));
        assert!(!matches("/ManageUsers"));
    }

    #[test]
    fn test_traversal_leaves_the_route() {
        let matches = |path: &str| route_matches("/manageusers", &request_path(path));
        assert!(!matches("/manageusers/../index.html"));
        assert!(!matches("/manageusers/%2e%2e/index.html"));
        assert!(matches("//manageusers"));
        assert!(matches("/site/../manageusers/tester"));
        assert!(matches("/./manageusers"));
    }

    #[test]
    fn test_route_is_cleaned_too() {
        assert!(route_matches("/manageusers/", "/manageusers/"));
        assert!(route_matches("manageusers", "/manageusers"));
        assert!(!route_matches("/manageusers/", "/manageusers"));
    }

    #[test]
    fn test_root_route_matches_everything() {
        assert!(route_matches("/", "/anything"));
        assert!(route_matches("", "/anything"));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("//a//b"), "/a/b");
        assert_eq!(clean_path("/a/./b/"), "/a/b/");
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/../../a"), "/a");
        assert_eq!(clean_path("/a/.."), "/");
        assert_eq!(clean_path("/a/../"), "/");
    }

    #[test]
    fn test_request_path_decodes() {
        assert_eq!(request_path("/manageusers/john%20doe"), "/manageusers/john doe");
        assert_eq!(request_path("/manageusers/caf%C3%A9"), "/manageusers/café");
        // Not UTF-8 once decoded.
        assert_eq!(request_path("/manageusers/%FF"), "/manageusers/%FF");
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(last_path_segment("/manageusers/tester"), "tester");
        assert_eq!(last_path_segment("/manageusers/tester/"), "tester");
        assert_eq!(last_path_segment("/a/b/c"), "c");
        assert_eq!(last_path_segment("/manageusers"), "manageusers");
        assert_eq!(last_path_segment("/"), "");
    }
}
