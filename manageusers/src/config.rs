//! Middleware configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the user management middleware.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManageUsersConfig {
    /// Path prefix the middleware answers on.
    #[serde(default = "default_route")]
    pub route: String,
    /// The htpasswd file holding the credentials.
    #[serde(default = "default_htpasswd_file")]
    pub htpasswd_file: PathBuf,
    /// Optional JSON file with per-user metadata.
    #[serde(default)]
    pub user_info_file: Option<PathBuf>,
}

impl Default for ManageUsersConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            htpasswd_file: default_htpasswd_file(),
            user_info_file: None,
        }
    }
}

// Default values
fn default_route() -> String {
    "/manageusers".to_string()
}
fn default_htpasswd_file() -> PathBuf {
    PathBuf::from("./.htpasswd")
}

impl ManageUsersConfig {
    /// Build a configuration from positional directive arguments.
    ///
    /// Up to three values are read in order: route, htpasswd file, user info
    /// file. Missing values keep their defaults and extra values are ignored.
    /// An empty user info path means no metadata file.
    pub fn from_directive_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        config.apply_directive_args(args);
        config
    }

    /// Override this configuration with positional directive arguments.
    pub fn apply_directive_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        if let Some(route) = args.next() {
            self.route = route.as_ref().to_string();
        }
        if let Some(file) = args.next() {
            self.htpasswd_file = PathBuf::from(file.as_ref());
        }
        if let Some(file) = args.next() {
            let file = file.as_ref();
            self.user_info_file = (!file.is_empty()).then(|| PathBuf::from(file));
        }
    }
}
