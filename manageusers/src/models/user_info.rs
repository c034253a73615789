use serde::{Deserialize, Serialize};

use super::user::UserForm;

/// Per-user metadata persisted in the user info file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject identifier, i.e. the username.
    #[serde(default)]
    pub sub: String,
    /// Where the user authenticates from (e.g. "htpasswd").
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub claims: Claims,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl From<&UserForm> for UserInfo {
    fn from(form: &UserForm) -> Self {
        Self {
            sub: form.username.clone(),
            origin: form.origin.clone(),
            claims: Claims {
                role: form.role.clone(),
                name: form.name.clone(),
                surname: form.surname.clone(),
            },
        }
    }
}
