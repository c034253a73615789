use serde::{Deserialize, Serialize};

/// A user as returned by the list endpoint.
///
/// Built from a credential entry and, when available, the matching metadata
/// record. `password` is always empty on the way out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub origin: String,
    pub role: String,
    pub name: String,
    pub surname: String,
}

impl User {
    /// View record for a credential entry with no metadata attached.
    pub fn bare(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// Body of a create-or-update request.
#[derive(Clone, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl std::fmt::Debug for UserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("origin", &self.origin)
            .field("role", &self.role)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_username_and_password() {
        let missing_password = r#"{"username": "alice", "role": "admin"}"#;
        assert!(serde_json::from_str::<UserForm>(missing_password).is_err());

        let missing_username = r#"{"password": "secret"}"#;
        assert!(serde_json::from_str::<UserForm>(missing_username).is_err());
    }

    #[test]
    fn test_form_optional_fields_default_to_empty() {
        let json = r#"{"username": "alice", "password": "secret", "role": "admin"}"#;
        let form: UserForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.username, "alice");
        assert_eq!(form.role, "admin");
        assert!(form.origin.is_empty());
        assert!(form.name.is_empty());
        assert!(form.surname.is_empty());
    }

    #[test]
    fn test_form_debug_hides_password() {
        let json = r#"{"username": "alice", "password": "hunter2"}"#;
        let form: UserForm = serde_json::from_str(json).unwrap();
        let printed = format!("{:?}", form);
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_bare_user_serialization() {
        let json = serde_json::to_string(&User::bare("bob")).unwrap();
        assert_eq!(
            json,
            r#"{"username":"bob","password":"","origin":"","role":"","name":"","surname":""}"#
        );
    }
}
