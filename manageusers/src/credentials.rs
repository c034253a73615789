//! Credential file access on top of `htauth`.
//!
//! New and replaced passwords are hashed with bcrypt. `htauth` treats a
//! missing file as empty; only setting a password is allowed to create it.

use std::path::Path;

use htauth::{HashAlgorithm, Htpasswd};

use crate::error::{Error, Result};

fn open(path: &Path) -> Result<Htpasswd> {
    Htpasswd::open(path).map_err(|e| Error::htpasswd(path, e))
}

fn open_existing(path: &Path) -> Result<Htpasswd> {
    if !path.is_file() {
        return Err(Error::MissingPasswordFile {
            path: path.to_path_buf(),
        });
    }
    open(path)
}

fn validate(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || username.contains([':', '\n', '\r']) {
        return Err(Error::InvalidUsername(username.to_string()));
    }
    if password.is_empty() {
        return Err(Error::EmptyPassword(username.to_string()));
    }
    Ok(())
}

/// Usernames in the password file, sorted.
pub fn list_users(path: &Path) -> Result<Vec<String>> {
    Ok(open_existing(path)?.list_users())
}

/// Add the user or replace its password, creating the file if needed.
///
/// Nothing is written when validation or hashing fails.
pub fn set_password(path: &Path, username: &str, password: &str) -> Result<()> {
    validate(username, password)?;

    let mut htpasswd = open(path)?;
    if htpasswd.user_exists(username) {
        htpasswd.update_user(username, password, HashAlgorithm::Bcrypt)
    } else {
        htpasswd.add_user(username, password, HashAlgorithm::Bcrypt)
    }
    .map_err(|e| Error::htpasswd(path, e))?;

    htpasswd.save().map_err(|e| Error::htpasswd(path, e))
}

/// Remove a user; fails when the file or the user is missing.
pub fn remove_user(path: &Path, username: &str) -> Result<()> {
    let mut htpasswd = open_existing(path)?;
    htpasswd
        .delete_user(username)
        .map_err(|e| Error::htpasswd(path, e))?;
    htpasswd.save().map_err(|e| Error::htpasswd(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FIXTURE: &str = "user:$2y$05$abc\nadmin:$2y$05$def\n";

    #[test]
    fn test_list_sorted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.htpasswd");
        fs::write(&path, FIXTURE).unwrap();

        assert_eq!(list_users(&path).unwrap(), vec!["admin", "user"]);
    }

    #[test]
    fn test_list_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.htpasswd");

        let result = list_users(&path);
        assert!(matches!(result, Err(Error::MissingPasswordFile { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_password_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.htpasswd");

        set_password(&path, "alice", "password123").unwrap();

        let htpasswd = Htpasswd::open(&path).unwrap();
        assert!(htpasswd.verify_user("alice", "password123").unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("alice:$2"));
    }

    #[test]
    fn test_set_password_replaces_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.htpasswd");

        set_password(&path, "alice", "first").unwrap();
        set_password(&path, "alice", "second").unwrap();

        let htpasswd = Htpasswd::open(&path).unwrap();
        assert_eq!(htpasswd.list_users(), vec!["alice"]);
        assert!(htpasswd.verify_user("alice", "second").unwrap());
        assert!(!htpasswd.verify_user("alice", "first").unwrap());
    }

    #[test]
    fn test_rejected_input_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.htpasswd");
        fs::write(&path, FIXTURE).unwrap();

        let result = set_password(&path, "bob", "");
        assert!(matches!(result, Err(Error::EmptyPassword(_))));

        for name in ["", "a:b", "line\nbreak"] {
            let result = set_password(&path, name, "pwd");
            assert!(matches!(result, Err(Error::InvalidUsername(_))), "{:?}", name);
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), FIXTURE);
    }

    #[test]
    fn test_remove_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.htpasswd");
        fs::write(&path, FIXTURE).unwrap();

        remove_user(&path, "user").unwrap();
        assert_eq!(list_users(&path).unwrap(), vec!["admin"]);
    }

    #[test]
    fn test_remove_nonexistent_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.htpasswd");
        fs::write(&path, FIXTURE).unwrap();

        assert!(remove_user(&path, "ghost").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), FIXTURE);
    }

    #[test]
    fn test_remove_from_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.htpasswd");

        let result = remove_user(&path, "user");
        assert!(matches!(result, Err(Error::MissingPasswordFile { .. })));
        assert!(!path.exists());
    }
}
