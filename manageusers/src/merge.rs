//! Read-time join of credential usernames with metadata records.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::models::user_info::UserInfo;

/// Overlay origin and claims from `infos` onto the users with a matching subject.
///
/// Fails without touching `users` when the map is empty. Records with no
/// matching user are ignored; for duplicate subjects the last record wins.
pub fn merge_users(users: &mut BTreeMap<String, User>, infos: &[UserInfo]) -> Result<()> {
    if users.is_empty() {
        return Err(Error::EmptyUserMap);
    }

    let by_sub: HashMap<&str, &UserInfo> =
        infos.iter().map(|info| (info.sub.as_str(), info)).collect();

    for user in users.values_mut() {
        if let Some(info) = by_sub.get(user.username.as_str()) {
            user.origin = info.origin.clone();
            user.role = info.claims.role.clone();
            user.name = info.claims.name.clone();
            user.surname = info.claims.surname.clone();
        }
    }
    Ok(())
}
