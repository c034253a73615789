//! User metadata file access.
//!
//! The file is a JSON array of [`UserInfo`] records. It is always read whole
//! and rewritten whole; there is no locking.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::user_info::UserInfo;

/// Read every record from the user info file.
pub fn read_user_infos(path: &Path) -> Result<Vec<UserInfo>> {
    let data = fs::read(path).map_err(|e| Error::io(path, e))?;
    // A `null` document is what an empty list used to be written as.
    let infos: Option<Vec<UserInfo>> =
        serde_json::from_slice(&data).map_err(|e| Error::json(path, e))?;
    Ok(infos.unwrap_or_default())
}

/// Overwrite the user info file with `infos`.
pub fn write_user_infos(path: &Path, infos: &[UserInfo]) -> Result<()> {
    let data = serde_json::to_vec(infos).map_err(|e| Error::json(path, e))?;
    fs::write(path, data).map_err(|e| Error::io(path, e))
}

/// Replace the record with the same subject, or append it.
pub fn upsert_user_info(path: &Path, info: UserInfo) -> Result<()> {
    let mut infos = read_user_infos(path)?;
    match infos.iter_mut().find(|existing| existing.sub == info.sub) {
        Some(existing) => *existing = info,
        None => infos.push(info),
    }
    write_user_infos(path, &infos)
}

/// Drop the first record for `sub`.
///
/// A subject with no record is not an error; the file is rewritten either way.
pub fn remove_user_info(path: &Path, sub: &str) -> Result<()> {
    let mut infos = read_user_infos(path)?;
    if let Some(index) = infos.iter().position(|info| info.sub == sub) {
        infos.remove(index);
    }
    write_user_infos(path, &infos)
}
