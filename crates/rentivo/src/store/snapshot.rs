use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::RepositoryError;
use crate::identity::User;
use crate::invoices::Invoice;
use crate::properties::Property;
use crate::tenancies::Tenancy;

/// On-disk image of every collection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct Snapshot {
    #[serde(default)]
    pub(super) users: Vec<User>,
    #[serde(default)]
    pub(super) properties: Vec<Property>,
    #[serde(default)]
    pub(super) tenancies: Vec<Tenancy>,
    #[serde(default)]
    pub(super) invoices: Vec<Invoice>,
}

/// Missing files yield an empty snapshot so a fresh deployment starts clean.
pub(super) fn load(path: &Path) -> Result<Snapshot, RepositoryError> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }

    let bytes = fs::read(path).map_err(|err| {
        RepositoryError::Unavailable(format!("failed to read {}: {err}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        RepositoryError::Unavailable(format!("corrupt snapshot {}: {err}", path.display()))
    })
}

/// Write through a sibling temp file and rename, so readers never see a torn snapshot.
pub(super) fn save(path: &Path, snapshot: &Snapshot) -> Result<(), RepositoryError> {
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| RepositoryError::Unavailable(format!("snapshot encoding failed: {err}")))?;

    let temp = temp_path(path);
    fs::write(&temp, bytes)
        .and_then(|()| fs::rename(&temp, path))
        .map_err(|err| {
            RepositoryError::Unavailable(format!("failed to write {}: {err}", path.display()))
        })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
