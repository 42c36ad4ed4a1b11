//! Disk persistence for collections as JSON documents.
//!
//! Each collection lives in one `<name>.json` file mapping id to
//! `{vector, metadata}`. Every write replaces the whole document: the new
//! contents go to `<name>.json.tmp`, are fsynced, and are renamed over the
//! live file, so a reader never sees a half-written snapshot. The directory
//! is fsynced after the rename.

use crate::config;
use crate::document::{Collection, EmbeddingRecord};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// In-memory contents of one collection, ordered by id.
pub type Records = BTreeMap<String, EmbeddingRecord>;

/// Path of the durable snapshot for `collection` inside `dir`.
pub fn snapshot_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        collection.as_str(),
        config::SNAPSHOT_EXTENSION
    ))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `records` as the full snapshot at `path` with an atomic rename.
///
/// On a write or rename error the live file is untouched and the temp file
/// is removed. A failed directory sync is also an error: the new file is in
/// place but may not survive a crash.
pub fn save_snapshot(path: &Path, records: &Records) -> Result<()> {
    let bytes = serde_json::to_vec(records)
        .map_err(|e| Error::persistence(path, io::Error::other(e.to_string())))?;

    let tmp_path = temp_path(path);
    if let Err(e) = write_synced(&tmp_path, &bytes) {
        let _ = fs::remove_file(&tmp_path);
        tracing::error!(path = ?path, error = %e, "snapshot write failed");
        return Err(Error::persistence(path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        tracing::error!(path = ?path, error = %e, "snapshot rename failed");
        return Err(Error::persistence(path, e));
    }
    // The rename is only durable once the directory entry is on disk.
    if let Err(e) = sync_dir(parent_dir(path)) {
        tracing::error!(path = ?path, error = %e, "snapshot directory sync failed");
        return Err(Error::persistence(path, e));
    }

    tracing::info!(
        path = ?path,
        records = records.len(),
        bytes = bytes.len(),
        "saved collection snapshot"
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

/// Directory containing `path`; `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Load the snapshot at `path`. A missing file is `Ok(None)`.
///
/// Records are returned unvalidated; dimension and metadata checks belong
/// to the caller, which knows the collection's configuration.
pub fn load_snapshot(path: &Path) -> Result<Option<Records>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::persistence(path, e)),
    };

    let records: Records = serde_json::from_slice(&raw).map_err(|e| {
        Error::persistence(
            path,
            io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
        )
    })?;

    tracing::info!(path = ?path, records = records.len(), "loaded collection snapshot");
    Ok(Some(records))
}
