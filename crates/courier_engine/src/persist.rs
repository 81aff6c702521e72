use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    Directory(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure `dir` exists and is a directory; create it if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::Directory(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::Directory(e.to_string()))
        }
        Err(err) => Err(PersistError::Directory(err.to_string())),
    }
}

/// Write `content` to `target` through a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn write_atomic(target: &Path, content: &str) -> Result<(), PersistError> {
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    ensure_dir(dir)?;

    let mut tmp = if dir.as_os_str().is_empty() {
        NamedTempFile::new_in(".")?
    } else {
        NamedTempFile::new_in(dir)?
    };
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
