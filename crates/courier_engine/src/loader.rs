use std::path::Path;

use crate::RunError;

/// Reads the message file selected by the user.
#[async_trait::async_trait]
pub trait FileLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<String, RunError>;
}

/// Reads from the local filesystem. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileLoader;

#[async_trait::async_trait]
impl FileLoader for FsFileLoader {
    async fn load(&self, path: &Path) -> Result<String, RunError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| RunError::FileRead {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Short name for log lines: the file name when there is one.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
