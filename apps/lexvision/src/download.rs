//! Download-directory file sink used by the export channel.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use client_core::{ExportError, FileSink};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

const MAX_SUFFIX: u32 = 999;

pub struct DownloadDirSink {
    dir: PathBuf,
    max_suffix: u32,
}

impl DownloadDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_suffix: MAX_SUFFIX,
        }
    }
}

/// `name.pdf`, then `name (1).pdf`, `name (2).pdf`, ... like a browser
/// download shelf.
fn candidate(dir: &Path, file_name: &str, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(file_name);
    }
    let name = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{file_name} ({n})"),
    };
    dir.join(name)
}

fn save_error(path: PathBuf) -> impl FnOnce(std::io::Error) -> ExportError {
    move |source| ExportError::Save { path, source }
}

#[async_trait]
impl FileSink for DownloadDirSink {
    /// Files are opened with `create_new`, so an existing export is never
    /// overwritten even if it appears while the name is being chosen.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(save_error(self.dir.clone()))?;

        for n in 0..=self.max_suffix {
            let path = candidate(&self.dir, file_name, n);
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(save_error(path)(err)),
            };
            file.write_all(bytes)
                .await
                .map_err(save_error(path.clone()))?;
            file.flush().await.map_err(save_error(path.clone()))?;
            return Ok(path);
        }

        Err(ExportError::Save {
            path: self.dir.join(file_name),
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} numbered copies already exist", self.max_suffix),
            ),
        })
    }
}
