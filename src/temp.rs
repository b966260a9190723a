//! Short-lived files handed to the renderer.
//!
//! Every file is owned by a [`TempResource`] and removed when the handle
//! drops, so a render call never leaves files behind once it returns.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use url::Url;

/// Name prefix shared by every file this crate creates.
pub const TEMP_PREFIX: &str = "phandom-";

#[derive(Debug)]
pub struct TempResource {
    path: TempPath,
}

impl TempResource {
    /// Writes `content` to a fresh file in the system temp dir.
    ///
    /// `extension` includes the leading dot (e.g. `".html"`).
    pub fn create(content: &[u8], extension: &str) -> io::Result<Self> {
        let mut file = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(extension)
            .tempfile()?;
        file.write_all(content)?;
        file.flush()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` URL of the absolute path.
    pub fn url(&self) -> io::Result<Url> {
        Url::from_file_path(&self.path).map_err(|_| {
            io::Error::other(format!(
                "temp path {} cannot be expressed as a file URL",
                self.path.display()
            ))
        })
    }

    /// Detaches the file from this handle; the caller becomes responsible for removing it.
    pub fn keep(self) -> io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}
