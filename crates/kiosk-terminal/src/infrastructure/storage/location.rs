//! File-backed start location.
//!
//! The file holds a single line: the URL the kiosk opens on start and on
//! "home".  Surrounding whitespace is ignored.  A missing, unreadable or blank
//! file falls back to the configured default, so a fresh or damaged kiosk
//! still opens the ordering page.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::application::navigate::{LocationError, LocationRepository};

/// Persists the start location in a plain text file.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
    default_location: String,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>, default_location: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_location: default_location.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocationRepository for LocationStore {
    fn load(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
            Ok(_) => {
                debug!("{} is blank; using default location", self.path.display());
                self.default_location.clone()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found; using default location", self.path.display());
                self.default_location.clone()
            }
            Err(e) => {
                warn!("cannot read {}: {e}; using default location", self.path.display());
                self.default_location.clone()
            }
        }
    }

    fn save(&self, location: &str) -> Result<String, LocationError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LocationError::Empty);
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| LocationError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, location).map_err(|source| LocationError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(location.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
