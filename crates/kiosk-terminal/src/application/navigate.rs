//! NavigationUseCase: the kiosk's start location and the page-level menu
//! actions (home, save location, reload).
//!
//! The start location is a single persisted string.  Storage is reached
//! through the [`LocationRepository`] trait so this layer never touches the
//! file system directly.

use std::path::PathBuf;
use std::sync::Arc;

use kiosk_core::ContentCommand;
use thiserror::Error;
use tracing::info;

use super::inject_input::{ContentHost, HostError};

/// Error type for start-location persistence.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The location file could not be written.
    #[error("I/O error accessing location file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A blank location was offered for saving.
    #[error("location must not be empty")]
    Empty,
}

/// Error type for navigation actions.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Persistence for the start location.
pub trait LocationRepository: Send + Sync {
    /// The stored location, or the built-in default when nothing usable is
    /// stored.  Never fails.
    fn load(&self) -> String;

    /// Stores `location` (trimmed) and returns what was stored.
    ///
    /// # Errors
    ///
    /// [`LocationError::Empty`] for a blank value, [`LocationError::Io`] when
    /// the write fails.
    fn save(&self, location: &str) -> Result<String, LocationError>;
}

/// Page navigation driven by the kiosk menu.
pub struct NavigationUseCase {
    host: Arc<dyn ContentHost>,
    store: Arc<dyn LocationRepository>,
}

impl NavigationUseCase {
    pub fn new(host: Arc<dyn ContentHost>, store: Arc<dyn LocationRepository>) -> Self {
        Self { host, store }
    }

    /// The location the kiosk opens on start and on "home".
    pub fn start_location(&self) -> String {
        self.store.load()
    }

    /// Navigates to the persisted start location and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Host`] if the navigation command fails.
    pub fn go_home(&self) -> Result<String, NavigationError> {
        let location = self.start_location();
        self.navigate(&location)?;
        Ok(location)
    }

    /// Persists `location` as the new start location, then opens it.
    ///
    /// Nothing is navigated when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Location`] when the location cannot be
    /// stored, or [`NavigationError::Host`] if the navigation command fails.
    pub fn save_location(&self, location: &str) -> Result<String, NavigationError> {
        let saved = self.store.save(location)?;
        info!("start location saved: {saved}");
        self.navigate(&saved)?;
        Ok(saved)
    }

    /// Reloads the current page.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Host`] if the reload command fails.
    pub fn reload(&self) -> Result<(), NavigationError> {
        self.host.apply(&ContentCommand::Reload)?;
        Ok(())
    }

    fn navigate(&self, location: &str) -> Result<(), HostError> {
        info!("navigating to {location}");
        self.host.apply(&ContentCommand::Navigate {
            location: location.to_string(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::inject_input::MockContentHost;
    use std::sync::Mutex;

    /// In-memory repository with the same trim/blank rules as the file store.
    struct MemoryStore {
        stored: Mutex<Option<String>>,
        default_location: String,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn new(stored: Option<&str>) -> Self {
            Self {
                stored: Mutex::new(stored.map(String::from)),
                default_location: "https://default.example/order".to_string(),
                fail_writes: false,
            }
        }
    }

    impl LocationRepository for MemoryStore {
        fn load(&self) -> String {
            self.stored
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| self.default_location.clone())
        }

        fn save(&self, location: &str) -> Result<String, LocationError> {
            let trimmed = location.trim();
            if trimmed.is_empty() {
                return Err(LocationError::Empty);
            }
            if self.fail_writes {
                return Err(LocationError::Io {
                    path: PathBuf::from("/read-only/location.txt"),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            *self.stored.lock().unwrap() = Some(trimmed.to_string());
            Ok(trimmed.to_string())
        }
    }

    fn expect_navigate_to(host: &mut MockContentHost, expected: &'static str) {
        host.expect_apply()
            .withf(move |cmd| {
                matches!(cmd, ContentCommand::Navigate { location } if location == expected)
            })
            .times(1)
            .returning(|_| Ok(()));
    }

    #[test]
    fn test_start_location_falls_back_to_default() {
        let host = MockContentHost::new();
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(MemoryStore::new(None)));

        assert_eq!(uc.start_location(), "https://default.example/order");
    }

    #[test]
    fn test_go_home_navigates_to_stored_location() {
        // Arrange
        let mut host = MockContentHost::new();
        expect_navigate_to(&mut host, "https://kantin.example/menu");
        let store = MemoryStore::new(Some("https://kantin.example/menu"));
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(store));

        // Act
        let location = uc.go_home().unwrap();

        // Assert
        assert_eq!(location, "https://kantin.example/menu");
    }

    #[test]
    fn test_save_location_persists_trimmed_then_navigates() {
        // Arrange
        let mut host = MockContentHost::new();
        expect_navigate_to(&mut host, "https://new.example/self");
        let store = Arc::new(MemoryStore::new(None));
        let uc = NavigationUseCase::new(Arc::new(host), Arc::clone(&store) as Arc<dyn LocationRepository>);

        // Act
        let saved = uc.save_location("  https://new.example/self \n").unwrap();

        // Assert
        assert_eq!(saved, "https://new.example/self");
        assert_eq!(store.load(), "https://new.example/self");
    }

    #[test]
    fn test_save_blank_location_is_rejected_without_navigation() {
        let mut host = MockContentHost::new();
        host.expect_apply().never();
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(MemoryStore::new(None)));

        let result = uc.save_location("   ");

        assert!(matches!(
            result,
            Err(NavigationError::Location(LocationError::Empty))
        ));
    }

    #[test]
    fn test_save_write_failure_does_not_navigate() {
        let mut host = MockContentHost::new();
        host.expect_apply().never();
        let mut store = MemoryStore::new(None);
        store.fail_writes = true;
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(store));

        let result = uc.save_location("https://x.example");

        assert!(matches!(
            result,
            Err(NavigationError::Location(LocationError::Io { .. }))
        ));
    }

    #[test]
    fn test_reload_sends_reload_command() {
        let mut host = MockContentHost::new();
        host.expect_apply()
            .withf(|cmd| *cmd == ContentCommand::Reload)
            .times(1)
            .returning(|_| Ok(()));
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(MemoryStore::new(None)));

        assert!(uc.reload().is_ok());
    }

    #[test]
    fn test_host_failure_surfaces_as_navigation_error() {
        let mut host = MockContentHost::new();
        host.expect_apply()
            .returning(|_| Err(HostError::Disconnected));
        let uc = NavigationUseCase::new(Arc::new(host), Arc::new(MemoryStore::new(None)));

        assert!(matches!(
            uc.go_home(),
            Err(NavigationError::Host(HostError::Disconnected))
        ));
    }
}
