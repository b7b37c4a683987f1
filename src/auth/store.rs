use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::session::AuthSession;

const SESSION_FILE_NAME: &str = "session.toml";
const SESSION_FILE_VERSION: u32 = 1;

/// Storage abstraction for the persisted auth session.
///
/// Implementations must make `save` and `clear` all-or-nothing: a reader never
/// observes a session with some fields from one write and some from another.
///
/// The API is synchronous and may block on disk I/O. Callers on an async
/// runtime run it inline; a session file is a few hundred bytes.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<AuthSession>, AuthError>;
    fn save(&self, session: &AuthSession) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;

    fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self.load()?.is_some())
    }
}

/// Configuration for file-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    pub base_dir: PathBuf,
}

impl SessionStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_ares_dir()
    }
}

/// File-backed session store using a single TOML file.
///
/// # Example
/// ```no_run
/// use ares::auth::{AuthSession, FileSessionStore, SessionStore, SessionStoreConfig};
///
/// let store = FileSessionStore::new(SessionStoreConfig::new("/tmp/ares".into()));
/// let session = AuthSession::new("access", "refresh", "2099-01-01T00:00:00Z", "pro");
/// store.save(&session)?;
/// assert!(store.is_logged_in()?);
/// # Ok::<(), ares::auth::AuthError>(())
/// ```
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            path: config.base_dir.join(SESSION_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(SessionStoreConfig::new(default_ares_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, AuthError> {
        self.write_lock
            .lock()
            .map_err(|_| AuthError::StorageFailure("session store lock poisoned".to_string()))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<AuthSession>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::StorageFailure(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        Ok(file.session.and_then(StoredSession::into_session))
    }

    fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            saved_at: Some(Utc::now()),
            session: Some(StoredSession::from(session)),
        };
        let serialized = toml::to_string(&file)?;
        let _guard = self.lock()?;
        atomic_write(&self.path, serialized.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let _guard = self.lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::StorageFailure(err.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    saved_at: Option<DateTime<Utc>>,
    session: Option<StoredSession>,
}

/// On-disk shape. Every field is optional so a partially written or
/// hand-edited file reads back as "no session" instead of an error.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<String>,
    feedly_plan: Option<String>,
}

impl StoredSession {
    fn into_session(self) -> Option<AuthSession> {
        let access_token = non_blank(self.access_token)?;
        let refresh_token = non_blank(self.refresh_token)?;
        let expires_at = non_blank(self.expires_at)?;
        let feedly_plan = non_blank(self.feedly_plan)?;
        Some(AuthSession::new(
            access_token,
            refresh_token,
            expires_at,
            feedly_plan,
        ))
    }
}

impl From<&AuthSession> for StoredSession {
    fn from(session: &AuthSession) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
            expires_at: Some(session.expires_at.clone()),
            feedly_plan: Some(session.feedly_plan.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_ares_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".ares"))
        .unwrap_or_else(|| PathBuf::from(".ares"))
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        AuthError::StorageFailure(format!("session path {} has no file name", path.display()))
    })?;
    let temp_name = format!(
        ".{}.tmp-{}-{}",
        file_name.to_string_lossy(),
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(SessionStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    fn sample_session() -> AuthSession {
        AuthSession::new("access", "refresh", "2025-01-01T00:00:00Z", "pro")
    }

    #[test]
    fn session_round_trip_works() {
        let (_dir, store) = temp_store();
        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.same_credentials(&sample_session()));
    }

    #[test]
    fn save_overwrites_prior_session() {
        let (_dir, store) = temp_store();
        store.save(&sample_session()).unwrap();
        let next = AuthSession::new("access-2", "refresh-2", "2026-01-01T00:00:00Z", "free");
        store.save(&next).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-2");
        assert_eq!(loaded.feedly_plan, "free");
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save(&sample_session()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.is_logged_in().unwrap());
    }

    #[test]
    fn missing_field_reads_as_no_session() {
        let (_dir, store) = temp_store();
        let contents = concat!(
            "version = 1\n\n[session]\n",
            "access_token = \"a\"\n",
            "refresh_token = \"r\"\n",
            "expires_at = \"2025-01-01T00:00:00Z\"\n",
        );
        fs::write(store.path(), contents).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn blank_field_reads_as_no_session() {
        let (_dir, store) = temp_store();
        store
            .save(&AuthSession::new("a", "", "2025-01-01T00:00:00Z", "pro"))
            .unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_storage_failure() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "not = [toml").unwrap();
        assert!(matches!(store.load(), Err(AuthError::StorageFailure(_))));
    }

    #[test]
    fn save_does_not_leave_temp_files() {
        let (dir, store) = temp_store();
        store.save(&sample_session()).unwrap();
        let has_tmp = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .any(|name| name.contains(".tmp-"));
        assert!(!has_tmp);
    }

    #[test]
    fn concurrent_save_and_clear_never_expose_mixed_sessions() {
        let (dir, store) = temp_store();
        let session_for = |i: usize| {
            AuthSession::new(
                format!("access-{i}"),
                format!("refresh-{i}"),
                "2999-01-01T00:00:00Z",
                format!("plan-{i}"),
            )
        };

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for round in 0..25 {
                        let i = writer * 100 + round;
                        if round % 5 == 4 {
                            store.clear().unwrap();
                        } else {
                            store.save(&session_for(i)).unwrap();
                        }
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..200 {
                    if let Some(loaded) = store.load().unwrap() {
                        let i = loaded.access_token.trim_start_matches("access-");
                        assert!(loaded.same_credentials(&session_for(i.parse().unwrap())));
                    }
                }
            });
        });

        let leftovers: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[cfg(unix)]
    #[test]
    fn save_restricts_permissions() {
        let (_dir, store) = temp_store();
        store.save(&sample_session()).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
