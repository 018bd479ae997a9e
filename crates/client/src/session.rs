//! Session context and token persistence.
//!
//! The session is the only piece of mutable state shared between clients.
//! It is created when credentials are acquired and torn down on logout or
//! when the backend rejects the token.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use budgetly_shared::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The signed-in user, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
}

/// An opaque bearer token plus the user it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user: Option<User>,
}

impl Session {
    /// Creates a session.
    #[must_use]
    pub const fn new(token: String, user: Option<User>) -> Self {
        Self { token, user }
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The user, once known.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Persists the bearer token between runs.
pub trait TokenStore: Send + Sync {
    /// Loads the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the backing store cannot be read.
    fn load(&self) -> AppResult<Option<String>>;

    /// Persists a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token cannot be written.
    fn save(&self, token: &str) -> AppResult<()>;

    /// Removes the persisted token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token cannot be removed.
    fn clear(&self) -> AppResult<()>;
}

#[derive(Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Stores the token as `{"token": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by `path`. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(action: &str, path: &Path, err: impl fmt::Display) -> AppError {
    AppError::Storage(format!("failed to {action} {}: {err}", path.display()))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> AppResult<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };

        match serde_json::from_str::<TokenFile>(&raw) {
            Ok(file) if !file.token.is_empty() => Ok(Some(file.token)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_error("create", parent, e))?;
        }
        let body = serde_json::to_string(&TokenFile {
            token: token.to_string(),
        })
        .map_err(|e| storage_error("encode", &self.path, e))?;
        fs::write(&self.path, body).map_err(|e| storage_error("write", &self.path, e))
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

/// Keeps the token in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> AppResult<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> AppResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Cloneable handle to the current session.
///
/// Every authorized client holds a clone. All clones observe the same
/// session, so invalidating through one signs every client out.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn TokenStore>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Creates a signed-out context backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// A signed-out context that persists nothing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Persists the token and makes the session current.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token cannot be persisted; the
    /// context is left unchanged.
    pub fn establish(&self, session: Session) -> AppResult<()> {
        self.store.save(session.token())?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        debug!("Session established");
        Ok(())
    }

    /// Loads a persisted token into the context without a known user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store cannot be read.
    pub fn resume(&self) -> AppResult<bool> {
        let Some(token) = self.store.load()? else {
            return Ok(false);
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Session::new(token, None));
        Ok(true)
    }

    /// Records the user for the current session. No-op when signed out.
    pub fn set_user(&self, user: User) {
        if let Some(session) = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            session.user = Some(user);
        }
    }

    /// Forgets the session and the persisted token.
    ///
    /// A failure to clear the store is logged; the in-memory session is
    /// dropped regardless.
    pub fn invalidate(&self) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted token");
        }
        debug!("Session invalidated");
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    /// The current user, once known.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.current().and_then(|s| s.user)
    }

    /// True while a session is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session::new("secret-token".to_string(), Some(user()));
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("Asha"));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "abc");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(FileTokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_establish_persists_and_invalidate_clears() {
        let store = Arc::new(MemoryTokenStore::new());
        let context = SessionContext::new(store.clone());

        context
            .establish(Session::new("tok".to_string(), Some(user())))
            .unwrap();
        assert!(context.is_authenticated());
        assert_eq!(store.load().unwrap(), Some("tok".to_string()));
        assert_eq!(context.user(), Some(user()));

        context.invalidate();
        assert!(!context.is_authenticated());
        assert_eq!(context.token(), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let context = SessionContext::in_memory();
        let other = context.clone();

        context.establish(Session::new("tok".to_string(), None)).unwrap();
        assert_eq!(other.token(), Some("tok".to_string()));

        other.invalidate();
        assert!(!context.is_authenticated());
    }

    #[test]
    fn test_resume_loads_token_without_user() {
        let context = SessionContext::new(Arc::new(MemoryTokenStore::with_token("saved")));

        assert!(context.resume().unwrap());
        assert_eq!(context.token(), Some("saved".to_string()));
        assert_eq!(context.user(), None);

        context.set_user(user());
        assert_eq!(context.user(), Some(user()));
    }

    #[test]
    fn test_resume_with_empty_store() {
        let context = SessionContext::in_memory();
        assert!(!context.resume().unwrap());
        context.set_user(user());
        assert_eq!(context.user(), None);
    }
}
