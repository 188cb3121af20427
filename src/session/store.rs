//! The process-wide session store.

use super::{Credential, CredentialStorage, MemoryStorage, UserIdentity};
use tokio::sync::watch;

/// Key the bearer token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Holds the single current credential and keeps the token durable.
///
/// Construct one per process and share it by `Arc` with every component
/// that needs to know who is signed in.
pub struct SessionStore {
    current: watch::Sender<Option<Credential>>,
    storage: Box<dyn CredentialStorage>,
}

impl SessionStore {
    /// Opens the store, reading durable storage once.
    ///
    /// An unreadable storage backend is logged and treated as signed out.
    pub fn open(storage: Box<dyn CredentialStorage>) -> Self {
        let restored = match storage.load(TOKEN_KEY) {
            Ok(token) => token.map(|token| Credential { token, user: None }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session, starting signed out");
                None
            }
        };
        if restored.is_some() {
            tracing::info!("Restored stored session token");
        }

        let (current, _) = watch::channel(restored);
        Self { current, storage }
    }

    /// A store backed by memory only.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()))
    }

    /// Replaces any existing credential and persists the token.
    pub fn set_credential(&self, token: impl Into<String>, user: UserIdentity) {
        let token = token.into();
        if let Err(e) = self.storage.store(TOKEN_KEY, &token) {
            tracing::warn!(error = %e, "Failed to persist session token");
        }

        tracing::info!(user = %user.email, "Session credential set");
        self.current.send_replace(Some(Credential {
            token,
            user: Some(user),
        }));
    }

    /// Forgets the credential in memory and in durable storage.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove stored session token");
        }
        if self.current.send_replace(None).is_some() {
            tracing::info!("Session cleared");
        }
    }

    /// The current credential, if signed in.
    pub fn current(&self) -> Option<Credential> {
        self.current.borrow().clone()
    }

    /// The bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|c| c.token.clone())
    }

    /// Whether a credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Watches credential changes (login, logout).
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.current.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.current.borrow())
            .finish()
    }
}
