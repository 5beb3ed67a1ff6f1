// Auth session: the one owner of the admin's tokens
//
// The HTTP client reads the access token from here on every request and
// reports 401s back. Other parts of the application learn about sign-in and
// logout by subscribing to the event channel instead of polling storage.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::models::AuthTokens;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Unauthorized,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    TokenRefreshed,
    LoggedOut(LogoutReason),
}

// Durable storage for the tokens
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<AuthTokens>, ClientError>;
    async fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<AuthTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: AuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }

    pub fn snapshot(&self) -> Option<AuthTokens> {
        self.tokens.read().clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<AuthTokens>, ClientError> {
        Ok(self.snapshot())
    }

    async fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.tokens.write() = None;
        Ok(())
    }
}

// Tokens persisted as a small JSON document
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<AuthTokens>, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| ClientError::StorageError(format!("corrupt token file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::StorageError(e.to_string())),
        }
    }

    async fn save(&self, tokens: &AuthTokens) -> Result<(), ClientError> {
        let raw = serde_json::to_vec(tokens)
            .map_err(|e| ClientError::StorageError(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| ClientError::StorageError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::StorageError(e.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    tokens: RwLock<Option<AuthTokens>>,
    store: Arc<dyn TokenStore>,
    // Cleared by the first 401 and re-armed by the next sign-in, so a burst
    // of concurrent 401s logs out once
    armed: AtomicBool,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                tokens: RwLock::new(None),
                store,
                armed: AtomicBool::new(true),
                events,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    // Session seeded from whatever the store already holds
    pub async fn restore(store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let stored = store.load().await?;
        let session = Self::new(store);
        if stored.is_some() {
            debug!("Restored admin tokens from storage");
        }
        *session.inner.tokens.write() = stored;
        Ok(session)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .as_ref()
            .and_then(|tokens| tokens.refresh_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.tokens.read().is_some()
    }

    pub async fn sign_in(&self, tokens: AuthTokens) -> Result<(), ClientError> {
        self.inner.store.save(&tokens).await?;
        *self.inner.tokens.write() = Some(tokens);
        self.inner.armed.store(true, Ordering::SeqCst);
        info!("Admin signed in");
        self.emit(AuthEvent::SignedIn);
        Ok(())
    }

    // A refresh response may omit the refresh token; keep the old one then
    pub async fn refresh(&self, mut tokens: AuthTokens) -> Result<(), ClientError> {
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = self.refresh_token();
        }
        self.inner.store.save(&tokens).await?;
        *self.inner.tokens.write() = Some(tokens);
        self.inner.armed.store(true, Ordering::SeqCst);
        debug!("Access token refreshed");
        self.emit(AuthEvent::TokenRefreshed);
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.inner.armed.store(false, Ordering::SeqCst);
        self.inner.tokens.write().take();
        self.inner.store.clear().await?;
        info!("Admin signed out");
        self.emit(AuthEvent::LoggedOut(LogoutReason::Manual));
        Ok(())
    }

    // Reacts to a 401 from the backend.
    //
    // Returns `true` when this call performed the logout, `false` when an
    // earlier 401 already did.
    pub async fn handle_unauthorized(&self) -> bool {
        if !self.inner.armed.swap(false, Ordering::SeqCst) {
            debug!("Ignoring 401, session already logged out");
            return false;
        }

        self.inner.tokens.write().take();
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear stored tokens after 401");
        }
        warn!("Backend answered 401, admin session cleared");
        self.emit(AuthEvent::LoggedOut(LogoutReason::Unauthorized));
        true
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine, nobody needs to react
        let _ = self.inner.events.send(event);
    }
}
