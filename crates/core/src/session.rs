//! Credential lifecycle
//!
//! The [`SessionManager`] makes sure a usable credential exists before each
//! object-store call. Without a token it does nothing and the store falls
//! back to ambient credentials. With a token it authenticates on first use
//! and again only once the held credential has expired.

use jiff::Timestamp;
use tokio::sync::Mutex;

use crate::auth::Authenticator;
use crate::credential::{Credential, CredentialStore};
use crate::error::{Error, Result};
use crate::partition::account_base_path;

#[derive(Debug, Default)]
struct SessionState {
    store: CredentialStore,
    attempted: bool,
}

/// Orchestrates the credential store and the authenticator
pub struct SessionManager<A> {
    token: Option<String>,
    authenticator: A,
    state: Mutex<SessionState>,
}

impl<A: Authenticator> SessionManager<A> {
    /// Create a manager; an empty token counts as no token
    pub fn new(token: Option<String>, authenticator: A) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            token,
            authenticator,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Ensure a valid credential is held, authenticating if needed
    ///
    /// Returns `None` when no token is configured. The state lock is held
    /// across the exchange so concurrent callers wait for a single
    /// authentication instead of starting their own.
    pub async fn ensure_valid(&self, now: Timestamp) -> Result<Option<Credential>> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };

        let mut state = self.state.lock().await;
        if state.store.is_valid(now) {
            return Ok(state.store.current().cloned());
        }

        if state.attempted {
            tracing::info!("Credentials expired, re-authenticating");
        } else {
            tracing::info!("Authenticating with access token");
        }
        state.attempted = true;

        let credential = self.authenticator.authenticate(token).await?;
        tracing::debug!(
            access_key_id = %credential.access_key_id,
            expires_at_ms = credential.expires_at_ms,
            "Obtained credentials"
        );
        if !credential.is_valid_at(now) {
            tracing::warn!("Token exchange returned credentials that are already expired");
        }

        state.store.set(credential.clone());
        Ok(Some(credential))
    }

    /// Current credential without triggering authentication
    pub async fn current(&self) -> Option<Credential> {
        self.state.lock().await.store.current().cloned()
    }

    /// Resolve the storage root for this invocation
    ///
    /// An explicit bucket and account id win. Otherwise the base path comes
    /// from the credential, which requires a token.
    pub async fn resolve_base_path(
        &self,
        now: Timestamp,
        bucket: Option<&str>,
        account_id: Option<&str>,
    ) -> Result<String> {
        if let (Some(bucket), Some(account_id)) = (non_empty(bucket), non_empty(account_id)) {
            return Ok(account_base_path(bucket, account_id));
        }

        match self.ensure_valid(now).await? {
            Some(credential) => Ok(credential.base_path),
            None => Err(Error::MissingBasePath),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
