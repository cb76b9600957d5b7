//! Short-lived storage credentials
//!
//! A [`Credential`] is what the token exchange hands back. The
//! [`CredentialStore`] keeps at most one of them and answers whether it is
//! still usable at a given instant.

use jiff::Timestamp;
use serde::Serialize;

/// Temporary access keys plus the base path they grant access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Expiry as epoch milliseconds
    pub expires_at_ms: i64,
    /// Storage root for the account, always ending in `/`
    pub base_path: String,
}

impl Credential {
    /// Valid iff the expiry lies strictly after `now`
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.expires_at_ms > now.as_millisecond()
    }

    /// Expiry as a timestamp, if it is representable
    pub fn expires_at(&self) -> Option<Timestamp> {
        Timestamp::from_millisecond(self.expires_at_ms).ok()
    }
}

/// Holds the current credential, replaced wholesale on every login
#[derive(Debug, Default)]
pub struct CredentialStore {
    credential: Option<Credential>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a credential is held and has not expired at `now`
    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|credential| credential.is_valid_at(now))
    }

    /// Replace the held credential
    pub fn set(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn current(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}
