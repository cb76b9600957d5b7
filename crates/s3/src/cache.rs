//! Credential-aware client cache
//!
//! Credentials from the token exchange are baked into the SDK client, so a
//! new client is needed whenever the session hands out a different
//! credential. The cache keeps one client and rebuilds it whenever any
//! part of the credential changes, since a re-issued credential may keep
//! its access key id while rotating the session token.

use async_trait::async_trait;
use pl_core::config::StorageSettings;
use pl_core::{Credential, Result, StoreProvider};

use crate::client::S3Client;

/// Holds the client built for the most recent credential
pub struct S3ClientCache {
    settings: StorageSettings,
    current: Option<(Option<Credential>, S3Client)>,
}

impl S3ClientCache {
    pub fn new(settings: StorageSettings) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// Client for `credential`, reusing the cached one when it is unchanged
    ///
    /// `None` means ambient credentials.
    pub async fn client(&mut self, credential: Option<&Credential>) -> Result<&S3Client> {
        let key = credential.cloned();
        let entry = match self.current.take() {
            Some((cached, client)) if cached == key => {
                tracing::debug!("Reusing S3 client");
                (cached, client)
            }
            _ => {
                tracing::debug!(
                    access_key_id = ?key.as_ref().map(|c| c.access_key_id.as_str()),
                    "Building S3 client"
                );
                (key, S3Client::new(credential, &self.settings).await?)
            }
        };
        Ok(&self.current.insert(entry).1)
    }
}

#[async_trait]
impl StoreProvider for S3ClientCache {
    type Store = S3Client;

    async fn store(&mut self, credential: Option<&Credential>) -> Result<&S3Client> {
        self.client(credential).await
    }
}
