//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from pl-core.

use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use pl_core::config::StorageSettings;
use pl_core::{Credential, Error, ObjectInfo, ObjectStore, Result, StorageUrl};

/// Provider name reported for credentials from the token exchange
const PROVIDER_NAME: &str = "partload-token-exchange";

/// Page size for ListObjectsV2
const MAX_KEYS: i32 = 1000;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client
    ///
    /// With a credential the client signs with those temporary keys;
    /// without one it uses the default AWS credential chain.
    pub async fn new(credential: Option<&Credential>, settings: &StorageSettings) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()));

        if let Some(credential) = credential {
            loader = loader.credentials_provider(session_credentials(credential));
        } else {
            tracing::debug!("No token configured, using ambient AWS credentials");
        }

        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.force_path_style)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list(&self, prefix: &StorageUrl, recursive: bool) -> Result<Vec<ObjectInfo>> {
        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .inner
                .list_objects_v2()
                .bucket(&prefix.bucket)
                .max_keys(MAX_KEYS);

            if !prefix.key.is_empty() {
                request = request.prefix(&prefix.key);
            }
            if !recursive {
                request = request.delimiter("/");
            }
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| classify(e.to_string(), || format!("Bucket not found: {}", prefix.bucket)))?;

            for common in response.common_prefixes() {
                if let Some(p) = common.prefix() {
                    items.push(ObjectInfo::dir(p));
                }
            }

            for object in response.contents() {
                let key = object.key().unwrap_or_default();
                let mut info = ObjectInfo::file(key, object.size().unwrap_or(0));
                info.last_modified = object.last_modified().and_then(to_timestamp);
                items.push(info);
            }

            if response.is_truncated().unwrap_or(false) {
                continuation_token = response.next_continuation_token().map(str::to_string);
                if continuation_token.is_none() {
                    tracing::warn!("Truncated listing without continuation token, stopping");
                    break;
                }
            } else {
                break;
            }
        }

        tracing::debug!(prefix = %prefix, count = items.len(), "Listed objects");
        Ok(items)
    }

    async fn download(&self, object: &StorageUrl, target: &Path) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| classify(e.to_string(), || object.to_string()))?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(target).await?;
        let mut body = response.body;
        let mut written = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| Error::Network(format!("Failed to read {object}: {e}")))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Wrap a token-exchange credential for the SDK
pub fn session_credentials(credential: &Credential) -> aws_credential_types::Credentials {
    let expiry = u64::try_from(credential.expires_at_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(|ms| UNIX_EPOCH + Duration::from_millis(ms));

    aws_credential_types::Credentials::new(
        credential.access_key_id.clone(),
        credential.secret_access_key.clone(),
        Some(credential.session_token.clone()),
        expiry,
        PROVIDER_NAME,
    )
}

fn to_timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(value.secs()).ok()
}

fn classify(err_str: String, not_found: impl FnOnce() -> String) -> Error {
    if err_str.contains("NotFound") || err_str.contains("NoSuchKey") || err_str.contains("NoSuchBucket")
    {
        Error::NotFound(not_found())
    } else {
        Error::Network(err_str)
    }
}
