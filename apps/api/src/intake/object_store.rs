//! Remote input: resolve an object-store URL, download the PDFs it names into a
//! scratch directory, then treat that directory as a local folder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::intake::local::scan_tree;
use crate::intake::IntakeError;
use crate::models::resume::{has_pdf_extension, ResumeDocument};

/// Bucket and key (or key prefix) named by an object-store URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Accepts `s3://bucket/key`, virtual-hosted `https://bucket.s3[.region].amazonaws.com/key`,
    /// `scheme://bucket.host/key`, and path-style `https://s3.host/bucket/key` or
    /// `http://localhost:9000/bucket/key`.
    pub fn parse(url: &str) -> Result<Self, IntakeError> {
        let invalid = |reason: &str| IntakeError::InvalidObjectUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        if host.is_empty() {
            return Err(invalid("missing bucket"));
        }

        let (bucket, key) = match scheme.to_ascii_lowercase().as_str() {
            "s3" => (host, path),
            "http" | "https" if is_path_style_host(host) => {
                path.split_once('/').unwrap_or((path, ""))
            }
            "http" | "https" => match host.find(".s3") {
                Some(idx) => (&host[..idx], path),
                None => (host.split('.').next().unwrap_or(host), path),
            },
            _ => return Err(invalid("unsupported scheme")),
        };

        if bucket.is_empty() {
            return Err(invalid("missing bucket"));
        }
        if bucket.chars().any(char::is_whitespace) {
            return Err(invalid("bucket name contains whitespace"));
        }

        Ok(ObjectLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// An empty key or one ending in `/` names every object under it.
    pub fn is_prefix(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }
}

fn is_path_style_host(host: &str) -> bool {
    host.starts_with("s3.")
        || host.starts_with("s3-")
        || host.contains(':')
        || host == "localhost"
        || host.parse::<std::net::IpAddr>().is_ok()
}

/// Read access to an object store. The S3 implementation uses ambient AWS
/// credentials; tests substitute an in-memory store.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, IntakeError>;

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, IntakeError>;
}

pub struct S3Fetcher {
    client: S3Client,
}

impl S3Fetcher {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectFetcher for S3Fetcher {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, IntakeError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    IntakeError::Download(format!(
                        "listing s3://{bucket}/{prefix} failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, IntakeError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                IntakeError::Download(format!(
                    "downloading s3://{bucket}/{key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let body = output.body.collect().await.map_err(|e| {
            IntakeError::Download(format!("reading s3://{bucket}/{key} failed: {e}"))
        })?;
        Ok(body.into_bytes())
    }
}

/// Downloads the PDFs at `location` into a fresh scratch directory (under
/// `scratch_parent` when given) and reads them back as documents. The scratch
/// directory is removed before returning.
pub async fn download_to_scratch(
    fetcher: &dyn ObjectFetcher,
    location: &ObjectLocation,
    scratch_parent: Option<&Path>,
) -> Result<Vec<ResumeDocument>, IntakeError> {
    let scratch = {
        let mut builder = tempfile::Builder::new();
        builder.prefix("screener-");
        match scratch_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
    }
    .map_err(|e| IntakeError::Download(format!("cannot create scratch directory: {e}")))?;

    let keys = if location.is_prefix() {
        location_keys(fetcher, location).await?
    } else {
        vec![location.key.clone()]
    };
    info!(
        "Downloading {} object(s) from s3://{}/{}",
        keys.len(),
        location.bucket,
        location.key
    );

    let downloads = keys.iter().map(|key| async move {
        let bytes = fetcher.fetch(&location.bucket, key).await?;
        Ok::<_, IntakeError>((key, bytes))
    });
    let objects = try_join_all(downloads).await?;

    for (key, bytes) in objects {
        let Some(relative) = scratch_path(location, key) else {
            debug!("Skipping object {key}: no usable file name");
            continue;
        };
        let path = scratch.path().join(&relative);
        debug!("Writing {} ({} bytes) to scratch", key, bytes.len());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| IntakeError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| IntakeError::Io {
                path: path.clone(),
                source,
            })?;
    }

    scan_tree(scratch.path()).await
}

/// Where `key` lands inside the scratch directory: its path below the prefix
/// for prefix downloads, its file name for single objects. Empty, `.` and
/// `..` segments are dropped so nothing is written outside the scratch dir.
fn scratch_path(location: &ObjectLocation, key: &str) -> Option<PathBuf> {
    let relative = if location.is_prefix() {
        key.strip_prefix(location.key.as_str()).unwrap_or(key)
    } else {
        key.rsplit('/').next().unwrap_or(key)
    };
    let path: PathBuf = relative
        .split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect();
    (!path.as_os_str().is_empty()).then_some(path)
}

async fn location_keys(
    fetcher: &dyn ObjectFetcher,
    location: &ObjectLocation,
) -> Result<Vec<String>, IntakeError> {
    let keys = fetcher.list_keys(&location.bucket, &location.key).await?;
    Ok(keys.into_iter().filter(|k| has_pdf_extension(k)).collect())
}
