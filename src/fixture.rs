//! Mock server fixture loading.
//!
//! Before the suite runs, the fixture file is posted as-is to the mock
//! server's configuration endpoint. The file is opaque here; only the mock
//! server interprets it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ConfigureSettings;
use crate::error::{Error, Result};

/// Read access to fixture files.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Returns true if `path` refers to an existing file.
    async fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file as UTF-8 text.
    async fn read(&self, path: &Path) -> Result<String>;
}

/// Sends fixture documents to the mock server.
#[async_trait]
pub trait ConfigureClient: Send + Sync {
    /// Posts `body` to the configuration endpoint and returns the response status.
    async fn configure(&self, body: String) -> Result<u16>;
}

/// Fixture source backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFixtureSource;

#[async_trait]
impl FixtureSource for FsFixtureSource {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::FixtureRead {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Configuration client that talks HTTP to the mock server.
#[derive(Debug, Clone)]
pub struct HttpConfigureClient {
    client: reqwest::Client,
    url: String,
    content_type: String,
}

impl HttpConfigureClient {
    /// Builds a client for the given endpoint settings.
    pub fn new(settings: &ConfigureSettings) -> Result<Self> {
        // The mock server is local; proxy variables from CI must not reroute it.
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Http {
                url: settings.url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: settings.url.clone(),
            content_type: settings.content_type.clone(),
        })
    }
}

#[async_trait]
impl ConfigureClient for HttpConfigureClient {
    async fn configure(&self, body: String) -> Result<u16> {
        let http_error = |e: reqwest::Error| Error::Http {
            url: self.url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, &self.content_type)
            .body(body)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        // Drain so the connection completes; the mock server's reply is not checked.
        response.bytes().await.map_err(http_error)?;

        Ok(status.as_u16())
    }
}

/// Outcome of a fixture load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No fixture file was found, nothing was sent.
    Skipped,
    /// The fixture was posted to the mock server.
    Configured {
        /// Size of the posted document in bytes.
        bytes: usize,
        /// HTTP status returned by the mock server.
        status: u16,
    },
}

/// Loads the fixture file into the mock server.
pub struct FixtureLoader<S, C> {
    path: PathBuf,
    source: S,
    client: C,
}

impl<S: FixtureSource, C: ConfigureClient> FixtureLoader<S, C> {
    /// Creates a loader for `path` with the given collaborators.
    pub fn new(path: impl Into<PathBuf>, source: S, client: C) -> Self {
        Self {
            path: path.into(),
            source,
            client,
        }
    }

    /// Posts the fixture to the mock server if the file exists.
    ///
    /// Waits for the mock server's response before returning, so fixtures are
    /// in place before the first transaction runs. A missing file is not an
    /// error; read and connection failures are.
    pub async fn load(&self) -> Result<LoadOutcome> {
        if !self.source.exists(&self.path).await {
            tracing::info!(path = %self.path.display(), "No fixtures found, skipping hook.");
            return Ok(LoadOutcome::Skipped);
        }

        let contents = self.source.read(&self.path).await?;
        let bytes = contents.len();

        tracing::info!(path = %self.path.display(), bytes, "loading fixtures into mock server");
        let status = self.client.configure(contents).await?;

        if (200..300).contains(&status) {
            tracing::info!(status, "mock server configured");
        } else {
            tracing::warn!(status, "mock server rejected fixtures");
        }

        Ok(LoadOutcome::Configured { bytes, status })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory fixture source.
    #[derive(Debug, Clone, Default)]
    pub struct MemorySource {
        files: HashMap<PathBuf, std::result::Result<String, std::io::ErrorKind>>,
    }

    impl MemorySource {
        pub fn with_file(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
            self.files.insert(path.into(), Ok(contents.to_string()));
            self
        }

        pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
            self.files
                .insert(path.into(), Err(std::io::ErrorKind::PermissionDenied));
            self
        }
    }

    #[async_trait]
    impl FixtureSource for MemorySource {
        async fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        async fn read(&self, path: &Path) -> Result<String> {
            match self.files.get(path) {
                Some(Ok(contents)) => Ok(contents.clone()),
                Some(Err(kind)) => Err(Error::FixtureRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(*kind),
                }),
                None => Err(Error::FixtureRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    /// Configure client that records bodies instead of sending them.
    #[derive(Debug, Clone)]
    pub struct RecordingClient {
        pub bodies: Arc<Mutex<Vec<String>>>,
        status: u16,
        fail: bool,
    }

    impl RecordingClient {
        pub fn new(status: u16) -> Self {
            Self {
                bodies: Arc::new(Mutex::new(Vec::new())),
                status,
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0)
            }
        }

        pub fn sent(&self) -> Vec<String> {
            self.bodies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfigureClient for RecordingClient {
        async fn configure(&self, body: String) -> Result<u16> {
            self.bodies.lock().unwrap().push(body);
            if self.fail {
                return Err(Error::Http {
                    url: "http://localhost:9000/__configure".to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self.status)
        }
    }
}
