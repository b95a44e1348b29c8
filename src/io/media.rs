use std::future::Future;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::StatusCode;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};

/// Downloads a remote resource into a local directory.
///
/// Implementations create `dir` when it is missing and overwrite any file
/// already stored under `file_name`.
pub trait MediaFetcher {
    fn fetch(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// [`MediaFetcher`] backed by a plain HTTP(S) GET.
///
/// A non-200 answer yields [`ToolError::HttpStatus`] and leaves the (possibly
/// empty) target file behind. A connection or stream failure yields
/// [`ToolError::Transport`] and removes the partial file.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self, dir), fields(dir = %dir.display()))]
    async fn fetch(&self, url: &str, dir: &Path, file_name: &str) -> Result<PathBuf> {
        info!(url, "downloading file");
        fs::create_dir_all(dir).await?;

        let target = dir.join(file_name);
        let mut file = fs::File::create(&target).await?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(source) => {
                drop(file);
                discard_partial(&target).await;
                return Err(ToolError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        if response.status() != StatusCode::OK {
            return Err(ToolError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    file.write_all(&bytes).await?;
                    written += bytes.len() as u64;
                }
                Err(source) => {
                    drop(file);
                    discard_partial(&target).await;
                    return Err(ToolError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }
        file.flush().await?;

        debug!(bytes = written, path = %target.display(), "download complete");
        Ok(target)
    }
}

async fn discard_partial(path: &Path) {
    if let Err(error) = fs::remove_file(path).await {
        debug!(%error, path = %path.display(), "partial download could not be removed");
    }
}
