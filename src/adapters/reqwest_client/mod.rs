use async_trait::async_trait;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::domain::{ProxyError, Result};
use crate::ports::FileDownloaderPort;

/// File downloader backed by reqwest, optionally going through an HTTP proxy
pub struct ReqwestDownloader {
    client: reqwest::Client,
}

impl ReqwestDownloader {
    pub fn new(via: Option<&Url>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        match via {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url.as_str())
                    .map_err(|e| ProxyError::InvalidTarget(format!("Invalid proxy URL: {}", e)))?;
                builder = builder.proxy(proxy);
            }
            None => {
                // Ignore *_proxy variables unless a proxy was asked for explicitly
                builder = builder.no_proxy();
            }
        }

        let client = builder
            .build()
            .map_err(|e| ProxyError::DownloadFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FileDownloaderPort for ReqwestDownloader {
    async fn download(&self, url: &Url, destination: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ProxyError::DownloadFailed(format!("GET {}: {}", url, e)))?
            .error_for_status()
            .map_err(|e| ProxyError::DownloadFailed(format!("GET {}: {}", url, e)))?;

        let mut file = File::create(destination)
            .await
            .map_err(|e| ProxyError::DownloadFailed(format!("{}: {}", destination.display(), e)))?;

        match write_body(&mut response, &mut file, url, destination).await {
            Ok(written) => Ok(written),
            Err(e) => {
                // Never leave a truncated file behind.
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                    log::warn!("Failed to remove partial download {}: {}", destination.display(), remove_err);
                }
                Err(e)
            }
        }
    }
}

async fn write_body(response: &mut reqwest::Response, file: &mut File, url: &Url, destination: &Path) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ProxyError::DownloadFailed(format!("GET {}: {}", url, e)))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| ProxyError::DownloadFailed(format!("{}: {}", destination.display(), e)))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| ProxyError::DownloadFailed(format!("{}: {}", destination.display(), e)))?;

    Ok(written)
}
