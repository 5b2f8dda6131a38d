use crate::domain::Result;
use async_trait::async_trait;
use std::path::Path;
use url::Url;

/// Port for fetching a remote resource into a local file
#[async_trait]
pub trait FileDownloaderPort: Send + Sync {
    /// Download `url` into `destination`, returning the number of bytes written
    async fn download(&self, url: &Url, destination: &Path) -> Result<u64>;
}
