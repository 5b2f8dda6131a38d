use crate::domain::{Encoding, EncodingSet, Result};
use async_trait::async_trait;
use url::Url;

/// Port for resolving the playable encodings of a video
#[async_trait]
pub trait StreamResolverPort: Send + Sync {
    /// List the encodings available for `video_id`
    async fn encodings(&self, video_id: &str) -> Result<EncodingSet>;

    /// Turn a selected encoding into a direct fetch URL
    async fn resolve_url(&self, encoding: &Encoding) -> Result<Url>;
}
