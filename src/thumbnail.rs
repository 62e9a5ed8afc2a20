use async_trait::async_trait;
use eyre::Result;
use log::{debug, warn};
use serde::Deserialize;

use crate::{Error, VideoId};

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Best-effort thumbnail lookup; `None` means "no image"
#[async_trait]
pub trait ThumbnailLookup: Send + Sync {
    async fn thumbnail_url(&self, video_id: &VideoId) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    thumbnail_url: Option<String>,
}

/// Thumbnail URL from YouTube's unauthenticated oEmbed endpoint
pub struct OEmbedThumbnails {
    client: reqwest::Client,
}

impl OEmbedThumbnails {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, video_id: &VideoId) -> Result<Option<String>> {
        let watch_url = video_id.watch_url();
        debug!("Fetching oEmbed metadata for {watch_url}");

        let body = self
            .client
            .get(OEMBED_URL)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_thumbnail(&body)
    }
}

#[async_trait]
impl ThumbnailLookup for OEmbedThumbnails {
    async fn thumbnail_url(&self, video_id: &VideoId) -> Option<String> {
        match self.fetch(video_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!("{}", Error::Thumbnail(e.to_string()));
                None
            }
        }
    }
}

fn parse_thumbnail(body: &str) -> Result<Option<String>> {
    let resp: OEmbedResponse = serde_json::from_str(body)?;
    Ok(resp.thumbnail_url.filter(|url| !url.is_empty()))
}
