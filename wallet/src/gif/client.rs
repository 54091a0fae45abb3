use reqwest::Url;
use tokio::sync::Mutex;

use super::types::{GifError, SearchResponse};
use crate::config::WalletConfig;

/// Shown whenever a lookup does not produce an image
pub const FALLBACK_GIF_URL: &str = "https://metro.co.uk/wp-content/uploads/2015/05/pokemon_crying.gif?quality=90&strip=all&zoom=1&resize=500%2C284";

#[derive(Clone, Debug)]
pub struct GifClient {
    client: reqwest::Client,
    search_url: String,
    api_key: String,
}

impl GifClient {
    pub fn new(search_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            search_url: search_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.gif_search_url.clone(), config.gif_api_key.clone())
    }

    /// Image URL for `keyword`, or [`FALLBACK_GIF_URL`] on any failure
    pub async fn search(&self, keyword: &str) -> String {
        match self.try_search(keyword).await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("GIF lookup for '{}' failed: {}", keyword, e);
                FALLBACK_GIF_URL.to_string()
            }
        }
    }

    async fn try_search(&self, keyword: &str) -> Result<String, GifError> {
        let query = search_term(keyword);
        if query.is_empty() {
            return Err(GifError::EmptyKeyword);
        }

        let response: SearchResponse = self
            .client
            .get(&self.search_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let url = response
            .data
            .into_iter()
            .next()
            .map(|gif| gif.images.downsized_medium.url)
            .ok_or(GifError::NoResults)?;

        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url),
            _ => Err(GifError::InvalidUrl(url)),
        }
    }
}

/// Remembers the last keyword's result so an unchanged keyword is not
/// searched again
#[derive(Debug)]
pub struct GifLookup {
    client: GifClient,
    last: Mutex<Option<(String, String)>>,
}

impl GifLookup {
    pub fn new(client: GifClient) -> Self {
        Self {
            client,
            last: Mutex::new(None),
        }
    }

    /// The memo lock is released while the search runs, so concurrent
    /// lookups never wait on each other's requests
    pub async fn lookup(&self, keyword: &str) -> String {
        if let Some((cached_keyword, url)) = self.last.lock().await.as_ref() {
            if cached_keyword == keyword {
                return url.clone();
            }
        }

        let url = self.client.search(keyword).await;
        *self.last.lock().await = Some((keyword.to_string(), url.clone()));
        url
    }
}

/// The search API treats the keyword as a single tag, so spaces are dropped
fn search_term(keyword: &str) -> String {
    keyword.replace(' ', "")
}
