use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search response, reduced to the one rendition we display
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<GifObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GifObject {
    pub images: GifImages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GifImages {
    pub downsized_medium: GifRendition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GifRendition {
    pub url: String,
}

/// Why a lookup fell back; logged, never returned to callers
#[derive(Debug, Error)]
pub enum GifError {
    #[error("empty keyword")]
    EmptyKeyword,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no results")]
    NoResults,

    #[error("invalid image URL '{0}'")]
    InvalidUrl(String),
}

/// `GET /api/gif` answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifResult {
    pub keyword: String,
    pub url: String,
}
