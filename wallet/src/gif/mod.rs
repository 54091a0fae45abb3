// GIF lookup module
// Resolves an entry keyword to a GIF image URL through a search API

pub mod client;
pub mod types;

pub use client::{GifClient, GifLookup, FALLBACK_GIF_URL};
pub use types::*;
