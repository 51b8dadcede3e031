//! This module defines how user requests become playable queue items.
//! It provides the `AudioResolver` seam used by the session registry and the
//! yt-dlp backed implementation the bot runs with.

/// Submodule defining the `TrackMetadata` struct parsed from yt-dlp output.
pub(crate) mod track_metadata;
/// Submodule implementing the `AudioResolver` trait on top of yt-dlp.
pub mod youtube;

use crate::commands::music::utils::music_manager::MusicResult;
use crate::commands::music::utils::queue_manager::QueueItem;
use serenity::async_trait;
use track_metadata::TrackMetadata;
use url::Url;

/// Trait defining how a URL or free-text search becomes a queue item.
/// Requires `Send + Sync` to be safely shared by the session registry.
#[async_trait]
pub trait AudioResolver: Send + Sync {
    /// The stream handle carried by resolved items.
    type Stream: Send + 'static;

    /// Resolves `locator` into a titled, playable item.
    ///
    /// # Arguments
    ///
    /// * `locator` - A media URL or a search query.
    ///
    /// # Returns
    ///
    /// The resolved item, or `MusicError::ResolutionError` when nothing playable was found.
    async fn resolve(&self, locator: &str) -> MusicResult<QueueItem<Self::Stream>>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as a URL.
    /// Does not validate if the URL is actually reachable.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }

    /// Checks whether a URL points at a playlist rather than a single track.
    /// Free-text searches are never treated as playlists.
    pub fn is_playlist(input: &str) -> bool {
        let Ok(url) = Url::parse(input) else {
            return false;
        };
        url.path().contains("playlist") || url.query_pairs().any(|(key, _)| key == "list")
    }
}
