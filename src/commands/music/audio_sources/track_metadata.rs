//! Defines the `TrackMetadata` struct and parses it out of `yt-dlp -j` output.

use crate::commands::music::utils::music_manager::MusicError;
use serde::Deserialize;
use std::time::Duration;

/// Metadata for a single resolved track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The extractor's id for the track, used to name downloaded files.
    pub id: Option<String>,
    /// The page URL of the track, if available.
    pub url: Option<String>,
    /// Direct media URL for streaming, if the extractor picked a format.
    pub stream_url: Option<String>,
    /// The duration of the track, if available.
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
}

/// The subset of a `yt-dlp -j` document that is used.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: Option<String>,
    title: Option<String>,
    fulltitle: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    entries: Option<Vec<YtDlpInfo>>,
}

impl TrackMetadata {
    /// Parses the first JSON document printed by `yt-dlp -j`.
    ///
    /// Searches and playlist-style results wrap the track in `entries`; the
    /// first entry is used in that case.
    pub fn from_yt_dlp_json(stdout: &str) -> Result<TrackMetadata, MusicError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| MusicError::ResolutionError("No results found".to_string()))?;

        let mut info: YtDlpInfo = serde_json::from_str(line).map_err(|e| {
            MusicError::ResolutionError(format!("Failed to parse video metadata: {}", e))
        })?;

        if let Some(entries) = info.entries.take() {
            info = entries
                .into_iter()
                .next()
                .ok_or_else(|| MusicError::ResolutionError("No results found".to_string()))?;
        }

        Ok(TrackMetadata {
            title: info
                .title
                .or(info.fulltitle)
                .unwrap_or_else(|| "Unknown Title".to_string()),
            id: info.id,
            url: info.webpage_url,
            stream_url: info.url,
            duration: info
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
            thumbnail: info.thumbnail,
        })
    }
}
