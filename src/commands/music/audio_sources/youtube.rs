//! Implements the `AudioResolver` trait with the `yt-dlp` command-line tool.
//! Supports direct streaming of the chosen audio format, or downloading to a
//! local mp3 that is deleted once the track leaves the queue.

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::music::utils::queue_manager::QueueItem;
use crate::config::ResolverMode;
use serenity::async_trait;
use songbird::input::{File, HttpRequest, Input};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioResolver, AudioSource, TrackMetadata};

/// Resolves requests through `yt-dlp`.
pub struct YtDlpResolver {
    http: reqwest::Client,
    mode: ResolverMode,
    songs_dir: PathBuf,
    downloads: AtomicU64,
}

impl YtDlpResolver {
    pub fn new(http: reqwest::Client, mode: ResolverMode, songs_dir: PathBuf) -> Self {
        Self {
            http,
            mode,
            songs_dir,
            downloads: AtomicU64::new(0),
        }
    }

    /// Turns a request into the target yt-dlp understands: URLs pass through,
    /// anything else becomes a single-result YouTube search.
    fn target(locator: &str) -> MusicResult<String> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(MusicError::ResolutionError(
                "Nothing to search for".to_string(),
            ));
        }
        if AudioSource::is_playlist(locator) {
            return Err(MusicError::ResolutionError(
                "Playlists are not supported, queue a single track instead".to_string(),
            ));
        }

        if AudioSource::is_url(locator) {
            Ok(locator.to_string())
        } else {
            Ok(format!("ytsearch1:{}", locator))
        }
    }

    /// Each download gets its own slot so two requests for one video never
    /// share, or delete, each other's file.
    fn next_slot(&self) -> u64 {
        self.downloads.fetch_add(1, Ordering::Relaxed)
    }

    fn output_template(&self, slot: u64) -> PathBuf {
        self.songs_dir.join(format!("%(id)s-{}.%(ext)s", slot))
    }

    fn scratch_path(&self, id: &str, slot: u64) -> PathBuf {
        self.songs_dir.join(format!("{}-{}.mp3", id, slot))
    }

    async fn stream(&self, target: &str) -> MusicResult<QueueItem<Input>> {
        let stdout = run_yt_dlp(&["-j", "--no-playlist", "-f", "bestaudio/best", target]).await?;
        let metadata = TrackMetadata::from_yt_dlp_json(&stdout)?;

        let stream_url = metadata.stream_url.clone().ok_or_else(|| {
            MusicError::ResolutionError(format!("No playable format for '{}'", metadata.title))
        })?;
        let locator = metadata.url.clone().unwrap_or_else(|| stream_url.clone());
        let input: Input = HttpRequest::new(self.http.clone(), stream_url).into();

        info!("Resolved '{}' for streaming", metadata.title);
        Ok(QueueItem::new(metadata.title, locator, input).with_duration(metadata.duration))
    }

    async fn download(&self, target: &str) -> MusicResult<QueueItem<Input>> {
        tokio::fs::create_dir_all(&self.songs_dir)
            .await
            .map_err(|e| {
                MusicError::ResolutionError(format!(
                    "Failed to create {}: {}",
                    self.songs_dir.display(),
                    e
                ))
            })?;

        let slot = self.next_slot();
        let template = self.output_template(slot);
        let template = template.to_string_lossy();
        let stdout = run_yt_dlp(&[
            "-j",
            "--no-simulate",
            "--no-playlist",
            "-f",
            "bestaudio/best",
            "-x",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "192K",
            "-o",
            &*template,
            target,
        ])
        .await?;
        let metadata = TrackMetadata::from_yt_dlp_json(&stdout)?;

        let id = metadata.id.as_deref().ok_or_else(|| {
            MusicError::ResolutionError(format!("No id reported for '{}'", metadata.title))
        })?;
        let path = self.scratch_path(id, slot);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(MusicError::ResolutionError(format!(
                "Download of '{}' produced no audio file",
                metadata.title
            )));
        }

        info!("Downloaded '{}' to {}", metadata.title, path.display());
        let input: Input = File::new(path.clone()).into();
        Ok(QueueItem::new(metadata.title, path.display().to_string(), input)
            .with_duration(metadata.duration)
            .with_scratch_file(path))
    }
}

#[async_trait]
impl AudioResolver for YtDlpResolver {
    type Stream = Input;

    async fn resolve(&self, locator: &str) -> MusicResult<QueueItem<Input>> {
        let target = Self::target(locator)?;
        debug!("Resolving '{}' in {:?} mode", target, self.mode);

        match self.mode {
            ResolverMode::Stream => self.stream(&target).await,
            ResolverMode::Download => self.download(&target).await,
        }
    }
}

/// Runs yt-dlp and returns its stdout, turning failures into resolution errors.
async fn run_yt_dlp(args: &[&str]) -> MusicResult<String> {
    let output = Command::new("yt-dlp")
        .args(args)
        .output()
        .await
        .map_err(|e| MusicError::ResolutionError(format!("Failed to run yt-dlp: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("yt-dlp exited with an error");
        return Err(MusicError::ResolutionError(reason.trim().to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
