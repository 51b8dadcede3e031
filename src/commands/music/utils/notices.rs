//! Status messages a playback session posts to the channel that started it.

use serenity::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::embedded_messages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NowPlaying { title: String },
    Queued { title: String, position: usize },
    Paused { title: String },
    Resumed { title: String },
    Skipped { title: String },
    Cleared { removed: usize },
    QueueFinished,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NowPlaying { title } => write!(f, "now playing {}", title),
            Notice::Queued { title, .. } => write!(f, "queued {}", title),
            Notice::Paused { title } => write!(f, "paused {}", title),
            Notice::Resumed { title } => write!(f, "resumed {}", title),
            Notice::Skipped { title } => write!(f, "skipped {}", title),
            Notice::Cleared { removed } => write!(f, "cleared {} from the queue", removed),
            Notice::QueueFinished => f.write_str("queue finished"),
        }
    }
}

/// Somewhere to deliver notices produced outside a command invocation
#[async_trait]
pub trait NoticeSink: Send + Sync {
    async fn deliver(&self, channel_id: ChannelId, notice: &Notice);
}

/// Posts notices as embeds in a Discord text channel
pub struct ChannelNotices {
    http: Arc<Http>,
}

impl ChannelNotices {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NoticeSink for ChannelNotices {
    async fn deliver(&self, channel_id: ChannelId, notice: &Notice) {
        let message = CreateMessage::new().embed(embedded_messages::notice_embed(notice));
        if let Err(e) = channel_id.send_message(&self.http, message).await {
            warn!("Failed to post '{}' to channel {}: {}", notice, channel_id, e);
        }
    }
}
