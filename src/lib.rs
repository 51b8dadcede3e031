use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

use config::BotConfig;
use utils::counters::Counters;
use utils::intro_toggles::{IntroToggles, load_intro_clips};
use utils::owner::{OwnerCheck, check_owner};

#[cfg(feature = "music")]
use commands::music::utils::music_manager::MusicSessions;
#[cfg(feature = "music")]
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared state, accessible in all command invocations and event handlers
pub struct Data {
    pub config: BotConfig,
    pub counters: Mutex<Counters>,
    pub intros: Mutex<IntroToggles>,
    pub intro_clips: HashMap<u64, PathBuf>,
    /// Last seen "active on web" flag per user, for login notices
    pub web_presence: DashMap<(serenity::GuildId, serenity::UserId), bool>,
    #[cfg(feature = "music")]
    pub sessions: Arc<MusicSessions>,
}

impl Data {
    /// Loads the flat-file stores and wires up the playback registry.
    pub async fn build(ctx: &serenity::Context, config: BotConfig) -> Result<Self, Error> {
        let counters = Counters::load(&config.data_dir)?;
        let intro_clips = load_intro_clips(&config.data_dir)?;
        let intros = IntroToggles::load(config.intro_toggle_file(), intro_clips.keys().copied())?;

        #[cfg(feature = "music")]
        let sessions = {
            use commands::music::audio_sources::youtube::YtDlpResolver;
            use commands::music::utils::{
                music_manager::get_songbird, notices::ChannelNotices,
                session_registry::SessionRegistry, songbird_transport::SongbirdTransport,
            };

            let manager = get_songbird(ctx).await?;
            let resolver = YtDlpResolver::new(
                reqwest::Client::new(),
                config.resolver_mode,
                config.songs_dir.clone(),
            );
            Arc::new(SessionRegistry::new(
                Arc::new(SongbirdTransport::new(manager)),
                Arc::new(resolver),
                Arc::new(ChannelNotices::new(ctx.http.clone())),
                config.queue_poll_interval,
            ))
        };
        #[cfg(not(feature = "music"))]
        let _ = ctx;

        Ok(Self {
            config,
            counters: Mutex::new(counters),
            intros: Mutex::new(intros),
            intro_clips,
            web_presence: DashMap::new(),
            #[cfg(feature = "music")]
            sessions,
        })
    }
}

/// Every command the bot registers
pub fn all_commands() -> Vec<poise::Command<Data, Error>> {
    use commands::{
        admins::{
            delete_all_channels::*, invite_saved_users::*, kick_all::*, monitor_channel::*,
            recreate_roles::*, save_users::*, sync::*,
        },
        general::{id::*, intro::*, ping::*},
    };

    let mut commands = vec![
        // Default commands
        help(),
        sync(),
        // General commands
        ping(),
        id(),
        joined(),
        toggle_intro(),
        // Server commands
        save_users(),
        recreate_roles(),
        invite_saved_users(),
        kick_all(),
        delete_all_channels(),
        monitor_channel(),
    ];

    // Handle Music feature
    #[cfg(feature = "music")]
    {
        use commands::music::{
            clear::*, join::*, leave::*, pause::*, play::*, queue::*, skip::*,
        };

        commands.extend(vec![
            join(),
            leave(),
            play(),
            pause(),
            resume(),
            skip(),
            clear(),
            queue(),
        ]);
    }

    commands
}

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

/// Restricts a command to the configured bot owner
pub async fn owner_only(ctx: Context<'_>) -> Result<bool, Error> {
    let check = check_owner(ctx.author().id, ctx.data().config.owner_id);
    if let Some(refusal) = check.refusal() {
        if check == OwnerCheck::Denied {
            warn!(
                "Unauthorized attempt to use {} by {} ({})",
                ctx.command().name,
                ctx.author().name,
                ctx.author().id
            );
        }
        ctx.say(refusal).await?;
        return Ok(false);
    }
    Ok(true)
}
