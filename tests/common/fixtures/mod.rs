//! Test fixtures for the coldbot Discord bot
//! This module contains sample ids and requests used in tests

use poise::serenity_prelude::{ChannelId, GuildId};

/// Sample guild the sessions play in
pub fn guild() -> GuildId {
    GuildId::new(111111111)
}

/// A second guild, for isolation checks
pub fn other_guild() -> GuildId {
    GuildId::new(222222222)
}

/// Voice channel the requesting user sits in
pub fn voice_channel() -> ChannelId {
    ChannelId::new(333333333)
}

/// Text channel the commands were issued from
pub fn text_channel() -> ChannelId {
    ChannelId::new(444444444)
}

/// A request the fake resolver refuses
pub const UNRESOLVABLE: &str = "https://www.youtube.com/playlist?list=PL123";
