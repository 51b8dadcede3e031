//! This module aggregates all the command modules for the bot.

/// Owner-only server administration (snapshots, wipes, command sync).
pub(crate) mod admins;
/// General purpose commands (e.g., ping, id, intros).
pub(crate) mod general;

/// Commands related to music playback (requires the `music` feature).
#[cfg(feature = "music")]
pub mod music;
