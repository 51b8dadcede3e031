//! This module aggregates various utility submodules used throughout the application.

/// Your-mom and swear counters persisted per guild.
pub mod counters;
/// Intro clip mapping and per-user intro switches.
pub mod intro_toggles;
/// Owner-only command gating.
pub mod owner;
/// Member and role snapshots used to rebuild a server.
pub mod snapshots;
/// Shared flat-file helpers and the store error type.
pub mod store;
