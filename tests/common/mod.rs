//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

pub mod fixtures;
pub mod mocks;

use coldbot::commands::music::utils::notices::Notice;
use poise::serenity_prelude::ChannelId;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// How long to wait for something the session watcher does in the background
pub const WATCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Waits for the next notice a session posts on its own
pub async fn next_notice(rx: &mut UnboundedReceiver<(ChannelId, Notice)>) -> (ChannelId, Notice) {
    tokio::time::timeout(WATCH_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a notice")
        .expect("notice sink closed")
}

/// Asserts that nothing is posted for a short while
pub async fn assert_quiet(rx: &mut UnboundedReceiver<(ChannelId, Notice)>) {
    let posted = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
    assert!(posted.is_err(), "unexpected notice: {:?}", posted);
}

/// Polls `condition` until it holds, failing the test after [`WATCH_TIMEOUT`]
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(WATCH_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never became true");
}

/// A fresh, empty directory under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("coldbot-it-{}-{}", label, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
