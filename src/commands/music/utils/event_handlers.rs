use serenity::async_trait;
use songbird::tracks::PlayMode;
use songbird::{Event, EventContext};
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::queue_manager::{CompletionSignal, TrackOutcome};

/// Fires a track's completion signal when songbird reports it ended or failed.
///
/// Registered for both the end and error events; whichever arrives first
/// takes the signal, so it fires at most once.
#[derive(Clone)]
pub struct TrackEndNotifier {
    signal: Arc<Mutex<Option<CompletionSignal>>>,
}

impl TrackEndNotifier {
    pub fn new(signal: CompletionSignal) -> Self {
        Self {
            signal: Arc::new(Mutex::new(Some(signal))),
        }
    }

    fn take(&self) -> Option<CompletionSignal> {
        self.signal.lock().ok()?.take()
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            let outcome = match tracks.first().map(|(state, _)| &state.playing) {
                Some(PlayMode::Errored(err)) => TrackOutcome::Errored(err.to_string()),
                _ => TrackOutcome::Finished,
            };

            if let Some(signal) = self.take() {
                debug!("Track {} ended: {:?}", signal.token(), outcome);
                signal.fire(outcome);
            }
        }
        None
    }
}
