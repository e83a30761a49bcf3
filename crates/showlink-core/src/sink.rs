//! Interface to the application state store.

use crate::DancerStatus;
use serde_json::Value;

/// Consumer of dispatcher output.
///
/// Implemented by the application's state store. The dispatcher only emits
/// intents; the sink owns dancer status and playback state. Methods take
/// `&self` so one sink can be shared between the connection task and the UI.
pub trait StateSink: Send + Sync {
    /// Merge `status` into the record for `name`.
    fn update_dancer_status(&self, name: &str, status: DancerStatus);

    /// Start playback with the payload the relay sent.
    fn start_play(&self, payload: Value);

    fn set_playing(&self, playing: bool);

    fn set_stopped(&self, stopped: bool);
}

impl<S: StateSink + ?Sized> StateSink for std::sync::Arc<S> {
    fn update_dancer_status(&self, name: &str, status: DancerStatus) {
        (**self).update_dancer_status(name, status)
    }

    fn start_play(&self, payload: Value) {
        (**self).start_play(payload)
    }

    fn set_playing(&self, playing: bool) {
        (**self).set_playing(playing)
    }

    fn set_stopped(&self, stopped: bool) {
        (**self).set_stopped(stopped)
    }
}
