//! Background actors.
//!
//! Each actor is an independent tokio task that talks to its owner through
//! a channel and stops when its [`ActorHandle`] is shut down. The only
//! actor today is the playback clock, which emits instants; consumers pass
//! those instants explicitly into the resolver.

pub mod playback;

use tokio_util::sync::CancellationToken;

pub use playback::{advance_display, PlaybackActor, PlaybackSettings, PlaybackTick};

/// Handle to a running actor, used for graceful shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the actor to stop after its current tick.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ActorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
