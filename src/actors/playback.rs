//! Playback clock actor.
//!
//! Advances a display position along a [`TimeAxis`] at a fixed wall-clock
//! cadence and emits the matching instant on every tick. Speed is read from
//! shared settings each tick, so it can change while playing; the tick
//! interval is fixed when the actor is spawned.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::PlaybackConfig;
use crate::timeline::TimeAxis;
use crate::{clog_debug, clog_trace};

use super::ActorHandle;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// User-adjustable playback parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub tick_interval: Duration,
    /// Display milliseconds advanced per wall-clock millisecond.
    pub speed: f64,
    pub looping: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            speed: 1.0,
            looping: false,
        }
    }
}

impl From<&PlaybackConfig> for PlaybackSettings {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            speed: config.speed,
            looping: config.looping,
        }
    }
}

/// One step of the playback clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTick {
    pub instant: DateTime<Utc>,
    pub display_fraction: f64,
    /// Set on the last tick of a non-looping run.
    pub finished: bool,
}

/// Step the display position by `step_ms`.
///
/// Returns the new position and whether playback reached the end. A looping
/// clock wraps to 0 instead of finishing. A non-positive `total_ms` is
/// finished at 0.
pub fn advance_display(current: f64, step_ms: f64, total_ms: f64, looping: bool) -> (f64, bool) {
    if !(total_ms.is_finite() && total_ms > 0.0) {
        return (0.0, true);
    }
    let step = if step_ms.is_finite() { step_ms.max(0.0) } else { 0.0 };
    let next = current.clamp(0.0, total_ms) + step;
    if next < total_ms {
        (next, false)
    } else if looping {
        (0.0, false)
    } else {
        (total_ms, true)
    }
}

/// Actor that drives playback over one time axis.
pub struct PlaybackActor {
    axis: TimeAxis,
    tick_tx: mpsc::UnboundedSender<PlaybackTick>,
    settings: Arc<RwLock<PlaybackSettings>>,
    start_fraction: f64,
}

impl PlaybackActor {
    pub fn new(
        axis: TimeAxis,
        tick_tx: mpsc::UnboundedSender<PlaybackTick>,
        settings: Arc<RwLock<PlaybackSettings>>,
    ) -> Self {
        Self {
            axis,
            tick_tx,
            settings,
            start_fraction: 0.0,
        }
    }

    /// Resume from a scrubber position instead of the beginning.
    pub fn starting_at(mut self, display_fraction: f64) -> Self {
        self.start_fraction = if display_fraction.is_nan() {
            0.0
        } else {
            display_fraction.clamp(0.0, 1.0)
        };
        self
    }

    fn tick_at(&self, display_elapsed: f64, total_ms: f64, finished: bool) -> PlaybackTick {
        let display_fraction = if total_ms > 0.0 {
            display_elapsed / total_ms
        } else {
            0.0
        };
        PlaybackTick {
            instant: self.axis.instant_at_display_fraction(display_fraction),
            display_fraction,
            finished,
        }
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        tokio::spawn(async move {
            let total_ms = self.axis.total_ms();
            let mut display_elapsed = self.start_fraction * total_ms;
            let period = self.settings.read().await.tick_interval.max(Duration::from_millis(1));

            clog_debug!(
                "PlaybackActor::spawn total_ms={} start_fraction={:.3} period_ms={}",
                total_ms,
                self.start_fraction,
                period.as_millis()
            );

            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        clog_debug!("PlaybackActor cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if self.tick_tx.is_closed() {
                            clog_debug!("PlaybackActor: tick channel closed");
                            break;
                        }

                        let (speed, looping) = {
                            let settings = self.settings.read().await;
                            (settings.speed, settings.looping)
                        };
                        let step = period.as_millis() as f64 * speed;
                        let (next, finished) =
                            advance_display(display_elapsed, step, total_ms, looping);
                        display_elapsed = next;

                        let tick = self.tick_at(display_elapsed, total_ms, finished);
                        clog_trace!(
                            "PlaybackActor tick fraction={:.4} finished={}",
                            tick.display_fraction,
                            finished
                        );
                        if self.tick_tx.send(tick).is_err() || finished {
                            clog_debug!("PlaybackActor finished");
                            break;
                        }
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
