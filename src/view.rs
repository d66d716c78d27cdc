//! Dashboard read model.
//!
//! A [`Dashboard`] owns one snapshot and everything derived from it. The
//! derived set is rebuilt as a whole whenever the snapshot is replaced and
//! stamped with a fresh version, so a [`Frame`] never mixes outputs of two
//! snapshots. The display instant is the only state that survives a swap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use crate::actors::{ActorHandle, PlaybackActor, PlaybackSettings, PlaybackTick};
use crate::agent::{active_agents_at, AgentId};
use crate::config::Config;
use crate::core::message::{detect_duplicates, messages_until};
use crate::core::{DependencyGraph, DuplicateGroup, Message, MirrorDivergence, Snapshot, TaskId};
use crate::diagnostics::{
    issues_visible_at, Analyzer, DiagnosticIssue, HealthMetrics, HealthScorer, ProjectMetrics,
};
use crate::timeline::{resolve, resolve_all, TaskBar, TaskState, TimeAxis};
use crate::{clog, clog_debug, clog_warn, Error, Result};

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Next derived-set version; strictly increasing across the process.
pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Everything computed once per snapshot.
#[derive(Debug)]
struct Derived {
    version: u64,
    graph: DependencyGraph,
    issues: Vec<DiagnosticIssue>,
    health: HealthMetrics,
    metrics: ProjectMetrics,
    duplicates: Vec<DuplicateGroup>,
    divergences: Vec<MirrorDivergence>,
    axis: Option<TimeAxis>,
}

impl Derived {
    fn compute(snapshot: &Snapshot, config: &Config) -> Self {
        let graph = DependencyGraph::from_tasks(&snapshot.tasks);
        let issues = Analyzer::new(config.analyzer()).analyze_graph(&snapshot.tasks, &graph);
        let health = HealthScorer::new(config.weights).score(&issues, &snapshot.tasks);
        let divergences = graph.mirror_divergences(&snapshot.tasks);

        let axis = match snapshot.time_axis(config.time_scale().exponent()) {
            Ok(axis) => Some(axis),
            Err(Error::NoTimeAxis) => None,
            Err(e) => {
                clog_warn!("Dashboard: snapshot {} has no usable time axis: {}", snapshot.id.short(), e);
                None
            }
        };

        Self {
            version: next_version(),
            issues,
            health,
            metrics: ProjectMetrics::compute(snapshot),
            duplicates: detect_duplicates(
                &snapshot.messages,
                config.diagnostics.duplicate_window(),
            ),
            divergences,
            axis,
            graph,
        }
    }
}

/// What to draw at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Version of the derived set this frame was built from.
    pub version: u64,
    pub instant: DateTime<Utc>,
    pub display_fraction: f64,
    pub task_states: HashMap<TaskId, TaskState>,
    pub task_bars: Vec<TaskBar>,
    /// Messages sent up to `instant`, oldest first.
    pub messages: Vec<Message>,
    /// Issues already detected at `instant`.
    pub issues: Vec<DiagnosticIssue>,
    pub active_agents: Vec<AgentId>,
}

impl Frame {
    pub fn state(&self, id: &TaskId) -> Option<&TaskState> {
        self.task_states.get(id)
    }
}

#[derive(Debug)]
pub struct Dashboard {
    config: Config,
    snapshot: Snapshot,
    derived: Derived,
    display_instant: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(snapshot: Snapshot, config: Config) -> Self {
        let derived = Derived::compute(&snapshot, &config);
        let display_instant = derived.axis.map(|axis| axis.start());
        clog_debug!(
            "Dashboard::new snapshot={} version={} issues={} score={}",
            snapshot.id.short(),
            derived.version,
            derived.issues.len(),
            derived.health.score
        );
        Self {
            config,
            snapshot,
            derived,
            display_instant,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn version(&self) -> u64 {
        self.derived.version
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.derived.graph
    }

    pub fn issues(&self) -> &[DiagnosticIssue] {
        &self.derived.issues
    }

    pub fn health(&self) -> &HealthMetrics {
        &self.derived.health
    }

    pub fn metrics(&self) -> &ProjectMetrics {
        &self.derived.metrics
    }

    pub fn duplicates(&self) -> &[DuplicateGroup] {
        &self.derived.duplicates
    }

    pub fn mirror_divergences(&self) -> &[MirrorDivergence] {
        &self.derived.divergences
    }

    pub fn time_axis(&self) -> Option<&TimeAxis> {
        self.derived.axis.as_ref()
    }

    pub fn display_instant(&self) -> Option<DateTime<Utc>> {
        self.display_instant
    }

    fn axis(&self) -> Result<TimeAxis> {
        self.derived.axis.ok_or(Error::NoTimeAxis)
    }

    /// Move the display instant, clamped onto the axis.
    pub fn seek(&mut self, instant: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let clamped = self.axis()?.clamp(instant);
        self.display_instant = Some(clamped);
        Ok(clamped)
    }

    /// Move the display instant to a scrubber position.
    pub fn seek_fraction(&mut self, display_fraction: f64) -> Result<DateTime<Utc>> {
        let instant = self.axis()?.instant_at_display_fraction(display_fraction);
        self.display_instant = Some(instant);
        Ok(instant)
    }

    /// Follow a playback tick.
    pub fn apply_tick(&mut self, tick: &PlaybackTick) -> Result<DateTime<Utc>> {
        self.seek(tick.instant)
    }

    /// Frame at an explicit instant; the display instant is left alone.
    ///
    /// # Errors
    /// `Error::NoTimeAxis` when the snapshot lacks a time bound.
    pub fn frame_at(&self, instant: DateTime<Utc>) -> Result<Frame> {
        let axis = self.axis()?;
        let instant = axis.clamp(instant);
        let tasks = &self.snapshot.tasks;

        let active_agents = active_agents_at(&self.snapshot, instant);

        Ok(Frame {
            version: self.derived.version,
            instant,
            display_fraction: axis.display_fraction(instant),
            task_states: resolve_all(tasks, instant),
            task_bars: tasks.iter().map(|task| axis.task_bar(task)).collect(),
            messages: messages_until(&self.snapshot.messages, instant)
                .into_iter()
                .cloned()
                .collect(),
            issues: issues_visible_at(&self.derived.issues, instant)
                .into_iter()
                .cloned()
                .collect(),
            active_agents,
        })
    }

    /// State of a single task at `instant`, for a detail panel.
    pub fn task_state_at(&self, id: &TaskId, instant: DateTime<Utc>) -> Result<TaskState> {
        let task = self.snapshot.require_task(id)?;
        Ok(resolve(task, self.axis()?.clamp(instant)))
    }

    /// Frame at the current display instant.
    pub fn current_frame(&self) -> Result<Frame> {
        let axis = self.axis()?;
        self.frame_at(self.display_instant.unwrap_or_else(|| axis.start()))
    }

    /// Swap in a newer snapshot.
    ///
    /// Every derived value is recomputed before the swap is visible. The
    /// display instant is kept, clamped into the new axis; with no previous
    /// instant playback starts at the new axis start. Returns the new version.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> u64 {
        let derived = Derived::compute(&snapshot, &self.config);
        let display_instant = match (self.display_instant, derived.axis) {
            (Some(instant), Some(axis)) => Some(axis.clamp(instant)),
            (None, Some(axis)) => Some(axis.start()),
            (instant, None) => instant,
        };

        clog!(
            "Dashboard::replace_snapshot {} -> {} version {} -> {}",
            self.snapshot.id.short(),
            snapshot.id.short(),
            self.derived.version,
            derived.version
        );

        self.snapshot = snapshot;
        self.derived = derived;
        self.display_instant = display_instant;
        self.derived.version
    }

    /// Playback settings from the configuration.
    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings::from(&self.config.playback)
    }

    /// Start a playback clock from the current display position. Must be
    /// called inside a tokio runtime.
    pub fn start_playback(
        &self,
        tick_tx: mpsc::UnboundedSender<PlaybackTick>,
        settings: Arc<RwLock<PlaybackSettings>>,
    ) -> Result<ActorHandle> {
        let axis = self.axis()?;
        let fraction = self
            .display_instant
            .map_or(0.0, |instant| axis.display_fraction(instant));
        Ok(PlaybackActor::new(axis, tick_tx, settings)
            .starting_at(fraction)
            .spawn())
    }
}
