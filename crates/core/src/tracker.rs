//! Watch-time accumulation for a single video view.
//!
//! One [`WatchSession`] owns all mutable tracker state for one
//! (user, lesson) playback view. It consumes canonical [`PlayerEvent`]s
//! plus fixed-cadence ticks and decides when a synchronization push to
//! the video-completion store is due. All updates are pure functions of
//! `(state, input, now)`, so the accumulation logic is testable without
//! a real player.
//!
//! Watch time is credited from wall-clock deltas between ticks, never
//! from reported playback positions, and a tick whose delta exceeds
//! [`TrackerConfig::max_tick_gap_secs`] is discarded entirely. That
//! filters out backgrounded tabs, seeks, and clock jumps that would
//! otherwise inflate the measurement.

use crate::player::PlayerEvent;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Fraction of the total duration that marks a video complete.
pub const COMPLETION_THRESHOLD: f64 = 0.80;

/// Accumulated watched seconds between periodic sync pushes.
pub const SYNC_INTERVAL_WATCHED_SECS: f64 = 15.0;

/// Largest wall-clock gap between ticks that still earns credit.
pub const MAX_TICK_GAP_SECS: f64 = 3.0;

/// Grace period before a missing `metadata` event triggers the fallback
/// duration.
pub const METADATA_GRACE_SECS: f64 = 10.0;

/// Assumed duration when the player never reported one. Keeps the
/// progress bar meaningful; never sufficient to mark a video complete.
pub const FALLBACK_DURATION_SECS: f64 = 600.0;

/// Tunable knobs for a [`WatchSession`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub completion_threshold: f64,
    pub sync_interval_watched_secs: f64,
    pub max_tick_gap_secs: f64,
    pub metadata_grace_secs: f64,
    pub fallback_duration_secs: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            completion_threshold: COMPLETION_THRESHOLD,
            sync_interval_watched_secs: SYNC_INTERVAL_WATCHED_SECS,
            max_tick_gap_secs: MAX_TICK_GAP_SECS,
            metadata_grace_secs: METADATA_GRACE_SECS,
            fallback_duration_secs: FALLBACK_DURATION_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Sync requests
// ---------------------------------------------------------------------------

/// Why a sync push was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReason {
    /// Another `sync_interval_watched_secs` of watch time accumulated.
    Interval,
    /// The completion threshold was just crossed and the server has not
    /// confirmed completion yet.
    ThresholdCrossed,
    /// The player reported `ended`; completion is forced.
    Ended,
    /// Final best-effort flush on page/tab teardown.
    Teardown,
}

/// Payload for one push to the video-completion store.
///
/// The server merges (max watch time, OR completed), so a stale or
/// duplicated request can never erase progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    pub watch_time_secs: f64,
    pub total_time_secs: f64,
    pub last_position_secs: f64,
    pub completed: bool,
    pub reason: SyncReason,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Accumulator state for one lesson view.
#[derive(Debug, Clone)]
pub struct WatchSession {
    config: TrackerConfig,
    started_at: Timestamp,
    /// Duration as reported by the player, if `metadata` ever arrived.
    reported_duration_secs: Option<f64>,
    playing: bool,
    watch_time_secs: f64,
    last_position_secs: f64,
    /// Sticky local completion flag for the remainder of the session.
    completed: bool,
    /// Whether the server already holds `completed = true` for this
    /// lesson; suppresses redundant threshold pushes.
    server_completed: bool,
    last_tick_at: Option<Timestamp>,
    watch_time_at_last_sync: f64,
}

impl WatchSession {
    pub fn new(config: TrackerConfig, now: Timestamp) -> Self {
        Self {
            config,
            started_at: now,
            reported_duration_secs: None,
            playing: false,
            watch_time_secs: 0.0,
            last_position_secs: 0.0,
            completed: false,
            server_completed: false,
            last_tick_at: None,
            watch_time_at_last_sync: 0.0,
        }
    }

    /// Seed the session from the stored server record, so a resumed view
    /// continues accumulating on top of prior credit instead of from zero.
    pub fn with_server_state(mut self, watch_time_secs: f64, completed: bool) -> Self {
        self.watch_time_secs = watch_time_secs.max(0.0);
        self.watch_time_at_last_sync = self.watch_time_secs;
        self.completed = completed;
        self.server_completed = completed;
        self
    }

    pub fn watch_time_secs(&self) -> f64 {
        self.watch_time_secs
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Duration used for progress math: the reported one, or the
    /// fallback once the metadata grace period has passed.
    pub fn effective_duration_secs(&self, now: Timestamp) -> Option<f64> {
        if let Some(d) = self.reported_duration_secs {
            return Some(d);
        }
        if secs_between(self.started_at, now) >= self.config.metadata_grace_secs {
            return Some(self.config.fallback_duration_secs);
        }
        None
    }

    /// Completion rate in percent (0-100) for display purposes.
    pub fn completion_rate(&self, now: Timestamp) -> f64 {
        match self.effective_duration_secs(now) {
            Some(d) if d > 0.0 => (self.watch_time_secs / d * 100.0).min(100.0),
            _ => 0.0,
        }
    }

    /// Record that the server confirmed `completed = true`.
    pub fn mark_server_completed(&mut self) {
        self.server_completed = true;
    }

    // -----------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------

    /// Consume one canonical player event.
    pub fn apply(&mut self, event: PlayerEvent, now: Timestamp) -> Option<SyncRequest> {
        match event {
            PlayerEvent::Metadata { duration_secs } => {
                if duration_secs > 0.0 {
                    self.reported_duration_secs = Some(duration_secs);
                    // Credit accumulated earlier may already cross the
                    // threshold once the real duration is known.
                    return self.check_threshold();
                }
                None
            }
            PlayerEvent::Play => {
                self.playing = true;
                self.last_tick_at = Some(now);
                None
            }
            PlayerEvent::Pause => {
                self.playing = false;
                self.last_tick_at = None;
                None
            }
            PlayerEvent::TimeUpdate { position_secs } => {
                if position_secs >= 0.0 {
                    self.last_position_secs = position_secs;
                }
                None
            }
            PlayerEvent::Ended => {
                self.playing = false;
                self.last_tick_at = None;
                // `ended` is authoritative: force completion regardless
                // of the accumulated measurement.
                self.completed = true;
                if let Some(d) = self.reported_duration_secs {
                    self.last_position_secs = d;
                }
                self.watch_time_at_last_sync = self.watch_time_secs;
                Some(self.sync_request(SyncReason::Ended, now))
            }
        }
    }

    /// Credit one fixed-cadence tick of wall-clock playback time.
    pub fn tick(&mut self, now: Timestamp) -> Option<SyncRequest> {
        if !self.playing {
            return None;
        }
        let Some(prev) = self.last_tick_at else {
            self.last_tick_at = Some(now);
            return None;
        };
        let delta = secs_between(prev, now);
        self.last_tick_at = Some(now);

        // Over-gap or backwards ticks are discarded, not clamped.
        if delta <= 0.0 || delta > self.config.max_tick_gap_secs {
            return None;
        }
        self.watch_time_secs += delta;

        if let Some(req) = self.check_threshold_sync(now) {
            return Some(req);
        }
        if self.watch_time_secs - self.watch_time_at_last_sync
            >= self.config.sync_interval_watched_secs
        {
            self.watch_time_at_last_sync = self.watch_time_secs;
            return Some(self.sync_request(SyncReason::Interval, now));
        }
        None
    }

    /// Final best-effort flush on teardown. Returns `None` when there is
    /// nothing the server does not already know.
    pub fn flush(&mut self, now: Timestamp) -> Option<SyncRequest> {
        let unsynced_time = self.watch_time_secs > self.watch_time_at_last_sync;
        let unsynced_completion = self.completed && !self.server_completed;
        if !unsynced_time && !unsynced_completion {
            return None;
        }
        self.watch_time_at_last_sync = self.watch_time_secs;
        Some(self.sync_request(SyncReason::Teardown, now))
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Set the sticky completed flag if the threshold is crossed against
    /// a *reported* duration. The fallback duration never completes.
    fn check_threshold(&mut self) -> Option<SyncRequest> {
        let d = self.reported_duration_secs?;
        if !self.completed && d > 0.0 && self.watch_time_secs >= self.config.completion_threshold * d
        {
            self.completed = true;
        }
        None
    }

    fn check_threshold_sync(&mut self, now: Timestamp) -> Option<SyncRequest> {
        let was_completed = self.completed;
        self.check_threshold();
        if self.completed && !was_completed && !self.server_completed {
            self.watch_time_at_last_sync = self.watch_time_secs;
            return Some(self.sync_request(SyncReason::ThresholdCrossed, now));
        }
        None
    }

    fn sync_request(&self, reason: SyncReason, now: Timestamp) -> SyncRequest {
        SyncRequest {
            watch_time_secs: self.watch_time_secs,
            total_time_secs: self.effective_duration_secs(now).unwrap_or(0.0),
            last_position_secs: self.last_position_secs,
            completed: self.completed,
            reason,
        }
    }
}

fn secs_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}
