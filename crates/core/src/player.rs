//! Canonical video-player events and provider translation.
//!
//! Embedded players emit wildly different event names for the same five
//! things the tracker cares about. Each provider gets a translation table
//! onto one canonical [`PlayerEvent`] union; the tracker only ever
//! consumes the canonical form.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Canonical events
// ---------------------------------------------------------------------------

/// A normalized playback event, independent of the embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PlayerEvent {
    /// Player metadata became available; carries the total duration.
    Metadata { duration_secs: f64 },
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// Playback reached the end of the video.
    Ended,
    /// Periodic position report while playing or after a seek.
    TimeUpdate { position_secs: f64 },
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Supported embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerProvider {
    Html5,
    YouTube,
    Vimeo,
}

impl PlayerProvider {
    /// Convert from a wire string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "html5" => Ok(Self::Html5),
            "youtube" => Ok(Self::YouTube),
            "vimeo" => Ok(Self::Vimeo),
            _ => Err(format!(
                "Unknown player provider '{s}'. Must be one of: html5, youtube, vimeo"
            )),
        }
    }

    /// Translate a provider-native event into the canonical form.
    ///
    /// `payload` carries whatever numeric detail the provider attaches
    /// (`duration`, `seconds`, `currentTime`, ...). Events the tracker has
    /// no use for translate to `None` and are dropped.
    pub fn translate(&self, event_name: &str, payload: &serde_json::Value) -> Option<PlayerEvent> {
        match self {
            Self::Html5 => translate_html5(event_name, payload),
            Self::YouTube => translate_youtube(event_name, payload),
            Self::Vimeo => translate_vimeo(event_name, payload),
        }
    }
}

/// Pull the first present numeric field out of a payload.
fn number_field(payload: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| payload.get(*k).and_then(|v| v.as_f64()))
}

fn translate_html5(event_name: &str, payload: &serde_json::Value) -> Option<PlayerEvent> {
    match event_name {
        "loadedmetadata" | "durationchange" => Some(PlayerEvent::Metadata {
            duration_secs: number_field(payload, &["duration"])?,
        }),
        "play" | "playing" => Some(PlayerEvent::Play),
        "pause" => Some(PlayerEvent::Pause),
        "ended" => Some(PlayerEvent::Ended),
        "timeupdate" => Some(PlayerEvent::TimeUpdate {
            position_secs: number_field(payload, &["currentTime", "position"])?,
        }),
        _ => None,
    }
}

fn translate_youtube(event_name: &str, payload: &serde_json::Value) -> Option<PlayerEvent> {
    match event_name {
        "onReady" | "video-metadata" => Some(PlayerEvent::Metadata {
            duration_secs: number_field(payload, &["duration"])?,
        }),
        "video-play" | "onStateChange.playing" => Some(PlayerEvent::Play),
        "video-pause" | "onStateChange.paused" => Some(PlayerEvent::Pause),
        "video-ended" | "onStateChange.ended" => Some(PlayerEvent::Ended),
        "video-progress" => Some(PlayerEvent::TimeUpdate {
            position_secs: number_field(payload, &["currentTime", "seconds"])?,
        }),
        _ => None,
    }
}

fn translate_vimeo(event_name: &str, payload: &serde_json::Value) -> Option<PlayerEvent> {
    match event_name {
        "loaded" => Some(PlayerEvent::Metadata {
            duration_secs: number_field(payload, &["duration"])?,
        }),
        "play" => Some(PlayerEvent::Play),
        "pause" => Some(PlayerEvent::Pause),
        "ended" | "finish" => Some(PlayerEvent::Ended),
        "timeupdate" | "playProgress" => Some(PlayerEvent::TimeUpdate {
            position_secs: number_field(payload, &["seconds", "currentTime"])?,
        }),
        _ => None,
    }
}
