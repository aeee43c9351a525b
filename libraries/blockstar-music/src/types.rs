//! Core types for music playback

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical grouping of interchangeable music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCategory {
    /// Front screen and menus
    Menu,

    /// In-game level music
    Level,
}

impl fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackCategory::Menu => f.write_str("menu"),
            TrackCategory::Level => f.write_str("level"),
        }
    }
}

/// Opaque reference to a bundled audio resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackHandle(pub u32);

impl fmt::Display for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

/// One bundled track registration: which category a resource belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRegistration {
    /// Category the track is registered under
    pub category: TrackCategory,

    /// Bundled resource
    pub handle: TrackHandle,

    /// Resource name, for logging
    #[serde(default)]
    pub name: String,
}

impl TrackRegistration {
    pub fn new(category: TrackCategory, handle: TrackHandle, name: impl Into<String>) -> Self {
        Self {
            category,
            handle,
            name: name.into(),
        }
    }
}

/// Handle of the single bundled menu track
pub const MENU_MUSIC: TrackHandle = TrackHandle(100);

/// Tracks shipped with the game
///
/// Ten level tracks (handles 1..=10) followed by the menu track.
pub fn default_bundle() -> Vec<TrackRegistration> {
    let mut bundle: Vec<TrackRegistration> = (1..=10)
        .map(|n| {
            TrackRegistration::new(
                TrackCategory::Level,
                TrackHandle(n),
                format!("level_music_{}", n),
            )
        })
        .collect();
    bundle.push(TrackRegistration::new(
        TrackCategory::Menu,
        MENU_MUSIC,
        "menu_music",
    ));
    bundle
}

/// Observable manager state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// `initialize` has not been called, or `destroy` has
    Uninitialized,

    /// Initialized, no session
    Idle,

    /// Session created, waiting for the native ready notification
    Preparing,

    /// Session is producing audio
    Playing,

    /// Session exists but is not producing audio
    Paused,
}

/// Track held by the active session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowPlaying {
    pub category: TrackCategory,
    pub index: usize,
    pub handle: TrackHandle,
}
