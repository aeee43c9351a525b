//! Screen lifecycle hooks
//!
//! Maps a screen's create/show/hide/teardown callbacks onto the music
//! manager. Screens share one manager; the first screen created starts the
//! menu music and later screens find it already running.

use crate::error::Result;
use crate::host::HostEnvironment;
use crate::manager::PlaybackManager;
use crate::types::TrackCategory;
use std::sync::Arc;
use tracing::warn;

/// Adapter between a screen and the shared music manager
pub struct ScreenLifecycle {
    manager: Arc<PlaybackManager>,
    host: Arc<dyn HostEnvironment>,
    volume_percent: u8,
}

impl ScreenLifecycle {
    pub fn new(
        manager: Arc<PlaybackManager>,
        host: Arc<dyn HostEnvironment>,
        volume_percent: u8,
    ) -> Self {
        Self {
            manager,
            host,
            volume_percent,
        }
    }

    pub fn manager(&self) -> &Arc<PlaybackManager> {
        &self.manager
    }

    /// Screen created: initialize and start menu music the first time
    pub fn on_screen_created(&self) -> Result<()> {
        if self.manager.is_initialized() {
            return Ok(());
        }

        self.manager
            .initialize(self.host.as_ref(), self.volume_percent)
            .and_then(|()| self.manager.play(TrackCategory::Menu).map(|_| ()))
            .map_err(|e| {
                warn!("Screen created: music setup failed: {}", e);
                e
            })
    }

    /// Screen visible again
    ///
    /// Harmless right after `on_screen_created`: resuming a playing (or
    /// still preparing) track does nothing.
    pub fn on_screen_shown(&self) -> Result<()> {
        self.manager
            .resume()
            .map_err(|e| {
                warn!("Screen shown: resume failed: {}", e);
                e
            })
    }

    pub fn on_screen_hidden(&self) -> Result<()> {
        self.manager
            .pause()
            .map_err(|e| {
                warn!("Screen hidden: pause failed: {}", e);
                e
            })
    }

    pub fn on_screen_torn_down(&self) {
        self.manager.destroy();
    }
}
