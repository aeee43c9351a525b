//! Music manager - owns the catalog and the single active native player
//!
//! Lifecycle: `Uninitialized → Idle → Playing ⇄ Paused → Idle → Uninitialized`.
//! All state lives behind one mutex because the native ready notification
//! arrives on a host-managed thread.

use crate::{
    catalog::Catalog,
    config::MusicConfig,
    error::{MusicError, Result},
    host::{AudioService, HostEnvironment, ReadyCallback},
    session::{Session, SessionToken},
    types::{default_bundle, NowPlaying, PlaybackState, TrackCategory, TrackRegistration},
    volume::{check_percent, Volume},
};
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info};

/// State that exists between `initialize` and `destroy`
struct Bound {
    service: Arc<dyn AudioService>,
    catalog: Catalog,
    volume: Volume,
    session: Option<Session>,
}

impl Bound {
    fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
    }

    fn session_mut(&mut self, operation: &str) -> Result<&mut Session> {
        self.session.as_mut().ok_or_else(|| {
            MusicError::invalid_operation(format!("{} called before play", operation))
        })
    }
}

#[derive(Default)]
struct Inner {
    bound: Option<Bound>,

    /// Last issued session token, kept across initialize/destroy cycles
    last_token: SessionToken,
}

impl Inner {
    fn bound(&self) -> Result<&Bound> {
        self.bound.as_ref().ok_or(MusicError::NotInitialized)
    }

    fn bound_mut(&mut self) -> Result<&mut Bound> {
        self.bound.as_mut().ok_or(MusicError::NotInitialized)
    }
}

/// Background music manager
///
/// Owned by the composition root and shared by reference (usually an `Arc`).
/// Every public operation other than `initialize` and `destroy` fails with
/// [`MusicError::NotInitialized`] until `initialize` succeeds.
pub struct PlaybackManager {
    bundle: Vec<TrackRegistration>,
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackManager {
    /// Create a manager that will register the given tracks on initialize
    pub fn new(bundle: Vec<TrackRegistration>) -> Self {
        Self {
            bundle,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn from_config(config: &MusicConfig) -> Self {
        Self::new(config.tracks.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind to the host audio service and build the catalog
    ///
    /// Does nothing if the manager is already initialized.
    pub fn initialize(&self, host: &dyn HostEnvironment, volume_percent: u8) -> Result<()> {
        let mut inner = self.lock();
        if inner.bound.is_some() {
            debug!("Music manager already initialized, ignoring initialize");
            return Ok(());
        }

        check_percent(volume_percent)?;
        let service = host
            .audio_service()
            .ok_or_else(|| MusicError::invalid_argument("host has no audio service"))?;

        let volume = Volume::new(service.max_stream_gain(), volume_percent)?;
        let catalog = Catalog::from_registrations(&self.bundle);

        info!(
            "Music manager initialized: {} tracks, volume {}% (gain {:.3})",
            self.bundle.len(),
            volume.percent(),
            volume.gain()
        );

        inner.bound = Some(Bound {
            service,
            catalog,
            volume,
            session: None,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().bound.is_some()
    }

    /// Number of tracks registered for a category
    pub fn track_count(&self, category: TrackCategory) -> Result<usize> {
        self.lock().bound()?.catalog.count(category)
    }

    /// Change the volume setting
    ///
    /// Applied to the active player immediately without interrupting it.
    pub fn set_volume_percent(&self, percent: u8) -> Result<()> {
        let mut inner = self.lock();
        let bound = inner.bound_mut()?;
        bound.volume.set_percent(percent)?;

        let gain = bound.volume.gain();
        if let Some(session) = bound.session.as_mut() {
            session.set_gain(gain);
        }
        debug!("Volume set to {}% (gain {:.3})", percent, gain);
        Ok(())
    }

    pub fn volume_percent(&self) -> Result<u8> {
        Ok(self.lock().bound()?.volume.percent())
    }

    /// Gain currently applied to native players
    pub fn gain(&self) -> Result<f32> {
        Ok(self.lock().bound()?.volume.gain())
    }

    /// Play a random track of the given category
    ///
    /// Returns the index that was picked.
    pub fn play(&self, category: TrackCategory) -> Result<usize> {
        let count = self.track_count(category)?;
        let index = rand::thread_rng().gen_range(0..count);
        self.play_track(category, index)?;
        Ok(index)
    }

    /// Play a specific track of the given category
    ///
    /// Tears down the previous player first. Returns once the new player is
    /// created and configured; audio starts when the host reports the track
    /// as prepared.
    pub fn play_track(&self, category: TrackCategory, index: usize) -> Result<()> {
        let mut inner = self.lock();
        let token = inner.last_token + 1;
        let bound = inner.bound_mut()?;
        let handle = bound.catalog.track(category, index)?;

        bound.stop();

        let mut player = bound.service.create_player(handle)?;
        player.set_looping(true);
        player.set_gain(bound.volume.gain());
        let subscription = player.subscribe_ready(self.ready_callback(token));

        let now_playing = NowPlaying {
            category,
            index,
            handle,
        };
        bound.session = Some(Session::new(token, now_playing, player, subscription));
        inner.last_token = token;

        info!(
            "Playing {} #{} ({}), session {}",
            category, index, handle, token
        );
        Ok(())
    }

    fn ready_callback(&self, token: SessionToken) -> ReadyCallback {
        let inner = Arc::downgrade(&self.inner);
        Arc::new(move || deliver_ready(&inner, token))
    }

    /// Start the player again after `pause`
    pub fn resume(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.bound_mut()?.session_mut("resume")?.resume();
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.bound_mut()?.session_mut("pause")?.pause();
        Ok(())
    }

    /// Tear down the active player, keeping the manager initialized
    pub(crate) fn stop(&self) -> Result<()> {
        self.lock().bound_mut()?.stop();
        Ok(())
    }

    /// Tear down everything and return to `Uninitialized`
    ///
    /// Safe to call repeatedly.
    pub fn destroy(&self) {
        let mut inner = self.lock();
        let Some(mut bound) = inner.bound.take() else {
            debug!("Music manager not initialized, ignoring destroy");
            return;
        };

        bound.stop();
        bound.service.unload();
        info!("Music manager destroyed");
    }

    pub fn is_playing(&self) -> Result<bool> {
        let inner = self.lock();
        Ok(inner
            .bound()?
            .session
            .as_ref()
            .is_some_and(Session::is_playing))
    }

    pub fn state(&self) -> PlaybackState {
        let inner = self.lock();
        match inner.bound.as_ref() {
            None => PlaybackState::Uninitialized,
            Some(Bound { session: None, .. }) => PlaybackState::Idle,
            Some(Bound {
                session: Some(session),
                ..
            }) => {
                if session.is_playing() {
                    PlaybackState::Playing
                } else if session.is_preparing() {
                    PlaybackState::Preparing
                } else {
                    PlaybackState::Paused
                }
            }
        }
    }

    /// Track held by the active player, if any
    pub fn now_playing(&self) -> Result<Option<NowPlaying>> {
        Ok(self
            .lock()
            .bound()?
            .session
            .as_ref()
            .map(|session| session.now_playing))
    }

    /// Whether the active player has received its ready notification
    pub fn is_ready(&self) -> Result<bool> {
        Ok(self
            .lock()
            .bound()?
            .session
            .as_ref()
            .is_some_and(Session::is_ready))
    }
}

impl Default for PlaybackManager {
    fn default() -> Self {
        Self::new(default_bundle())
    }
}

impl Drop for PlaybackManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Ready notification from the host's callback thread
///
/// Only the session that armed the callback may be started by it; anything
/// else (torn down, superseded, manager gone) is ignored.
fn deliver_ready(inner: &Weak<Mutex<Inner>>, token: SessionToken) {
    let Some(inner) = inner.upgrade() else {
        debug!("Ready notification for session {} after manager dropped", token);
        return;
    };
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);

    let session = inner
        .bound
        .as_mut()
        .and_then(|bound| bound.session.as_mut())
        .filter(|session| session.token == token);

    match session {
        Some(session) => {
            if session.on_ready() {
                debug!("Session {} ready, playback started", token);
            } else {
                debug!("Session {} ready, start not requested", token);
            }
        }
        None => debug!("Ignoring ready notification for stale session {}", token),
    }
}
