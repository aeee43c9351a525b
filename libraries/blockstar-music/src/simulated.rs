//! In-process host environment
//!
//! Records everything the manager does to its native players. Ready
//! notifications are dispatched either manually (deterministic tests) or
//! from a background thread after a preparation delay (headless runs).

use crate::error::{MusicError, Result};
use crate::host::{AudioService, HostEnvironment, NativePlayer, ReadyCallback, SubscriptionId};
use crate::types::TrackHandle;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How ready notifications reach the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyDispatch {
    /// Only when the test calls `complete_preparation` / `fire_ready`
    Manual,

    /// From a background thread once the delay has elapsed
    Background(Duration),
}

/// Snapshot of one native player created by the simulated host
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub track: TrackHandle,
    pub looping: bool,
    /// Every gain set on the player, in order
    pub gains: Vec<f32>,
    pub playing: bool,
    /// Player was started at least once
    pub started: bool,
    pub start_count: usize,
    pub pause_count: usize,
    pub stopped: bool,
    pub released: bool,
    /// Total `subscribe_ready` calls
    pub subscribe_count: usize,
    /// Total `unsubscribe_ready` calls
    pub unsubscribe_count: usize,
    /// Ready notification delivered by the host
    pub prepared: bool,
}

impl PlayerRecord {
    fn new(track: TrackHandle) -> Self {
        Self {
            track,
            looping: false,
            gains: Vec::new(),
            playing: false,
            started: false,
            start_count: 0,
            pause_count: 0,
            stopped: false,
            released: false,
            subscribe_count: 0,
            unsubscribe_count: 0,
            prepared: false,
        }
    }

    /// Last gain applied, if any
    pub fn gain(&self) -> Option<f32> {
        self.gains.last().copied()
    }
}

#[derive(Default)]
struct HostState {
    players: Vec<PlayerRecord>,
    subscriptions: Vec<Option<(SubscriptionId, ReadyCallback)>>,
    next_subscription: u64,
    unload_count: usize,
    bind_count: usize,
    fail_creation: bool,
    peak_live: usize,
}

impl HostState {
    fn live(&self) -> usize {
        self.players.iter().filter(|p| !p.released).count()
    }
}

type SharedState = Arc<Mutex<HostState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deliver the ready notification of one player
///
/// The callback runs without the host lock held: it calls back into the
/// player through the manager.
fn fire(state: &SharedState, player: usize) -> bool {
    let callback = {
        let mut host = lock(state);
        let Some(Some((_, callback))) = host.subscriptions.get(player) else {
            return false;
        };
        let callback = Arc::clone(callback);
        if let Some(record) = host.players.get_mut(player) {
            record.prepared = true;
        }
        callback
    };
    callback();
    true
}

/// Simulated host environment
#[derive(Clone)]
pub struct SimulatedHost {
    state: SharedState,
    max_stream_gain: f32,
    dispatch: ReadyDispatch,
    available: bool,
}

impl SimulatedHost {
    /// Host with manual ready dispatch and a maximum stream gain of 1.0
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            max_stream_gain: 1.0,
            dispatch: ReadyDispatch::Manual,
            available: true,
        }
    }

    pub fn with_max_stream_gain(mut self, max_stream_gain: f32) -> Self {
        self.max_stream_gain = max_stream_gain;
        self
    }

    pub fn with_dispatch(mut self, dispatch: ReadyDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Host whose platform exposes no audio service
    pub fn without_audio_service() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Make subsequent `create_player` calls fail
    pub fn fail_creation(&self, fail: bool) {
        lock(&self.state).fail_creation = fail;
    }

    /// Deliver the ready notification of the most recently created player
    pub fn complete_preparation(&self) -> bool {
        let latest = lock(&self.state).players.len().checked_sub(1);
        latest.is_some_and(|player| fire(&self.state, player))
    }

    /// Deliver the ready notification of a specific player
    ///
    /// Returns false when the player has no ready subscription.
    pub fn fire_ready(&self, player: usize) -> bool {
        fire(&self.state, player)
    }

    /// Clone the currently subscribed ready callback of a player
    ///
    /// Lets tests deliver a notification that raced with teardown.
    pub fn ready_callback(&self, player: usize) -> Option<ReadyCallback> {
        lock(&self.state)
            .subscriptions
            .get(player)
            .and_then(|slot| slot.as_ref())
            .map(|(_, callback)| Arc::clone(callback))
    }

    pub fn player(&self, player: usize) -> Option<PlayerRecord> {
        lock(&self.state).players.get(player).cloned()
    }

    pub fn players(&self) -> Vec<PlayerRecord> {
        lock(&self.state).players.clone()
    }

    pub fn players_created(&self) -> usize {
        lock(&self.state).players.len()
    }

    /// Players created and not yet released
    pub fn live_players(&self) -> usize {
        lock(&self.state).live()
    }

    /// Highest number of simultaneously live players observed
    pub fn peak_live_players(&self) -> usize {
        lock(&self.state).peak_live
    }

    /// Number of ready subscriptions still registered
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.state)
            .subscriptions
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn unload_count(&self) -> usize {
        lock(&self.state).unload_count
    }

    pub fn bind_count(&self) -> usize {
        lock(&self.state).bind_count
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEnvironment for SimulatedHost {
    fn audio_service(&self) -> Option<Arc<dyn AudioService>> {
        if !self.available {
            return None;
        }
        lock(&self.state).bind_count += 1;
        Some(Arc::new(SimulatedService {
            state: Arc::clone(&self.state),
            max_stream_gain: self.max_stream_gain,
            dispatch: self.dispatch,
        }))
    }
}

struct SimulatedService {
    state: SharedState,
    max_stream_gain: f32,
    dispatch: ReadyDispatch,
}

impl AudioService for SimulatedService {
    fn create_player(&self, track: TrackHandle) -> Result<Box<dyn NativePlayer>> {
        let mut host = lock(&self.state);
        if host.fail_creation {
            return Err(MusicError::Host(format!("cannot create player for {}", track)));
        }

        let index = host.players.len();
        host.players.push(PlayerRecord::new(track));
        host.subscriptions.push(None);
        host.peak_live = host.peak_live.max(host.live());
        debug!("Simulated player {} created for {}", index, track);

        Ok(Box::new(SimulatedPlayer {
            state: Arc::clone(&self.state),
            index,
            dispatch: self.dispatch,
        }))
    }

    fn max_stream_gain(&self) -> f32 {
        self.max_stream_gain
    }

    fn unload(&self) {
        lock(&self.state).unload_count += 1;
    }
}

struct SimulatedPlayer {
    state: SharedState,
    index: usize,
    dispatch: ReadyDispatch,
}

impl SimulatedPlayer {
    fn update(&self, f: impl FnOnce(&mut PlayerRecord)) {
        if let Some(record) = lock(&self.state).players.get_mut(self.index) {
            f(record);
        }
    }
}

impl NativePlayer for SimulatedPlayer {
    fn set_looping(&mut self, looping: bool) {
        self.update(|p| p.looping = looping);
    }

    fn set_gain(&mut self, gain: f32) {
        self.update(|p| p.gains.push(gain));
    }

    fn start(&mut self) {
        self.update(|p| {
            if !p.released {
                p.playing = true;
                p.started = true;
                p.start_count += 1;
            }
        });
    }

    fn pause(&mut self) {
        self.update(|p| {
            p.playing = false;
            p.pause_count += 1;
        });
    }

    fn stop(&mut self) {
        self.update(|p| {
            p.playing = false;
            p.stopped = true;
        });
    }

    fn release(&mut self) {
        self.update(|p| {
            p.playing = false;
            p.released = true;
        });
    }

    fn is_playing(&self) -> bool {
        lock(&self.state)
            .players
            .get(self.index)
            .is_some_and(|p| p.playing)
    }

    fn subscribe_ready(&mut self, callback: ReadyCallback) -> SubscriptionId {
        let id = {
            let mut host = lock(&self.state);
            host.next_subscription += 1;
            let id = SubscriptionId(host.next_subscription);
            host.subscriptions[self.index] = Some((id, callback));
            host.players[self.index].subscribe_count += 1;
            id
        };

        if let ReadyDispatch::Background(delay) = self.dispatch {
            let state = Arc::clone(&self.state);
            let index = self.index;
            thread::spawn(move || {
                thread::sleep(delay);
                fire(&state, index);
            });
        }
        id
    }

    fn unsubscribe_ready(&mut self, subscription: SubscriptionId) {
        let mut host = lock(&self.state);
        let slot = &mut host.subscriptions[self.index];
        if slot.as_ref().is_some_and(|(id, _)| *id == subscription) {
            *slot = None;
        }
        host.players[self.index].unsubscribe_count += 1;
    }
}
