//! Lifecycle tests for PlaybackManager
//!
//! Drives the manager against the simulated host and checks the player
//! resources it leaves behind after every transition.

use blockstar_music::{
    MusicError, PlaybackManager, PlaybackState, SimulatedHost, TrackCategory, TrackHandle,
    TrackRegistration, MENU_MUSIC,
};
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn initialized(host: &SimulatedHost) -> PlaybackManager {
    let manager = PlaybackManager::default();
    manager.initialize(host, 100).unwrap();
    manager
}

fn menu_only_bundle() -> Vec<TrackRegistration> {
    vec![TrackRegistration::new(
        TrackCategory::Menu,
        TrackHandle(1),
        "menu",
    )]
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
fn operations_before_initialize_fail() {
    let manager = PlaybackManager::default();

    assert!(!manager.is_initialized());
    assert_eq!(manager.state(), PlaybackState::Uninitialized);
    assert!(matches!(
        manager.track_count(TrackCategory::Menu),
        Err(MusicError::NotInitialized)
    ));
    assert!(matches!(
        manager.set_volume_percent(50),
        Err(MusicError::NotInitialized)
    ));
    assert!(matches!(
        manager.play(TrackCategory::Menu),
        Err(MusicError::NotInitialized)
    ));
    assert!(matches!(
        manager.play_track(TrackCategory::Menu, 0),
        Err(MusicError::NotInitialized)
    ));
    assert!(matches!(manager.resume(), Err(MusicError::NotInitialized)));
    assert!(matches!(manager.pause(), Err(MusicError::NotInitialized)));
    assert!(matches!(manager.is_playing(), Err(MusicError::NotInitialized)));
    assert!(matches!(manager.now_playing(), Err(MusicError::NotInitialized)));
    assert!(matches!(manager.volume_percent(), Err(MusicError::NotInitialized)));
}

#[test]
fn initialize_rejects_invalid_arguments() {
    let manager = PlaybackManager::default();

    let no_service = SimulatedHost::without_audio_service();
    assert!(matches!(
        manager.initialize(&no_service, 100),
        Err(MusicError::InvalidArgument(_))
    ));

    let host = SimulatedHost::new();
    assert!(matches!(
        manager.initialize(&host, 101),
        Err(MusicError::InvalidArgument(_))
    ));
    assert!(!manager.is_initialized());
    // Rejected before the host service is bound
    assert_eq!(host.bind_count(), 0);

    manager.initialize(&host, 0).unwrap();
    assert!(manager.is_initialized());
    assert_eq!(manager.gain().unwrap(), 0.0);
}

#[test]
fn initialize_twice_is_idempotent() {
    let host = SimulatedHost::new().with_max_stream_gain(15.0);
    let manager = initialized(&host);
    let before = (
        manager.track_count(TrackCategory::Level).unwrap(),
        manager.track_count(TrackCategory::Menu).unwrap(),
        manager.volume_percent().unwrap(),
        manager.gain().unwrap(),
        manager.state(),
    );

    // Different volume, different host: both ignored
    let other = SimulatedHost::new().with_max_stream_gain(1.0);
    manager.initialize(&other, 10).unwrap();

    let after = (
        manager.track_count(TrackCategory::Level).unwrap(),
        manager.track_count(TrackCategory::Menu).unwrap(),
        manager.volume_percent().unwrap(),
        manager.gain().unwrap(),
        manager.state(),
    );
    assert_eq!(before, after);
    assert_eq!(other.bind_count(), 0);
    assert_eq!(host.bind_count(), 1);
}

#[test]
fn track_counts_follow_bundle() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    assert_eq!(manager.track_count(TrackCategory::Level).unwrap(), 10);
    assert_eq!(manager.track_count(TrackCategory::Menu).unwrap(), 1);

    // Counts do not change while playing
    manager.play(TrackCategory::Level).unwrap();
    manager.set_volume_percent(30).unwrap();
    assert_eq!(manager.track_count(TrackCategory::Level).unwrap(), 10);
}

#[test]
fn unregistered_category_is_invalid_argument() {
    let host = SimulatedHost::new();
    let manager = PlaybackManager::new(menu_only_bundle());
    manager.initialize(&host, 100).unwrap();

    assert!(matches!(
        manager.track_count(TrackCategory::Level),
        Err(MusicError::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.play(TrackCategory::Level),
        Err(MusicError::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.play_track(TrackCategory::Level, 0),
        Err(MusicError::InvalidArgument(_))
    ));
    assert_eq!(host.players_created(), 0);
}

// ============================================================================
// PLAY
// ============================================================================

#[test]
fn play_track_configures_player_before_start() {
    let host = SimulatedHost::new().with_max_stream_gain(15.0);
    let manager = PlaybackManager::default();
    manager.initialize(&host, 60).unwrap();

    manager.play_track(TrackCategory::Menu, 0).unwrap();

    let player = host.player(0).unwrap();
    assert_eq!(player.track, MENU_MUSIC);
    assert!(player.looping);
    assert!((player.gain().unwrap() - 9.0).abs() < 1e-5);
    assert_eq!(player.subscribe_count, 1);
    assert!(!player.started, "play must not start an unprepared player");
    assert_eq!(manager.state(), PlaybackState::Preparing);
    assert!(!manager.is_ready().unwrap());

    host.complete_preparation();
    let player = host.player(0).unwrap();
    assert!(player.playing);
    assert_eq!(player.start_count, 1);
    assert_eq!(manager.state(), PlaybackState::Playing);
    assert!(manager.is_ready().unwrap());

    let now = manager.now_playing().unwrap().unwrap();
    assert_eq!(now.category, TrackCategory::Menu);
    assert_eq!(now.index, 0);
    assert_eq!(now.handle, MENU_MUSIC);
}

#[test]
fn play_track_index_bounds() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    assert!(matches!(
        manager.play_track(TrackCategory::Level, 10),
        Err(MusicError::IndexOutOfRange {
            category: TrackCategory::Level,
            index: 10,
            count: 10
        })
    ));
    assert!(matches!(
        manager.play_track(TrackCategory::Level, 11),
        Err(MusicError::IndexOutOfRange { .. })
    ));
    assert_eq!(host.players_created(), 0);

    manager.play_track(TrackCategory::Level, 9).unwrap();
    assert_eq!(host.player(0).unwrap().track, TrackHandle(10));
}

#[test]
fn failed_play_keeps_previous_session() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Level, 0).unwrap();
    host.complete_preparation();

    // Validation failures happen before teardown
    assert!(manager.play_track(TrackCategory::Level, 42).is_err());
    assert_eq!(manager.state(), PlaybackState::Playing);
    assert_eq!(host.live_players(), 1);
}

#[test]
fn host_creation_failure_surfaces_and_leaves_idle() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Level, 0).unwrap();

    host.fail_creation(true);
    assert!(matches!(
        manager.play_track(TrackCategory::Level, 1),
        Err(MusicError::Host(_))
    ));
    assert_eq!(host.live_players(), 0);
    assert_eq!(manager.state(), PlaybackState::Idle);
    assert!(manager.now_playing().unwrap().is_none());
}

#[test]
fn replay_tears_down_previous_session_once() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    manager.play_track(TrackCategory::Level, 0).unwrap();
    host.complete_preparation();
    manager.play_track(TrackCategory::Level, 1).unwrap();
    manager.play_track(TrackCategory::Menu, 0).unwrap();

    let players = host.players();
    assert_eq!(players.len(), 3);
    for old in &players[..2] {
        assert!(old.stopped && old.released);
        assert_eq!(old.subscribe_count, 1);
        assert_eq!(old.unsubscribe_count, 1);
        assert!(!old.playing);
    }
    assert!(!players[2].released);
    assert_eq!(host.live_players(), 1);
    assert_eq!(host.peak_live_players(), 1);
    assert_eq!(host.active_subscriptions(), 1);
}

#[test]
fn stale_ready_notification_is_ignored() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    manager.play_track(TrackCategory::Level, 0).unwrap();
    let stale = host.ready_callback(0).unwrap();

    // New session replaces the first before it was ready
    manager.play_track(TrackCategory::Level, 1).unwrap();
    stale();

    assert!(!host.player(0).unwrap().started);
    assert!(!host.player(1).unwrap().started);
    assert_eq!(manager.state(), PlaybackState::Preparing);

    host.complete_preparation();
    assert!(host.player(1).unwrap().playing);
}

#[test]
fn ready_after_destroy_is_ignored() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    manager.play_track(TrackCategory::Menu, 0).unwrap();
    let stale = host.ready_callback(0).unwrap();
    manager.destroy();

    stale();
    assert!(!host.player(0).unwrap().started);
    assert_eq!(manager.state(), PlaybackState::Uninitialized);
}

#[test]
fn repeated_ready_does_not_restart_paused_player() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    manager.play_track(TrackCategory::Menu, 0).unwrap();
    host.complete_preparation();
    manager.pause().unwrap();

    // Callback stays registered until teardown
    assert_eq!(host.active_subscriptions(), 1);
    host.complete_preparation();
    assert_eq!(manager.state(), PlaybackState::Paused);
    assert_eq!(host.player(0).unwrap().start_count, 1);
}

// ============================================================================
// PAUSE / RESUME
// ============================================================================

#[test]
fn resume_and_pause_require_session() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    assert!(matches!(
        manager.resume(),
        Err(MusicError::InvalidOperation(_))
    ));
    assert!(matches!(
        manager.pause(),
        Err(MusicError::InvalidOperation(_))
    ));
    assert_eq!(manager.state(), PlaybackState::Idle);
}

#[test]
fn pause_then_resume_restores_playing() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Level, 2).unwrap();
    host.complete_preparation();

    manager.pause().unwrap();
    assert!(!manager.is_playing().unwrap());
    assert_eq!(manager.state(), PlaybackState::Paused);

    // Pausing twice is a no-op
    manager.pause().unwrap();
    assert_eq!(host.player(0).unwrap().pause_count, 1);

    manager.resume().unwrap();
    assert!(manager.is_playing().unwrap());

    // Resuming while playing is a no-op
    manager.resume().unwrap();
    assert_eq!(host.player(0).unwrap().start_count, 2);
    assert_eq!(host.players_created(), 1);
}

#[test]
fn pause_before_ready_holds_playback() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Menu, 0).unwrap();

    manager.pause().unwrap();
    host.complete_preparation();
    assert!(!host.player(0).unwrap().started);
    assert_eq!(manager.state(), PlaybackState::Paused);

    manager.resume().unwrap();
    assert!(manager.is_playing().unwrap());
}

#[test]
fn resume_before_ready_waits_for_preparation() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Menu, 0).unwrap();

    manager.resume().unwrap();
    assert!(!host.player(0).unwrap().started);
    assert_eq!(manager.state(), PlaybackState::Preparing);

    host.complete_preparation();
    assert_eq!(host.player(0).unwrap().start_count, 1);
}

// ============================================================================
// VOLUME
// ============================================================================

#[test]
fn set_volume_validates_range() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);

    assert!(matches!(
        manager.set_volume_percent(101),
        Err(MusicError::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.set_volume_percent(u8::MAX),
        Err(MusicError::InvalidArgument(_))
    ));
    assert_eq!(manager.volume_percent().unwrap(), 100);
}

#[test]
fn set_volume_applies_to_active_session_without_state_change() {
    let host = SimulatedHost::new().with_max_stream_gain(20.0);
    let manager = initialized(&host);
    manager.play_track(TrackCategory::Level, 0).unwrap();
    host.complete_preparation();

    manager.set_volume_percent(25).unwrap();
    let player = host.player(0).unwrap();
    assert!((player.gain().unwrap() - 5.0).abs() < 1e-5);
    assert!(player.playing);
    assert_eq!(player.start_count, 1);
    assert_eq!(manager.state(), PlaybackState::Playing);

    manager.pause().unwrap();
    manager.set_volume_percent(75).unwrap();
    assert!((host.player(0).unwrap().gain().unwrap() - 15.0).abs() < 1e-5);
    assert_eq!(manager.state(), PlaybackState::Paused);

    // Next session picks up the stored gain
    manager.play_track(TrackCategory::Level, 1).unwrap();
    assert!((host.player(1).unwrap().gain().unwrap() - 15.0).abs() < 1e-5);
}

// ============================================================================
// DESTROY
// ============================================================================

#[test]
fn destroy_twice_does_not_fail() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.play(TrackCategory::Menu).unwrap();

    manager.destroy();
    manager.destroy();

    assert_eq!(manager.state(), PlaybackState::Uninitialized);
    assert_eq!(host.unload_count(), 1);
    assert_eq!(host.live_players(), 0);
}

#[test]
fn destroy_before_initialize_is_noop() {
    let manager = PlaybackManager::default();
    manager.destroy();
    assert!(!manager.is_initialized());
}

#[test]
fn reinitialize_after_destroy_builds_fresh_state() {
    let host = SimulatedHost::new();
    let manager = initialized(&host);
    manager.set_volume_percent(10).unwrap();
    manager.play(TrackCategory::Level).unwrap();
    manager.destroy();

    manager.initialize(&host, 80).unwrap();
    assert_eq!(manager.volume_percent().unwrap(), 80);
    assert_eq!(manager.state(), PlaybackState::Idle);
    assert_eq!(manager.track_count(TrackCategory::Level).unwrap(), 10);
    assert_eq!(host.bind_count(), 2);
}

#[test]
fn example_scenario() {
    let host = SimulatedHost::new();
    let manager = PlaybackManager::default();

    manager.initialize(&host, 100).unwrap();
    manager.play_track(TrackCategory::Menu, 0).unwrap();
    host.complete_preparation();
    assert!(manager.is_playing().unwrap());

    manager.pause().unwrap();
    assert!(!manager.is_playing().unwrap());

    manager.resume().unwrap();
    assert!(manager.is_playing().unwrap());

    manager.destroy();
    assert_eq!(manager.state(), PlaybackState::Uninitialized);
    assert_eq!(host.live_players(), 0);
    assert_eq!(host.active_subscriptions(), 0);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn ready_notifications_race_with_replay() {
    let host = SimulatedHost::new();
    let manager = Arc::new(initialized(&host));

    for round in 0..50 {
        manager.play_track(TrackCategory::Level, round % 10).unwrap();
        let callback = host.ready_callback(2 * round).unwrap();
        let firing = std::thread::spawn(move || callback());
        manager.play_track(TrackCategory::Menu, 0).unwrap();
        firing.join().unwrap();
        assert!(host.peak_live_players() <= 1);
    }

    assert_eq!(host.live_players(), 1);
    assert_eq!(host.active_subscriptions(), 1);
}
