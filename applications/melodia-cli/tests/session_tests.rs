//! End-to-end sessions against the simulated backend.

use melodia_cli::{CliConfig, Command, PlayerSession, SimulatedMedia, SimulatorSettings};
use melodia_playback::testing::MemoryHistorySink;
use melodia_playback::{
    ManualClock, MediaState, PlaybackConfig, PlaybackController, PlaybackEvent, RepeatMode,
    SharedSession, Track, TrackStreamUrl,
};
use std::io::Write;
use std::time::Duration;

const LATENCY: Duration = Duration::from_millis(100);

struct Fixture {
    session: PlayerSession,
    history: MemoryHistorySink,
}

fn track(id: &str, url: &str) -> Track {
    Track::new(id, format!("Title {}", id), "Artist")
        .with_stream_url(url)
        .with_duration(2.0)
}

fn fixture(config: PlaybackConfig, playlist: Vec<Track>, user: Option<&str>) -> Fixture {
    let history = MemoryHistorySink::new();
    let user_session = match user {
        Some(user) => SharedSession::signed_in(user),
        None => SharedSession::new(),
    };
    let (media, simulator) = SimulatedMedia::new(SimulatorSettings {
        load_latency: LATENCY,
        default_duration_secs: 2.0,
    });
    let controller =
        PlaybackController::new(config, media, history.clone(), user_session.clone())
            .with_clock(ManualClock::new())
            .with_rng_seed(3);

    Fixture {
        session: PlayerSession::new(controller, simulator, user_session, playlist, &TrackStreamUrl),
        history,
    }
}

fn standard_playlist() -> Vec<Track> {
    vec![
        track("SNG1", "http://cdn/1.mp3"),
        track("SNG2", "http://cdn/2.mp3"),
        track("SNG3", "http://cdn/3.mp3"),
    ]
}

fn exec(session: &mut PlayerSession, line: &str) {
    let mut sink = Vec::new();
    session
        .execute(line.parse::<Command>().unwrap(), &mut sink)
        .unwrap();
    sink.flush().unwrap();
}

/// Let the current load become ready and start playing
fn settle(session: &mut PlayerSession) -> Vec<PlaybackEvent> {
    let mut events = session.tick(LATENCY);
    events.extend(session.tick(Duration::ZERO));
    events
}

fn current_id(session: &PlayerSession) -> Option<String> {
    session
        .controller()
        .get_current_track()
        .map(|t| t.id.clone())
}

#[test]
fn test_listen_through_records_each_track_once() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), Some("USR001"));

    exec(&mut f.session, "play 1");
    settle(&mut f.session);
    assert_eq!(f.session.controller().get_media_state(), MediaState::Playing);

    // Track 1 ends, track 2 loads and starts on its own
    f.session.tick(Duration::from_millis(2500));
    assert_eq!(current_id(&f.session).as_deref(), Some("SNG2"));
    settle(&mut f.session);
    assert!(f.session.controller().is_playing());

    // Pause and resume must not record the same load again
    exec(&mut f.session, "pause");
    exec(&mut f.session, "resume");
    f.session.tick(Duration::ZERO);

    assert_eq!(f.history.track_ids(), vec!["SNG1", "SNG2"]);
    assert!(f
        .history
        .records()
        .iter()
        .all(|(user, _)| user == "USR001"));
}

#[test]
fn test_end_of_queue_pauses_on_last_track() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), None);

    exec(&mut f.session, "play 3");
    settle(&mut f.session);
    f.session.tick(Duration::from_millis(2500));

    assert_eq!(current_id(&f.session).as_deref(), Some("SNG3"));
    assert!(!f.session.controller().is_playing());
}

#[test]
fn test_repeat_all_wraps_to_first_track() {
    let config = PlaybackConfig {
        repeat: RepeatMode::All,
        ..Default::default()
    };
    let mut f = fixture(config, standard_playlist(), None);

    exec(&mut f.session, "play 3");
    settle(&mut f.session);
    f.session.tick(Duration::from_millis(2500));

    assert_eq!(current_id(&f.session).as_deref(), Some("SNG1"));
}

#[test]
fn test_repeat_one_loops_without_advancing() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), Some("USR001"));

    exec(&mut f.session, "repeat one");
    exec(&mut f.session, "play 1");
    settle(&mut f.session);

    for _ in 0..3 {
        f.session.tick(Duration::from_millis(2500));
    }

    assert_eq!(current_id(&f.session).as_deref(), Some("SNG1"));
    assert!(f.session.controller().is_playing());
    assert_eq!(f.history.track_ids(), vec!["SNG1"]);
}

#[test]
fn test_signed_out_plays_are_not_recorded() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), None);

    exec(&mut f.session, "play 1");
    settle(&mut f.session);
    assert!(f.history.records().is_empty());

    exec(&mut f.session, "login USR009");
    exec(&mut f.session, "next");
    settle(&mut f.session);
    assert_eq!(f.history.records(), vec![("USR009".to_string(), "SNG2".to_string())]);

    exec(&mut f.session, "logout");
    exec(&mut f.session, "next");
    settle(&mut f.session);
    assert_eq!(f.history.records().len(), 1);
}

#[test]
fn test_unsupported_source_fails_then_next_recovers() {
    let playlist = vec![
        track("SNG1", "ftp://cdn/1.mp3"),
        track("SNG2", "http://cdn/2.mp3"),
    ];
    let mut f = fixture(PlaybackConfig::default(), playlist, None);

    exec(&mut f.session, "play 1");
    let events = settle(&mut f.session);

    assert_eq!(f.session.controller().get_media_state(), MediaState::Error);
    assert!(!f.session.controller().is_playing());
    assert_eq!(current_id(&f.session).as_deref(), Some("SNG1"));
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));

    exec(&mut f.session, "next");
    settle(&mut f.session);
    assert_eq!(f.session.controller().get_media_state(), MediaState::Playing);
}

#[test]
fn test_rapid_skips_settle_on_last_choice() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), None);

    exec(&mut f.session, "play 1");
    exec(&mut f.session, "next");
    exec(&mut f.session, "next");
    settle(&mut f.session);

    assert_eq!(current_id(&f.session).as_deref(), Some("SNG3"));
    assert_eq!(f.session.controller().get_media_state(), MediaState::Playing);
    assert!(f
        .session
        .status_line()
        .starts_with("▶ Title SNG3 - Artist"));
}

#[test]
fn test_seek_and_volume_commands() {
    let mut f = fixture(PlaybackConfig::default(), standard_playlist(), None);

    exec(&mut f.session, "play 1");
    settle(&mut f.session);

    exec(&mut f.session, "seek 0:01");
    assert_eq!(f.session.controller().get_player().current_time_seconds, 1.0);

    exec(&mut f.session, "seek 99");
    assert_eq!(f.session.controller().get_player().current_time_seconds, 2.0);

    exec(&mut f.session, "vol 150");
    assert_eq!(f.session.controller().get_volume(), 100);
    exec(&mut f.session, "mute");
    assert!(f.session.controller().is_muted());
    exec(&mut f.session, "vol 20");
    assert!(!f.session.controller().is_muted());
}

#[test]
fn test_config_file_drives_playback_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("melodia.toml");
    std::fs::write(
        &path,
        "[playback]\nvolume = 35\nrepeat = \"one\"\n\n[simulation]\nload_latency_ms = 5\n",
    )
    .unwrap();

    let config = CliConfig::load(Some(&path)).unwrap();
    assert_eq!(config.playback.volume, 35);
    assert_eq!(config.playback.repeat, RepeatMode::One);
    assert_eq!(config.simulation.simulator().load_latency, Duration::from_millis(5));
}
