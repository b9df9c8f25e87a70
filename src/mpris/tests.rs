use super::*;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        id: "42".to_string(),
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        src: "https://cdn.example.com/music/test.mp3".to_string(),
        cover: Some("https://cdn.example.com/covers/test.jpg".to_string()),
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

fn iface(state: &Arc<Mutex<SharedState>>) -> PlayerIface {
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    PlayerIface {
        tx,
        state: state.clone(),
    }
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, _notify) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(7), Some(&track), 1.234_567);

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(
            s.art_url.as_deref(),
            Some("https://cdn.example.com/covers/test.jpg")
        );
        assert!(s.url.as_deref().unwrap().ends_with("/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None, 0.0);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.art_url, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn unknown_length_is_omitted() {
    let (handle, state, _notify) = handle();
    handle.set_track_metadata(Some(0), Some(&make_track()), 0.0);
    assert_eq!(state.lock().unwrap().length_micros, None);
}

#[test]
fn setters_schedule_notifications() {
    let (handle, _state, notify) = handle();
    handle.set_playback(PlayerStatus::Playing);
    handle.set_loop(RepeatMode::All);
    handle.set_volume(30);
    assert_eq!(notify.try_iter().count(), 3);
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (handle, state, _notify) = handle();
    let iface = iface(&state);

    assert_eq!(iface.playback_status(), "Stopped");
    handle.set_playback(PlayerStatus::Playing);
    assert_eq!(iface.playback_status(), "Playing");
    handle.set_playback(PlayerStatus::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn loop_status_and_volume_follow_engine_values() {
    let (handle, state, _notify) = handle();
    let iface = iface(&state);

    assert_eq!(iface.loop_status(), "None");
    handle.set_loop(RepeatMode::All);
    assert_eq!(iface.loop_status(), "Playlist");
    handle.set_loop(RepeatMode::One);
    assert_eq!(iface.loop_status(), "Track");

    handle.set_volume(150);
    assert_eq!(iface.volume(), 1.0);
    handle.set_volume(25);
    assert_eq!(iface.volume(), 0.25);
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state, _notify) = handle();
    let iface = iface(&state);

    handle.set_track_metadata(Some(1), Some(&make_track()), 200.0);
    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }

    handle.set_track_metadata(None, None, 0.0);
    let map = iface.metadata();
    assert!(map.contains_key("xesam:title"));
    assert!(!map.contains_key("mpris:trackid"));
}

#[test]
fn player_methods_forward_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}
