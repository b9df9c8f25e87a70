use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::Track;
use crate::state::{RepeatMode, lock};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.neuroplayer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

/// Transport status as reported over MPRIS.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Default)]
struct SharedState {
    status: PlayerStatus,
    repeat: RepeatMode,
    volume: u8,
    track_id: Option<OwnedObjectPath>,
    title: Option<String>,
    artist: Vec<String>,
    art_url: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
}

/// Writer side of the MPRIS service. Every setter schedules a
/// `PropertiesChanged` emission.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    fn update(&self, f: impl FnOnce(&mut SharedState)) {
        f(&mut lock(&self.state));
        let _ = self.notify.send(());
    }

    pub fn set_playback(&self, status: PlayerStatus) {
        self.update(|s| s.status = status);
    }

    pub fn set_loop(&self, mode: RepeatMode) {
        self.update(|s| s.repeat = mode);
    }

    pub fn set_volume(&self, volume: u8) {
        self.update(|s| s.volume = volume.min(100));
    }

    /// Publish the current track, or clear the metadata with `None`.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>, duration_secs: f64) {
        self.update(|s| match (index, track) {
            (Some(index), Some(track)) => {
                s.track_id =
                    OwnedObjectPath::try_from(format!("{OBJECT_PATH}/track/{index}")).ok();
                s.title = Some(track.title.clone());
                s.artist = vec![track.artist.clone()];
                s.art_url = track.cover.clone();
                s.url = Some(track.src.clone());
                s.length_micros = (duration_secs.is_finite() && duration_secs > 0.0)
                    .then(|| (duration_secs * 1_000_000.0).round() as i64);
            }
            _ => {
                s.track_id = None;
                s.title = None;
                s.artist.clear();
                s.art_url = None;
                s.url = None;
                s.length_micros = None;
            }
        });
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "neuroplayer"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["http".to_string(), "https".to_string(), "file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => log::debug!("MPRIS: dropping {key}: {e}"),
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        match lock(&self.state).status {
            PlayerStatus::Stopped => "Stopped",
            PlayerStatus::Playing => "Playing",
            PlayerStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        match lock(&self.state).repeat {
            RepeatMode::Off => "None",
            RepeatMode::All => "Playlist",
            RepeatMode::One => "Track",
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        f64::from(lock(&self.state).volume) / 100.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let s = lock(&self.state);
        let mut map = HashMap::new();

        if let Some(id) = s.track_id.as_ref() {
            insert(&mut map, "mpris:trackid", Value::from(ObjectPath::clone(id)));
        }
        insert(
            &mut map,
            "xesam:title",
            Value::from(s.title.clone().unwrap_or_default()),
        );
        if !s.artist.is_empty() {
            insert(&mut map, "xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(url) = s.url.as_ref() {
            insert(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(art) = s.art_url.as_ref() {
            insert(&mut map, "mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(length) = s.length_micros {
            insert(&mut map, "mpris:length", Value::from(length));
        }
        map
    }
}

async fn emit_changes(connection: &Connection) -> zbus::Result<()> {
    let iface_ref = connection
        .object_server()
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    let iface = iface_ref.get().await;
    let emitter = iface_ref.signal_emitter();
    iface.playback_status_changed(emitter).await?;
    iface.loop_status_changed(emitter).await?;
    iface.volume_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    Ok(())
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    log::info!("MPRIS: registered as {BUS_NAME}");

    loop {
        Timer::after(Duration::from_millis(250)).await;
        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if changed {
            if let Err(e) = emit_changes(&connection).await {
                log::debug!("MPRIS: failed to emit property changes: {e}");
            }
        }
    }
}

/// Start the MPRIS service on its own thread. Failures to reach the session
/// bus are logged and leave the handle working as a no-op sink.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            log::warn!("MPRIS: service unavailable: {e}");
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

#[cfg(test)]
mod tests;
