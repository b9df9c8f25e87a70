use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::state::lock;

use super::sink::{SharedBytes, create_sink_at, load_media};
use super::tap::SampleTap;
use super::types::{AudioCmd, AudioError, PlaybackHandle};

const POLL: Duration = Duration::from_millis(50);

/// Everything the audio thread owns besides the output stream.
struct Deck {
    sink: Option<Sink>,
    media: Option<SharedBytes>,
    duration: Option<Duration>,
    paused: bool,
    volume: f32,
    ended_reported: bool,
}

impl Deck {
    fn new() -> Self {
        Self {
            sink: None,
            media: None,
            duration: None,
            paused: true,
            volume: 1.0,
            ended_reported: false,
        }
    }

    fn install(&mut self, sink: Sink, duration: Option<Duration>) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        sink.set_volume(self.volume);
        if !self.paused {
            sink.play();
        }
        self.sink = Some(sink);
        self.duration = duration;
        self.ended_reported = false;
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn seek(&mut self, stream: &OutputStream, tap: &SampleTap, to: Duration) -> Duration {
        let Some(sink) = self.sink.as_ref() else {
            return Duration::ZERO;
        };

        if !sink.empty() {
            if let Err(e) = sink.try_seek(to) {
                log::warn!("seek to {:.2}s failed: {e}", to.as_secs_f64());
            }
            self.ended_reported = false;
            return sink.get_pos();
        }

        // The source ran out and left the sink; rebuild it from the cached bytes.
        let Some(media) = self.media.clone() else {
            return Duration::ZERO;
        };
        tap.clear();
        match create_sink_at(stream, &media, tap, to) {
            Ok((sink, duration)) => {
                self.install(sink, duration);
                self.position()
            }
            Err(e) => {
                log::error!("failed to rebuild sink: {e}");
                Duration::ZERO
            }
        }
    }
}

/// Spawn the thread that owns the output stream and the current sink.
///
/// `ready` receives the outcome of opening the output device; on failure the
/// thread exits right after reporting it.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    tap: SampleTap,
    ready: Sender<Result<(), AudioError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(AudioError::DeviceUnavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a terminal app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let client = match reqwest::blocking::Client::builder()
            .user_agent(concat!("neuroplayer/", env!("CARGO_PKG_VERSION")))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                log::error!("failed to build media client: {e}");
                return;
            }
        };

        let mut deck = Deck::new();

        loop {
            match rx.recv_timeout(POLL) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load(src) => {
                        if let Some(old) = deck.sink.take() {
                            old.stop();
                        }
                        deck.media = None;
                        deck.duration = None;
                        tap.clear();

                        let built = load_media(&client, &src).and_then(|media| {
                            let built = create_sink_at(&stream, &media, &tap, Duration::ZERO)?;
                            deck.media = Some(media);
                            Ok(built)
                        });
                        match built {
                            Ok((sink, duration)) => {
                                log::debug!("loaded {src}");
                                deck.install(sink, duration);
                            }
                            Err(e) => log::error!("failed to load {src}: {e}"),
                        }
                    }

                    AudioCmd::Play => {
                        deck.paused = false;
                        if let Some(sink) = deck.sink.as_ref() {
                            sink.play();
                        }
                    }

                    AudioCmd::Pause => {
                        deck.paused = true;
                        if let Some(sink) = deck.sink.as_ref() {
                            sink.pause();
                        }
                    }

                    AudioCmd::Seek { to, reply } => {
                        let landed = deck.seek(&stream, &tap, to);
                        let _ = reply.send(landed);
                    }

                    AudioCmd::SetVolume(volume) => {
                        deck.volume = volume;
                        if let Some(sink) = deck.sink.as_ref() {
                            sink.set_volume(volume);
                        }
                    }

                    AudioCmd::Quit => {
                        if let Some(sink) = deck.sink.take() {
                            sink.stop();
                        }
                        let mut info = lock(&playback_info);
                        info.playing = false;
                        info.loaded = false;
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let finished = deck
                .sink
                .as_ref()
                .is_some_and(|sink| !deck.paused && sink.empty() && !deck.ended_reported);
            if finished {
                deck.ended_reported = true;
            }

            let mut info = lock(&playback_info);
            info.position = deck.position();
            info.duration = deck.duration;
            info.loaded = deck.sink.is_some();
            info.playing = !deck.paused && deck.sink.as_ref().is_some_and(|s| !s.empty());
            if finished {
                info.ended = true;
            }
        }
    })
}
