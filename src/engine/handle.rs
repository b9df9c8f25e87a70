use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::audio::{AudioBackend, AudioGraph};
use crate::config::Settings;
use crate::library::Track;
use crate::playlist::{CancelToken, LoadOutcome, PlaylistLoader, TrackSource};
use crate::spectrum::{PseudoNoise, SignalGenerator, SpectralLoop};
use crate::state::{PlaybackState, StateHandle, lock};

use super::frames::FrameClock;

/// Handle to one audio-reactive playback engine.
///
/// Cloning is cheap and every clone drives the same engine.
#[derive(Clone)]
pub struct Engine {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) settings: Settings,
    pub(super) state: StateHandle,
    pub(super) graph: Mutex<AudioGraph>,
    pub(super) spectral: Mutex<SpectralLoop>,
    pub(super) loader: PlaylistLoader,
    pub(super) token: CancelToken,
    pub(super) clock: FrameClock,
    pub(super) epoch: Instant,
    /// Bumped whenever a frame loop is (re)started or stopped for good.
    pub(super) generation: AtomicU64,
    pub(super) frame_thread: Mutex<Option<JoinHandle<()>>>,
    /// Background page loads started from the tail of the list.
    pub(super) pending: Mutex<Vec<JoinHandle<()>>>,
    pub(super) store_initialized: AtomicBool,
    pub(super) disposed: AtomicBool,
}

impl Engine {
    pub fn new(
        settings: Settings,
        backend: Box<dyn AudioBackend>,
        source: Arc<dyn TrackSource>,
        clock: FrameClock,
    ) -> Self {
        Self::with_generator(settings, backend, source, clock, Box::new(PseudoNoise::new()))
    }

    /// Like [`Engine::new`] with a custom idle spectrum.
    pub fn with_generator(
        settings: Settings,
        backend: Box<dyn AudioBackend>,
        source: Arc<dyn TrackSource>,
        clock: FrameClock,
        generator: Box<dyn SignalGenerator>,
    ) -> Self {
        let state = PlaybackState::new(
            settings.analysis.bins(),
            settings.audio.initial_volume,
            settings.playback.repeat_mode.into(),
        )
        .into_handle();
        let token = CancelToken::new();
        let loader = PlaylistLoader::new(
            source,
            state.clone(),
            settings.playlist.page_size,
            settings.playlist.media_base_url.clone(),
            token.clone(),
        );
        let spectral = SpectralLoop::new(&settings.analysis, generator);

        Self {
            inner: Arc::new(Inner {
                settings,
                state,
                graph: Mutex::new(AudioGraph::new(backend)),
                spectral: Mutex::new(spectral),
                loader,
                token,
                clock,
                epoch: Instant::now(),
                generation: AtomicU64::new(0),
                frame_thread: Mutex::new(None),
                pending: Mutex::new(Vec::new()),
                store_initialized: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Copy of the current playback state.
    pub fn snapshot(&self) -> PlaybackState {
        lock(&self.inner.state).clone()
    }

    pub fn current_track(&self) -> Option<Track> {
        lock(&self.inner.state).current_track().cloned()
    }

    pub fn analysis_bins(&self) -> usize {
        lock(&self.inner.state).analysis_bins()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Create the playback element and analysis graph if they don't exist yet.
    ///
    /// Returns true when this call created the element. After [`Engine::dispose`]
    /// the graph is never rebuilt.
    pub fn init_audio(&self) -> bool {
        if self.is_disposed() {
            log::debug!("init_audio ignored: engine disposed");
            return false;
        }
        let mut graph = lock(&self.inner.graph);
        if graph.has_element() || graph.is_released() {
            return false;
        }
        let (src, volume) = {
            let s = lock(&self.inner.state);
            (s.current_track().map(|t| t.src.clone()), s.volume)
        };
        graph.init(src.as_deref(), volume)
    }

    /// Fetch the next page of tracks.
    pub fn load_more_tracks(&self) -> LoadOutcome {
        self.inner.loader.load_more()
    }

    /// Load the first page once. Later calls return `None`.
    pub fn init_store(&self) -> Option<LoadOutcome> {
        if self.inner.store_initialized.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.load_more_tracks())
    }

    /// Run `f` on a background thread tracked by [`Engine::wait_idle`].
    pub(super) fn spawn_pending<F>(&self, f: F)
    where
        F: FnOnce(Engine) + Send + 'static,
    {
        let engine = self.clone();
        let handle = thread::spawn(move || f(engine));
        let mut pending = lock(&self.inner.pending);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Block until all background work (tail-of-list loads) has finished.
    pub fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(&mut *lock(&self.inner.pending));
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if handle.join().is_err() {
                    log::error!("background task panicked");
                }
            }
        }
    }

    /// Tear the engine down: cancel pending loads, stop the frame loop and
    /// release the audio graph. Further calls are no-ops.
    pub fn dispose(&self) {
        // The token must be cancelled before `disposed` is visible.
        self.inner.token.cancel();
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("disposing engine");
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let frame_thread = lock(&self.inner.frame_thread).take();
        if let Some(handle) = frame_thread {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                log::error!("frame loop panicked");
            }
        }
        self.wait_idle();

        let mut graph = lock(&self.inner.graph);
        let mut spectral = lock(&self.inner.spectral);
        graph.release();
        spectral.reset();
        let mut s = lock(&self.inner.state);
        s.is_playing = false;
        s.silence();
    }
}
