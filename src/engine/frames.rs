use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use crate::state::lock;

use super::handle::Engine;

/// What drives the spectral loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClock {
    /// A background thread ticks at this interval while playing.
    Realtime(Duration),
    /// The host calls [`Engine::tick`] itself.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Playing; schedule another frame.
    Continue,
    /// Paused or disposed; the loop ends and the spectrum is at rest.
    Stopped,
}

impl Engine {
    /// Run one frame at `now`.
    ///
    /// Syncs position and length from the element, dispatches a track end to
    /// [`Engine::next_track`] and publishes the spectrum with its derived
    /// values under a single state lock.
    pub fn tick(&self, now: Instant) -> LoopControl {
        if self.is_disposed() {
            return LoopControl::Stopped;
        }

        let ended = {
            let mut graph = lock(&self.inner.graph);
            let mut spectral = lock(&self.inner.spectral);
            let playing = lock(&self.inner.state).is_playing;
            let update = graph.sync(playing);

            let frame = if playing {
                let real = graph.read_spectrum(spectral.buffer_mut());
                let t_ms = now.saturating_duration_since(self.inner.epoch).as_secs_f64() * 1000.0;
                Some(spectral.step(now, t_ms, real))
            } else {
                spectral.reset();
                None
            };

            let mut s = lock(&self.inner.state);
            if let Some(update) = update {
                s.current_time = update.position;
                s.duration = update.duration;
            }
            match frame {
                Some(frame) => s.write_frame(spectral.data(), frame.bass, frame.mid, frame.beat),
                None => {
                    s.silence();
                    return LoopControl::Stopped;
                }
            }
            update.is_some_and(|u| u.ended)
        };

        if ended {
            log::debug!("track ended");
            self.next_track();
        }
        LoopControl::Continue
    }

    /// Start a fresh frame loop, retiring any previous one.
    pub(super) fn start_loop(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let FrameClock::Realtime(interval) = self.inner.clock else {
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let handle = thread::spawn(move || {
            loop {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                let engine = Engine { inner };
                if engine.tick(Instant::now()) == LoopControl::Stopped {
                    break;
                }
                drop(engine);
                thread::sleep(interval);
            }
        });
        // A replaced loop notices the generation change and exits on its own.
        *lock(&self.inner.frame_thread) = Some(handle);
    }

    /// Stop the frame loop now and put the spectrum at rest.
    pub(super) fn stop_loop(&self) {
        let mut spectral = lock(&self.inner.spectral);
        spectral.reset();
        lock(&self.inner.state).silence();
    }
}
