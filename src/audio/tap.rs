//! A pass-through `rodio` source that copies what it plays into a shared buffer.
//!
//! The analysis node reads the most recent block from that buffer. Samples are
//! downmixed to mono and published in small batches to keep lock traffic off
//! the per-sample path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};

use crate::state::lock;

const BATCH: usize = 256;

#[derive(Clone)]
pub struct SampleTap {
    shared: Arc<TapShared>,
}

struct TapShared {
    enabled: AtomicBool,
    capacity: usize,
    buffer: Mutex<VecDeque<f32>>,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(TapShared {
                enabled: AtomicBool::new(false),
                capacity,
                buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            }),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Relaxed)
    }

    pub fn push(&self, samples: &[f32]) {
        let mut buf = lock(&self.shared.buffer);
        buf.extend(samples.iter().copied());
        let excess = buf.len().saturating_sub(self.shared.capacity);
        buf.drain(..excess);
    }

    /// Copy the buffered samples (oldest first) into `out`.
    pub fn snapshot(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(lock(&self.shared.buffer).iter().copied());
    }

    pub fn clear(&self) {
        lock(&self.shared.buffer).clear();
    }
}

pub struct Tap<S> {
    inner: S,
    tap: SampleTap,
    frame_sum: f32,
    frame_pos: ChannelCount,
    pending: Vec<f32>,
}

impl<S: Source> Tap<S> {
    pub fn new(inner: S, tap: SampleTap) -> Self {
        Self {
            inner,
            tap,
            frame_sum: 0.0,
            frame_pos: 0,
            pending: Vec::with_capacity(BATCH),
        }
    }

    fn record(&mut self, sample: Sample) {
        let channels = self.inner.channels().max(1);
        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            self.pending.push(self.frame_sum / f32::from(channels));
            self.frame_sum = 0.0;
            self.frame_pos = 0;
        }
        if self.pending.len() >= BATCH {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.tap.push(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S: Source> Iterator for Tap<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        match self.inner.next() {
            Some(sample) => {
                if self.tap.is_enabled() {
                    self.record(sample);
                }
                Some(sample)
            }
            None => {
                self.flush();
                None
            }
        }
    }
}

impl<S: Source> Source for Tap<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.pending.clear();
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.inner.try_seek(pos)
    }
}
