use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;

/// Source of the synthesized spectrum shown while real analysis is unavailable.
pub trait SignalGenerator: Send {
    /// Fill every bin of `out` for time `t_ms` (milliseconds).
    fn fill(&mut self, t_ms: f64, out: &mut [u8]);
}

/// Slowly drifting trig noise, tilted toward the low bins and jittered.
pub struct PseudoNoise {
    rng: StdRng,
}

impl PseudoNoise {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Noise level of one bin before jitter.
    pub fn envelope(t_ms: f64, bin: usize, bins: usize) -> f64 {
        let t = t_ms + bin as f64 * 100.0;
        let noise = ((t * 0.005).sin() * (t * 0.01).cos() * 255.0).abs();
        let factor = 1.0 - bin as f64 / bins as f64;
        noise * factor
    }
}

impl Default for PseudoNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator for PseudoNoise {
    fn fill(&mut self, t_ms: f64, out: &mut [u8]) {
        let bins = out.len();
        for (i, slot) in out.iter_mut().enumerate() {
            let unit: f64 = StandardUniform.sample(&mut self.rng);
            let jitter = 0.5 + unit * 0.5;
            *slot = (Self::envelope(t_ms, i, bins) * jitter).min(255.0) as u8;
        }
    }
}
