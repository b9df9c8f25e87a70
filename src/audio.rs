mod analyser;
mod backend;
mod fake;
mod graph;
mod player;
mod sink;
mod tap;
mod thread;
mod types;

pub use analyser::{AnalyserConfig, FrequencyAnalyser};
pub use backend::AudioBackend;
pub use fake::{FakeAudio, FakeBackend, FakeOptions, FakeProbe};
pub use graph::{AudioGraph, TimeUpdate};
pub use player::RodioBackend;
pub use tap::SampleTap;
pub use types::{AudioCmd, AudioError, GraphState, PlaybackHandle, PlaybackInfo};
