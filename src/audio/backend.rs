use super::types::{AudioError, GraphState};

/// Host audio capabilities used by the engine.
///
/// A backend models three host objects: a playback element (plays one source
/// at a time), a processing context, and an analysis node fed by the element.
/// The engine only talks to a backend through `AudioGraph`, which guarantees
/// that `create_element`, `construct` and `connect` each succeed at most once.
pub trait AudioBackend: Send {
    /// Create the playback element with the given gain (0.0 - 1.0).
    fn create_element(&mut self, volume: f32) -> Result<(), AudioError>;

    /// Bind the element to a new source, stopping the previous one.
    fn set_source(&mut self, src: &str) -> Result<(), AudioError>;

    /// Build the processing context and analysis node. The context starts suspended.
    fn construct(&mut self) -> Result<(), AudioError>;

    /// Route element -> analysis node -> output. Hosts reject a second connection.
    fn connect(&mut self) -> Result<(), AudioError>;

    fn graph_state(&self) -> GraphState;

    fn resume(&mut self) -> Result<(), AudioError>;

    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self);

    /// Move to `secs` and return where playback actually landed.
    fn seek(&mut self, secs: f64) -> f64;

    fn set_volume(&mut self, volume: f32);

    /// Current position in seconds.
    fn position(&self) -> f64;

    /// Length of the current source in seconds, 0 when unknown.
    fn duration(&self) -> f64;

    /// Whether the source ran out since the last call.
    fn take_ended(&mut self) -> bool;

    /// Fill `out` with byte magnitudes. Returns false when no real data is available.
    fn spectrum(&mut self, out: &mut [u8]) -> bool;

    /// Stop playback and drop the element, context and analysis node.
    fn release(&mut self);
}
