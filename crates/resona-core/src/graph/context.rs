//! The host audio graph capability.

use std::sync::Arc;

use super::buffer::AudioBuffer;
use super::edge::EdgeId;
use super::unit::UnitId;

/// Errors that can occur during host graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The specified unit was not found in the graph.
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    /// The specified edge was not found in the graph.
    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    /// Adding this edge would create a cycle.
    #[error("adding this edge would create a cycle")]
    CycleDetected,

    /// A duplicate edge already exists between these units.
    #[error("edge from {0} to {1} already exists")]
    DuplicateEdge(UnitId, UnitId),

    /// A structurally invalid connection (e.g., an edge into Input).
    #[error("invalid connection: {0}")]
    InvalidConnection(String),

    /// An impulse response was assigned to a unit that is not a convolver.
    #[error("unit {0} is not a convolver")]
    NotAConvolver(UnitId),

    /// A filter chain link was built from an empty unit sequence.
    #[error("a filter chain needs at least one unit")]
    EmptyChain,

    /// A buffer with an unusable shape was requested or supplied.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// The host could not allocate memory for a buffer.
    #[error("could not allocate buffer of {requested} samples")]
    Allocation {
        /// Total samples requested across all channels.
        requested: usize,
    },

    /// The filter has already been destroyed.
    #[error("filter has been destroyed")]
    Destroyed,
}

/// Capability interface to the host audio processing graph.
///
/// Filters receive this explicitly on every call that touches the host, which
/// keeps them free of global state and lets tests substitute any graph.
///
/// The trait is object-safe; filters take `&mut dyn AudioGraph`.
pub trait AudioGraph {
    /// Current sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Creates a convolution unit with no impulse response (silent output).
    fn create_convolver(&mut self) -> Result<UnitId, GraphError>;

    /// Allocates a zeroed buffer of `channel_count` channels of `length` samples.
    ///
    /// Allocation failure is reported as [`GraphError::Allocation`] and must not
    /// touch any existing unit or buffer.
    fn create_buffer(
        &mut self,
        channel_count: usize,
        length: usize,
        sample_rate: f32,
    ) -> Result<AudioBuffer, GraphError>;

    /// Connects the output of `from` to the input of `to`.
    fn connect(&mut self, from: UnitId, to: UnitId) -> Result<EdgeId, GraphError>;

    /// Removes a single connection.
    fn disconnect(&mut self, edge: EdgeId) -> Result<(), GraphError>;

    /// Removes every connection leaving `unit`.
    fn disconnect_outputs(&mut self, unit: UnitId) -> Result<(), GraphError>;

    /// Makes `impulse` the active impulse response of a convolution unit,
    /// replacing the previous one in a single step.
    ///
    /// The unit keeps a shared reference and never mutates the buffer.
    fn set_impulse_response(
        &mut self,
        unit: UnitId,
        impulse: Arc<AudioBuffer>,
    ) -> Result<(), GraphError>;

    /// Removes a unit and every connection touching it.
    fn release(&mut self, unit: UnitId) -> Result<(), GraphError>;
}
