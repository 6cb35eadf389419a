//! Processing unit types for the host graph.
//!
//! Each unit has a [`UnitId`] handed out to filters and a [`UnitKind`] that
//! decides what it does with audio. `UnitData` bundles the kind with adjacency
//! bookkeeping and the unit's per-block output buffer.

use super::buffer::StereoBuffer;
use super::convolver::Convolver;
use super::edge::EdgeId;

/// Handle to a processing unit in a host graph.
///
/// Unit IDs are assigned sequentially and never reused within a graph instance,
/// so a stale handle can never alias a newer unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitId(pub(crate) u32);

impl UnitId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

/// The role of a unit in the graph.
pub enum UnitKind {
    /// Receives external audio. Exactly one per graph, created with it.
    Input,
    /// Produces final audio. Exactly one per graph, created with it.
    Output,
    /// Multiplies the summed input by a constant.
    Gain(f32),
    /// Convolves its input with an assignable impulse response.
    Convolver(Box<Convolver>),
}

impl UnitKind {
    /// Short lowercase label, used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Gain(_) => "gain",
            Self::Convolver(_) => "convolver",
        }
    }
}

/// Internal bookkeeping for a unit.
pub(crate) struct UnitData {
    pub kind: UnitKind,
    /// Edges arriving at this unit.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this unit.
    pub outgoing: Vec<EdgeId>,
    /// Output of the most recent block, read by downstream units.
    pub output: StereoBuffer,
}

impl UnitData {
    pub fn new(kind: UnitKind, block_size: usize) -> Self {
        Self {
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            output: StereoBuffer::new(block_size),
        }
    }
}
