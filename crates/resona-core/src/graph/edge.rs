//! Graph edge types.
//!
//! An `Edge` carries audio from the output of one unit to the input of another.

use super::unit::UnitId;

/// Unique identifier for a connection in the host graph.
///
/// Edge IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A directed connection between two units.
pub(crate) struct Edge {
    pub from: UnitId,
    pub to: UnitId,
}
