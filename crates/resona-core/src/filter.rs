//! Filter chaining: how a filter presents itself to the host graph.
//!
//! A filter may be built from several host units wired in sequence. The
//! [`FilterChainLink`] hides that sequence behind a single input and a single
//! output, so a pipeline can splice any filter between two units without
//! knowing what is inside it.

use std::any::Any;

use crate::graph::{AudioGraph, EdgeId, GraphError, UnitId};

/// Ordered run of connected host units with one input and one output.
///
/// While alive the link holds at least one unit and each adjacent pair is
/// connected output to input. After [`destroy`](Self::destroy) the link is
/// empty and [`input`](Self::input) / [`output`](Self::output) return `None`.
///
/// # Example
///
/// ```rust
/// use resona_core::{AudioGraph, FilterChainLink, ProcessingGraph};
///
/// let mut graph = ProcessingGraph::new(48000.0, 64);
/// let a = graph.add_gain(0.5);
/// let b = graph.add_gain(2.0);
///
/// let mut link = FilterChainLink::new(&mut graph, vec![a, b]).unwrap();
/// assert_eq!(link.input(), Some(a));
/// assert_eq!(link.output(), Some(b));
/// assert!(graph.is_connected(a, b));
///
/// link.destroy(&mut graph);
/// assert!(link.is_destroyed());
/// assert!(!graph.contains_unit(a));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChainLink {
    units: Vec<UnitId>,
}

impl FilterChainLink {
    /// Connects `units` in order and wraps them.
    ///
    /// # Errors
    ///
    /// - [`GraphError::EmptyChain`] if `units` is empty
    /// - any error from [`AudioGraph::connect`]; edges created before the
    ///   failure are removed again
    pub fn new(graph: &mut dyn AudioGraph, units: Vec<UnitId>) -> Result<Self, GraphError> {
        if units.is_empty() {
            return Err(GraphError::EmptyChain);
        }

        let mut created: Vec<EdgeId> = Vec::with_capacity(units.len() - 1);
        for pair in units.windows(2) {
            match graph.connect(pair[0], pair[1]) {
                Ok(edge) => created.push(edge),
                Err(err) => {
                    for edge in created {
                        if let Err(_undo) = graph.disconnect(edge) {
                            #[cfg(feature = "tracing")]
                            tracing::warn!("chain_new: rollback of {edge} failed: {_undo}");
                        }
                    }
                    return Err(err);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("chain_new: {} units", units.len());
        Ok(Self { units })
    }

    /// Wraps a single unit. No connections are made.
    pub fn single(unit: UnitId) -> Self {
        Self { units: vec![unit] }
    }

    /// The unit upstream audio should be connected to.
    pub fn input(&self) -> Option<UnitId> {
        self.units.first().copied()
    }

    /// The unit whose output leaves the chain.
    pub fn output(&self) -> Option<UnitId> {
        self.units.last().copied()
    }

    /// All wrapped units in signal order.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.units.is_empty()
    }

    /// Connects the chain's output to `destination`.
    ///
    /// # Errors
    ///
    /// [`GraphError::Destroyed`] after teardown, otherwise whatever the host
    /// reports.
    pub fn connect(
        &self,
        graph: &mut dyn AudioGraph,
        destination: UnitId,
    ) -> Result<EdgeId, GraphError> {
        let output = self.output().ok_or(GraphError::Destroyed)?;
        graph.connect(output, destination)
    }

    /// Removes every connection leaving the chain's output.
    pub fn disconnect(&self, graph: &mut dyn AudioGraph) -> Result<(), GraphError> {
        let output = self.output().ok_or(GraphError::Destroyed)?;
        graph.disconnect_outputs(output)
    }

    /// Tears the chain down: disconnects the output, releases every unit and
    /// empties the link.
    ///
    /// Host failures are logged and skipped. Calling this again is a no-op.
    pub fn destroy(&mut self, graph: &mut dyn AudioGraph) {
        let Some(output) = self.output() else {
            return;
        };

        if let Err(_err) = graph.disconnect_outputs(output) {
            #[cfg(feature = "tracing")]
            tracing::warn!("chain_destroy: disconnecting {output} failed: {_err}");
        }
        for unit in self.units.drain(..) {
            if let Err(_err) = graph.release(unit) {
                #[cfg(feature = "tracing")]
                tracing::warn!("chain_destroy: releasing {unit} failed: {_err}");
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("chain_destroy: released through {output}");
    }
}

/// A named audio transform that can be spliced into a host graph.
///
/// Implementors own a [`FilterChainLink`] and expose it; the provided methods
/// cover wiring and teardown. Override [`destroy`](Self::destroy) when the
/// filter holds more than its link, but keep it idempotent.
pub trait Filter: Any {
    /// Short display name, e.g. `"reverb"`.
    fn name(&self) -> &str;

    /// The filter's connection points.
    fn link(&self) -> &FilterChainLink;

    /// Mutable access to the connection points.
    fn link_mut(&mut self) -> &mut FilterChainLink;

    /// The unit upstream audio should be connected to.
    fn input(&self) -> Option<UnitId> {
        self.link().input()
    }

    /// The unit whose output leaves the filter.
    fn output(&self) -> Option<UnitId> {
        self.link().output()
    }

    /// Releases the filter's host units. Idempotent.
    fn destroy(&mut self, graph: &mut dyn AudioGraph) {
        self.link_mut().destroy(graph);
    }

    /// Upcast for downcasting a boxed filter.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting a boxed filter.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProcessingGraph;

    fn graph() -> ProcessingGraph {
        ProcessingGraph::new(1000.0, 8)
    }

    #[test]
    fn empty_chain_rejected() {
        let mut g = graph();
        assert!(matches!(
            FilterChainLink::new(&mut g, Vec::new()),
            Err(GraphError::EmptyChain)
        ));
    }

    #[test]
    fn chain_connects_in_order() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let b = g.add_gain(1.0);
        let c = g.add_gain(1.0);
        let link = FilterChainLink::new(&mut g, vec![a, b, c]).unwrap();

        assert_eq!(link.input(), Some(a));
        assert_eq!(link.output(), Some(c));
        assert_eq!(link.units(), &[a, b, c]);
        assert!(g.is_connected(a, b));
        assert!(g.is_connected(b, c));
        assert!(!g.is_connected(a, c));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn single_makes_no_edges() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let link = FilterChainLink::single(a);
        assert_eq!(link.input(), link.output());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn failed_chain_rolls_back() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let b = g.add_gain(1.0);
        // b -> a closes a loop after a -> b succeeded
        let result = FilterChainLink::new(&mut g, vec![a, b, a]);
        assert!(matches!(result, Err(GraphError::CycleDetected)));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn connect_and_disconnect_output() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let link = FilterChainLink::single(a);
        let out = g.output();

        link.connect(&mut g, out).unwrap();
        assert!(g.is_connected(a, out));
        link.disconnect(&mut g).unwrap();
        assert!(!g.is_connected(a, out));
    }

    #[test]
    fn destroy_releases_and_is_idempotent() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let b = g.add_gain(1.0);
        let (input, output) = (g.input(), g.output());
        let mut link = FilterChainLink::new(&mut g, vec![a, b]).unwrap();
        g.connect(input, a).unwrap();
        link.connect(&mut g, output).unwrap();

        link.destroy(&mut g);
        assert!(link.is_destroyed());
        assert_eq!(link.input(), None);
        assert_eq!(link.output(), None);
        assert!(!g.contains_unit(a));
        assert!(!g.contains_unit(b));
        assert_eq!(g.edge_count(), 0);

        link.destroy(&mut g);
        assert!(link.is_destroyed());
    }

    #[test]
    fn destroyed_link_refuses_wiring() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let mut link = FilterChainLink::single(a);
        link.destroy(&mut g);
        let out = g.output();
        assert!(matches!(
            link.connect(&mut g, out),
            Err(GraphError::Destroyed)
        ));
        assert!(matches!(link.disconnect(&mut g), Err(GraphError::Destroyed)));
    }

    #[test]
    fn destroy_tolerates_units_already_gone() {
        let mut g = graph();
        let a = g.add_gain(1.0);
        let mut link = FilterChainLink::single(a);
        g.release(a).unwrap();
        link.destroy(&mut g);
        assert!(link.is_destroyed());
    }
}
