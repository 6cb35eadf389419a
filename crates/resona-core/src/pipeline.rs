//! Ordered filter insertion between two host units.
//!
//! A [`FilterPipeline`] sits between a `source` unit (for example a sound
//! source or the graph's input) and a `destination` unit. Whenever its filter
//! list changes it tears down the edges it made and wires
//! `source → f0 → f1 → … → destination` again, so callers never touch the
//! connections themselves.

use crate::filter::Filter;
use crate::graph::{AudioGraph, EdgeId, GraphError, UnitId};

/// A splice that did not go through, carrying the filters it was given.
///
/// The pipeline never destroys filters it failed to take ownership of; they
/// come back here so the caller can retry, move or destroy them.
#[derive(thiserror::Error)]
#[error("could not splice {} filter(s): {error}", .rejected.len())]
pub struct SpliceError {
    /// What went wrong.
    #[source]
    pub error: GraphError,
    /// The filters passed in, in their original order.
    pub rejected: Vec<Box<dyn Filter>>,
}

impl SpliceError {
    fn new(error: GraphError, rejected: Vec<Box<dyn Filter>>) -> Self {
        Self { error, rejected }
    }

    /// Destroys the rejected filters and returns the underlying error.
    pub fn discard(mut self, graph: &mut dyn AudioGraph) -> GraphError {
        for filter in &mut self.rejected {
            filter.destroy(graph);
        }
        self.error
    }
}

impl core::fmt::Debug for SpliceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpliceError")
            .field("error", &self.error)
            .field(
                "rejected",
                &self.rejected.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Owns an ordered list of filters spliced between `source` and `destination`.
///
/// Filters removed from the pipeline, or refused by it, are handed back to the
/// caller still alive. Members destroyed in place (through
/// [`get_as_mut`](Self::get_as_mut)) are dropped from the list on the next
/// change and the remaining chain is wired around them.
///
/// # Example
///
/// ```rust
/// use resona_core::{FilterPipeline, ProcessingGraph};
///
/// let mut graph = ProcessingGraph::new(48000.0, 64);
/// let (input, output) = (graph.input(), graph.output());
///
/// let mut pipeline = FilterPipeline::new(&mut graph, input, output).unwrap();
/// assert!(graph.is_connected(input, output));
/// assert!(pipeline.is_empty());
///
/// pipeline.destroy(&mut graph);
/// assert!(!graph.is_connected(input, output));
/// ```
pub struct FilterPipeline {
    source: UnitId,
    destination: UnitId,
    filters: Vec<Box<dyn Filter>>,
    /// Edges this pipeline created, torn down on every rewire.
    edges: Vec<EdgeId>,
    destroyed: bool,
}

impl FilterPipeline {
    /// Creates an empty pipeline and connects `source → destination`.
    pub fn new(
        graph: &mut dyn AudioGraph,
        source: UnitId,
        destination: UnitId,
    ) -> Result<Self, GraphError> {
        let mut pipeline = Self {
            source,
            destination,
            filters: Vec::new(),
            edges: Vec::new(),
            destroyed: false,
        };
        pipeline.rewire(graph)?;
        Ok(pipeline)
    }

    /// The unit feeding the first filter.
    pub fn source(&self) -> UnitId {
        self.source
    }

    /// The unit fed by the last filter.
    pub fn destination(&self) -> UnitId {
        self.destination
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if no filters are spliced in.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Edges currently owned by the pipeline.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// The filter at `index`.
    pub fn get(&self, index: usize) -> Option<&dyn Filter> {
        self.filters.get(index).map(|f| &**f)
    }

    /// The filter at `index`, downcast to its concrete type.
    pub fn get_as<T: Filter>(&self, index: usize) -> Option<&T> {
        self.filters.get(index)?.as_any().downcast_ref::<T>()
    }

    /// The filter at `index`, downcast mutably to its concrete type.
    pub fn get_as_mut<T: Filter>(&mut self, index: usize) -> Option<&mut T> {
        self.filters.get_mut(index)?.as_any_mut().downcast_mut::<T>()
    }

    /// Iterates filters in signal order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|f| &**f as &dyn Filter)
    }

    /// Appends a filter just before the destination.
    pub fn push(
        &mut self,
        graph: &mut dyn AudioGraph,
        filter: Box<dyn Filter>,
    ) -> Result<(), SpliceError> {
        let index = self.filters.len();
        self.insert(graph, index, filter)
    }

    /// Inserts a filter at `index` (clamped to the list length) and rewires.
    ///
    /// # Errors
    ///
    /// A [`SpliceError`] holding `filter`, undestroyed, with:
    ///
    /// - [`GraphError::Destroyed`] if the pipeline or the filter was destroyed
    /// - any connection error from the host; the previous wiring is restored
    pub fn insert(
        &mut self,
        graph: &mut dyn AudioGraph,
        index: usize,
        filter: Box<dyn Filter>,
    ) -> Result<(), SpliceError> {
        if let Err(err) = self.ensure_alive() {
            return Err(SpliceError::new(err, vec![filter]));
        }
        if filter.input().is_none() {
            return Err(SpliceError::new(GraphError::Destroyed, vec![filter]));
        }

        let index = self.prune(index);
        self.filters.insert(index, filter);
        if let Err(err) = self.rewire(graph) {
            let rejected = self.filters.remove(index);
            self.restore(graph);
            return Err(SpliceError::new(err, vec![rejected]));
        }
        Ok(())
    }

    /// Removes the filter at `index`, rewires, and returns it undestroyed.
    ///
    /// Returns `Ok(None)` when `index` is out of range. If rewiring fails the
    /// filter stays in the pipeline and the previous wiring is restored.
    pub fn remove(
        &mut self,
        graph: &mut dyn AudioGraph,
        index: usize,
    ) -> Result<Option<Box<dyn Filter>>, GraphError> {
        self.ensure_alive()?;
        if index >= self.filters.len() {
            return Ok(None);
        }

        let removed = self.filters.remove(index);
        let index = self.prune(index);
        if let Err(err) = self.rewire(graph) {
            self.filters.insert(index, removed);
            self.restore(graph);
            return Err(err);
        }
        Ok(Some(removed))
    }

    /// Replaces the whole list and returns the previous filters undestroyed.
    ///
    /// # Errors
    ///
    /// A [`SpliceError`] holding the new filters, undestroyed, with:
    ///
    /// - [`GraphError::Destroyed`] if the pipeline or any new filter was destroyed
    /// - any connection error from the host; the previous list and wiring are
    ///   restored
    pub fn set_filters(
        &mut self,
        graph: &mut dyn AudioGraph,
        filters: Vec<Box<dyn Filter>>,
    ) -> Result<Vec<Box<dyn Filter>>, SpliceError> {
        if let Err(err) = self.ensure_alive() {
            return Err(SpliceError::new(err, filters));
        }
        if filters.iter().any(|f| f.input().is_none()) {
            return Err(SpliceError::new(GraphError::Destroyed, filters));
        }

        self.prune(0);
        let previous = core::mem::replace(&mut self.filters, filters);
        if let Err(err) = self.rewire(graph) {
            let rejected = core::mem::replace(&mut self.filters, previous);
            self.restore(graph);
            return Err(SpliceError::new(err, rejected));
        }
        Ok(previous)
    }

    /// Removes every filter, reconnects `source → destination`, and returns
    /// the live filters undestroyed.
    ///
    /// If rewiring fails the filters stay in the pipeline and the previous
    /// wiring is restored.
    pub fn clear(
        &mut self,
        graph: &mut dyn AudioGraph,
    ) -> Result<Vec<Box<dyn Filter>>, GraphError> {
        self.ensure_alive()?;
        self.prune(0);
        let removed = core::mem::take(&mut self.filters);
        if let Err(err) = self.rewire(graph) {
            self.filters = removed;
            self.restore(graph);
            return Err(err);
        }
        Ok(removed)
    }

    /// Disconnects the pipeline and destroys every filter it owns. Idempotent.
    pub fn destroy(&mut self, graph: &mut dyn AudioGraph) {
        if self.destroyed {
            return;
        }
        self.unwire(graph);
        for mut filter in self.filters.drain(..) {
            filter.destroy(graph);
        }
        self.destroyed = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("pipeline_destroy: {} → {}", self.source, self.destination);
    }

    fn ensure_alive(&self) -> Result<(), GraphError> {
        if self.destroyed {
            Err(GraphError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Drops members destroyed in place and maps `index` onto the pruned list.
    fn prune(&mut self, index: usize) -> usize {
        let index = index.min(self.filters.len());
        let stale_before = self.filters[..index]
            .iter()
            .filter(|f| f.input().is_none())
            .count();
        let before = self.filters.len();
        self.filters.retain(|f| f.input().is_some());
        let pruned = before - self.filters.len();
        if pruned > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!("pipeline_prune: dropped {pruned} destroyed filter(s)");
        }
        index - stale_before
    }

    /// Tears down owned edges and connects the current list end to end.
    fn rewire(&mut self, graph: &mut dyn AudioGraph) -> Result<(), GraphError> {
        self.unwire(graph);

        let mut hops = Vec::with_capacity(self.filters.len() + 1);
        let mut from = self.source;
        for filter in &self.filters {
            let (Some(input), Some(output)) = (filter.input(), filter.output()) else {
                return Err(GraphError::Destroyed);
            };
            hops.push((from, input));
            from = output;
        }
        hops.push((from, self.destination));

        for (from, to) in hops {
            match graph.connect(from, to) {
                Ok(edge) => self.edges.push(edge),
                Err(err) => {
                    self.unwire(graph);
                    return Err(err);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "pipeline_rewire: {} filters, {} edges",
            self.filters.len(),
            self.edges.len()
        );
        Ok(())
    }

    /// Best-effort rewire after a failed change.
    fn restore(&mut self, graph: &mut dyn AudioGraph) {
        if let Err(_err) = self.rewire(graph) {
            #[cfg(feature = "tracing")]
            tracing::warn!("pipeline_restore: rewiring failed: {_err}");
        }
    }

    fn unwire(&mut self, graph: &mut dyn AudioGraph) {
        for edge in self.edges.drain(..) {
            // Edges vanish on their own when a filter releases its units.
            if let Err(_err) = graph.disconnect(edge) {
                #[cfg(feature = "tracing")]
                tracing::debug!("pipeline_unwire: {edge} already gone: {_err}");
            }
        }
    }
}

impl core::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("edges", &self.edges)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
