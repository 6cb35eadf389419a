//! In-process reference host: mutation API, cycle detection, and rendering.
//!
//! [`ProcessingGraph`] owns the topology (units and edges), implements the
//! [`AudioGraph`] capability that filters build on, and renders stereo blocks
//! from its Input unit to its Output unit.
//!
//! The graph is mutated on the control thread. [`compile()`](ProcessingGraph::compile)
//! caches a topological order; rendering with a stale order recompiles first,
//! which allocates, so hosts that care call `compile()` after each batch of
//! mutations.

use std::sync::Arc;

use super::buffer::{AudioBuffer, StereoBuffer};
use super::context::{AudioGraph, GraphError};
use super::convolver::Convolver;
use super::edge::{Edge, EdgeId};
use super::unit::{UnitData, UnitId, UnitKind};

/// Directed acyclic graph of processing units.
///
/// Created with one Input and one Output unit. Everything else is added
/// through the [`AudioGraph`] capability ([`create_convolver`](AudioGraph::create_convolver))
/// or [`add_gain()`](Self::add_gain).
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add units and connect them ([`AudioGraph::connect`])
/// 3. Optionally [`compile()`](Self::compile)
/// 4. Render: [`process_block()`](Self::process_block)
pub struct ProcessingGraph {
    units: Vec<Option<UnitData>>,
    edges: Vec<Option<Edge>>,
    sample_rate: f32,
    block_size: usize,
    input: UnitId,
    output: UnitId,
    next_unit_slot: u32,
    next_edge_slot: u32,
    /// Largest buffer (samples across all channels) `create_buffer` will hand out.
    buffer_limit: Option<usize>,
    /// Cached topological order of unit slots; `None` after any mutation.
    order: Option<Vec<usize>>,
    /// Summing bus for the unit being rendered.
    mix: StereoBuffer,
}

impl ProcessingGraph {
    /// Creates a graph with only its Input and Output units.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz (e.g., 48000.0)
    /// * `block_size` - Number of samples per rendered block (e.g., 256)
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        let mut graph = Self {
            units: Vec::new(),
            edges: Vec::new(),
            sample_rate,
            block_size,
            input: UnitId(0),
            output: UnitId(0),
            next_unit_slot: 0,
            next_edge_slot: 0,
            buffer_limit: None,
            order: None,
            mix: StereoBuffer::new(block_size),
        };
        graph.input = graph.add_unit(UnitKind::Input);
        graph.output = graph.add_unit(UnitKind::Output);
        graph
    }

    /// Caps the size of any single buffer `create_buffer` will allocate.
    ///
    /// Requests above `max_samples` (summed over channels) fail with
    /// [`GraphError::Allocation`], the same way a host out of memory would.
    pub fn with_buffer_limit(mut self, max_samples: usize) -> Self {
        self.buffer_limit = Some(max_samples);
        self
    }

    /// Changes or removes the buffer size cap.
    pub fn set_buffer_limit(&mut self, max_samples: Option<usize>) {
        self.buffer_limit = max_samples;
    }

    /// The graph's Input unit.
    pub fn input(&self) -> UnitId {
        self.input
    }

    /// The graph's Output unit.
    pub fn output(&self) -> UnitId {
        self.output
    }

    /// Returns the block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Adds a constant gain unit. Returns the new unit's ID.
    pub fn add_gain(&mut self, gain: f32) -> UnitId {
        let id = self.add_unit(UnitKind::Gain(gain));
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: gain unit {id}");
        id
    }

    /// Returns the kind of a unit, if it exists.
    pub fn unit_kind(&self, id: UnitId) -> Option<&UnitKind> {
        self.get_unit(id).ok().map(|u| &u.kind)
    }

    /// Returns true if the unit exists.
    pub fn contains_unit(&self, id: UnitId) -> bool {
        self.get_unit(id).is_ok()
    }

    /// Returns the convolver inside a unit, if it is one.
    pub fn convolver(&self, id: UnitId) -> Option<&Convolver> {
        match &self.get_unit(id).ok()?.kind {
            UnitKind::Convolver(conv) => Some(&**conv),
            _ => None,
        }
    }

    /// Returns the number of live units, Input and Output included.
    pub fn unit_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_some()).count()
    }

    /// Returns the number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Returns the number of edges touching a unit (0 for unknown units).
    pub fn degree(&self, id: UnitId) -> usize {
        self.get_unit(id)
            .map_or(0, |u| u.incoming.len() + u.outgoing.len())
    }

    /// Finds the edge from `from` to `to`, if connected.
    pub fn find_edge(&self, from: UnitId, to: UnitId) -> Option<EdgeId> {
        let unit = self.get_unit(from).ok()?;
        unit.outgoing.iter().copied().find(|edge_id| {
            self.edges[edge_id.0 as usize]
                .as_ref()
                .is_some_and(|e| e.to == to)
        })
    }

    /// Returns true if an edge from `from` to `to` exists.
    pub fn is_connected(&self, from: UnitId, to: UnitId) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Returns the units fed by `id`, in connection order.
    pub fn successors(&self, id: UnitId) -> Vec<UnitId> {
        self.get_unit(id).map_or_else(
            |_| Vec::new(),
            |u| {
                u.outgoing
                    .iter()
                    .filter_map(|e| self.edges[e.0 as usize].as_ref().map(|e| e.to))
                    .collect()
            },
        )
    }

    // --- Compilation ---

    /// Computes and caches a topological order of all live units.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if the topology has a cycle.
    pub fn compile(&mut self) -> Result<(), GraphError> {
        let order = self.kahn_sort()?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_sort: {} units in topo order", order.len());
        self.order = Some(order);
        Ok(())
    }

    /// Returns true if a cached order is available.
    pub fn is_compiled(&self) -> bool {
        self.order.is_some()
    }

    /// Renders one stereo block from the Input unit to the Output unit.
    ///
    /// Units with several inputs sum them. Units not reachable from Input
    /// render silence. The order is recompiled first if the graph changed.
    ///
    /// # Panics
    ///
    /// Panics if any slice is not exactly [`block_size()`](Self::block_size) long.
    pub fn process_block(
        &mut self,
        left_in: &[f32],
        right_in: &[f32],
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) -> Result<(), GraphError> {
        let bs = self.block_size;
        assert!(
            left_in.len() == bs
                && right_in.len() == bs
                && left_out.len() == bs
                && right_out.len() == bs,
            "process_block: all slices must be {bs} samples"
        );

        if self.order.is_none() {
            self.compile()?;
        }
        let order = self.order.take().unwrap_or_default();

        for &idx in &order {
            self.mix.clear();
            if let Some(unit) = &self.units[idx] {
                for edge_id in &unit.incoming {
                    if let Some(edge) = &self.edges[edge_id.0 as usize]
                        && let Some(source) = &self.units[edge.from.0 as usize]
                    {
                        self.mix.accumulate_from(&source.output);
                    }
                }
            }

            let Some(unit) = self.units[idx].as_mut() else {
                continue;
            };
            match &mut unit.kind {
                UnitKind::Input => {
                    self.mix.left.copy_from_slice(left_in);
                    self.mix.right.copy_from_slice(right_in);
                }
                UnitKind::Output => {
                    left_out.copy_from_slice(&self.mix.left);
                    right_out.copy_from_slice(&self.mix.right);
                }
                UnitKind::Gain(gain) => self.mix.scale(*gain),
                UnitKind::Convolver(conv) => {
                    conv.process(&mut self.mix.left, &mut self.mix.right);
                }
            }
            core::mem::swap(&mut unit.output, &mut self.mix);
        }

        self.order = Some(order);
        Ok(())
    }

    /// Clears convolution state in every convolver.
    pub fn reset(&mut self) {
        for unit in self.units.iter_mut().flatten() {
            if let UnitKind::Convolver(conv) = &mut unit.kind {
                conv.reset();
            }
            unit.output.clear();
        }
    }

    // --- Internal helpers ---

    fn add_unit(&mut self, kind: UnitKind) -> UnitId {
        let id = UnitId(self.next_unit_slot);
        self.next_unit_slot += 1;

        let idx = id.0 as usize;
        if idx >= self.units.len() {
            self.units.resize_with(idx + 1, || None);
        }
        self.units[idx] = Some(UnitData::new(kind, self.block_size));
        self.order = None;
        id
    }

    fn get_unit(&self, id: UnitId) -> Result<&UnitData, GraphError> {
        self.units
            .get(id.0 as usize)
            .and_then(|u| u.as_ref())
            .ok_or(GraphError::UnitNotFound(id))
    }

    fn get_unit_mut(&mut self, id: UnitId) -> Result<&mut UnitData, GraphError> {
        self.units
            .get_mut(id.0 as usize)
            .and_then(|u| u.as_mut())
            .ok_or(GraphError::UnitNotFound(id))
    }

    /// Returns true if `to` is reachable from `from` via existing edges.
    fn can_reach(&self, from: UnitId, to: UnitId) -> bool {
        let mut visited = vec![false; self.units.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(unit)) = self.units.get(idx) {
                for edge_id in &unit.outgoing {
                    if let Some(edge) = &self.edges[edge_id.0 as usize] {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    fn validate_connection(&self, from: UnitId, to: UnitId) -> Result<(), GraphError> {
        let from_unit = self.get_unit(from)?;
        let to_unit = self.get_unit(to)?;

        if from == to {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect {from} to itself"
            )));
        }
        if matches!(to_unit.kind, UnitKind::Input) {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect into Input unit {from}→{to}"
            )));
        }
        if matches!(from_unit.kind, UnitKind::Output) {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect from Output unit {from}→{to}"
            )));
        }
        Ok(())
    }

    fn disconnect_internal(&mut self, id: EdgeId) {
        let idx = id.0 as usize;
        if let Some(edge) = self.edges.get_mut(idx).and_then(Option::take) {
            if let Some(Some(unit)) = self.units.get_mut(edge.from.0 as usize) {
                unit.outgoing.retain(|e| *e != id);
            }
            if let Some(Some(unit)) = self.units.get_mut(edge.to.0 as usize) {
                unit.incoming.retain(|e| *e != id);
            }
            self.order = None;
        }
    }

    fn kahn_sort(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.units.len();
        let mut in_degree = vec![0u32; n];
        let mut active_count = 0usize;

        for (i, unit) in self.units.iter().enumerate() {
            if let Some(unit) = unit {
                active_count += 1;
                in_degree[i] = unit
                    .incoming
                    .iter()
                    .filter(|e| self.edges[e.0 as usize].is_some())
                    .count() as u32;
            }
        }

        let mut queue: Vec<usize> = (0..n)
            .filter(|&i| self.units[i].is_some() && in_degree[i] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(active_count);

        while let Some(idx) = queue.pop() {
            sorted.push(idx);
            let Some(unit) = &self.units[idx] else {
                continue;
            };
            for edge_id in &unit.outgoing {
                if let Some(edge) = &self.edges[edge_id.0 as usize] {
                    let to_idx = edge.to.0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        queue.push(to_idx);
                    }
                }
            }
        }

        if sorted.len() != active_count {
            return Err(GraphError::CycleDetected);
        }
        Ok(sorted)
    }
}

impl AudioGraph for ProcessingGraph {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn create_convolver(&mut self) -> Result<UnitId, GraphError> {
        let conv = Convolver::new(self.block_size);
        let id = self.add_unit(UnitKind::Convolver(Box::new(conv)));
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: convolver unit {id}");
        Ok(id)
    }

    fn create_buffer(
        &mut self,
        channel_count: usize,
        length: usize,
        sample_rate: f32,
    ) -> Result<AudioBuffer, GraphError> {
        let requested = channel_count.saturating_mul(length);
        if let Some(limit) = self.buffer_limit
            && requested > limit
        {
            #[cfg(feature = "tracing")]
            tracing::warn!("graph_alloc: {requested} samples exceeds limit {limit}");
            return Err(GraphError::Allocation { requested });
        }
        AudioBuffer::try_new(channel_count, length, sample_rate)
    }

    /// Connects two units with a directed edge.
    ///
    /// Fails if either unit doesn't exist, the edge would create a cycle, a
    /// duplicate edge exists, or the connection is structurally invalid (self
    /// loop, edge into Input, edge out of Output).
    fn connect(&mut self, from: UnitId, to: UnitId) -> Result<EdgeId, GraphError> {
        self.validate_connection(from, to)?;

        if self.is_connected(from, to) {
            return Err(GraphError::DuplicateEdge(from, to));
        }
        // A cycle exists if `to` can already reach `from`.
        if self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }

        let edge_id = EdgeId(self.next_edge_slot);
        self.next_edge_slot += 1;

        let edge_idx = edge_id.0 as usize;
        if edge_idx >= self.edges.len() {
            self.edges.resize_with(edge_idx + 1, || None);
        }
        self.edges[edge_idx] = Some(Edge { from, to });

        self.get_unit_mut(from)?.outgoing.push(edge_id);
        self.get_unit_mut(to)?.incoming.push(edge_id);
        self.order = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {from} → {to}");
        Ok(edge_id)
    }

    fn disconnect(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        if self
            .edges
            .get(edge.0 as usize)
            .and_then(|e| e.as_ref())
            .is_none()
        {
            return Err(GraphError::EdgeNotFound(edge));
        }
        self.disconnect_internal(edge);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: edge {edge}");
        Ok(())
    }

    fn disconnect_outputs(&mut self, unit: UnitId) -> Result<(), GraphError> {
        let outgoing = self.get_unit(unit)?.outgoing.clone();
        for edge_id in outgoing {
            self.disconnect_internal(edge_id);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: all outputs of {unit}");
        Ok(())
    }

    fn set_impulse_response(
        &mut self,
        unit: UnitId,
        impulse: Arc<AudioBuffer>,
    ) -> Result<(), GraphError> {
        let data = self.get_unit_mut(unit)?;
        let UnitKind::Convolver(conv) = &mut data.kind else {
            return Err(GraphError::NotAConvolver(unit));
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_impulse: {unit} ← {} ch × {} samples",
            impulse.channel_count(),
            impulse.len()
        );
        conv.set_impulse_response(impulse);
        Ok(())
    }

    fn release(&mut self, unit: UnitId) -> Result<(), GraphError> {
        let data = self.get_unit(unit)?;
        if matches!(data.kind, UnitKind::Input | UnitKind::Output) {
            return Err(GraphError::InvalidConnection(format!(
                "cannot release {} unit {unit}",
                data.kind.label()
            )));
        }

        let edge_ids: Vec<EdgeId> = data
            .incoming
            .iter()
            .chain(data.outgoing.iter())
            .copied()
            .collect();
        for edge_id in edge_ids {
            self.disconnect_internal(edge_id);
        }

        self.units[unit.0 as usize] = None;
        self.order = None;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_release: unit {unit}");
        Ok(())
    }
}
