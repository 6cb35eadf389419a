//! Convolution reverb driven by a synthesized noise tail.
//!
//! [`ReverbSynthesizer`] owns one convolution unit in the host graph. On
//! construction and on every parameter change it synthesizes a fresh stereo
//! impulse response (see [`crate::impulse`]) and hands it to that unit in a
//! single [`AudioGraph::set_impulse_response`] call.
//!
//! Setting a parameter always resynthesizes, even when the value is
//! unchanged; the noise is redrawn each time.

use std::any::Any;
use std::sync::Arc;

use resona_core::{
    AudioBuffer, AudioGraph, Filter, FilterChainLink, GraphError, ParamDescriptor, ParameterInfo,
    UnitId,
};

use crate::impulse::synthesize;
use crate::noise::{NoiseSource, UniformNoise};
use crate::params::{DESCRIPTORS, ReverbParams};

/// Shared handle to a synthesized stereo impulse response.
pub type ImpulseResponse = Arc<AudioBuffer>;

/// Noise-tail convolution reverb.
///
/// # Parameters
///
/// - `seconds`: 1.0-50.0, tail length (default 3.0)
/// - `decay`: 0.0-100.0, envelope exponent (default 2.0)
/// - `reverse`: swell instead of decay (default false)
///
/// # Example
///
/// ```rust
/// use resona_core::{AudioGraph, Filter, ProcessingGraph};
/// use resona_effects::ReverbSynthesizer;
///
/// let mut graph = ProcessingGraph::new(8000.0, 256);
/// let mut reverb = ReverbSynthesizer::new(&mut graph, 1.0, 2.0, false).unwrap();
/// assert_eq!(reverb.impulse_response().unwrap().len(), 8000);
///
/// reverb.set_seconds(&mut graph, 100.0).unwrap();
/// assert_eq!(reverb.seconds(), 50.0);
///
/// let (input, output) = (graph.input(), graph.output());
/// graph.connect(input, reverb.input().unwrap()).unwrap();
/// reverb.link().connect(&mut graph, output).unwrap();
///
/// reverb.destroy(&mut graph);
/// reverb.destroy(&mut graph);
/// ```
#[derive(Debug)]
pub struct ReverbSynthesizer<N = UniformNoise> {
    params: ReverbParams,
    link: FilterChainLink,
    convolver: Option<UnitId>,
    impulse: Option<ImpulseResponse>,
    noise: N,
}

impl ReverbSynthesizer<UniformNoise> {
    /// Creates a reverb with OS-seeded noise.
    ///
    /// Out-of-range values are clamped.
    ///
    /// # Errors
    ///
    /// Host failures while creating the convolution unit or the first
    /// impulse response. Nothing is left behind in the graph on failure.
    pub fn new(
        graph: &mut dyn AudioGraph,
        seconds: f32,
        decay: f32,
        reverse: bool,
    ) -> Result<Self, GraphError> {
        Self::with_noise(
            graph,
            ReverbParams::new(seconds, decay, reverse),
            UniformNoise::from_entropy(),
        )
    }

    /// Creates a reverb with default parameters (3 s, decay 2, forward).
    pub fn with_defaults(graph: &mut dyn AudioGraph) -> Result<Self, GraphError> {
        Self::with_noise(graph, ReverbParams::default(), UniformNoise::from_entropy())
    }
}

impl<N: NoiseSource> ReverbSynthesizer<N> {
    /// Creates a reverb drawing from a caller-supplied noise source.
    pub fn with_noise(
        graph: &mut dyn AudioGraph,
        params: ReverbParams,
        noise: N,
    ) -> Result<Self, GraphError> {
        let unit = graph.create_convolver()?;
        let mut reverb = Self {
            params,
            link: FilterChainLink::single(unit),
            convolver: Some(unit),
            impulse: None,
            noise,
        };
        if let Err(err) = reverb.reconfigure(graph, params) {
            reverb.destroy(graph);
            return Err(err);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("reverb_new: convolver {unit}");
        Ok(reverb)
    }

    /// Current parameters.
    pub fn params(&self) -> ReverbParams {
        self.params
    }

    /// Tail length in seconds.
    pub fn seconds(&self) -> f32 {
        self.params.seconds()
    }

    /// Envelope exponent.
    pub fn decay(&self) -> f32 {
        self.params.decay()
    }

    /// Whether the tail swells instead of decaying.
    pub fn reverse(&self) -> bool {
        self.params.reverse()
    }

    /// The impulse response currently assigned to the convolution unit.
    pub fn impulse_response(&self) -> Option<&ImpulseResponse> {
        self.impulse.as_ref()
    }

    /// The owned convolution unit, `None` after [`destroy`](Self::destroy).
    pub fn convolver(&self) -> Option<UnitId> {
        self.convolver
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.convolver.is_none()
    }

    /// Clamps and stores `seconds`, then resynthesizes.
    pub fn set_seconds(
        &mut self,
        graph: &mut dyn AudioGraph,
        seconds: f32,
    ) -> Result<ImpulseResponse, GraphError> {
        let params = self.params.with_seconds(seconds);
        self.reconfigure(graph, params)
    }

    /// Clamps and stores `decay`, then resynthesizes.
    pub fn set_decay(
        &mut self,
        graph: &mut dyn AudioGraph,
        decay: f32,
    ) -> Result<ImpulseResponse, GraphError> {
        let params = self.params.with_decay(decay);
        self.reconfigure(graph, params)
    }

    /// Stores `reverse`, then resynthesizes.
    pub fn set_reverse(
        &mut self,
        graph: &mut dyn AudioGraph,
        reverse: bool,
    ) -> Result<ImpulseResponse, GraphError> {
        let params = self.params.with_reverse(reverse);
        self.reconfigure(graph, params)
    }

    /// Sets the parameter at `index` from a plain value and resynthesizes.
    ///
    /// Returns `Ok(None)` for an unknown index, without touching anything.
    pub fn set_param(
        &mut self,
        graph: &mut dyn AudioGraph,
        index: usize,
        value: f32,
    ) -> Result<Option<ImpulseResponse>, GraphError> {
        if index >= DESCRIPTORS.len() {
            return Ok(None);
        }
        let params = self.params.with_param(index, value);
        self.reconfigure(graph, params).map(Some)
    }

    /// Replaces all parameters and synthesizes a new impulse response.
    ///
    /// The buffer is allocated and assigned before anything is stored, so on
    /// error the previous parameters and impulse response stay in effect.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Destroyed`] after [`destroy`](Self::destroy)
    /// - allocation or assignment failures from the host, unchanged
    pub fn reconfigure(
        &mut self,
        graph: &mut dyn AudioGraph,
        params: ReverbParams,
    ) -> Result<ImpulseResponse, GraphError> {
        let unit = self.convolver.ok_or(GraphError::Destroyed)?;
        let impulse = Arc::new(synthesize(graph, &params, &mut self.noise)?);
        graph.set_impulse_response(unit, Arc::clone(&impulse))?;

        self.params = params;
        self.impulse = Some(Arc::clone(&impulse));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "reverb_rebuild: {unit} {:.2} s, decay {:.2}, reverse {}",
            params.seconds(),
            params.decay(),
            params.reverse()
        );
        Ok(impulse)
    }

    /// Releases the convolution unit and drops the impulse response. Idempotent.
    pub fn destroy(&mut self, graph: &mut dyn AudioGraph) {
        self.convolver = None;
        self.impulse = None;
        self.link.destroy(graph);
    }
}

impl<N: NoiseSource + 'static> Filter for ReverbSynthesizer<N> {
    fn name(&self) -> &str {
        "reverb"
    }

    fn link(&self) -> &FilterChainLink {
        &self.link
    }

    fn link_mut(&mut self) -> &mut FilterChainLink {
        &mut self.link
    }

    fn destroy(&mut self, graph: &mut dyn AudioGraph) {
        ReverbSynthesizer::destroy(self, graph);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<N> ParameterInfo for ReverbSynthesizer<N> {
    fn param_count(&self) -> usize {
        DESCRIPTORS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        DESCRIPTORS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        self.params.param(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{PARAM_DECAY, PARAM_REVERSE, PARAM_SECONDS};
    use resona_core::{FilterPipeline, ProcessingGraph};

    const RATE: f32 = 100.0;

    fn graph() -> ProcessingGraph {
        ProcessingGraph::new(RATE, 16)
    }

    fn seeded(graph: &mut ProcessingGraph, params: ReverbParams) -> ReverbSynthesizer {
        ReverbSynthesizer::with_noise(graph, params, UniformNoise::seeded(1)).unwrap()
    }

    #[test]
    fn construction_assigns_impulse() {
        let mut g = graph();
        let reverb = seeded(&mut g, ReverbParams::default());
        let unit = reverb.convolver().unwrap();

        let ir = reverb.impulse_response().unwrap();
        assert_eq!(ir.channel_count(), 2);
        assert_eq!(ir.len(), 300);
        let assigned = g.convolver(unit).unwrap().impulse_response().unwrap();
        assert!(Arc::ptr_eq(ir, assigned));
        assert_eq!(reverb.input(), Some(unit));
        assert_eq!(reverb.output(), Some(unit));
    }

    #[test]
    fn constructor_clamps() {
        let mut g = graph();
        let reverb = ReverbSynthesizer::new(&mut g, 0.0, 500.0, true).unwrap();
        assert_eq!(reverb.seconds(), 1.0);
        assert_eq!(reverb.decay(), 100.0);
        assert!(reverb.reverse());
    }

    #[test]
    fn setters_clamp_and_resize() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());

        let ir = reverb.set_seconds(&mut g, 100.0).unwrap();
        assert_eq!(reverb.seconds(), 50.0);
        assert_eq!(ir.len(), 5000);

        reverb.set_decay(&mut g, -4.0).unwrap();
        assert_eq!(reverb.decay(), 0.0);

        reverb.set_reverse(&mut g, true).unwrap();
        assert!(reverb.reverse());
        assert_eq!(reverb.seconds(), 50.0);
    }

    #[test]
    fn same_value_still_resynthesizes() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());
        let first = reverb.set_seconds(&mut g, 2.0).unwrap();
        let second = reverb.set_seconds(&mut g, 2.0).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_ne!(first.channel(0), second.channel(0));
    }

    #[test]
    fn allocation_failure_keeps_previous_state() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());
        let before = Arc::clone(reverb.impulse_response().unwrap());
        let unit = reverb.convolver().unwrap();

        g.set_buffer_limit(Some(1000));
        let err = reverb.set_seconds(&mut g, 10.0);
        assert!(matches!(err, Err(GraphError::Allocation { requested: 2000 })));
        assert_eq!(reverb.seconds(), 3.0);
        assert!(Arc::ptr_eq(reverb.impulse_response().unwrap(), &before));
        let assigned = g.convolver(unit).unwrap().impulse_response().unwrap();
        assert!(Arc::ptr_eq(assigned, &before));
    }

    #[test]
    fn failed_construction_leaves_graph_clean() {
        let mut g = graph().with_buffer_limit(10);
        let result = ReverbSynthesizer::with_defaults(&mut g);
        assert!(matches!(result, Err(GraphError::Allocation { .. })));
        assert_eq!(g.unit_count(), 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());
        let unit = reverb.convolver().unwrap();
        let output = g.output();
        reverb.link().connect(&mut g, output).unwrap();

        reverb.destroy(&mut g);
        assert!(reverb.is_destroyed());
        assert!(reverb.impulse_response().is_none());
        assert!(reverb.input().is_none());
        assert!(!g.contains_unit(unit));
        assert_eq!(g.edge_count(), 0);

        reverb.destroy(&mut g);
        assert!(reverb.is_destroyed());
    }

    #[test]
    fn mutation_after_destroy_is_refused() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());
        reverb.destroy(&mut g);
        assert!(matches!(
            reverb.set_decay(&mut g, 5.0),
            Err(GraphError::Destroyed)
        ));
        assert_eq!(reverb.decay(), 2.0);
    }

    #[test]
    fn parameter_info() {
        let mut g = graph();
        let mut reverb = seeded(&mut g, ReverbParams::default());
        assert_eq!(reverb.param_count(), 3);
        assert_eq!(reverb.param_info(PARAM_SECONDS).unwrap().name, "Seconds");
        assert_eq!(reverb.find_param_by_name("decay"), Some(PARAM_DECAY));
        assert_eq!(reverb.get_param(PARAM_REVERSE), 0.0);

        reverb.set_param(&mut g, PARAM_REVERSE, 1.0).unwrap();
        assert!(reverb.reverse());
        reverb.set_param(&mut g, PARAM_SECONDS, 0.5).unwrap();
        assert_eq!(reverb.get_param(PARAM_SECONDS), 1.0);
        assert!(reverb.set_param(&mut g, 7, 1.0).unwrap().is_none());
    }

    #[test]
    fn splices_into_pipeline() {
        let mut g = graph();
        let (input, output) = (g.input(), g.output());
        let mut pipeline = FilterPipeline::new(&mut g, input, output).unwrap();
        let reverb = seeded(&mut g, ReverbParams::new(1.0, 0.0, false));
        let unit = reverb.convolver().unwrap();
        pipeline.push(&mut g, Box::new(reverb)).unwrap();

        assert!(g.is_connected(input, unit));
        assert!(g.is_connected(unit, output));

        let reverb = pipeline.get_as_mut::<ReverbSynthesizer>(0).unwrap();
        reverb.set_decay(&mut g, 4.0).unwrap();
        assert_eq!(reverb.decay(), 4.0);

        pipeline.destroy(&mut g);
        assert!(!g.contains_unit(unit));
    }
}
