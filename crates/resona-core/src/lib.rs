//! Resona Core - audio graph capability and filter chaining
//!
//! This crate provides the plumbing that lets a named audio transform be spliced
//! into a host's audio processing graph without the graph knowing its internals.
//!
//! # Core Abstractions
//!
//! ## Host Capability
//!
//! - [`AudioGraph`] - Object-safe trait for the host audio graph: create units,
//!   allocate buffers, connect, assign impulse responses, release
//! - [`AudioBuffer`] - Fallibly allocated multi-channel sample buffer
//! - [`GraphError`] - Everything a host operation can fail with
//!
//! ## Filter Chaining
//!
//! - [`FilterChainLink`] - Ordered, connected run of units with one input and one output
//! - [`Filter`] - Capability trait implemented by every concrete filter
//! - [`FilterPipeline`] - Splices an ordered list of filters between a source and a destination
//!
//! ## Reference Host
//!
//! - [`ProcessingGraph`] - In-process [`AudioGraph`] with block rendering
//! - [`Convolver`] - Uniformly partitioned FFT convolution unit
//!
//! ## Parameters
//!
//! - [`ParameterInfo`] / [`ParamDescriptor`] - Introspectable parameter metadata
//!
//! # Example
//!
//! ```rust
//! use resona_core::{AudioGraph, FilterChainLink, ProcessingGraph};
//!
//! let mut graph = ProcessingGraph::new(48000.0, 256);
//! let convolver = graph.create_convolver().unwrap();
//! let mut link = FilterChainLink::single(convolver);
//!
//! let (input, output) = (graph.input(), graph.output());
//! graph.connect(input, link.input().unwrap()).unwrap();
//! link.connect(&mut graph, output).unwrap();
//!
//! link.destroy(&mut graph);
//! link.destroy(&mut graph); // second call is a no-op
//! ```
//!
//! # Design Principles
//!
//! - **Injected host**: every mutating call takes `&mut dyn AudioGraph`; there is
//!   no global audio context
//! - **Fallible allocation**: buffer exhaustion is an error value, never an abort
//! - **Idempotent teardown**: destroying twice is always safe

pub mod filter;
pub mod graph;
pub mod param_info;
pub mod pipeline;

// Re-export main types at crate root
pub use filter::{Filter, FilterChainLink};
pub use graph::{
    AudioBuffer, AudioGraph, Convolver, EdgeId, GraphError, ProcessingGraph, StereoBuffer,
    UnitId, UnitKind,
};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamUnit, ParameterInfo};
pub use pipeline::{FilterPipeline, SpliceError};
