//! Host audio graph capability and the in-process reference host.
//!
//! Filters never reach into a global audio context. Instead every operation that
//! touches the host receives the [`AudioGraph`] capability explicitly. The
//! capability covers exactly what a filter needs:
//!
//! - create a convolution unit
//! - query the sample rate
//! - allocate a multi-channel sample buffer
//! - connect and disconnect units
//! - assign an impulse response to a convolution unit
//! - release a unit
//!
//! # Reference Host
//!
//! [`ProcessingGraph`] implements the capability in-process. Units live in
//! slot-indexed storage, ids are never reused, and connections are validated at
//! mutation time (no cycles, no duplicates, nothing into Input, nothing out of
//! Output). [`compile()`](ProcessingGraph::compile) produces a topological
//! order and [`process_block()`](ProcessingGraph::process_block) renders stereo
//! blocks through it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resona_core::graph::{AudioGraph, ProcessingGraph};
//!
//! let mut graph = ProcessingGraph::new(1000.0, 64);
//! let conv = graph.create_convolver().unwrap();
//! let mut ir = graph.create_buffer(2, 1000, 1000.0).unwrap();
//! ir.channel_mut(0)[0] = 1.0;
//! ir.channel_mut(1)[0] = 1.0;
//! graph.set_impulse_response(conv, Arc::new(ir)).unwrap();
//!
//! graph.connect(graph.input(), conv).unwrap();
//! graph.connect(conv, graph.output()).unwrap();
//!
//! let input = vec![0.5; 64];
//! let (mut left, mut right) = (vec![0.0; 64], vec![0.0; 64]);
//! graph.process_block(&input, &input, &mut left, &mut right).unwrap();
//! assert!((left[10] - 0.5).abs() < 1e-4);
//! ```

pub mod buffer;
pub mod context;
pub mod convolver;
pub mod edge;
mod processing;
pub mod unit;

pub use buffer::{AudioBuffer, StereoBuffer};
pub use context::{AudioGraph, GraphError};
pub use convolver::Convolver;
pub use edge::EdgeId;
pub use processing::ProcessingGraph;
pub use unit::{UnitId, UnitKind};
