//! Resona Effects - noise-tail convolution reverb
//!
//! This crate provides the reverb filter built on resona-core:
//!
//! - [`ReverbSynthesizer`] - Owns a convolution unit and regenerates its
//!   impulse response on every parameter change
//! - [`ReverbParams`] - Clamped `seconds` / `decay` / `reverse` triple
//! - [`synthesize`] / [`envelope`] / [`impulse_length`] - The tail synthesis
//!   itself, usable without a filter
//! - [`NoiseSource`] / [`UniformNoise`] - Injectable, seedable noise
//!
//! ## Example
//!
//! ```rust
//! use resona_core::{FilterPipeline, ProcessingGraph};
//! use resona_effects::{ReverbParams, ReverbSynthesizer, UniformNoise};
//!
//! let mut graph = ProcessingGraph::new(8000.0, 128);
//! let (input, output) = (graph.input(), graph.output());
//! let mut pipeline = FilterPipeline::new(&mut graph, input, output).unwrap();
//!
//! let reverb = ReverbSynthesizer::with_noise(
//!     &mut graph,
//!     ReverbParams::new(2.0, 4.0, false),
//!     UniformNoise::seeded(42),
//! )
//! .unwrap();
//! pipeline.push(&mut graph, Box::new(reverb)).unwrap();
//!
//! let reverb = pipeline.get_as_mut::<ReverbSynthesizer>(0).unwrap();
//! reverb.set_reverse(&mut graph, true).unwrap();
//!
//! pipeline.destroy(&mut graph);
//! ```

pub mod impulse;
pub mod noise;
pub mod params;
pub mod reverb;

// Re-export main types at crate root
pub use impulse::{envelope, impulse_length, synthesize, write_tail};
pub use noise::{NoiseSource, UniformNoise};
pub use params::ReverbParams;
pub use reverb::{ImpulseResponse, ReverbSynthesizer};
