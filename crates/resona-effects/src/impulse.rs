//! Noise impulse response synthesis.
//!
//! A tail is white noise shaped by a power-law envelope. For a buffer of
//! `length` samples the envelope at sample `i` is
//!
//! ```text
//! n = reverse ? length - i : i
//! e = (1 - n / length) ^ decay
//! ```
//!
//! so `decay = 0` gives a flat tail, larger values pull the energy towards
//! the start (or, reversed, towards the end). Each channel draws its own
//! noise, left before right at every sample, which decorrelates the stereo
//! image.

use resona_core::{AudioBuffer, AudioGraph, GraphError};

use crate::noise::NoiseSource;
use crate::params::ReverbParams;

/// Number of samples in a tail of `seconds` at `sample_rate`, truncated.
///
/// ```rust
/// use resona_effects::impulse_length;
///
/// assert_eq!(impulse_length(44100.0, 1.0), 44100);
/// assert_eq!(impulse_length(1000.0, 1.2345), 1234);
/// ```
pub fn impulse_length(sample_rate: f32, seconds: f32) -> usize {
    (f64::from(sample_rate) * f64::from(seconds)) as usize
}

/// Envelope gain at `index` of a `length`-sample tail.
///
/// `index` is expected in `[0, length)`; larger values are treated as
/// `length`. A zero-length tail has no envelope and returns 0.
///
/// ```rust
/// use resona_effects::envelope;
///
/// assert_eq!(envelope(0, 100, 2.0, false), 1.0);
/// assert_eq!(envelope(50, 100, 1.0, false), 0.5);
/// assert_eq!(envelope(0, 100, 2.0, true), 0.0);
/// ```
pub fn envelope(index: usize, length: usize, decay: f32, reverse: bool) -> f32 {
    if length == 0 {
        return 0.0;
    }
    let index = index.min(length);
    let n = if reverse { length - index } else { index };
    let base = 1.0 - n as f64 / length as f64;
    libm::pow(base, f64::from(decay)) as f32
}

/// Fills `left` and `right` with enveloped noise.
///
/// Both slices must be the same length; that length is the tail length.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn write_tail<N: NoiseSource + ?Sized>(
    left: &mut [f32],
    right: &mut [f32],
    decay: f32,
    reverse: bool,
    noise: &mut N,
) {
    assert_eq!(left.len(), right.len(), "write_tail: channel length mismatch");
    let length = left.len();
    for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
        let e = envelope(i, length, decay, reverse);
        *l = noise.next_sample() * e;
        *r = noise.next_sample() * e;
    }
}

/// Allocates a stereo buffer through `graph` and synthesizes a tail into it.
///
/// The buffer length is `trunc(graph.sample_rate() × params.seconds())`.
///
/// # Errors
///
/// - whatever [`AudioGraph::create_buffer`] reports, unchanged
/// - [`GraphError::InvalidBuffer`] if the host hands back fewer than two channels
pub fn synthesize<N: NoiseSource + ?Sized>(
    graph: &mut dyn AudioGraph,
    params: &ReverbParams,
    noise: &mut N,
) -> Result<AudioBuffer, GraphError> {
    let rate = graph.sample_rate();
    let length = impulse_length(rate, params.seconds());
    let mut impulse = graph.create_buffer(2, length, rate)?;

    let channels = impulse.channel_count();
    let (left, right) = impulse.stereo_mut().ok_or_else(|| {
        GraphError::InvalidBuffer(format!("expected 2 channels, host returned {channels}"))
    })?;
    write_tail(left, right, params.decay(), params.reverse(), noise);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "impulse_synth: {length} samples at {rate} Hz, decay {}, reverse {}",
        params.decay(),
        params.reverse()
    );
    Ok(impulse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resona_core::ProcessingGraph;

    struct Constant(f32);

    impl NoiseSource for Constant {
        fn next_sample(&mut self) -> f32 {
            self.0
        }
    }

    /// Alternates +1, -1 so left and right draws are distinguishable.
    struct Alternating(bool);

    impl NoiseSource for Alternating {
        fn next_sample(&mut self) -> f32 {
            self.0 = !self.0;
            if self.0 { 1.0 } else { -1.0 }
        }
    }

    #[test]
    fn length_truncates() {
        assert_eq!(impulse_length(48000.0, 3.0), 144_000);
        assert_eq!(impulse_length(44100.0, 50.0), 2_205_000);
        assert_eq!(impulse_length(10.0, 1.09), 10);
    }

    #[test]
    fn flat_envelope_at_zero_decay() {
        for i in 0..100 {
            assert_eq!(envelope(i, 100, 0.0, false), 1.0);
            assert_eq!(envelope(i, 100, 0.0, true), 1.0);
        }
    }

    #[test]
    fn forward_envelope_is_power_law() {
        assert_eq!(envelope(0, 4, 2.0, false), 1.0);
        assert!((envelope(1, 4, 2.0, false) - 0.5625).abs() < 1e-7);
        assert!((envelope(2, 4, 2.0, false) - 0.25).abs() < 1e-7);
        assert!((envelope(3, 4, 2.0, false) - 0.0625).abs() < 1e-7);
    }

    #[test]
    fn reverse_envelope_mirrors_with_offset() {
        let len = 10;
        assert_eq!(envelope(0, len, 3.0, true), 0.0);
        for i in 1..len {
            assert_eq!(
                envelope(i, len, 3.0, true),
                envelope(len - i, len, 3.0, false)
            );
        }
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(envelope(0, 0, 2.0, false), 0.0);
        assert_eq!(envelope(20, 10, 2.0, false), 0.0);
    }

    #[test]
    fn left_draws_before_right() {
        let mut left = [0.0; 3];
        let mut right = [0.0; 3];
        write_tail(&mut left, &mut right, 0.0, false, &mut Alternating(false));
        assert_eq!(left, [1.0; 3]);
        assert_eq!(right, [-1.0; 3]);
    }

    #[test]
    fn synthesize_allocates_through_graph() {
        let mut graph = ProcessingGraph::new(100.0, 8);
        let params = ReverbParams::new(2.0, 1.0, false);
        let ir = synthesize(&mut graph, &params, &mut Constant(1.0)).unwrap();
        assert_eq!(ir.channel_count(), 2);
        assert_eq!(ir.len(), 200);
        assert_eq!(ir.sample_rate(), 100.0);
        assert_eq!(ir.channel(0)[0], 1.0);
        assert!((ir.channel(1)[100] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn synthesize_propagates_allocation_failure() {
        let mut graph = ProcessingGraph::new(100.0, 8).with_buffer_limit(100);
        let params = ReverbParams::new(1.0, 2.0, false);
        assert!(matches!(
            synthesize(&mut graph, &params, &mut Constant(1.0)),
            Err(GraphError::Allocation { requested: 200 })
        ));
    }
}
