//! Property-based tests for impulse synthesis.
//!
//! Clamping, envelope bounds and reverse symmetry over randomized parameters.

use proptest::prelude::*;
use resona_core::ProcessingGraph;
use resona_effects::{
    NoiseSource, ReverbParams, ReverbSynthesizer, UniformNoise, envelope, impulse_length,
    synthesize,
};

struct Constant(f32);

impl NoiseSource for Constant {
    fn next_sample(&mut self) -> f32 {
        self.0
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Stored values are exactly the clamped inputs.
    #[test]
    fn params_clamp(seconds in -100.0f32..200.0f32, decay in -100.0f32..300.0f32) {
        let p = ReverbParams::new(seconds, decay, false);
        prop_assert_eq!(p.seconds(), seconds.clamp(1.0, 50.0));
        prop_assert_eq!(p.decay(), decay.clamp(0.0, 100.0));
    }

    /// Envelope gains lie in [0, 1] and never increase going forward.
    #[test]
    fn envelope_bounded_and_monotone(
        length in 1usize..2000,
        decay in 0.0f32..=100.0f32,
    ) {
        let mut previous = f32::INFINITY;
        for i in 0..length {
            let e = envelope(i, length, decay, false);
            prop_assert!((0.0..=1.0).contains(&e), "e[{}] = {}", i, e);
            prop_assert!(e <= previous);
            previous = e;
        }
    }

    /// Reversed envelope reads the forward one backwards, one sample offset.
    #[test]
    fn reverse_symmetry(length in 2usize..2000, decay in 0.0f32..=100.0f32) {
        for i in 1..length {
            prop_assert_eq!(
                envelope(i, length, decay, true),
                envelope(length - i, length, decay, false)
            );
        }
        let head = envelope(0, length, decay, true);
        let expected = if decay == 0.0 { 1.0 } else { 0.0 };
        prop_assert_eq!(head, expected);
    }

    /// Synthesized length follows the truncated product of rate and seconds.
    #[test]
    fn synthesized_length(rate in 50.0f32..2000.0f32, seconds in -5.0f32..80.0f32) {
        let mut graph = ProcessingGraph::new(rate, 32);
        let params = ReverbParams::new(seconds, 1.0, false);
        let ir = synthesize(&mut graph, &params, &mut Constant(0.5)).unwrap();
        prop_assert_eq!(ir.len(), impulse_length(rate, seconds.clamp(1.0, 50.0)));
        prop_assert_eq!(ir.channel_count(), 2);
    }

    /// Samples stay within the noise range whatever the parameters.
    #[test]
    fn synthesized_samples_bounded(
        decay in 0.0f32..=100.0f32,
        reverse in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut graph = ProcessingGraph::new(500.0, 32);
        let reverb = ReverbSynthesizer::with_noise(
            &mut graph,
            ReverbParams::new(1.0, decay, reverse),
            UniformNoise::seeded(seed),
        )
        .unwrap();
        let ir = reverb.impulse_response().unwrap();
        prop_assert!(ir.peak() <= 1.0);
    }
}
