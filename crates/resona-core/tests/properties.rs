//! Property-based tests for resona-core.
//!
//! Convolution accuracy against the direct sum, parameter clamping bounds and
//! chain link bookkeeping, using proptest for randomized input generation.

use std::sync::Arc;

use proptest::prelude::*;
use resona_core::{AudioBuffer, Convolver, FilterChainLink, ParamDescriptor, ProcessingGraph};

fn direct(input: &[f32], ir: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; input.len()];
    for (n, y) in out.iter_mut().enumerate() {
        for (k, &h) in ir.iter().enumerate().take(n + 1) {
            *y += h * input[n - k];
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The partitioned convolver agrees with direct convolution for any
    /// impulse length and block size.
    #[test]
    fn convolver_matches_direct_sum(
        block in 1usize..17,
        ir in prop::collection::vec(-1.0f32..=1.0f32, 1..60),
        input in prop::collection::vec(-1.0f32..=1.0f32, 64),
    ) {
        let mut buf = AudioBuffer::try_new(1, ir.len(), 1000.0).unwrap();
        buf.channel_mut(0).copy_from_slice(&ir);
        let mut conv = Convolver::new(block);
        conv.set_impulse_response(Arc::new(buf));

        let blocks = input.len() / block;
        let used = &input[..blocks * block];
        let mut out = Vec::with_capacity(used.len());
        for chunk in used.chunks(block) {
            let mut l = chunk.to_vec();
            let mut r = chunk.to_vec();
            conv.process(&mut l, &mut r);
            prop_assert_eq!(&l, &r);
            out.extend_from_slice(&l);
        }

        let expected = direct(used, &ir);
        for (i, (a, b)) in out.iter().zip(expected.iter()).enumerate() {
            prop_assert!((a - b).abs() < 1e-3, "sample {}: {} vs {}", i, a, b);
        }
    }

    /// Clamping always lands inside the descriptor's range.
    #[test]
    fn clamp_stays_in_range(
        value in prop::num::f32::ANY,
        min in -100.0f32..100.0f32,
        width in 0.0f32..100.0f32,
    ) {
        let desc = ParamDescriptor::custom("P", "P", min, min + width, min);
        let c = desc.clamp(value);
        prop_assert!(c >= desc.min && c <= desc.max);
        if value >= desc.min && value <= desc.max {
            prop_assert_eq!(c, value);
        }
    }

    /// A chain of n units creates n - 1 edges; destroying it removes every
    /// unit and edge.
    #[test]
    fn chain_link_bookkeeping(n in 1usize..12) {
        let mut graph = ProcessingGraph::new(1000.0, 8);
        let units: Vec<_> = (0..n).map(|_| graph.add_gain(1.0)).collect();
        let mut link = FilterChainLink::new(&mut graph, units.clone()).unwrap();

        prop_assert_eq!(graph.edge_count(), n - 1);
        prop_assert_eq!(link.input(), units.first().copied());
        prop_assert_eq!(link.output(), units.last().copied());

        link.destroy(&mut graph);
        prop_assert_eq!(graph.edge_count(), 0);
        prop_assert_eq!(graph.unit_count(), 2);
        prop_assert!(link.is_destroyed());
    }
}
