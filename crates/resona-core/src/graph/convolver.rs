//! Uniformly partitioned FFT convolution.
//!
//! The impulse response is cut into partitions of one block each. Every
//! partition is transformed once when the impulse response is assigned. Per
//! block, the input is transformed once, pushed into a frequency-domain delay
//! line, multiplied against every partition and accumulated, then transformed
//! back and overlap-added. With the partition size equal to the render block
//! size the convolution adds no latency.
//!
//! Only bins `0..=N/2` are stored and multiplied; the upper half of each
//! spectrum is the conjugate mirror of the lower half because all signals are
//! real.
//!
//! Reference: Wefers, "Partitioned convolution algorithms for real-time
//! auralization" (2015), uniform partitioned overlap-add.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::buffer::AudioBuffer;

const ZERO: Complex<f32> = Complex { re: 0.0, im: 0.0 };

/// Stereo convolution unit.
///
/// A stereo impulse response convolves left with channel 0 and right with
/// channel 1. A mono impulse response feeds both channels. Without an impulse
/// response the unit outputs silence.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use resona_core::{AudioBuffer, Convolver};
///
/// let mut ir = AudioBuffer::try_new(1, 4, 48000.0).unwrap();
/// ir.channel_mut(0)[2] = 0.5;
///
/// let mut conv = Convolver::new(8);
/// conv.set_impulse_response(Arc::new(ir));
///
/// let mut left = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// let mut right = left;
/// conv.process(&mut left, &mut right);
/// assert!((left[2] - 0.5).abs() < 1e-6);
/// ```
pub struct Convolver {
    block_size: usize,
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    impulse: Option<Arc<AudioBuffer>>,
    /// Per channel: lower-half spectra of each impulse partition.
    partitions: [Vec<Vec<Complex<f32>>>; 2],
    /// Per channel: ring of lower-half spectra of past input blocks.
    history: [Vec<Vec<Complex<f32>>>; 2],
    /// Ring slot holding the newest input block.
    head: usize,
    /// Per channel: tail of the previous block's linear convolution.
    overlap: [Vec<f32>; 2],
    spectrum: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Convolver {
    /// Creates a convolver that processes blocks of exactly `block_size` samples.
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let fft_size = block_size * 2;
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            block_size,
            fft_size,
            forward,
            inverse,
            impulse: None,
            partitions: [Vec::new(), Vec::new()],
            history: [Vec::new(), Vec::new()],
            head: 0,
            overlap: [vec![0.0; block_size], vec![0.0; block_size]],
            spectrum: vec![ZERO; fft_size],
            accum: vec![ZERO; fft_size / 2 + 1],
            scratch: vec![ZERO; scratch_len],
        }
    }

    /// Returns the block size this convolver processes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the number of impulse partitions (0 without an impulse response).
    pub fn partition_count(&self) -> usize {
        self.partitions[0].len()
    }

    /// Returns the active impulse response, if any.
    pub fn impulse_response(&self) -> Option<&Arc<AudioBuffer>> {
        self.impulse.as_ref()
    }

    /// Replaces the impulse response.
    ///
    /// Partitions are transformed here, off the render path. Convolution state
    /// restarts from silence, so a tail that was ringing stops abruptly.
    pub fn set_impulse_response(&mut self, impulse: Arc<AudioBuffer>) {
        let bins = self.fft_size / 2 + 1;
        let count = impulse.len().div_ceil(self.block_size);
        let last_channel = impulse.channel_count().saturating_sub(1);

        for ch in 0..2 {
            let source = impulse.channel(ch.min(last_channel));
            let mut parts = Vec::with_capacity(count);
            for chunk in source.chunks(self.block_size) {
                self.spectrum.fill(ZERO);
                for (dst, &s) in self.spectrum.iter_mut().zip(chunk) {
                    dst.re = s;
                }
                self.forward
                    .process_with_scratch(&mut self.spectrum, &mut self.scratch);
                parts.push(self.spectrum[..bins].to_vec());
            }
            self.partitions[ch] = parts;
            self.history[ch] = vec![vec![ZERO; bins]; count];
        }

        self.impulse = Some(impulse);
        self.head = 0;
        for tail in &mut self.overlap {
            tail.fill(0.0);
        }
    }

    /// Clears convolution history without touching the impulse response.
    pub fn reset(&mut self) {
        for ring in &mut self.history {
            for slot in ring.iter_mut() {
                slot.fill(ZERO);
            }
        }
        for tail in &mut self.overlap {
            tail.fill(0.0);
        }
        self.head = 0;
    }

    /// Convolves one stereo block in place.
    ///
    /// Both slices must be exactly [`block_size()`](Self::block_size) long.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), self.block_size, "left block length");
        debug_assert_eq!(right.len(), self.block_size, "right block length");

        let count = self.partition_count();
        if count == 0 {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let n = self.fft_size;
        let half = n / 2;
        let bins = half + 1;
        let norm = 1.0 / n as f32;

        for (ch, samples) in [left, right].into_iter().enumerate() {
            self.spectrum.fill(ZERO);
            for (dst, &s) in self.spectrum.iter_mut().zip(samples.iter()) {
                dst.re = s;
            }
            self.forward
                .process_with_scratch(&mut self.spectrum, &mut self.scratch);
            self.history[ch][self.head].copy_from_slice(&self.spectrum[..bins]);

            self.accum.fill(ZERO);
            for (p, part) in self.partitions[ch].iter().enumerate() {
                let past = &self.history[ch][(self.head + count - p) % count];
                for ((acc, x), h) in self.accum.iter_mut().zip(past).zip(part) {
                    *acc += x * h;
                }
            }

            self.spectrum[..bins].copy_from_slice(&self.accum);
            for k in 1..half {
                self.spectrum[n - k] = self.accum[k].conj();
            }
            self.inverse
                .process_with_scratch(&mut self.spectrum, &mut self.scratch);

            let tail = &mut self.overlap[ch];
            for (i, out) in samples.iter_mut().enumerate() {
                *out = self.spectrum[i].re * norm + tail[i];
                tail[i] = self.spectrum[i + self.block_size].re * norm;
            }
        }

        self.head = (self.head + 1) % count;
    }
}
