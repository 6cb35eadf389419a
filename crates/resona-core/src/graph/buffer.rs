//! Sample buffers for the host graph.
//!
//! [`AudioBuffer`] is what a host hands out from
//! [`create_buffer`](super::AudioGraph::create_buffer): a multi-channel block of
//! samples tagged with a sample rate. Its allocation is fallible so that
//! resource exhaustion reaches the caller as [`GraphError::Allocation`].
//!
//! [`StereoBuffer`] is the per-unit scratch block used while rendering.

use super::context::GraphError;

/// Multi-channel sample buffer with an associated sample rate.
///
/// All channels have the same length. Samples start zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
}

impl AudioBuffer {
    /// Allocates a zeroed buffer of `channel_count` channels, `length` samples each.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidBuffer`] if `channel_count` or `length` is zero, or
    ///   `sample_rate` is not a positive finite number
    /// - [`GraphError::Allocation`] if the memory cannot be reserved
    pub fn try_new(
        channel_count: usize,
        length: usize,
        sample_rate: f32,
    ) -> Result<Self, GraphError> {
        if channel_count == 0 {
            return Err(GraphError::InvalidBuffer("zero channels".into()));
        }
        if length == 0 {
            return Err(GraphError::InvalidBuffer("zero length".into()));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(GraphError::InvalidBuffer(format!(
                "sample rate {sample_rate} is not positive"
            )));
        }

        let requested = channel_count.saturating_mul(length);
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(channel_count)
            .map_err(|_| GraphError::Allocation { requested })?;
        for _ in 0..channel_count {
            let mut samples = Vec::new();
            samples
                .try_reserve_exact(length)
                .map_err(|_| GraphError::Allocation { requested })?;
            samples.resize(length, 0.0);
            channels.push(samples);
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns the number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Returns the buffer duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / self.sample_rate
    }

    /// Returns the samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Returns the samples of one channel, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Returns the first two channels as `(left, right)`, or `None` for a mono buffer.
    pub fn stereo(&self) -> Option<(&[f32], &[f32])> {
        match self.channels.as_slice() {
            [left, right, ..] => Some((left.as_slice(), right.as_slice())),
            _ => None,
        }
    }

    /// Returns the first two channels mutably as `(left, right)`, or `None` for
    /// a mono buffer.
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        match self.channels.as_mut_slice() {
            [left, right, ..] => Some((left.as_mut_slice(), right.as_mut_slice())),
            _ => None,
        }
    }

    /// Peak absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }
}

/// A stereo block of samples.
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a new zeroed stereo buffer with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self {
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
        }
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Resizes both channels to the given block size, zeroing new samples.
    pub fn resize(&mut self, block_size: usize) {
        self.left.resize(block_size, 0.0);
        self.right.resize(block_size, 0.0);
    }

    /// Returns the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Adds another buffer's contents sample-by-sample.
    pub fn accumulate_from(&mut self, other: &StereoBuffer) {
        for (dst, src) in self.left.iter_mut().zip(other.left.iter()) {
            *dst += *src;
        }
        for (dst, src) in self.right.iter_mut().zip(other.right.iter()) {
            *dst += *src;
        }
    }

    /// Multiplies both channels by `gain`.
    pub fn scale(&mut self, gain: f32) {
        for s in self.left.iter_mut().chain(self.right.iter_mut()) {
            *s *= gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_buffer_starts_zeroed() {
        let buf = AudioBuffer::try_new(2, 100, 48000.0).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.len(), 100);
        assert!(buf.channel(0).iter().all(|&s| s == 0.0));
        assert!(buf.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn audio_buffer_rejects_degenerate_shapes() {
        assert!(matches!(
            AudioBuffer::try_new(0, 10, 48000.0),
            Err(GraphError::InvalidBuffer(_))
        ));
        assert!(matches!(
            AudioBuffer::try_new(2, 0, 48000.0),
            Err(GraphError::InvalidBuffer(_))
        ));
        assert!(matches!(
            AudioBuffer::try_new(2, 10, 0.0),
            Err(GraphError::InvalidBuffer(_))
        ));
        assert!(matches!(
            AudioBuffer::try_new(2, 10, f32::NAN),
            Err(GraphError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn audio_buffer_reports_exhaustion() {
        // Larger than any address space can reserve.
        let result = AudioBuffer::try_new(2, usize::MAX / 2, 48000.0);
        assert!(matches!(result, Err(GraphError::Allocation { .. })));
    }

    #[test]
    fn stereo_views() {
        let mut buf = AudioBuffer::try_new(2, 4, 1000.0).unwrap();
        {
            let (l, r) = buf.stereo_mut().unwrap();
            l[0] = 1.0;
            r[3] = -2.0;
        }
        let (l, r) = buf.stereo().unwrap();
        assert_eq!(l[0], 1.0);
        assert_eq!(r[3], -2.0);
        assert_eq!(buf.peak(), 2.0);

        let mono = AudioBuffer::try_new(1, 4, 1000.0).unwrap();
        assert!(mono.stereo().is_none());
    }

    #[test]
    fn duration_follows_rate() {
        let buf = AudioBuffer::try_new(1, 44100, 44100.0).unwrap();
        assert!((buf.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stereo_buffer_accumulate_and_scale() {
        let mut a = StereoBuffer::new(3);
        let mut b = StereoBuffer::new(3);
        b.left.copy_from_slice(&[1.0, 2.0, 3.0]);
        b.right.copy_from_slice(&[-1.0, -2.0, -3.0]);
        a.accumulate_from(&b);
        a.accumulate_from(&b);
        a.scale(0.5);
        assert_eq!(a.left, vec![1.0, 2.0, 3.0]);
        assert_eq!(a.right, vec![-1.0, -2.0, -3.0]);
        a.clear();
        assert!(a.left.iter().all(|&s| s == 0.0));
    }
}
