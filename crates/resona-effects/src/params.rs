//! Reverb parameters and their ranges.

use resona_core::{ParamDescriptor, ParamId, ParamUnit};

/// Shortest tail length in seconds.
pub const SECONDS_MIN: f32 = 1.0;
/// Longest tail length in seconds.
pub const SECONDS_MAX: f32 = 50.0;
/// Default tail length in seconds.
pub const SECONDS_DEFAULT: f32 = 3.0;

/// Flattest envelope exponent (no decay).
pub const DECAY_MIN: f32 = 0.0;
/// Steepest envelope exponent.
pub const DECAY_MAX: f32 = 100.0;
/// Default envelope exponent.
pub const DECAY_DEFAULT: f32 = 2.0;

/// Default tail direction.
pub const REVERSE_DEFAULT: bool = false;

/// Parameter index of `seconds`.
pub const PARAM_SECONDS: usize = 0;
/// Parameter index of `decay`.
pub const PARAM_DECAY: usize = 1;
/// Parameter index of `reverse`.
pub const PARAM_REVERSE: usize = 2;

/// Descriptors in parameter index order.
pub const DESCRIPTORS: [ParamDescriptor; 3] = [
    ParamDescriptor::custom("Seconds", "Len", SECONDS_MIN, SECONDS_MAX, SECONDS_DEFAULT)
        .with_unit(ParamUnit::Seconds)
        .with_step(0.1)
        .with_id(ParamId(1500), "rvb_seconds"),
    ParamDescriptor::custom("Decay", "Decay", DECAY_MIN, DECAY_MAX, DECAY_DEFAULT)
        .with_unit(ParamUnit::Ratio)
        .with_step(0.1)
        .with_id(ParamId(1501), "rvb_decay"),
    ParamDescriptor::toggle("Reverse", "Rev", REVERSE_DEFAULT)
        .with_id(ParamId(1502), "rvb_reverse"),
];

/// The three values that fully determine a synthesized tail.
///
/// Values are clamped on the way in and never rejected: `seconds` to
/// `[1, 50]`, `decay` to `[0, 100]`. NaN lands on the range minimum.
///
/// ```rust
/// use resona_effects::ReverbParams;
///
/// let p = ReverbParams::new(100.0, -3.0, true);
/// assert_eq!(p.seconds(), 50.0);
/// assert_eq!(p.decay(), 0.0);
/// assert!(p.reverse());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    seconds: f32,
    decay: f32,
    reverse: bool,
}

impl ReverbParams {
    /// Creates clamped parameters.
    pub fn new(seconds: f32, decay: f32, reverse: bool) -> Self {
        Self {
            seconds: clamp_seconds(seconds),
            decay: clamp_decay(decay),
            reverse,
        }
    }

    /// Tail length in seconds.
    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    /// Envelope exponent.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Whether the envelope swells instead of decaying.
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Copy with a new (clamped) tail length.
    pub fn with_seconds(mut self, seconds: f32) -> Self {
        self.seconds = clamp_seconds(seconds);
        self
    }

    /// Copy with a new (clamped) envelope exponent.
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = clamp_decay(decay);
        self
    }

    /// Copy with a new direction.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Copy with the parameter at `index` set from a plain value.
    ///
    /// Reverse reads `>= 0.5` as on. Unknown indices return `self` unchanged.
    pub fn with_param(self, index: usize, value: f32) -> Self {
        match index {
            PARAM_SECONDS => self.with_seconds(value),
            PARAM_DECAY => self.with_decay(value),
            PARAM_REVERSE => self.with_reverse(value >= 0.5),
            _ => self,
        }
    }

    /// Plain value of the parameter at `index`; 0 for unknown indices.
    pub fn param(&self, index: usize) -> f32 {
        match index {
            PARAM_SECONDS => self.seconds,
            PARAM_DECAY => self.decay,
            PARAM_REVERSE => {
                if self.reverse {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            seconds: SECONDS_DEFAULT,
            decay: DECAY_DEFAULT,
            reverse: REVERSE_DEFAULT,
        }
    }
}

fn clamp_seconds(seconds: f32) -> f32 {
    DESCRIPTORS[PARAM_SECONDS].clamp(seconds)
}

fn clamp_decay(decay: f32) -> f32 {
    DESCRIPTORS[PARAM_DECAY].clamp(decay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = ReverbParams::default();
        assert_eq!(p.seconds(), 3.0);
        assert_eq!(p.decay(), 2.0);
        assert!(!p.reverse());
        for (i, d) in DESCRIPTORS.iter().enumerate() {
            assert_eq!(p.param(i), d.default, "{}", d.name);
        }
    }

    #[test]
    fn clamps_out_of_range() {
        let p = ReverbParams::new(0.2, 250.0, false);
        assert_eq!(p.seconds(), SECONDS_MIN);
        assert_eq!(p.decay(), DECAY_MAX);

        let p = p.with_seconds(75.0).with_decay(-1.0);
        assert_eq!(p.seconds(), SECONDS_MAX);
        assert_eq!(p.decay(), DECAY_MIN);
    }

    #[test]
    fn nan_maps_to_minimum() {
        let p = ReverbParams::new(f32::NAN, f32::NAN, false);
        assert_eq!(p.seconds(), SECONDS_MIN);
        assert_eq!(p.decay(), DECAY_MIN);
    }

    #[test]
    fn in_range_values_kept() {
        let p = ReverbParams::new(12.5, 0.75, true);
        assert_eq!(p.seconds(), 12.5);
        assert_eq!(p.decay(), 0.75);
        assert!(p.reverse());
    }

    #[test]
    fn indexed_access() {
        let p = ReverbParams::default()
            .with_param(PARAM_SECONDS, 8.0)
            .with_param(PARAM_DECAY, 4.0)
            .with_param(PARAM_REVERSE, 0.7);
        assert_eq!(p.param(PARAM_SECONDS), 8.0);
        assert_eq!(p.param(PARAM_DECAY), 4.0);
        assert_eq!(p.param(PARAM_REVERSE), 1.0);
        assert_eq!(p.with_param(PARAM_REVERSE, 0.49).param(PARAM_REVERSE), 0.0);
        assert_eq!(p.with_param(9, 1.0), p);
        assert_eq!(p.param(9), 0.0);
    }

    #[test]
    fn descriptor_ids_are_stable() {
        assert_eq!(DESCRIPTORS[PARAM_SECONDS].id, ParamId(1500));
        assert_eq!(DESCRIPTORS[PARAM_DECAY].id, ParamId(1501));
        assert_eq!(DESCRIPTORS[PARAM_REVERSE].id, ParamId(1502));
        assert_eq!(DESCRIPTORS[PARAM_REVERSE].string_id, "rvb_reverse");
    }
}
