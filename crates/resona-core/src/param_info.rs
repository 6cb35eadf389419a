//! Parameter metadata for filters that expose tunable values.
//!
//! A filter describes each of its parameters with a [`ParamDescriptor`] and
//! answers queries through the [`ParameterInfo`] trait. Hosts, preset loaders,
//! and generic editors use this to discover ranges and defaults without knowing
//! the concrete filter type.
//!
//! Setting a value is deliberately not part of [`ParameterInfo`]: applying a
//! parameter usually touches the host graph, so each filter exposes its own
//! setter that takes the graph explicitly.
//!
//! # Example
//!
//! ```rust
//! use resona_core::{ParamDescriptor, ParamId, ParamUnit, ParameterInfo};
//!
//! struct Level {
//!     amount: f32,
//! }
//!
//! impl ParameterInfo for Level {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         match index {
//!             0 => Some(
//!                 ParamDescriptor::custom("Amount", "Amt", 0.0, 1.0, 0.5)
//!                     .with_unit(ParamUnit::Ratio)
//!                     .with_id(ParamId(10), "lvl_amount"),
//!             ),
//!             _ => None,
//!         }
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         match index {
//!             0 => self.amount,
//!             _ => 0.0,
//!         }
//!     }
//! }
//!
//! let level = Level { amount: 0.25 };
//! assert_eq!(level.find_param_by_name("amount"), Some(0));
//! assert_eq!(level.param_index_by_id(ParamId(10)), Some(0));
//! ```

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, the id of a parameter never changes; presets and
/// automation refer to parameters by id rather than by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags. Combine with [`union`](Self::union).
///
/// ```rust
/// use resona_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::HIDDEN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Value may be changed while audio is running.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Value moves in discrete steps (toggles, enumerations).
    pub const STEPPED: Self = Self(1 << 1);
    /// Not shown in generic editors.
    pub const HIDDEN: Self = Self(1 << 2);
    /// Display only.
    pub const READ_ONLY: Self = Self(1 << 3);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Display unit of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Seconds (s).
    Seconds,
    /// Milliseconds (ms).
    Milliseconds,
    /// Dimensionless multiplier or exponent.
    Ratio,
    /// Off/on switch stored as 0.0 or 1.0.
    Toggle,
    /// No unit.
    #[default]
    None,
}

impl ParamUnit {
    /// Short suffix for display, empty when the unit has none.
    pub fn suffix(self) -> &'static str {
        match self {
            ParamUnit::Seconds => " s",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Ratio | ParamUnit::Toggle | ParamUnit::None => "",
        }
    }
}

/// Metadata describing one parameter.
///
/// ```rust
/// use resona_core::{ParamDescriptor, ParamUnit};
///
/// let desc = ParamDescriptor::custom("Length", "Len", 1.0, 50.0, 3.0)
///     .with_unit(ParamUnit::Seconds);
/// assert_eq!(desc.clamp(0.0), 1.0);
/// assert_eq!(desc.clamp(f32::NAN), 1.0);
/// assert_eq!(desc.format_value(3.0), "3.00 s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full display name, e.g. "Seconds".
    pub name: &'static str,
    /// Abbreviated name for narrow displays.
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value used when nothing else is specified.
    pub default: f32,
    /// Suggested increment for editors.
    pub step: f32,
    /// Stable id. `ParamId(0)` means unassigned.
    pub id: ParamId,
    /// Stable human-readable id used in serialized form.
    pub string_id: &'static str,
    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Creates a descriptor with the given range and default.
    ///
    /// Step defaults to 1% of the range, unit to [`ParamUnit::None`], flags to
    /// [`ParamFlags::AUTOMATABLE`].
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: (max - min) / 100.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// An off/on switch: range `[0, 1]`, step 1, stepped.
    pub const fn toggle(name: &'static str, short_name: &'static str, default: bool) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Toggle,
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
        }
    }

    /// Sets the stable id and string id.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the editor step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Sets the capability flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamps a value into `[min, max]`. NaN maps to `min`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() || value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Maps a plain value to `[0, 1]`. A zero-width range maps to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Maps a normalized `[0, 1]` value back to the plain range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let t = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        self.min + t * (self.max - self.min)
    }

    /// Formats a value with its unit suffix.
    pub fn format_value(&self, value: f32) -> String {
        match self.unit {
            ParamUnit::Toggle => {
                if value >= 0.5 {
                    "On".to_string()
                } else {
                    "Off".to_string()
                }
            }
            unit => format!("{value:.2}{}", unit.suffix()),
        }
    }
}

/// Runtime discovery of a filter's parameters.
///
/// Indices are zero-based and stable for the lifetime of the filter.
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Descriptor of the parameter at `index`, or `None` when out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of the parameter at `index`. Out-of-range indices return 0.
    fn get_param(&self, index: usize) -> f32;

    /// Finds a parameter by name or short name, ignoring ASCII case.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|d| {
                d.name.eq_ignore_ascii_case(name)
                    || d.short_name.eq_ignore_ascii_case(name)
                    || (!d.string_id.is_empty() && d.string_id == name)
            })
        })
    }

    /// Stable id of the parameter at `index`.
    fn param_id(&self, index: usize) -> Option<ParamId> {
        self.param_info(index).map(|d| d.id)
    }

    /// Finds a parameter index by its stable id.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_id(i) == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        a: f32,
        b: bool,
    }

    impl ParameterInfo for Pair {
        fn param_count(&self) -> usize {
            2
        }

        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            match index {
                0 => Some(
                    ParamDescriptor::custom("Alpha", "A", -1.0, 1.0, 0.0)
                        .with_id(ParamId(40), "pair_alpha"),
                ),
                1 => Some(
                    ParamDescriptor::toggle("Bravo", "B", false)
                        .with_id(ParamId(41), "pair_bravo"),
                ),
                _ => None,
            }
        }

        fn get_param(&self, index: usize) -> f32 {
            match index {
                0 => self.a,
                1 => {
                    if self.b {
                        1.0
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            }
        }
    }

    #[test]
    fn clamp_limits_and_nan() {
        let d = ParamDescriptor::custom("X", "X", 1.0, 50.0, 3.0);
        assert_eq!(d.clamp(0.5), 1.0);
        assert_eq!(d.clamp(51.0), 50.0);
        assert_eq!(d.clamp(7.25), 7.25);
        assert_eq!(d.clamp(f32::NAN), 1.0);
        assert_eq!(d.clamp(f32::INFINITY), 50.0);
        assert_eq!(d.clamp(f32::NEG_INFINITY), 1.0);
    }

    #[test]
    fn normalize_denormalize() {
        let d = ParamDescriptor::custom("X", "X", 0.0, 100.0, 2.0);
        assert_eq!(d.normalize(25.0), 0.25);
        assert_eq!(d.denormalize(0.5), 50.0);
        assert_eq!(d.denormalize(2.0), 100.0);
        assert_eq!(d.denormalize(f32::NAN), 0.0);

        let flat = ParamDescriptor::custom("F", "F", 3.0, 3.0, 3.0);
        assert_eq!(flat.normalize(3.0), 0.0);
    }

    #[test]
    fn toggle_descriptor() {
        let d = ParamDescriptor::toggle("Reverse", "Rev", true);
        assert_eq!(d.default, 1.0);
        assert_eq!(d.step, 1.0);
        assert!(d.flags.contains(ParamFlags::STEPPED));
        assert_eq!(d.format_value(1.0), "On");
        assert_eq!(d.format_value(0.0), "Off");
    }

    #[test]
    fn lookup_by_name_and_id() {
        let p = Pair { a: 0.5, b: true };
        assert_eq!(p.find_param_by_name("alpha"), Some(0));
        assert_eq!(p.find_param_by_name("B"), Some(1));
        assert_eq!(p.find_param_by_name("pair_bravo"), Some(1));
        assert_eq!(p.find_param_by_name("charlie"), None);
        assert_eq!(p.param_id(1), Some(ParamId(41)));
        assert_eq!(p.param_index_by_id(ParamId(40)), Some(0));
        assert_eq!(p.param_index_by_id(ParamId(99)), None);
        assert_eq!(p.get_param(1), 1.0);
        assert!(p.param_info(2).is_none());
    }

    #[test]
    fn flags_default_automatable() {
        let f = ParamFlags::default();
        assert!(f.contains(ParamFlags::AUTOMATABLE));
        assert!(!f.contains(ParamFlags::READ_ONLY));
        assert!(ParamFlags::NONE.union(ParamFlags::HIDDEN).contains(ParamFlags::HIDDEN));
    }
}
