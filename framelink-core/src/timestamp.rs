//! Time base and timestamp handling.
//!
//! The host pipeline expresses presentation time in floating-point
//! seconds; the filter graph speaks integer ticks against a per-link
//! time base. These types cover the graph side and the conversions
//! between the two domains.

use crate::rational::Rational;
use std::fmt;

/// A time base: the rational scale factor converting an integer tick
/// count into seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBase(pub Rational);

impl TimeBase {
    /// Create a new time base from numerator and denominator.
    pub fn new(num: i64, den: i64) -> Self {
        Self(Rational::new(num, den))
    }

    /// Microsecond time base (1/1000000).
    ///
    /// This is the fixed tick domain the graph's source endpoint is
    /// parameterized with: the graph talks microseconds internally, not
    /// the host's seconds domain.
    pub const MICROSECONDS: Self = Self(Rational { num: 1, den: 1_000_000 });

    /// Millisecond time base (1/1000).
    pub const MILLISECONDS: Self = Self(Rational { num: 1, den: 1000 });

    /// Second time base (1/1).
    pub const SECONDS: Self = Self(Rational { num: 1, den: 1 });

    /// Convert a tick count from this time base to another.
    pub fn convert(&self, value: i64, target: TimeBase) -> i64 {
        self.0.rescale(value, target.0)
    }

    /// Ticks to seconds.
    pub fn to_seconds(&self, value: i64) -> f64 {
        value as f64 * self.0.to_f64()
    }

    /// Seconds to ticks.
    pub fn from_seconds(&self, seconds: f64) -> i64 {
        (seconds / self.0.to_f64()) as i64
    }

    /// The underlying rational.
    pub fn as_rational(&self) -> Rational {
        self.0
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::MICROSECONDS
    }
}

impl From<Rational> for TimeBase {
    fn from(r: Rational) -> Self {
        Self(r)
    }
}

/// An integer timestamp with its time base.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    /// Raw tick value. `Timestamp::NONE` marks an undefined timestamp.
    pub value: i64,
    /// Time base interpreting the value.
    pub time_base: TimeBase,
}

impl Timestamp {
    /// Sentinel tick value for an undefined timestamp.
    pub const NONE: i64 = i64::MIN;

    /// Create a new timestamp.
    pub fn new(value: i64, time_base: TimeBase) -> Self {
        Self { value, time_base }
    }

    /// Create an undefined timestamp in the given time base.
    pub fn none(time_base: TimeBase) -> Self {
        Self {
            value: Self::NONE,
            time_base,
        }
    }

    /// Check if this timestamp is defined.
    pub fn is_valid(&self) -> bool {
        self.value != Self::NONE
    }

    /// Rescale into a different time base. Undefined stays undefined.
    pub fn rescale(&self, target: TimeBase) -> Self {
        if !self.is_valid() {
            return Self::none(target);
        }
        Self {
            value: self.time_base.convert(self.value, target),
            time_base: target,
        }
    }

    /// Seconds, or `None` when undefined.
    pub fn to_seconds(&self) -> Option<f64> {
        if self.is_valid() {
            Some(self.time_base.to_seconds(self.value))
        } else {
            None
        }
    }

    /// Build a timestamp from optional seconds; `None` maps to the
    /// undefined sentinel.
    pub fn from_seconds(seconds: Option<f64>, time_base: TimeBase) -> Self {
        match seconds {
            Some(s) => Self::new(time_base.from_seconds(s), time_base),
            None => Self::none(time_base),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return !self.is_valid() && !other.is_valid();
        }
        // Compare in the higher-precision base
        let tb = if self.time_base.0.den > other.time_base.0.den {
            self.time_base
        } else {
            other.time_base
        };
        self.rescale(tb).value == other.rescale(tb).value
    }
}

impl Eq for Timestamp {}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_seconds() {
            Some(secs) => write!(f, "{:.6}s", secs),
            None => write!(f, "NONE"),
        }
    }
}
