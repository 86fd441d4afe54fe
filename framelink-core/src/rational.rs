//! Rational number type for time bases and aspect ratios.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul};

/// A rational number as numerator over denominator.
///
/// Time bases, frame rates, and sample aspect ratios are all exact
/// ratios; keeping them rational avoids cumulative floating-point drift
/// when rescaling tick counts between domains.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub num: i64,
    /// Denominator (always positive after construction).
    pub den: i64,
}

impl Rational {
    /// Create a new rational number.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self { num, den }
    }

    /// The rational one (1/1), the identity sample aspect ratio.
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Reduce to lowest terms.
    pub fn reduce(&self) -> Self {
        if self.num == 0 {
            return Self { num: 0, den: 1 };
        }
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()) as i64;
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Reciprocal.
    ///
    /// # Panics
    ///
    /// Panics if the numerator is zero.
    pub fn recip(&self) -> Self {
        assert!(self.num != 0, "cannot take reciprocal of zero");
        Self::new(self.den, self.num)
    }

    /// Rescale an integer tick count from this unit to another.
    ///
    /// Computed in 128-bit intermediates so large timestamps survive the
    /// cross-multiplication without overflow.
    pub fn rescale(&self, value: i64, target: Rational) -> i64 {
        let num = value as i128 * self.num as i128 * target.den as i128;
        let den = self.den as i128 * target.num as i128;
        (num / den) as i64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self { num: 0, den: 1 }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.num * rhs.num, self.den * rhs.den).reduce()
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::new(self.num * rhs.den, self.den * rhs.num).reduce()
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self::new(num, den)
    }
}

/// Greatest common divisor, Euclidean.
fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_normalization() {
        let r = Rational::new(1, -2);
        assert_eq!(r.num, -1);
        assert_eq!(r.den, 2);
    }

    #[test]
    fn test_reduce() {
        let r = Rational::new(6, 8).reduce();
        assert_eq!(r, Rational::new(3, 4));
    }

    #[test]
    fn test_recip() {
        assert_eq!(Rational::new(1, 90000).recip(), Rational::new(90000, 1));
    }

    #[test]
    fn test_rescale() {
        // 1000 ms expressed in 1/90000 ticks
        let ms = Rational::new(1, 1000);
        assert_eq!(ms.rescale(1000, Rational::new(1, 90000)), 90000);
    }

    #[test]
    fn test_rescale_large_no_overflow() {
        let us = Rational::new(1, 1_000_000);
        let v = i64::MAX / 1_000_000;
        assert_eq!(us.rescale(v, us), v);
    }

    #[test]
    fn test_ord() {
        assert!(Rational::new(1, 2) > Rational::new(1, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::new(4, 3).to_string(), "4/3");
        assert_eq!(Rational::new(5, 1).to_string(), "5");
    }
}
