//! Microsecond-resolution simulated time.
//!
//! All durations in the simulator are non-negative integers of microsecond
//! resolution. Arithmetic never loses precision to floating point — the one
//! place a ratio is needed (`true_update_period`) goes through
//! [`Ratio::approximate`], an exact continued-fraction reduction capped at a
//! denominator of 100, before it touches duration arithmetic.

use std::ops::{Add, AddAssign, Sub};

/// A non-negative duration in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

/// Sentinel representing "infinite update period" (a job with no requested
/// revisit cadence, e.g. one that has not yet completed a cycle).
pub const MAX_DURATION: Duration = Duration(u64::MAX);

impl Duration {
    /// Zero duration.
    pub const ZERO: Duration = Duration(0);

    /// Build a duration from a microsecond count.
    pub const fn from_micros(us: u64) -> Self {
        Duration(us)
    }

    /// The duration as a raw microsecond count.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// True iff this is the `MAX_DURATION` sentinel.
    pub const fn is_max(self) -> bool {
        self.0 == u64::MAX
    }

    /// Saturating subtraction; never underflows.
    pub fn saturating_sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }

    /// Saturating multiplication by an integer factor.
    pub fn saturating_mul(self, factor: u64) -> Duration {
        if self.is_max() || factor == 0 {
            return if self.is_max() && factor != 0 {
                MAX_DURATION
            } else {
                Duration(self.0.saturating_mul(factor))
            };
        }
        Duration(self.0.saturating_mul(factor))
    }

    /// `self / divisor`, truncating (integer division).
    ///
    /// Used for the 10% duty cycle split (`tx = T / 10`), which truncates
    /// rather than rounds, matching the original implementation.
    pub fn div_trunc(self, divisor: u64) -> Duration {
        debug_assert!(divisor > 0);
        Duration(self.0 / divisor)
    }

    /// Returns the larger of two durations, treating `MAX_DURATION` as
    /// absorbing (max with anything is `MAX_DURATION`).
    pub fn max(self, other: Duration) -> Duration {
        std::cmp::max(self, other)
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        if self.is_max() || rhs.is_max() {
            return MAX_DURATION;
        }
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        self.saturating_sub(rhs)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_max() {
            write!(f, "MAX")
        } else {
            write!(f, "{}us", self.0)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::ZERO
    }
}

/// An exact rational number, reduced to lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    /// Numerator.
    pub numer: i64,
    /// Denominator, always `> 0`.
    pub denom: i64,
}

impl Ratio {
    /// Build a ratio directly from a fraction, reducing by GCD.
    pub fn new(numer: i64, denom: i64) -> Self {
        debug_assert!(denom != 0);
        let (numer, denom) = if denom < 0 { (-numer, -denom) } else { (numer, denom) };
        let g = gcd(numer.unsigned_abs(), denom.unsigned_abs()).max(1);
        Ratio {
            numer: numer / g as i64,
            denom: denom / g as i64,
        }
    }

    /// Best rational approximation of `value` with denominator `<= max_denom`,
    /// via the standard continued-fraction (Stern-Brocot) method.
    ///
    /// `max_denom` must be `>= 1`. `value` must be finite and non-negative.
    pub fn approximate(value: f64, max_denom: i64) -> Ratio {
        debug_assert!(max_denom >= 1);
        if !value.is_finite() || value <= 0.0 {
            return Ratio { numer: 0, denom: 1 };
        }

        // Continued-fraction convergents via the classic two-term recurrence.
        let (mut h_prev, mut h_cur) = (0i64, 1i64);
        let (mut k_prev, mut k_cur) = (1i64, 0i64);
        let mut x = value;

        loop {
            let a = x.floor() as i64;
            let h_next = a.saturating_mul(h_cur).saturating_add(h_prev);
            let k_next = a.saturating_mul(k_cur).saturating_add(k_prev);

            if k_next > max_denom || k_next <= 0 {
                break;
            }

            h_prev = h_cur;
            h_cur = h_next;
            k_prev = k_cur;
            k_cur = k_next;

            let frac = x - a as f64;
            if frac.abs() < 1e-12 {
                break;
            }
            x = 1.0 / frac;
            if !x.is_finite() {
                break;
            }
        }

        if k_cur == 0 {
            return Ratio { numer: value.round() as i64, denom: 1 };
        }
        Ratio { numer: h_cur, denom: k_cur }
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_add_saturates_to_max() {
        assert_eq!(Duration::from_micros(5) + MAX_DURATION, MAX_DURATION);
    }

    #[test]
    fn duration_sub_never_underflows() {
        assert_eq!(
            Duration::from_micros(3).saturating_sub(Duration::from_micros(10)),
            Duration::ZERO
        );
    }

    #[test]
    fn div_trunc_truncates() {
        assert_eq!(Duration::from_micros(105).div_trunc(10), Duration::from_micros(10));
    }

    #[test]
    fn ratio_approximates_half() {
        let r = Ratio::approximate(0.5, 100);
        assert_eq!(r.numer, 1);
        assert_eq!(r.denom, 2);
    }

    #[test]
    fn ratio_caps_denominator() {
        let r = Ratio::approximate(1.0 / 3.0, 100);
        assert!(r.denom <= 100);
        assert_eq!((r.numer, r.denom), (1, 3));
    }

    #[test]
    fn ratio_zero_is_zero_over_one() {
        let r = Ratio::approximate(0.0, 100);
        assert_eq!((r.numer, r.denom), (0, 1));
    }
}
