use core::cmp::Ordering;

use super::BigFloat;
use crate::radix::{compare_magnitudes, compare_values, ValueFlags};

impl BigFloat {
    /// Compares numeric values.
    ///
    /// NaN compares greater than every other number and equal
    /// to every NaN. Zeros compare equal regardless of sign.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_values(self, other),
        }
    }

    /// Compares numbers by the IEEE 754 total order.
    ///
    /// Negative numbers order before positive ones, including
    /// zeros and NaNs. Within a sign, finite numbers order
    /// before infinities, infinities before quiet NaNs and
    /// quiet NaNs before signaling NaNs. Numerically equal
    /// finite numbers are ordered by exponent, and NaNs by
    /// payload.
    pub fn compare_to_total(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare_to_total_magnitude(other),
            (true, true) => self.compare_to_total_magnitude(other).reverse(),
        }
    }

    /// Compares absolute values by the IEEE 754 total order.
    pub fn compare_to_total_magnitude(&self, other: &Self) -> Ordering {
        let ord = self.rank().cmp(&other.rank());
        if ord != Ordering::Equal {
            return ord;
        }
        if self.is_nan() {
            return self.mantissa.cmp(&other.mantissa);
        }
        if self.is_infinite() {
            return Ordering::Equal;
        }
        let ord = match (self.mantissa.is_zero(), other.mantissa.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_magnitudes::<Self>(
                &self.mantissa,
                &self.exponent,
                &other.mantissa,
                &other.exponent,
            ),
        };
        ord.then_with(|| self.exponent.cmp(&other.exponent))
    }

    fn rank(&self) -> u8 {
        if self.flags.contains(ValueFlags::SIGNALING_NAN) {
            3
        } else if self.flags.contains(ValueFlags::QUIET_NAN) {
            2
        } else if self.flags.contains(ValueFlags::INFINITY) {
            1
        } else {
            0
        }
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            None
        } else {
            Some(compare_values(self, other))
        }
    }
}
