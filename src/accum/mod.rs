//! Removal of low-order digits with rounding residue.
//!
//! A shift accumulator divides a non-negative integer by a
//! power of its radix while remembering just enough about the
//! removed digits to round correctly: the most significant
//! removed digit and whether any other removed digit was
//! non-zero.

use core::fmt;

use num_bigint::BigUint;

use crate::{fastint::FastInt, util};

mod bit;
mod digit;

pub use bit::BitShiftAccumulator;
pub use digit::DigitShiftAccumulator;

/// Removes low-order digits from an integer while tracking the
/// rounding residue.
///
/// After removing any suffix of digits,
/// [`last_discarded`][Self::last_discarded] is the most
/// significant removed digit (0 if nothing was removed) and
/// [`sticky`][Self::sticky] is 1 iff any other removed digit,
/// or any residue the accumulator was created with, is
/// non-zero.
pub trait ShiftAccumulator: Clone + fmt::Debug {
    /// The radix of the digits the accumulator removes.
    const RADIX: u32;

    /// Creates an accumulator for the non-negative `value`
    /// whose own residue is `(last_discarded, sticky)`.
    fn new(value: FastInt, last_discarded: u32, sticky: u32) -> Self;

    /// Returns the value after the digits removed so far.
    fn shifted_value(&self) -> &FastInt;

    /// Consumes the accumulator, returning the shifted value.
    fn into_shifted_value(self) -> FastInt;

    /// Returns the most significant removed digit.
    fn last_discarded(&self) -> u32;

    /// Returns 1 if any removed digit other than the last one
    /// is non-zero, or 0 otherwise.
    fn sticky(&self) -> u32;

    /// Returns the number of digits removed so far.
    fn discarded_count(&self) -> &FastInt;

    /// Returns the exact number of digits in the shifted value.
    fn digit_length(&mut self) -> FastInt;

    /// Returns an upper bound on the number of digits in the
    /// shifted value.
    fn overestimate_digit_length(&self) -> FastInt;

    /// Returns a lower bound on the number of digits in the
    /// shifted value.
    fn underestimate_digit_length(&self) -> FastInt;

    /// Removes `n` digits.
    fn shift_right(&mut self, n: &FastInt);

    /// Removes `n` digits.
    fn shift_right_int(&mut self, n: u32);

    /// Removes digits until at most `target` remain, removing
    /// at least `min_shift` digits.
    ///
    /// In `truncate` mode the residue collapses into the sticky
    /// bit and [`last_discarded`][Self::last_discarded] reads
    /// 0, which is enough for callers that only ask whether
    /// the removed digits were zero.
    fn shift_to_digits(&mut self, target: &FastInt, min_shift: Option<&FastInt>, truncate: bool);

    /// Removes `n` digits, keeping the full residue.
    fn truncate_right_exact(&mut self, n: &FastInt);

    /// Removes `n` digits, collapsing the residue into the
    /// sticky bit.
    fn truncate_right_simple(&mut self, n: &FastInt);

    /// Returns `value * RADIX^n`.
    fn scale(value: &FastInt, n: u64) -> FastInt;

    /// Returns the number of digits in `|value|`, which is 1
    /// for zero.
    fn length_of(value: &FastInt) -> u64;

    /// Reports whether any non-zero digit has been removed.
    fn is_inexact(&self) -> bool {
        self.last_discarded() != 0 || self.sticky() != 0
    }
}

/// The per-radix primitives behind an accumulator.
pub(crate) trait Radix {
    const RADIX: u32;

    /// See [`util::split_digits`].
    fn split_small(x: u64, n: u32) -> (u64, u32, bool);

    /// See [`util::split_digits`].
    fn split_big(x: &BigUint, n: u64) -> (BigUint, u32, bool);

    fn length(x: &FastInt) -> u64;
    fn over_length(x: &FastInt) -> u64;
    fn under_length(x: &FastInt) -> u64;
    fn scale(x: &FastInt, n: u64) -> FastInt;
}

/// The state shared by every accumulator.
#[derive(Clone, Debug)]
pub(crate) struct State {
    value: FastInt,
    last: u32,
    sticky: u32,
    discarded: FastInt,
    known_length: Option<u64>,
}

impl State {
    pub(crate) fn new<R: Radix>(value: FastInt, last: u32, sticky: u32) -> Self {
        debug_assert!(!value.is_negative());
        debug_assert!(last < R::RADIX);
        debug_assert!(sticky <= 1);

        Self {
            value,
            last,
            sticky,
            discarded: FastInt::ZERO,
            known_length: None,
        }
    }

    pub(crate) fn value(&self) -> &FastInt {
        &self.value
    }

    pub(crate) fn into_value(self) -> FastInt {
        self.value
    }

    pub(crate) fn last(&self) -> u32 {
        self.last
    }

    pub(crate) fn sticky(&self) -> u32 {
        self.sticky
    }

    pub(crate) fn discarded(&self) -> &FastInt {
        &self.discarded
    }

    pub(crate) fn length<R: Radix>(&mut self) -> u64 {
        match self.known_length {
            Some(n) => n,
            None => {
                let n = R::length(&self.value);
                self.known_length = Some(n);
                n
            }
        }
    }

    pub(crate) fn over_length<R: Radix>(&self) -> u64 {
        self.known_length
            .unwrap_or_else(|| R::over_length(&self.value))
    }

    pub(crate) fn under_length<R: Radix>(&self) -> u64 {
        self.known_length
            .unwrap_or_else(|| R::under_length(&self.value))
    }

    /// Removes `n` digits from the value.
    pub(crate) fn shift<R: Radix>(&mut self, n: &FastInt, truncate: bool) {
        if n.signum() <= 0 {
            return;
        }
        // Anything past `u64::MAX` digits discards the whole
        // value, same as `u64::MAX` does.
        let n = n.to_u64().unwrap_or(u64::MAX);

        let (q, last, rest) = match &self.value {
            FastInt::Small(v) => {
                let x = u64::try_from(*v).unwrap_or_default();
                let (q, d, rest) = R::split_small(x, u32::try_from(n).unwrap_or(u32::MAX));
                (FastInt::from_u64(q), d, rest)
            }
            FastInt::Large(v) => {
                let (q, d, rest) = R::split_big(v.magnitude(), n);
                (FastInt::from_biguint(q), d, rest)
            }
        };
        let (last, rest) = if truncate {
            (0, last != 0 || rest)
        } else {
            (last, rest)
        };

        self.sticky |= u32::from(self.last != 0 || rest);
        self.last = last;
        self.value = q;
        self.discarded = self.discarded.add(&FastInt::from_u64(n));
        self.known_length = self
            .known_length
            .map(|len| if len > n { len - n } else { 1 });
    }

    pub(crate) fn shift_to<R: Radix>(
        &mut self,
        target: &FastInt,
        min_shift: Option<&FastInt>,
        truncate: bool,
    ) {
        let mut shift = FastInt::ZERO;
        if FastInt::from_u64(self.over_length::<R>()) > *target {
            let len = FastInt::from_u64(self.length::<R>());
            if len > *target {
                shift = len - target;
            }
        }
        if let Some(min) = min_shift {
            if *min > shift {
                shift = min.clone();
            }
        }
        self.shift::<R>(&shift, truncate);
    }
}

// log10(2) lies in (0.30102999, 0.30103).
const LOG10_2_LO: (u128, u128) = (30_102_999, 100_000_000);
const LOG10_2_HI: (u128, u128) = (30_103, 100_000);

/// Returns a lower bound on the number of decimal digits in an
/// integer with `bits` bits.
pub(crate) fn decimal_length_under(bits: u64) -> u64 {
    if bits <= 1 {
        return 1;
    }
    let (num, den) = LOG10_2_LO;
    ((u128::from(bits - 1) * num) / den) as u64 + 1
}

/// Returns an upper bound on the number of decimal digits in
/// an integer with `bits` bits.
pub(crate) fn decimal_length_over(bits: u64) -> u64 {
    let (num, den) = LOG10_2_HI;
    ((u128::from(bits) * num) / den) as u64 + 1
}

/// Returns the number of decimal digits in `x`.
pub(crate) fn decimal_length(x: &BigUint) -> u64 {
    let bits = x.bits();
    if bits <= u64::from(u64::BITS) {
        let lo = x.iter_u64_digits().next().unwrap_or_default();
        return u64::from(util::digits(lo));
    }
    let mut n = decimal_length_under(bits);
    let mut p = crate::fastint::pow10_big(n);
    while *x >= p {
        n += 1;
        p *= 10u8;
    }
    n
}

// Implements `ShiftAccumulator` for a newtype around `State`.
macro_rules! impl_accumulator {
    ($name:ident, $radix:ty) => {
        impl $crate::accum::ShiftAccumulator for $name {
            const RADIX: u32 = <$radix as $crate::accum::Radix>::RADIX;

            fn new(value: FastInt, last_discarded: u32, sticky: u32) -> Self {
                Self {
                    state: $crate::accum::State::new::<$radix>(value, last_discarded, sticky),
                }
            }

            fn shifted_value(&self) -> &FastInt {
                self.state.value()
            }

            fn into_shifted_value(self) -> FastInt {
                self.state.into_value()
            }

            fn last_discarded(&self) -> u32 {
                self.state.last()
            }

            fn sticky(&self) -> u32 {
                self.state.sticky()
            }

            fn discarded_count(&self) -> &FastInt {
                self.state.discarded()
            }

            fn digit_length(&mut self) -> FastInt {
                FastInt::from_u64(self.state.length::<$radix>())
            }

            fn overestimate_digit_length(&self) -> FastInt {
                FastInt::from_u64(self.state.over_length::<$radix>())
            }

            fn underestimate_digit_length(&self) -> FastInt {
                FastInt::from_u64(self.state.under_length::<$radix>())
            }

            fn shift_right(&mut self, n: &FastInt) {
                self.state.shift::<$radix>(n, false);
            }

            fn shift_right_int(&mut self, n: u32) {
                self.state.shift::<$radix>(&FastInt::from(n), false);
            }

            fn shift_to_digits(
                &mut self,
                target: &FastInt,
                min_shift: Option<&FastInt>,
                truncate: bool,
            ) {
                self.state.shift_to::<$radix>(target, min_shift, truncate);
            }

            fn truncate_right_exact(&mut self, n: &FastInt) {
                self.state.shift::<$radix>(n, false);
            }

            fn truncate_right_simple(&mut self, n: &FastInt) {
                self.state.shift::<$radix>(n, true);
            }

            fn scale(value: &FastInt, n: u64) -> FastInt {
                <$radix as $crate::accum::Radix>::scale(value, n)
            }

            fn length_of(value: &FastInt) -> u64 {
                <$radix as $crate::accum::Radix>::length(value)
            }
        }
    };
}
pub(crate) use impl_accumulator;
