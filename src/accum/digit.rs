use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use super::{decimal_length_over, decimal_length_under, impl_accumulator, Radix, State};
use crate::{
    fastint::{pow10_big, FastInt},
    util,
};

/// Removes decimal digits.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Decimal;

impl Radix for Decimal {
    const RADIX: u32 = 10;

    fn split_small(x: u64, n: u32) -> (u64, u32, bool) {
        util::split_digits(x, n)
    }

    fn split_big(x: &BigUint, n: u64) -> (BigUint, u32, bool) {
        debug_assert!(n > 0);

        if n - 1 >= decimal_length_over(x.bits()) {
            // Don't build a divisor larger than `x`.
            return (BigUint::zero(), 0, !x.is_zero());
        }
        let (t, rest) = x.div_rem(&pow10_big(n - 1));
        let (q, d) = t.div_rem(&BigUint::from(10u8));
        (q, d.to_u32().unwrap_or_default(), !rest.is_zero())
    }

    fn length(x: &FastInt) -> u64 {
        x.digit_length()
    }

    fn over_length(x: &FastInt) -> u64 {
        match x {
            FastInt::Small(_) => x.digit_length(),
            FastInt::Large(v) => decimal_length_over(v.bits()),
        }
    }

    fn under_length(x: &FastInt) -> u64 {
        match x {
            FastInt::Small(_) => x.digit_length(),
            FastInt::Large(v) => decimal_length_under(v.bits()),
        }
    }

    fn scale(x: &FastInt, n: u64) -> FastInt {
        x.scale10(n)
    }
}

/// A [`ShiftAccumulator`][super::ShiftAccumulator] for radix
/// 10.
#[derive(Clone, Debug)]
pub struct DigitShiftAccumulator {
    state: State,
}
impl_accumulator!(DigitShiftAccumulator, Decimal);
