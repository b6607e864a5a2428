use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use super::{impl_accumulator, Radix, State};
use crate::{fastint::FastInt, util};

/// Removes binary digits.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Binary;

impl Radix for Binary {
    const RADIX: u32 = 2;

    fn split_small(x: u64, n: u32) -> (u64, u32, bool) {
        util::split_bits(x, n)
    }

    fn split_big(x: &BigUint, n: u64) -> (BigUint, u32, bool) {
        debug_assert!(n > 0);

        if n - 1 >= x.bits() {
            return (BigUint::zero(), 0, !x.is_zero());
        }
        let t = x >> (n - 1);
        let d = u32::from(t.is_odd());
        let rest = x.trailing_zeros().is_some_and(|tz| tz < n - 1);
        (t >> 1u8, d, rest)
    }

    fn length(x: &FastInt) -> u64 {
        x.bit_length().max(1)
    }

    fn over_length(x: &FastInt) -> u64 {
        Self::length(x)
    }

    fn under_length(x: &FastInt) -> u64 {
        Self::length(x)
    }

    fn scale(x: &FastInt, n: u64) -> FastInt {
        x.shl(n)
    }
}

/// A [`ShiftAccumulator`][super::ShiftAccumulator] for radix
/// 2.
#[derive(Clone, Debug)]
pub struct BitShiftAccumulator {
    state: State,
}
impl_accumulator!(BitShiftAccumulator, Binary);
