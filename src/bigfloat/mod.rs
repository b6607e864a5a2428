//! Arbitrary precision binary floating point numbers.

mod cmp;
mod fmt;
mod ieee;
mod int;

use num_bigint::BigInt;

use crate::{
    accum::BitShiftAccumulator,
    ctx::{Condition, Context},
    fastint::FastInt,
    macros::{binop_impl, neg_impl},
    radix::{RadixHost, RadixMath, ValueFlags},
    trap::{TrapResult, Trappable},
};

/// An arbitrary precision binary floating point number.
///
/// A finite `BigFloat` is `sign * mantissa * 2^exponent`, where
/// both the mantissa and the exponent are unbounded. It may
/// also be an infinity, or a quiet or signaling NaN with an
/// integer payload.
///
/// Values are immutable. Arithmetic without a [`Context`] is
/// exact; arithmetic with one rounds the result to fit it and
/// applies its trap policy.
///
/// Equality and ordering follow numeric value: `-0 == 0`,
/// `1.0 == 1` regardless of representation, and NaN is
/// unordered. See [`compare_to_total`][Self::compare_to_total]
/// for a total order.
#[derive(Clone)]
pub struct BigFloat {
    flags: ValueFlags,
    /// The unsigned significand, or the NaN payload.
    mantissa: FastInt,
    exponent: FastInt,
}

impl BigFloat {
    /// Positive zero.
    pub const ZERO: Self = Self::from_small(0, ValueFlags::empty());
    /// Negative zero.
    pub const NEG_ZERO: Self = Self::from_small(0, ValueFlags::NEGATIVE);
    /// One.
    pub const ONE: Self = Self::from_small(1, ValueFlags::empty());
    /// Ten.
    pub const TEN: Self = Self::from_small(10, ValueFlags::empty());
    /// Positive infinity.
    pub const INFINITY: Self = Self::from_small(0, ValueFlags::INFINITY);
    /// Negative infinity.
    pub const NEG_INFINITY: Self =
        Self::from_small(0, ValueFlags::INFINITY.union(ValueFlags::NEGATIVE));
    /// A quiet NaN without a payload.
    pub const NAN: Self = Self::from_small(0, ValueFlags::QUIET_NAN);

    const fn from_small(mantissa: i32, flags: ValueFlags) -> Self {
        Self {
            flags,
            mantissa: FastInt::from_i32(mantissa),
            exponent: FastInt::ZERO,
        }
    }

    /// Creates `mantissa * 2^exponent`.
    ///
    /// The sign of the result is the sign of `mantissa`.
    pub fn create(mantissa: impl Into<FastInt>, exponent: impl Into<FastInt>) -> Self {
        let mantissa = mantissa.into();
        Self {
            flags: ValueFlags::sign(mantissa.is_negative()),
            mantissa: mantissa.abs(),
            exponent: exponent.into(),
        }
    }

    /// Creates an integer.
    pub fn from_i32(v: i32) -> Self {
        Self::create(v, 0)
    }

    /// Creates an integer.
    pub fn from_i64(v: i64) -> Self {
        Self::create(v, 0)
    }

    /// Creates an integer.
    pub fn from_bigint(v: BigInt) -> Self {
        Self::create(v, 0)
    }

    /// Returns a quiet NaN without a payload.
    pub const fn nan() -> Self {
        Self::NAN
    }

    /// Returns a signaling NaN without a payload.
    pub const fn signaling_nan() -> Self {
        Self::from_small(0, ValueFlags::SIGNALING_NAN)
    }

    /// Creates a NaN.
    ///
    /// `payload` must not be negative.
    pub fn create_nan(payload: impl Into<FastInt>, signaling: bool, negative: bool) -> Self {
        let payload = payload.into();
        debug_assert!(!payload.is_negative());

        let kind = if signaling {
            ValueFlags::SIGNALING_NAN
        } else {
            ValueFlags::QUIET_NAN
        };
        Self {
            flags: kind | ValueFlags::sign(negative),
            mantissa: payload.abs(),
            exponent: FastInt::ZERO,
        }
    }

    /// Returns the signed significand.
    ///
    /// For an infinity this is zero. For a NaN it is the
    /// signed payload.
    pub fn mantissa(&self) -> FastInt {
        if self.is_negative() {
            self.mantissa.neg()
        } else {
            self.mantissa.clone()
        }
    }

    /// Returns the unsigned significand, or the payload of a
    /// NaN.
    pub const fn unsigned_mantissa(&self) -> &FastInt {
        &self.mantissa
    }

    /// Returns the exponent.
    pub const fn exponent(&self) -> &FastInt {
        &self.exponent
    }

    /// Reports whether the sign bit is set.
    ///
    /// This is true for negative zero and negative NaNs.
    pub const fn is_negative(&self) -> bool {
        self.flags.is_negative()
    }

    /// Reports whether the number is a positive or negative
    /// zero.
    pub fn is_zero(&self) -> bool {
        !self.flags.is_special() && self.mantissa.is_zero()
    }

    /// Reports whether the number is neither an infinity nor
    /// a NaN.
    pub const fn is_finite(&self) -> bool {
        !self.flags.is_special()
    }

    /// Reports whether the number is an infinity.
    pub const fn is_infinite(&self) -> bool {
        self.flags.contains(ValueFlags::INFINITY)
    }

    /// Reports whether the number is a NaN.
    pub const fn is_nan(&self) -> bool {
        self.flags.is_nan()
    }

    /// Reports whether the number is a quiet NaN.
    pub const fn is_quiet_nan(&self) -> bool {
        self.flags.contains(ValueFlags::QUIET_NAN)
    }

    /// Reports whether the number is a signaling NaN.
    pub const fn is_signaling_nan(&self) -> bool {
        self.flags.contains(ValueFlags::SIGNALING_NAN)
    }

    /// Returns -1, 0 or 1 according to the sign of the number.
    ///
    /// It returns 0 for zeros and NaNs.
    pub fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Returns `-self`.
    ///
    /// This flips the sign of every number, including zeros
    /// and NaNs.
    #[allow(clippy::should_implement_trait)]
    pub fn neg(&self) -> Self {
        Self {
            flags: self.flags ^ ValueFlags::NEGATIVE,
            ..self.clone()
        }
    }

    /// Returns `|self|`.
    pub fn abs(&self) -> Self {
        Self {
            flags: self.flags - ValueFlags::NEGATIVE,
            ..self.clone()
        }
    }

    /// Returns the exact product `self * rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: &Self) -> Self {
        if self.is_finite() && rhs.is_finite() {
            let neg = self.is_negative() != rhs.is_negative();
            let mantissa = match (&self.mantissa, &rhs.mantissa) {
                (FastInt::Small(a), FastInt::Small(b)) => {
                    FastInt::from_i64(i64::from(*a) * i64::from(*b))
                }
                (a, b) => a * b,
            };
            return Self {
                flags: ValueFlags::sign(neg),
                mantissa,
                exponent: &self.exponent + &rhs.exponent,
            };
        }
        exact(|m, ctx| m.multiply(self, rhs, ctx))
    }

    /// Returns the exact sum `self + rhs`.
    ///
    /// If aligning the operands requires shifting by more than
    /// [`MAX_SHIFT_BITS`][crate::MAX_SHIFT_BITS] bits, the
    /// result is NaN.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: &Self) -> Self {
        exact(|m, ctx| m.add(self, rhs, ctx))
    }

    /// Returns the exact difference `self - rhs`.
    ///
    /// If aligning the operands requires shifting by more than
    /// [`MAX_SHIFT_BITS`][crate::MAX_SHIFT_BITS] bits, the
    /// result is NaN.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, rhs: &Self) -> Self {
        exact(|m, ctx| m.subtract(self, rhs, ctx))
    }

    /// Returns `self + rhs` rounded to fit `ctx`.
    pub fn add_ctx(&self, rhs: &Self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.add(self, rhs, ctx)
    }

    /// Returns `self - rhs` rounded to fit `ctx`.
    pub fn sub_ctx(&self, rhs: &Self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.subtract(self, rhs, ctx)
    }

    /// Returns `self * rhs` rounded to fit `ctx`.
    pub fn mul_ctx(&self, rhs: &Self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.multiply(self, rhs, ctx)
    }

    /// Returns `self / rhs` rounded to fit `ctx`.
    ///
    /// If `ctx` has unlimited precision the quotient must
    /// have a terminating binary expansion. Otherwise the
    /// result is NaN and the
    /// [`INVALID`][Condition::INVALID] condition is
    /// raised.
    pub fn div_ctx(&self, rhs: &Self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.divide(self, rhs, ctx)
    }

    /// Rounds `self` to fit `ctx`.
    pub fn round_to_precision(&self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.round_to_precision(self, ctx)
    }

    /// Returns `-self` rounded to fit `ctx`.
    pub fn negate_ctx(&self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.negate(self, ctx)
    }

    /// Returns `|self|` rounded to fit `ctx`.
    pub fn abs_ctx(&self, ctx: &Context) -> TrapResult<Self> {
        TRAPPABLE.abs(self, ctx)
    }

    /// Compares `self` against `rhs`, returning -1, 0 or 1, or
    /// NaN if either operand is a NaN.
    ///
    /// Unlike [`compare_to`][Self::compare_to], any NaN operand
    /// raises [`INVALID`][Condition::INVALID].
    pub fn compare_to_signal(&self, rhs: &Self, ctx: &Context) -> TrapResult<Self> {
        let (r, mut flags) = RadixMath::new().compare_with_context(self, rhs, &ctx.non_trapping());
        if self.is_nan() || rhs.is_nan() {
            flags |= Condition::INVALID;
        }
        ctx.trigger_traps(r, flags)
    }
}

const TRAPPABLE: Trappable<BigFloat> = Trappable::new();

/// Runs an operation with unlimited precision and exponent
/// range, ignoring the conditions it raises.
fn exact<F>(op: F) -> BigFloat
where
    F: FnOnce(&RadixMath<BigFloat>, &Context) -> (BigFloat, Condition),
{
    op(&RadixMath::new(), &Context::UNLIMITED).0
}

impl RadixHost for BigFloat {
    type Accumulator = BitShiftAccumulator;

    fn mantissa(&self) -> &FastInt {
        &self.mantissa
    }

    fn exponent(&self) -> &FastInt {
        &self.exponent
    }

    fn value_flags(&self) -> ValueFlags {
        self.flags
    }

    fn from_parts(mantissa: FastInt, exponent: FastInt, flags: ValueFlags) -> Self {
        debug_assert!(!mantissa.is_negative());
        Self {
            flags,
            mantissa,
            exponent,
        }
    }
}

impl Default for BigFloat {
    fn default() -> Self {
        Self::ZERO
    }
}

binop_impl! { Add, add, add; BigFloat }
binop_impl! { Sub, sub, sub; BigFloat }
binop_impl! { Mul, mul, mul; BigFloat }
neg_impl! { neg; BigFloat }

macro_rules! from_impl {
    ($($t:ty),* $(,)?) => {
        $(impl From<$t> for BigFloat {
            fn from(v: $t) -> Self {
                Self::create(v, 0)
            }
        })*
    };
}
from_impl!(i8, i16, i32, i64, u8, u16, u32, u64, BigInt);

impl From<FastInt> for BigFloat {
    fn from(v: FastInt) -> Self {
        Self::create(v, 0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};

    use super::*;
    use crate::ctx::Rounding;

    #[test]
    fn test_create() {
        let x = BigFloat::create(-12, 3);
        assert!(x.is_negative());
        assert_eq!(x.mantissa(), FastInt::from_i32(-12));
        assert_eq!(x.unsigned_mantissa(), &FastInt::from_i32(12));
        assert_eq!(x.exponent(), &FastInt::from_i32(3));
        assert_eq!(x.signum(), -1);

        let x = BigFloat::from_i32(i32::MIN);
        assert_eq!(x.unsigned_mantissa().to_i64(), Some(1 << 31));

        assert!(BigFloat::ZERO.is_zero());
        assert!(BigFloat::NEG_ZERO.is_negative());
        assert_eq!(BigFloat::NEG_ZERO.signum(), 0);
        assert!(BigFloat::INFINITY.is_infinite());
        assert!(!BigFloat::INFINITY.is_finite());
        assert!(!BigFloat::INFINITY.is_zero());
        assert!(BigFloat::NAN.is_quiet_nan());
        assert!(BigFloat::signaling_nan().is_signaling_nan());
        assert_eq!(BigFloat::NAN.signum(), 0);
    }

    #[test]
    fn test_create_nan() {
        let x = BigFloat::create_nan(42, true, true);
        assert!(x.is_signaling_nan());
        assert!(x.is_negative());
        assert_eq!(x.unsigned_mantissa(), &FastInt::from_i32(42));
        assert_eq!(x.mantissa(), FastInt::from_i32(-42));
        assert_eq!(x.exponent(), &FastInt::ZERO);
    }

    #[test]
    fn test_mul_exact() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let (a, b) = (rng.gen::<i32>(), rng.gen::<i32>());
            let (ea, eb) = (rng.gen_range(-100..100), rng.gen_range(-100..100));
            let got = BigFloat::create(a, ea) * BigFloat::create(b, eb);
            let want = i64::from(a) * i64::from(b);
            assert_eq!(got.mantissa(), FastInt::from_i64(want), "{a} * {b}");
            assert_eq!(got.exponent(), &FastInt::from_i32(ea + eb));
        }

        let got = BigFloat::from_i32(200) * BigFloat::from_i32(5);
        assert_eq!(got.unsigned_mantissa(), &FastInt::from_i32(1000));
        assert_eq!(got.exponent(), &FastInt::ZERO);
        assert!(!got.is_negative());
        assert_eq!(BigFloat::create(1, -1).to_f64(), 0.5);

        let got = BigFloat::INFINITY.mul(&BigFloat::ZERO);
        assert!(got.is_nan());
        let got = BigFloat::NEG_INFINITY.mul(&BigFloat::from_i32(-3));
        assert_eq!(got, BigFloat::INFINITY);
        let got = BigFloat::NEG_ZERO.mul(&BigFloat::ONE);
        assert!(got.is_zero() && got.is_negative());
    }

    #[test]
    fn test_add_exact() {
        let tests = [
            ((3, 0), (1, -2), (13, -2)),
            ((-3, 0), (1, -2), (-11, -2)),
            ((1, 100), (-1, 100), (0, 100)),
            ((5, -1), (0, 4), (5, -1)),
        ];
        for (i, ((ma, ea), (mb, eb), (mw, ew))) in tests.into_iter().enumerate() {
            let got = BigFloat::create(ma, ea) + BigFloat::create(mb, eb);
            assert_eq!(got.mantissa(), FastInt::from_i32(mw), "#{i}");
            assert_eq!(got.exponent(), &FastInt::from_i32(ew), "#{i}");
        }
        let got = BigFloat::ONE - BigFloat::ONE;
        assert!(got.is_zero() && !got.is_negative());
        let got = BigFloat::create(1, 1 << 30).add(&BigFloat::ONE);
        assert!(got.is_nan());
    }

    #[test]
    fn test_against_f64() {
        let mut rng = thread_rng();
        let ctx = Context::BINARY64;
        let finite = |rng: &mut rand::rngs::ThreadRng| loop {
            let v = f64::from_bits(rng.gen());
            if v.is_finite() {
                return v;
            }
        };
        for _ in 0..5000 {
            let (a, b) = (finite(&mut rng), finite(&mut rng));
            let (x, y) = (BigFloat::from_f64(a), BigFloat::from_f64(b));

            let tests = [
                ("+", x.add_ctx(&y, &ctx), a + b),
                ("-", x.sub_ctx(&y, &ctx), a - b),
                ("*", x.mul_ctx(&y, &ctx), a * b),
                ("/", x.div_ctx(&y, &ctx), a / b),
            ];
            for (op, got, want) in tests {
                if want.is_nan() {
                    continue;
                }
                let got = got.unwrap().to_f64();
                assert_eq!(got.to_bits(), want.to_bits(), "{a:e} {op} {b:e}");
            }
        }
    }

    #[test]
    fn test_ctx_flags() {
        let ctx = Context::BINARY64.with_blank_flags();
        let got = BigFloat::ONE
            .div_ctx(&BigFloat::from_i32(3), &ctx)
            .unwrap();
        assert_eq!(got.mantissa(), FastInt::from_i64(6004799503160661));
        assert_eq!(got.exponent(), &FastInt::from_i32(-54));
        assert_eq!(ctx.flags(), Condition::INEXACT | Condition::ROUNDED);

        let ctx = Context::BINARY64
            .with_rounding(Rounding::Down)
            .with_traps(Condition::OVERFLOW);
        let err = BigFloat::from_f64(f64::MAX)
            .mul_ctx(&BigFloat::from_i32(2), &ctx)
            .unwrap_err();
        assert_eq!(err.primary(), Condition::OVERFLOW);
        assert_eq!(err.result().to_f64(), f64::MAX);
    }

    #[test]
    fn test_compare_to_signal() {
        let ctx = Context::BINARY64.with_blank_flags();
        let got = BigFloat::ONE
            .compare_to_signal(&BigFloat::from_i32(2), &ctx)
            .unwrap();
        assert_eq!(got, BigFloat::from_i32(-1));
        assert_eq!(ctx.flags(), Condition::empty());

        let got = BigFloat::NAN
            .compare_to_signal(&BigFloat::ONE, &ctx)
            .unwrap();
        assert!(got.is_quiet_nan());
        assert_eq!(ctx.flags(), Condition::INVALID);

        let ctx = ctx.with_traps(Condition::INVALID);
        let err = BigFloat::ONE
            .compare_to_signal(&BigFloat::signaling_nan(), &ctx)
            .unwrap_err();
        assert_eq!(err.primary(), Condition::INVALID);
    }

    #[test]
    fn test_negate_abs() {
        let ctx = Context::BINARY32;
        let x = BigFloat::create(-((1 << 24) + 1), 0);
        let got = x.abs_ctx(&ctx).unwrap();
        assert_eq!(got.to_f32(), 16777216.0);
        let got = x.negate_ctx(&ctx).unwrap();
        assert_eq!(got.to_f32(), 16777216.0);
        assert_eq!(-x.clone(), x.abs());
        assert!((-BigFloat::ZERO).is_negative());
        assert!(BigFloat::NEG_INFINITY.abs().is_infinite());
    }
}
