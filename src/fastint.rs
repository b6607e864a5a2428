//! Integers that only allocate when they leave `i32` range.

use alloc::borrow::Cow;
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Pow, Signed, ToPrimitive, Zero};

use crate::{
    accum,
    macros::{binop_impl, forward_op_assign, neg_impl},
    util,
};

/// An arbitrary precision integer.
///
/// Values in `i32` range are stored inline. Constructors
/// normalize, so a [`Large`][FastInt::Large] produced by this
/// crate never holds a value that fits in an `i32`. Equality,
/// ordering and hashing only consider the mathematical value.
#[derive(Clone, Debug)]
pub enum FastInt {
    /// A value in `i32` range.
    Small(i32),
    /// A value outside `i32` range.
    Large(BigInt),
}

impl FastInt {
    /// 0
    pub const ZERO: Self = Self::Small(0);
    /// 1
    pub const ONE: Self = Self::Small(1);
    /// 10
    pub const TEN: Self = Self::Small(10);
    /// -1
    pub const NEG_ONE: Self = Self::Small(-1);

    /// Creates a `FastInt` from an `i32`.
    pub const fn from_i32(v: i32) -> Self {
        Self::Small(v)
    }

    /// Creates a `FastInt` from an `i64`.
    pub fn from_i64(v: i64) -> Self {
        match i32::try_from(v) {
            Ok(v) => Self::Small(v),
            Err(_) => Self::Large(BigInt::from(v)),
        }
    }

    /// Creates a `FastInt` from a `u64`.
    pub fn from_u64(v: u64) -> Self {
        match i32::try_from(v) {
            Ok(v) => Self::Small(v),
            Err(_) => Self::Large(BigInt::from(v)),
        }
    }

    /// Creates a `FastInt` from a `BigInt`, demoting it if
    /// possible.
    pub fn from_bigint(v: BigInt) -> Self {
        match v.to_i32() {
            Some(v) => Self::Small(v),
            None => Self::Large(v),
        }
    }

    /// Creates a non-negative `FastInt` from a `BigUint`.
    pub fn from_biguint(v: BigUint) -> Self {
        Self::from_bigint(BigInt::from_biguint(Sign::Plus, v))
    }

    /// Reports whether the value is stored inline.
    pub const fn is_small(&self) -> bool {
        matches!(self, Self::Small(_))
    }

    /// Returns the value as a `BigInt`.
    pub fn to_bigint(&self) -> BigInt {
        self.big().into_owned()
    }

    /// Converts the value into a `BigInt`.
    pub fn into_bigint(self) -> BigInt {
        match self {
            Self::Small(v) => BigInt::from(v),
            Self::Large(v) => v,
        }
    }

    /// Returns the value as an `i32`, if it fits.
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            Self::Small(v) => Some(*v),
            Self::Large(v) => v.to_i32(),
        }
    }

    /// Returns the value as an `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Small(v) => Some(i64::from(*v)),
            Self::Large(v) => v.to_i64(),
        }
    }

    /// Returns the value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Self::Small(v) => u64::try_from(*v).ok(),
            Self::Large(v) => v.to_u64(),
        }
    }

    /// Reports whether the value is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Small(v) => *v == 0,
            Self::Large(v) => v.is_zero(),
        }
    }

    /// Reports whether the value is less than zero.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Small(v) => *v < 0,
            Self::Large(v) => v.is_negative(),
        }
    }

    /// Reports whether the value is even.
    pub fn is_even(&self) -> bool {
        match self {
            Self::Small(v) => v & 1 == 0,
            Self::Large(v) => v.is_even(),
        }
    }

    /// Returns -1, 0 or 1 according to the sign of the value.
    pub fn signum(&self) -> i32 {
        match self {
            Self::Small(v) => v.signum(),
            Self::Large(v) => match v.sign() {
                Sign::Minus => -1,
                Sign::NoSign => 0,
                Sign::Plus => 1,
            },
        }
    }

    /// Returns `self + rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: &Self) -> Self {
        if let (Self::Small(a), Self::Small(b)) = (self, rhs) {
            return match small_add(*a, *b) {
                Some(v) => Self::Small(v),
                None => Self::Large(BigInt::from(i64::from(*a) + i64::from(*b))),
            };
        }
        Self::from_bigint(self.big().as_ref() + rhs.big().as_ref())
    }

    /// Returns `self - rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, rhs: &Self) -> Self {
        if let (Self::Small(a), Self::Small(b)) = (self, rhs) {
            return match small_sub(*a, *b) {
                Some(v) => Self::Small(v),
                None => Self::Large(BigInt::from(i64::from(*a) - i64::from(*b))),
            };
        }
        Self::from_bigint(self.big().as_ref() - rhs.big().as_ref())
    }

    /// Returns `self * rhs`.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: &Self) -> Self {
        if let (Self::Small(a), Self::Small(b)) = (self, rhs) {
            return match a.checked_mul(*b) {
                Some(v) => Self::Small(v),
                None => Self::Large(BigInt::from(i64::from(*a) * i64::from(*b))),
            };
        }
        Self::from_bigint(self.big().as_ref() * rhs.big().as_ref())
    }

    /// Returns `-self`.
    #[allow(clippy::should_implement_trait)]
    pub fn neg(&self) -> Self {
        match self {
            Self::Small(v) => match v.checked_neg() {
                Some(v) => Self::Small(v),
                None => Self::Large(-BigInt::from(*v)),
            },
            Self::Large(v) => Self::from_bigint(-v),
        }
    }

    /// Returns `|self|`.
    pub fn abs(&self) -> Self {
        match self {
            Self::Small(v) => Self::from_u64(u64::from(v.unsigned_abs())),
            Self::Large(v) => Self::Large(v.abs()),
        }
    }

    /// Returns `self + rhs`.
    pub fn add_int(&self, rhs: i32) -> Self {
        self.add(&Self::Small(rhs))
    }

    /// Compares `self` against `rhs`.
    pub fn cmp_int(&self, rhs: i32) -> Ordering {
        match self {
            Self::Small(v) => v.cmp(&rhs),
            Self::Large(v) => v.cmp(&BigInt::from(rhs)),
        }
    }

    /// Returns the truncated quotient and remainder of `self`
    /// divided by `d`.
    ///
    /// `d` must be non-zero.
    pub fn div_rem_int(&self, d: i32) -> (Self, i32) {
        debug_assert!(d != 0);

        match self {
            Self::Small(v) => match (v.checked_div(d), v.checked_rem(d)) {
                (Some(q), Some(r)) => (Self::Small(q), r),
                // i32::MIN / -1
                _ => (Self::from_i64(-i64::from(*v)), 0),
            },
            Self::Large(v) => {
                let (q, r) = v.div_rem(&BigInt::from(d));
                (Self::from_bigint(q), r.to_i32().unwrap_or_default())
            }
        }
    }

    /// Returns the truncated quotient and remainder of `self`
    /// divided by `d`.
    ///
    /// `d` must be non-zero.
    pub fn div_rem(&self, d: &Self) -> (Self, Self) {
        debug_assert!(!d.is_zero());

        if let (Self::Small(a), Self::Small(b)) = (self, d) {
            if let (Some(q), Some(r)) = (a.checked_div(*b), a.checked_rem(*b)) {
                return (Self::Small(q), Self::Small(r));
            }
        }
        let (q, r) = self.big().as_ref().div_rem(d.big().as_ref());
        (Self::from_bigint(q), Self::from_bigint(r))
    }

    /// Returns the number of bits in `|self|`.
    ///
    /// It returns 0 for zero.
    pub fn bit_length(&self) -> u64 {
        match self {
            Self::Small(v) => u64::from(u32::BITS - v.unsigned_abs().leading_zeros()),
            Self::Large(v) => v.bits(),
        }
    }

    /// Returns the number of decimal digits in `|self|`.
    ///
    /// It returns 1 for zero.
    pub fn digit_length(&self) -> u64 {
        match self {
            Self::Small(v) => u64::from(util::digits(u64::from(v.unsigned_abs()))),
            Self::Large(v) => accum::decimal_length(v.magnitude()),
        }
    }

    /// Returns `self * 2^n`.
    pub fn shl(&self, n: u64) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        if let (Self::Small(v), Ok(n)) = (self, u32::try_from(n)) {
            if n < 32 {
                return Self::from_i64(i64::from(*v) << n);
            }
        }
        Self::from_bigint(self.big().as_ref() << n)
    }

    /// Returns `self * 10^n`.
    pub fn scale10(&self, n: u64) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        if let Self::Small(v) = self {
            if n <= u64::from(util::MAX_POW10) {
                if let Some(p) = i64::try_from(util::pow10(n as u32))
                    .ok()
                    .and_then(|p| p.checked_mul(i64::from(*v)))
                {
                    return Self::from_i64(p);
                }
            }
        }
        Self::from_bigint(self.big().as_ref() * BigInt::from(pow10_big(n)))
    }

    /// Returns the value as a (possibly borrowed) `BigInt`.
    pub(crate) fn big(&self) -> Cow<'_, BigInt> {
        match self {
            Self::Small(v) => Cow::Owned(BigInt::from(*v)),
            Self::Large(v) => Cow::Borrowed(v),
        }
    }
}

/// Returns `a + b`, or `None` if the sum leaves `i32` range.
const fn small_add(a: i32, b: i32) -> Option<i32> {
    if (b > 0 && a > i32::MAX - b) || (b < 0 && a < i32::MIN - b) {
        None
    } else {
        Some(a + b)
    }
}

/// Returns `a - b`, or `None` if the difference leaves `i32`
/// range.
const fn small_sub(a: i32, b: i32) -> Option<i32> {
    if (b < 0 && a > i32::MAX + b) || (b > 0 && a < i32::MIN + b) {
        None
    } else {
        Some(a - b)
    }
}

/// Returns 10^n.
pub(crate) fn pow10_big(n: u64) -> BigUint {
    if n <= u64::from(util::MAX_POW10) {
        BigUint::from(util::pow10(n as u32))
    } else {
        Pow::pow(BigUint::from(10u8), n)
    }
}

impl Default for FastInt {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for FastInt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FastInt {}

impl PartialOrd for FastInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FastInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Small(a), Self::Small(b)) => a.cmp(b),
            _ => self.big().as_ref().cmp(other.big().as_ref()),
        }
    }
}

impl Hash for FastInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.to_i32() {
            Some(v) => v.hash(state),
            None => self.big().hash(state),
        }
    }
}

impl fmt::Display for FastInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small(v) => fmt::Display::fmt(v, f),
            Self::Large(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! from_impl {
    ($($t:ty => $ctor:ident),* $(,)?) => {
        $(impl From<$t> for FastInt {
            fn from(v: $t) -> Self {
                Self::$ctor(v.into())
            }
        })*
    };
}
from_impl! {
    i8 => from_i32,
    i16 => from_i32,
    i32 => from_i32,
    u8 => from_i32,
    u16 => from_i32,
    i64 => from_i64,
    u32 => from_u64,
    u64 => from_u64,
    BigInt => from_bigint,
    BigUint => from_biguint,
}

impl From<FastInt> for BigInt {
    fn from(v: FastInt) -> Self {
        v.into_bigint()
    }
}

binop_impl! { Add, add, add; FastInt }
binop_impl! { Sub, sub, sub; FastInt }
binop_impl! { Mul, mul, mul; FastInt }
neg_impl! { neg; FastInt }
forward_op_assign! { impl AddAssign, add_assign, Add, add for FastInt, FastInt }
forward_op_assign! { impl SubAssign, sub_assign, Sub, sub for FastInt, FastInt }
forward_op_assign! { impl MulAssign, mul_assign, Mul, mul for FastInt, FastInt }
