//! The arithmetic engine shared by every radix.
//!
//! [`RadixMath`] works on any type implementing [`RadixHost`],
//! which exposes a value as a sign, a significand, an exponent
//! and its special-value flags. Every operation returns its
//! result together with the conditions it raised; applying
//! trap policy is left to [`Trappable`][crate::Trappable].

use core::{cmp::Ordering, fmt, marker::PhantomData};

use bitflags::bitflags;
use num_bigint::BigInt;
use num_integer::Integer;

use crate::{
    accum::ShiftAccumulator,
    ctx::{Condition, Context, Rounding},
    fastint::FastInt,
};

/// The largest number of digits an operation may shift a
/// significand by to align it with another one when the
/// precision is unlimited.
pub const MAX_SHIFT_BITS: u64 = 1 << 22;

/// The kind and sign of a value.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ValueFlags(u8);

bitflags! {
    impl ValueFlags: u8 {
        /// The value is negative.
        const NEGATIVE = 0x1;
        /// The value is an infinity.
        const INFINITY = 0x2;
        /// The value is a quiet NaN.
        const QUIET_NAN = 0x4;
        /// The value is a signaling NaN.
        const SIGNALING_NAN = 0x8;
    }
}

impl ValueFlags {
    /// Reports whether the value is a NaN.
    pub const fn is_nan(self) -> bool {
        self.intersects(Self::QUIET_NAN.union(Self::SIGNALING_NAN))
    }

    /// Reports whether the value is an infinity or a NaN.
    pub const fn is_special(self) -> bool {
        self.intersects(
            Self::INFINITY
                .union(Self::QUIET_NAN)
                .union(Self::SIGNALING_NAN),
        )
    }

    /// Reports whether the value is negative.
    pub const fn is_negative(self) -> bool {
        self.contains(Self::NEGATIVE)
    }

    /// Returns [`NEGATIVE`][Self::NEGATIVE] if `negative` is
    /// true, or no flags otherwise.
    pub const fn sign(negative: bool) -> Self {
        if negative {
            Self::NEGATIVE
        } else {
            Self::empty()
        }
    }
}

impl fmt::Debug for ValueFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, &mut *f)
    }
}

/// A floating point type the engine can compute on.
///
/// For a finite value the significand holds the unsigned
/// coefficient. For a NaN it holds the payload and the
/// exponent is zero. For an infinity both are zero.
pub trait RadixHost: Clone {
    /// The accumulator used to round significands.
    type Accumulator: ShiftAccumulator;

    /// The radix of the significand and exponent.
    const RADIX: u32 = <Self::Accumulator as ShiftAccumulator>::RADIX;

    /// Returns the unsigned significand or NaN payload.
    fn mantissa(&self) -> &FastInt;

    /// Returns the exponent.
    fn exponent(&self) -> &FastInt;

    /// Returns the kind and sign of the value.
    fn value_flags(&self) -> ValueFlags;

    /// Creates a value from its parts.
    fn from_parts(mantissa: FastInt, exponent: FastInt, flags: ValueFlags) -> Self;
}

/// The arithmetic engine for a [`RadixHost`].
pub struct RadixMath<H> {
    _host: PhantomData<fn() -> H>,
}

impl<H> RadixMath<H> {
    /// Creates the engine.
    pub const fn new() -> Self {
        Self {
            _host: PhantomData,
        }
    }
}

impl<H> Copy for RadixMath<H> {}
impl<H> Clone for RadixMath<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Default for RadixMath<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RadixMath<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RadixMath")
    }
}

impl<H: RadixHost> RadixMath<H> {
    /// Rounds `x` to fit `ctx`.
    pub fn round_to_precision(&self, x: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        let f = x.value_flags();
        let r = if f.is_nan() {
            quiet(x, ctx, &mut flags)
        } else if f.contains(ValueFlags::INFINITY) {
            x.clone()
        } else {
            let x = Finite::of(x);
            round::<H>(x.neg, x.mant, x.exp, (0, 0), ctx, &mut flags)
        };
        (r, flags)
    }

    /// Returns `-x`, rounded to fit `ctx`.
    pub fn negate(&self, x: &H, ctx: &Context) -> (H, Condition) {
        self.with_sign(x, ctx, |neg| !neg)
    }

    /// Returns `|x|`, rounded to fit `ctx`.
    pub fn abs(&self, x: &H, ctx: &Context) -> (H, Condition) {
        self.with_sign(x, ctx, |_| false)
    }

    fn with_sign(&self, x: &H, ctx: &Context, sign: impl FnOnce(bool) -> bool) -> (H, Condition) {
        let mut flags = Condition::empty();
        let f = x.value_flags();
        let r = if f.is_nan() {
            quiet(x, ctx, &mut flags)
        } else if f.contains(ValueFlags::INFINITY) {
            infinity(sign(f.is_negative()))
        } else {
            let x = Finite::of(x);
            round::<H>(sign(x.neg), x.mant, x.exp, (0, 0), ctx, &mut flags)
        };
        (r, flags)
    }

    /// Returns `x + y`, rounded to fit `ctx`.
    pub fn add(&self, x: &H, y: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        let r = add_special(x, y, false, ctx, &mut flags);
        (r, flags)
    }

    /// Returns `x - y`, rounded to fit `ctx`.
    pub fn subtract(&self, x: &H, y: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        let r = add_special(x, y, true, ctx, &mut flags);
        (r, flags)
    }

    /// Returns `x * y`, rounded to fit `ctx`.
    pub fn multiply(&self, x: &H, y: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        let r = multiply(x, y, ctx, &mut flags);
        (r, flags)
    }

    /// Returns `x / y`, rounded to fit `ctx`.
    ///
    /// With unlimited precision the quotient must terminate,
    /// otherwise the result is NaN and
    /// [`INVALID`][Condition::INVALID] is raised.
    pub fn divide(&self, x: &H, y: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        let r = divide(x, y, ctx, &mut flags);
        (r, flags)
    }

    /// Compares `x` and `y`, returning -1, 0 or 1 as a value,
    /// or NaN if either operand is a NaN.
    ///
    /// Signaling NaN operands raise
    /// [`INVALID`][Condition::INVALID].
    pub fn compare_with_context(&self, x: &H, y: &H, ctx: &Context) -> (H, Condition) {
        let mut flags = Condition::empty();
        if let Some(nan) = select_nan(x, y, ctx, &mut flags) {
            return (nan, flags);
        }
        let r = match compare_values(x, y) {
            Ordering::Less => H::from_parts(FastInt::ONE, FastInt::ZERO, ValueFlags::NEGATIVE),
            Ordering::Equal => H::from_parts(FastInt::ZERO, FastInt::ZERO, ValueFlags::empty()),
            Ordering::Greater => H::from_parts(FastInt::ONE, FastInt::ZERO, ValueFlags::empty()),
        };
        (r, flags)
    }
}

type Acc<H> = <H as RadixHost>::Accumulator;

/// The parts of a finite value.
#[derive(Clone, Debug)]
struct Finite {
    neg: bool,
    mant: FastInt,
    exp: FastInt,
}

impl Finite {
    fn of<H: RadixHost>(x: &H) -> Self {
        Self {
            neg: x.value_flags().is_negative(),
            mant: x.mantissa().clone(),
            exp: x.exponent().clone(),
        }
    }

    fn negated(self, negate: bool) -> Self {
        Self {
            neg: self.neg != negate,
            ..self
        }
    }
}

/// The precision of a context, in digits of the host's radix.
#[derive(Clone, Debug)]
struct Precision {
    digits: FastInt,
    /// The largest significand if the precision is counted in
    /// bits but the radix is not 2.
    max: Option<FastInt>,
}

impl Precision {
    fn of<H: RadixHost>(ctx: &Context) -> Option<Self> {
        if !ctx.has_max_precision() {
            return None;
        }
        if ctx.precision_in_bits() && H::RADIX != 2 {
            let bits = ctx.precision().to_u64()?;
            let max = FastInt::ONE.shl(bits).add_int(-1);
            let digits = FastInt::from_u64(Acc::<H>::length_of(&max));
            Some(Self {
                digits,
                max: Some(max),
            })
        } else {
            Some(Self {
                digits: ctx.precision().clone(),
                max: None,
            })
        }
    }

    fn fits<H: RadixHost>(&self, mant: &FastInt) -> bool {
        FastInt::from_u64(Acc::<H>::length_of(mant)) <= self.digits
            && self.max.as_ref().map_or(true, |max| mant <= max)
    }

    /// Returns the largest significand.
    fn largest<H: RadixHost>(&self) -> FastInt {
        match &self.max {
            Some(max) => max.clone(),
            None => {
                let digits = self.digits.to_u64().unwrap_or_default();
                Acc::<H>::scale(&FastInt::ONE, digits).add_int(-1)
            }
        }
    }
}

fn radix_int<H: RadixHost>() -> i32 {
    i32::try_from(H::RADIX).unwrap_or(i32::MAX)
}

fn finite<H: RadixHost>(neg: bool, mant: FastInt, exp: FastInt) -> H {
    H::from_parts(mant, exp, ValueFlags::sign(neg))
}

fn infinity<H: RadixHost>(neg: bool) -> H {
    H::from_parts(
        FastInt::ZERO,
        FastInt::ZERO,
        ValueFlags::INFINITY | ValueFlags::sign(neg),
    )
}

/// Converts a scaling shift to a `u64`, refusing shifts past
/// [`MAX_SHIFT_BITS`].
fn bounded_shift(n: &FastInt) -> Option<u64> {
    let shift = n.to_u64().filter(|v| *v <= MAX_SHIFT_BITS);
    if shift.is_none() {
        #[cfg(feature = "tracing")]
        tracing::trace!(shift = %n, "shift exceeds MAX_SHIFT_BITS");
    }
    shift
}

fn invalid<H: RadixHost>(flags: &mut Condition) -> H {
    *flags |= Condition::INVALID;
    H::from_parts(FastInt::ZERO, FastInt::ZERO, ValueFlags::QUIET_NAN)
}

/// Returns `x`, which must be a NaN, as a quiet NaN whose
/// payload fits `ctx`.
fn quiet<H: RadixHost>(x: &H, ctx: &Context, flags: &mut Condition) -> H {
    let f = x.value_flags();
    if f.contains(ValueFlags::SIGNALING_NAN) {
        *flags |= Condition::INVALID;
    }
    let payload = truncate_payload::<H>(x.mantissa(), ctx);
    H::from_parts(
        payload,
        FastInt::ZERO,
        ValueFlags::QUIET_NAN | (f & ValueFlags::NEGATIVE),
    )
}

/// Keeps the low-order digits of a NaN payload that fit the
/// precision, less one digit if exponents are clamped.
fn truncate_payload<H: RadixHost>(payload: &FastInt, ctx: &Context) -> FastInt {
    let Some(prec) = Precision::of::<H>(ctx) else {
        return payload.clone();
    };
    let keep = if ctx.clamp_normal_exponents() {
        prec.digits.add_int(-1)
    } else {
        prec.digits
    };
    if keep.signum() <= 0 {
        return FastInt::ZERO;
    }
    if FastInt::from_u64(Acc::<H>::length_of(payload)) <= keep {
        return payload.clone();
    }
    let mut acc = Acc::<H>::new(payload.clone(), 0, 0);
    acc.truncate_right_simple(&keep);
    let high = Acc::<H>::scale(acc.shifted_value(), keep.to_u64().unwrap_or_default());
    payload - high
}

/// Returns the quiet NaN an operation on `x` and `y` produces,
/// if either is a NaN.
///
/// Signaling NaNs take precedence over quiet ones and the left
/// operand over the right.
fn select_nan<H: RadixHost>(x: &H, y: &H, ctx: &Context, flags: &mut Condition) -> Option<H> {
    let (fx, fy) = (x.value_flags(), y.value_flags());
    if fx.contains(ValueFlags::SIGNALING_NAN) {
        Some(quiet(x, ctx, flags))
    } else if fy.contains(ValueFlags::SIGNALING_NAN) {
        Some(quiet(y, ctx, flags))
    } else if fx.is_nan() {
        Some(quiet(x, ctx, flags))
    } else if fy.is_nan() {
        Some(quiet(y, ctx, flags))
    } else {
        None
    }
}

/// Reports whether the significand `kept` rounds away from
/// zero given the residue of the digits removed from it.
fn rounds_up(mode: Rounding, neg: bool, kept: &FastInt, last: u32, sticky: bool, radix: u32) -> bool {
    let half = radix / 2;
    #[allow(deprecated)]
    match mode.for_radix(radix) {
        Rounding::None | Rounding::Down => false,
        Rounding::Up => true,
        Rounding::Ceiling => !neg,
        Rounding::Floor => neg,
        Rounding::HalfUp => last >= half,
        Rounding::HalfDown => last > half || (last == half && sticky),
        Rounding::HalfEven => last > half || (last == half && (sticky || !kept.is_even())),
        Rounding::Odd => kept.is_even(),
        Rounding::ZeroFiveUp | Rounding::OddOrZeroFiveUp => {
            let (_, d) = kept.div_rem_int(i32::try_from(radix).unwrap_or(i32::MAX));
            d == 0 || (radix == 10 && d == 5)
        }
    }
}

/// The digits removed from a significand.
#[derive(Copy, Clone, Debug)]
struct Residue {
    last: u32,
    sticky: bool,
}

/// Rounds `mant + residue`, which exceeds `max`, when the
/// precision is counted in bits.
///
/// The candidates are `max` and the next multiple of the radix
/// above `mant`. Returns the latter divided by the radix if it
/// is chosen.
fn round_past_max<H: RadixHost>(
    mode: Rounding,
    neg: bool,
    mant: &FastInt,
    residue: Residue,
    max: &FastInt,
) -> Option<FastInt> {
    let radix = H::RADIX;
    let coarse = mant.div_rem_int(radix_int::<H>()).0.add_int(1);
    let away = if mode.is_truncating() {
        rounds_up(mode, neg, max, 1, true, radix)
    } else {
        // Twice the distance from `mant` to the midpoint of the
        // candidates.
        let upper = Acc::<H>::scale(&coarse, 1);
        let d = max + upper - mant.add(mant);
        let half = radix / 2;
        let above = match d.cmp_int(1) {
            Ordering::Less if d.is_zero() && residue.last == 0 && !residue.sticky => None,
            Ordering::Less => Some(true),
            Ordering::Equal => match residue.last.cmp(&half) {
                Ordering::Greater => Some(true),
                Ordering::Equal if residue.sticky => Some(true),
                Ordering::Equal => None,
                Ordering::Less => Some(false),
            },
            Ordering::Greater => Some(false),
        };
        above.unwrap_or(match mode {
            Rounding::HalfUp => true,
            Rounding::HalfDown => false,
            _ => !max.is_even(),
        })
    };
    away.then_some(coarse)
}

/// Rounds a finite value to fit `ctx`.
///
/// `residue` is the `(last_discarded, sticky)` pair of digits
/// already removed from `mant`.
fn round<H: RadixHost>(
    neg: bool,
    mant: FastInt,
    exp: FastInt,
    residue: (u32, u32),
    ctx: &Context,
    flags: &mut Condition,
) -> H {
    debug_assert!(!mant.is_negative());

    let radix = H::RADIX;
    let mode = ctx.rounding();

    if mant.is_zero() && residue == (0, 0) {
        return zero::<H>(neg, exp, ctx, flags);
    }

    let Some(prec) = Precision::of::<H>(ctx) else {
        if residue != (0, 0) {
            *flags |= Condition::INEXACT | Condition::ROUNDED;
        }
        if !ctx.exponent_within_range(&exp) {
            return overflow::<H>(neg, None, ctx, flags);
        }
        return finite(neg, mant, exp);
    };

    let mut acc = Acc::<H>::new(mant, residue.0, residue.1);
    let mut subnormal = false;
    let mut min_shift = None;
    if ctx.has_exponent_range() {
        let etiny = ctx.etiny(&prec.digits);
        let adjusted = if ctx.adjust_exponent() {
            &exp + acc.digit_length().add_int(-1)
        } else {
            exp.clone()
        };
        subnormal = adjusted < *ctx.emin();
        if exp < etiny {
            min_shift = Some(&etiny - &exp);
        }
    }

    acc.shift_to_digits(&prec.digits, min_shift.as_ref(), mode.is_truncating());

    let (last, sticky) = (acc.last_discarded(), acc.sticky());
    let discarded = acc.discarded_count().clone();
    let mut inexact = acc.is_inexact();
    let mut exp = exp + &discarded;
    let mut mant = acc.into_shifted_value();

    let past_max = prec
        .max
        .as_ref()
        .filter(|max| mant > **max || (mant == **max && inexact));
    if past_max.is_some() {
        inexact = true;
    }

    if !discarded.is_zero() {
        *flags |= Condition::ROUNDED;
    }
    if inexact {
        if mode == Rounding::None {
            return invalid(flags);
        }
        *flags |= Condition::INEXACT | Condition::ROUNDED;

        if let Some(max) = past_max {
            let residue = Residue {
                last,
                sticky: sticky != 0,
            };
            if let Some(coarse) = round_past_max::<H>(mode, neg, &mant, residue, max) {
                mant = coarse;
                exp = exp.add_int(1);
            } else {
                mant = max.clone();
            }
        } else if rounds_up(mode, neg, &mant, last, sticky != 0, radix) {
            mant = mant.add_int(1);
            if !prec.fits::<H>(&mant) {
                // The carry produced RADIX^digits.
                mant = mant.div_rem_int(radix_int::<H>()).0;
                exp = exp.add_int(1);
            }
        }
    }

    if ctx.has_exponent_range() && !mant.is_zero() {
        let emax = ctx.emax();
        if ctx.adjust_exponent() {
            let len = FastInt::from_u64(Acc::<H>::length_of(&mant));
            if &exp + len.add_int(-1) > *emax {
                return overflow::<H>(neg, Some(&prec), ctx, flags);
            }
            if ctx.clamp_normal_exponents() {
                let top = emax - prec.digits.add_int(-1);
                if exp > top {
                    let pad = (&exp - &top).to_u64().unwrap_or_default();
                    mant = Acc::<H>::scale(&mant, pad);
                    exp = top;
                    *flags |= Condition::CLAMPED;
                }
            }
        } else if exp > *emax {
            let pad = (&exp - emax).to_u64().filter(|n| *n <= MAX_SHIFT_BITS);
            match pad.map(|n| Acc::<H>::scale(&mant, n)) {
                Some(padded) if ctx.clamp_normal_exponents() && prec.fits::<H>(&padded) => {
                    mant = padded;
                    exp = emax.clone();
                    *flags |= Condition::CLAMPED;
                }
                _ => return overflow::<H>(neg, Some(&prec), ctx, flags),
            }
        }
    }

    if subnormal {
        *flags |= Condition::SUBNORMAL;
        if inexact {
            *flags |= Condition::UNDERFLOW;
            if mant.is_zero() {
                *flags |= Condition::CLAMPED;
            }
        }
    }

    let neg = neg && !(ctx.simplified() && mant.is_zero());
    finite(neg, mant, exp)
}

/// Fits the exponent of a zero into `ctx`.
fn zero<H: RadixHost>(neg: bool, exp: FastInt, ctx: &Context, flags: &mut Condition) -> H {
    let neg = neg && !ctx.simplified();
    let mut exp = exp;
    if ctx.has_exponent_range() {
        let digits = Precision::of::<H>(ctx).map_or(FastInt::ONE, |p| p.digits);
        let etiny = ctx.etiny(&digits);
        let top = if ctx.adjust_exponent() && ctx.clamp_normal_exponents() {
            ctx.emax() - digits.add_int(-1)
        } else {
            ctx.emax().clone()
        };
        if exp < etiny {
            exp = etiny;
            *flags |= Condition::CLAMPED;
        } else if exp > top {
            exp = top;
            *flags |= Condition::CLAMPED;
        }
    }
    finite(neg, FastInt::ZERO, exp)
}

/// Returns the result of an overflow: an infinity, or the
/// largest finite value if the rounding mode rounds toward
/// zero.
fn overflow<H: RadixHost>(
    neg: bool,
    prec: Option<&Precision>,
    ctx: &Context,
    flags: &mut Condition,
) -> H {
    *flags |= Condition::OVERFLOW | Condition::INEXACT | Condition::ROUNDED;

    #[cfg(feature = "tracing")]
    tracing::trace!(negative = neg, "overflow");

    let mode = ctx.rounding();
    if mode == Rounding::None {
        return invalid(flags);
    }
    match prec {
        Some(prec) if mode.overflows_to_finite(neg) => {
            let exp = if ctx.adjust_exponent() {
                ctx.emax() - prec.digits.add_int(-1)
            } else {
                ctx.emax().clone()
            };
            finite(neg, prec.largest::<H>(), exp)
        }
        _ => infinity(neg),
    }
}

/// Rounds a finite operand of a simplified arithmetic
/// operation to the precision.
fn lose_digits<H: RadixHost>(x: Finite, ctx: &Context, flags: &mut Condition) -> Finite {
    let Some(prec) = Precision::of::<H>(ctx) else {
        return x;
    };
    if prec.fits::<H>(&x.mant) {
        return x;
    }
    let plain = ctx.with_unlimited_exponents().with_simplified(false);
    let mut lost = Condition::empty();
    let r: H = round::<H>(x.neg, x.mant, x.exp, (0, 0), &plain, &mut lost);
    if lost.contains(Condition::INEXACT) {
        *flags |= Condition::LOST_DIGITS;
    }
    *flags |= lost;
    Finite::of(&r)
}

fn operands<H: RadixHost>(x: &H, y: &H, ctx: &Context, flags: &mut Condition) -> (Finite, Finite) {
    let (x, y) = (Finite::of(x), Finite::of(y));
    if ctx.simplified() {
        (
            lose_digits::<H>(x, ctx, flags),
            lose_digits::<H>(y, ctx, flags),
        )
    } else {
        (x, y)
    }
}

fn add_special<H: RadixHost>(x: &H, y: &H, negate: bool, ctx: &Context, flags: &mut Condition) -> H {
    if let Some(nan) = select_nan(x, y, ctx, flags) {
        return nan;
    }
    let fx = x.value_flags();
    let fy = y.value_flags() ^ ValueFlags::sign(negate);
    if fx.contains(ValueFlags::INFINITY) {
        if fy.contains(ValueFlags::INFINITY) && fx.is_negative() != fy.is_negative() {
            return invalid(flags);
        }
        return infinity(fx.is_negative());
    }
    if fy.contains(ValueFlags::INFINITY) {
        return infinity(fy.is_negative());
    }
    let (x, y) = operands(x, y, ctx, flags);
    add_finite::<H>(x, y.negated(negate), ctx, flags)
}

fn add_finite<H: RadixHost>(x: Finite, y: Finite, ctx: &Context, flags: &mut Condition) -> H {
    let zero_neg = if x.neg == y.neg {
        x.neg
    } else {
        ctx.rounding() == Rounding::Floor
    };
    // `hi` has the larger exponent.
    let (hi, lo) = if x.exp >= y.exp { (x, y) } else { (y, x) };
    let diff = &hi.exp - &lo.exp;

    if !diff.is_zero() {
        if let Some(prec) = Precision::of::<H>(ctx) {
            if let Some(r) = add_far::<H>(&hi, &lo, &diff, &prec, zero_neg, ctx, flags) {
                return r;
            }
        }
    }

    let aligned = if hi.mant.is_zero() {
        FastInt::ZERO
    } else {
        match bounded_shift(&diff) {
            Some(n) => Acc::<H>::scale(&hi.mant, n),
            None => return invalid(flags),
        }
    };
    let (neg, mant) = if hi.neg == lo.neg {
        (hi.neg, aligned + &lo.mant)
    } else {
        match aligned.cmp(&lo.mant) {
            Ordering::Greater => (hi.neg, aligned - &lo.mant),
            Ordering::Less => (lo.neg, &lo.mant - aligned),
            Ordering::Equal => (zero_neg, FastInt::ZERO),
        }
    };
    let neg = if mant.is_zero() { zero_neg } else { neg };
    round::<H>(neg, mant, lo.exp, (0, 0), ctx, flags)
}

/// Adds operands whose exponents differ without aligning them
/// exactly, if one of them is zero or lies entirely below the
/// rounding position of the other.
#[allow(clippy::too_many_arguments)]
fn add_far<H: RadixHost>(
    hi: &Finite,
    lo: &Finite,
    diff: &FastInt,
    prec: &Precision,
    zero_neg: bool,
    ctx: &Context,
    flags: &mut Condition,
) -> Option<H> {
    if lo.mant.is_zero() {
        if hi.mant.is_zero() {
            return Some(round::<H>(zero_neg, FastInt::ZERO, lo.exp.clone(), (0, 0), ctx, flags));
        }
        // Padding `hi` past the precision would only add
        // zeros for rounding to remove.
        let len = FastInt::from_u64(Acc::<H>::length_of(&hi.mant));
        let room = (&prec.digits - len).max(FastInt::ZERO);
        let pad = if *diff > room {
            *flags |= Condition::ROUNDED;
            room
        } else {
            diff.clone()
        };
        let Some(n) = bounded_shift(&pad) else {
            return Some(invalid(flags));
        };
        let mant = Acc::<H>::scale(&hi.mant, n);
        return Some(round::<H>(hi.neg, mant, &hi.exp - pad, (0, 0), ctx, flags));
    }
    if hi.mant.is_zero() {
        return None;
    }

    // Extend `hi` to at least `digits + 3` digits. If `lo` is
    // then less than one unit in the last place, only its sign
    // and the fact that it is non-zero matter.
    let len = FastInt::from_u64(Acc::<H>::length_of(&hi.mant));
    let pad = (prec.digits.add_int(2) - len).max(FastInt::ZERO).add_int(1);
    let guard = &hi.exp - &pad;
    let lo_top = &lo.exp + FastInt::from_u64(Acc::<H>::length_of(&lo.mant));
    if lo_top > guard {
        return None;
    }
    let mant = Acc::<H>::scale(&hi.mant, bounded_shift(&pad)?);
    let mant = if hi.neg == lo.neg {
        mant
    } else {
        mant.add_int(-1)
    };
    Some(round::<H>(hi.neg, mant, guard, (0, 1), ctx, flags))
}

fn multiply<H: RadixHost>(x: &H, y: &H, ctx: &Context, flags: &mut Condition) -> H {
    if let Some(nan) = select_nan(x, y, ctx, flags) {
        return nan;
    }
    let (fx, fy) = (x.value_flags(), y.value_flags());
    let neg = fx.is_negative() != fy.is_negative();
    if fx.contains(ValueFlags::INFINITY) || fy.contains(ValueFlags::INFINITY) {
        let zero = |f: ValueFlags, m: &FastInt| !f.is_special() && m.is_zero();
        if zero(fx, x.mantissa()) || zero(fy, y.mantissa()) {
            return invalid(flags);
        }
        return infinity(neg);
    }
    let (x, y) = operands(x, y, ctx, flags);
    round::<H>(neg, x.mant * y.mant, x.exp + y.exp, (0, 0), ctx, flags)
}

fn divide<H: RadixHost>(x: &H, y: &H, ctx: &Context, flags: &mut Condition) -> H {
    if let Some(nan) = select_nan(x, y, ctx, flags) {
        return nan;
    }
    let (fx, fy) = (x.value_flags(), y.value_flags());
    let neg = fx.is_negative() != fy.is_negative();
    match (
        fx.contains(ValueFlags::INFINITY),
        fy.contains(ValueFlags::INFINITY),
    ) {
        (true, true) => return invalid(flags),
        (true, false) => return infinity(neg),
        (false, true) => {
            let exp = if ctx.has_exponent_range() {
                *flags |= Condition::CLAMPED;
                let digits = Precision::of::<H>(ctx).map_or(FastInt::ONE, |p| p.digits);
                ctx.etiny(&digits)
            } else {
                FastInt::ZERO
            };
            return zero::<H>(neg, exp, ctx, flags);
        }
        (false, false) => {}
    }

    let (x, y) = operands(x, y, ctx, flags);
    if y.mant.is_zero() {
        if x.mant.is_zero() {
            return invalid(flags);
        }
        *flags |= Condition::DIVIDE_BY_ZERO;
        return infinity(neg);
    }
    let ideal = &x.exp - &y.exp;
    if x.mant.is_zero() {
        return zero::<H>(neg, ideal, ctx, flags);
    }

    let Some(prec) = Precision::of::<H>(ctx) else {
        return divide_exact::<H>(neg, &x.mant, &y.mant, ideal, ctx, flags);
    };

    // Scale the dividend so the quotient has at least
    // `digits + 1` digits.
    let lx = FastInt::from_u64(Acc::<H>::length_of(&x.mant));
    let ly = FastInt::from_u64(Acc::<H>::length_of(&y.mant));
    let shift = (prec.digits.add_int(1) + ly - lx).max(FastInt::ZERO);
    let Some(n) = bounded_shift(&shift) else {
        return divide_exact::<H>(neg, &x.mant, &y.mant, ideal, ctx, flags);
    };
    let (mut q, r) = Acc::<H>::scale(&x.mant, n).div_rem(&y.mant);
    let mut exp = ideal.clone() - shift;
    if !r.is_zero() {
        return round::<H>(neg, q, exp, (0, 1), ctx, flags);
    }
    let radix = radix_int::<H>();
    while exp < ideal {
        let (next, d) = q.div_rem_int(radix);
        if d != 0 {
            break;
        }
        q = next;
        exp = exp.add_int(1);
    }
    round::<H>(neg, q, exp, (0, 0), ctx, flags)
}

/// Divides `x` by `y` if the quotient terminates, otherwise
/// signals [`INVALID`][Condition::INVALID].
fn divide_exact<H: RadixHost>(
    neg: bool,
    x: &FastInt,
    y: &FastInt,
    ideal: FastInt,
    ctx: &Context,
    flags: &mut Condition,
) -> H {
    match exact_quotient::<H>(x, y) {
        Some((mant, shift)) => round::<H>(neg, mant, ideal - shift, (0, 0), ctx, flags),
        None => invalid(flags),
    }
}

/// Returns `(q, k)` such that `x / y = q * RADIX^-k` exactly,
/// or `None` if the quotient does not terminate.
fn exact_quotient<H: RadixHost>(x: &FastInt, y: &FastInt) -> Option<(FastInt, FastInt)> {
    let (x, y) = (x.to_bigint(), y.to_bigint());
    let g = x.gcd(&y);
    let (n, mut d) = (x / &g, y / &g);

    let primes: &[u32] = match H::RADIX {
        2 => &[2],
        10 => &[2, 5],
        _ => return None,
    };
    let mut k = 0u64;
    let mut counts = [0u64; 2];
    for (p, count) in primes.iter().zip(counts.iter_mut()) {
        while d.is_multiple_of(&(*p).into()) {
            d /= *p;
            *count += 1;
        }
        k = k.max(*count);
    }
    if d != BigInt::from(1u8) {
        return None;
    }
    let mut q = n;
    for (p, count) in primes.iter().zip(counts) {
        q *= num_traits::pow(BigInt::from(*p), usize::try_from(k - count).ok()?);
    }
    Some((FastInt::from_bigint(q), FastInt::from_u64(k)))
}

/// Compares two values that are not NaNs.
pub(crate) fn compare_values<H: RadixHost>(x: &H, y: &H) -> Ordering {
    let (fx, fy) = (x.value_flags(), y.value_flags());
    debug_assert!(!fx.is_nan() && !fy.is_nan());

    let rank = |f: ValueFlags, m: &FastInt| -> i32 {
        let r = if f.contains(ValueFlags::INFINITY) {
            2
        } else {
            i32::from(!m.is_zero())
        };
        if f.is_negative() {
            -r
        } else {
            r
        }
    };
    let (rx, ry) = (rank(fx, x.mantissa()), rank(fy, y.mantissa()));
    if rx != ry || rx.abs() != 1 {
        // Different signs or kinds, or equal infinities or
        // zeros.
        return rx.cmp(&ry);
    }
    let ord = compare_magnitudes::<H>(x.mantissa(), x.exponent(), y.mantissa(), y.exponent());
    if rx < 0 {
        ord.reverse()
    } else {
        ord
    }
}

/// Compares `|mx * RADIX^ex|` and `|my * RADIX^ey|`, both
/// non-zero.
pub(crate) fn compare_magnitudes<H: RadixHost>(
    mx: &FastInt,
    ex: &FastInt,
    my: &FastInt,
    ey: &FastInt,
) -> Ordering {
    let tx = ex + FastInt::from_u64(Acc::<H>::length_of(mx));
    let ty = ey + FastInt::from_u64(Acc::<H>::length_of(my));
    if tx != ty {
        return tx.cmp(&ty);
    }
    // The top digits line up, so the exponents differ by at
    // most the length of the longer significand.
    match ex.cmp(ey) {
        Ordering::Equal => mx.cmp(my),
        Ordering::Greater => {
            let n = (ex - ey).to_u64().unwrap_or_default();
            Acc::<H>::scale(mx, n).cmp(my)
        }
        Ordering::Less => {
            let n = (ey - ex).to_u64().unwrap_or_default();
            mx.cmp(&Acc::<H>::scale(my, n))
        }
    }
}
