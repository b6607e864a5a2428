//! Arithmetic contexts.

use alloc::sync::Arc;
use core::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use bitflags::bitflags;

use crate::{fastint::FastInt, trap::Trap};

/// Controls the precision, rounding, exponent range and trap
/// policy of an arithmetic operation.
///
/// A `Context` is immutable, except for its optional flags
/// cell. Clones of a context share the same cell, so
/// conditions raised through any clone are visible from all of
/// them. Use [`snapshot`][Self::snapshot] or
/// [`with_blank_flags`][Self::with_blank_flags] to get a
/// context with its own cell.
#[derive(Clone, Debug)]
pub struct Context {
    precision: FastInt,
    rounding: Rounding,
    emin: FastInt,
    emax: FastInt,
    has_exponent_range: bool,
    clamp_normal_exponents: bool,
    adjust_exponent: bool,
    precision_in_bits: bool,
    simplified: bool,
    traps: Condition,
    flags: Option<FlagCell>,
}

impl Context {
    /// Unlimited precision and exponent range, rounding half
    /// up.
    pub const UNLIMITED: Self = Self::unlimited(Rounding::HalfUp);

    /// Unlimited precision and exponent range, rounding half
    /// even.
    pub const UNLIMITED_HALF_EVEN: Self = Self::unlimited(Rounding::HalfEven);

    /// The General Decimal Arithmetic basic context: 9 digits,
    /// half up, exponents in [-999999999, 999999999].
    pub const BASIC: Self =
        Self::preset(9, Rounding::HalfUp, -999_999_999, 999_999_999, false).with_traps_const(
            Condition::INVALID
                .union(Condition::DIVIDE_BY_ZERO)
                .union(Condition::OVERFLOW),
        );

    /// IEEE 754-2008 decimal32.
    pub const DECIMAL32: Self = Self::preset(7, Rounding::HalfEven, -95, 96, true);

    /// IEEE 754-2008 decimal64.
    pub const DECIMAL64: Self = Self::preset(16, Rounding::HalfEven, -383, 384, true);

    /// IEEE 754-2008 decimal128.
    pub const DECIMAL128: Self = Self::preset(34, Rounding::HalfEven, -6143, 6144, true);

    /// The .NET `System.Decimal` format: a 96 bit coefficient
    /// and a raw exponent in [-28, 0].
    pub const CLI_DECIMAL: Self = {
        let mut ctx = Self::preset(96, Rounding::HalfEven, -28, 0, true);
        ctx.adjust_exponent = false;
        ctx.precision_in_bits = true;
        ctx
    };

    /// IEEE 754-2008 binary16.
    pub const BINARY16: Self = Self::preset(11, Rounding::HalfEven, -14, 15, false);

    /// IEEE 754-2008 binary32.
    pub const BINARY32: Self = Self::preset(24, Rounding::HalfEven, -126, 127, false);

    /// IEEE 754-2008 binary64.
    pub const BINARY64: Self = Self::preset(53, Rounding::HalfEven, -1022, 1023, false);

    /// IEEE 754-2008 binary128.
    pub const BINARY128: Self = Self::preset(113, Rounding::HalfEven, -16382, 16383, false);

    const fn unlimited(rounding: Rounding) -> Self {
        Self {
            precision: FastInt::ZERO,
            rounding,
            emin: FastInt::ZERO,
            emax: FastInt::ZERO,
            has_exponent_range: false,
            clamp_normal_exponents: false,
            adjust_exponent: true,
            precision_in_bits: false,
            simplified: false,
            traps: Condition::empty(),
            flags: None,
        }
    }

    const fn preset(precision: i32, rounding: Rounding, emin: i32, emax: i32, clamp: bool) -> Self {
        Self {
            precision: FastInt::from_i32(precision),
            rounding,
            emin: FastInt::from_i32(emin),
            emax: FastInt::from_i32(emax),
            has_exponent_range: true,
            clamp_normal_exponents: clamp,
            adjust_exponent: true,
            precision_in_bits: false,
            simplified: false,
            traps: Condition::empty(),
            flags: None,
        }
    }

    const fn with_traps_const(self, traps: Condition) -> Self {
        let mut ctx = self;
        ctx.traps = traps;
        ctx
    }

    /// Creates a context with `precision` digits and an
    /// exponent range of `[emin, emax]`.
    ///
    /// A precision of 0 means unlimited.
    pub fn new(
        precision: u32,
        rounding: Rounding,
        emin: i32,
        emax: i32,
        clamp_normal_exponents: bool,
    ) -> Result<Self, ContextError> {
        if emin > emax {
            return Err(ContextError::InvertedExponentRange);
        }
        let mut ctx = Self::unlimited(rounding);
        ctx.precision = FastInt::from(precision);
        ctx.emin = FastInt::from_i32(emin);
        ctx.emax = FastInt::from_i32(emax);
        ctx.has_exponent_range = true;
        ctx.clamp_normal_exponents = clamp_normal_exponents;
        Ok(ctx)
    }

    /// Creates a context with `precision` digits, rounding half
    /// up and no exponent range.
    pub fn for_precision(precision: u32) -> Self {
        Self::for_precision_and_rounding(precision, Rounding::HalfUp)
    }

    /// Creates a context with unlimited precision and the given
    /// rounding.
    pub const fn for_rounding(rounding: Rounding) -> Self {
        Self::unlimited(rounding)
    }

    /// Creates a context with `precision` digits, the given
    /// rounding and no exponent range.
    pub fn for_precision_and_rounding(precision: u32, rounding: Rounding) -> Self {
        let mut ctx = Self::unlimited(rounding);
        ctx.precision = FastInt::from(precision);
        ctx
    }

    /// Returns the maximum number of digits (or bits, see
    /// [`precision_in_bits`][Self::precision_in_bits]) in a
    /// result. Zero means unlimited.
    pub fn precision(&self) -> &FastInt {
        &self.precision
    }

    /// Reports whether [`precision`][Self::precision] is
    /// limited.
    pub fn has_max_precision(&self) -> bool {
        !self.precision.is_zero()
    }

    /// Returns the rounding mode.
    pub const fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Returns the smallest exponent.
    pub fn emin(&self) -> &FastInt {
        &self.emin
    }

    /// Returns the largest exponent.
    pub fn emax(&self) -> &FastInt {
        &self.emax
    }

    /// Reports whether exponents are limited to
    /// `[emin, emax]`.
    pub const fn has_exponent_range(&self) -> bool {
        self.has_exponent_range
    }

    /// Reports whether the exponents of large results are
    /// folded down by padding the significand with zeros.
    pub const fn clamp_normal_exponents(&self) -> bool {
        self.clamp_normal_exponents
    }

    /// Reports whether the exponent range applies to the
    /// adjusted exponent (the exponent of the most significant
    /// digit) rather than the raw exponent.
    pub const fn adjust_exponent(&self) -> bool {
        self.adjust_exponent
    }

    /// Reports whether the precision counts bits instead of
    /// digits in the result's radix.
    pub const fn precision_in_bits(&self) -> bool {
        self.precision_in_bits
    }

    /// Reports whether the context follows the ANSI X3.274
    /// simplified arithmetic rules.
    pub const fn simplified(&self) -> bool {
        self.simplified
    }

    /// Returns the set of trapped conditions.
    pub const fn traps(&self) -> Condition {
        self.traps
    }

    /// Reports whether the context records raised conditions.
    pub const fn has_flags(&self) -> bool {
        self.flags.is_some()
    }

    /// Returns the conditions raised so far, or the empty set
    /// if the context does not record them.
    pub fn flags(&self) -> Condition {
        self.flags
            .as_ref()
            .map_or(Condition::empty(), FlagCell::get)
    }

    /// Overwrites the recorded conditions.
    pub fn set_flags(&self, flags: Condition) -> Result<(), ContextError> {
        match &self.flags {
            Some(cell) => {
                cell.set(flags);
                Ok(())
            }
            None => Err(ContextError::NoFlags),
        }
    }

    /// Records `flags` if the context records conditions.
    pub(crate) fn merge_flags(&self, flags: Condition) {
        if let Some(cell) = &self.flags {
            cell.merge(flags);
        }
    }

    /// Returns a deep copy of the context whose flags cell, if
    /// any, is no longer shared.
    pub fn snapshot(&self) -> Self {
        let mut ctx = self.clone();
        ctx.flags = self.flags.as_ref().map(|cell| FlagCell::new(cell.get()));
        ctx
    }

    /// Returns a copy of the context with `precision` digits.
    pub fn with_precision(&self, precision: u32) -> Self {
        let mut ctx = self.clone();
        ctx.precision = FastInt::from(precision);
        ctx
    }

    /// Returns a copy of the context with `precision` digits.
    pub fn with_big_precision(&self, precision: FastInt) -> Result<Self, ContextError> {
        if precision.is_negative() {
            return Err(ContextError::NegativePrecision);
        }
        let mut ctx = self.clone();
        ctx.precision = precision;
        Ok(ctx)
    }

    /// Returns a copy of the context with the given rounding.
    pub fn with_rounding(&self, rounding: Rounding) -> Self {
        let mut ctx = self.clone();
        ctx.rounding = rounding;
        ctx
    }

    /// Returns a copy of the context with an exponent range of
    /// `[emin, emax]`.
    pub fn with_exponent_range(&self, emin: i32, emax: i32) -> Result<Self, ContextError> {
        self.with_big_exponent_range(FastInt::from_i32(emin), FastInt::from_i32(emax))
    }

    /// Returns a copy of the context with an exponent range of
    /// `[emin, emax]`.
    pub fn with_big_exponent_range(
        &self,
        emin: FastInt,
        emax: FastInt,
    ) -> Result<Self, ContextError> {
        if emin > emax {
            return Err(ContextError::InvertedExponentRange);
        }
        let mut ctx = self.clone();
        ctx.emin = emin;
        ctx.emax = emax;
        ctx.has_exponent_range = true;
        Ok(ctx)
    }

    /// Returns a copy of the context without an exponent range.
    pub fn with_unlimited_exponents(&self) -> Self {
        let mut ctx = self.clone();
        ctx.has_exponent_range = false;
        ctx
    }

    /// Returns a copy of the context that does (or does not)
    /// fold down large exponents.
    pub fn with_exponent_clamp(&self, clamp: bool) -> Self {
        let mut ctx = self.clone();
        ctx.clamp_normal_exponents = clamp;
        ctx
    }

    /// Returns a copy of the context whose exponent range
    /// applies to adjusted (or raw) exponents.
    pub fn with_adjust_exponent(&self, adjust: bool) -> Self {
        let mut ctx = self.clone();
        ctx.adjust_exponent = adjust;
        ctx
    }

    /// Returns a copy of the context whose precision counts
    /// bits (or digits).
    pub fn with_precision_in_bits(&self, bits: bool) -> Self {
        let mut ctx = self.clone();
        ctx.precision_in_bits = bits;
        ctx
    }

    /// Returns a copy of the context with simplified
    /// arithmetic turned on or off.
    pub fn with_simplified(&self, simplified: bool) -> Self {
        let mut ctx = self.clone();
        ctx.simplified = simplified;
        ctx
    }

    /// Returns a copy of the context trapping `traps`.
    pub fn with_traps(&self, traps: Condition) -> Self {
        let mut ctx = self.clone();
        ctx.traps = traps;
        ctx
    }

    /// Returns a copy of the context with its own, empty flags
    /// cell.
    pub fn with_blank_flags(&self) -> Self {
        let mut ctx = self.clone();
        ctx.flags = Some(FlagCell::new(Condition::empty()));
        ctx
    }

    /// Returns a copy of the context that does not record
    /// conditions.
    pub fn with_no_flags(&self) -> Self {
        let mut ctx = self.clone();
        ctx.flags = None;
        ctx
    }

    /// Returns the context used to run an operation on behalf
    /// of `self`: the same context if nothing is trapped,
    /// otherwise a copy without traps or flags.
    pub fn non_trapping(&self) -> Self {
        if self.traps.is_empty() {
            self.clone()
        } else {
            let mut ctx = self.clone();
            ctx.traps = Condition::empty();
            ctx.flags = None;
            ctx
        }
    }

    /// Reports whether `exp` lies within the exponent range.
    ///
    /// Without a limited precision only the upper bound is
    /// checked. Otherwise, if the range applies to adjusted
    /// exponents, `exp` is taken to be the exponent of a
    /// full-precision significand.
    pub fn exponent_within_range(&self, exp: &FastInt) -> bool {
        if !self.has_exponent_range {
            return true;
        }
        if !self.has_max_precision() {
            return *exp <= self.emax;
        }
        let exp = if self.adjust_exponent {
            exp + self.precision.add_int(-1)
        } else {
            exp.clone()
        };
        exp >= self.emin && exp <= self.emax
    }

    /// Records `flags` and escalates any trapped condition.
    ///
    /// The first trapped condition, by bit position, that is
    /// not one of Clamped, Inexact, Rounded and Subnormal is
    /// reported. Otherwise Subnormal, Inexact, Rounded and
    /// Clamped are reported in that order.
    pub fn trigger_traps<T>(&self, result: T, flags: Condition) -> Result<T, Trap<T>> {
        self.merge_flags(flags);

        let armed = self.traps & flags;
        if armed.is_empty() {
            return Ok(result);
        }
        let primary = primary_condition(armed);

        #[cfg(feature = "tracing")]
        tracing::debug!(condition = %primary, flags = %flags, "trapped");

        Err(Trap::new(primary, flags, self.snapshot(), result))
    }

    /// Returns the subnormal exponent limit for a significand
    /// of `digits` digits.
    pub(crate) fn etiny(&self, digits: &FastInt) -> FastInt {
        if self.adjust_exponent {
            &self.emin - digits.add_int(-1)
        } else {
            self.emin.clone()
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

/// Returns the trapped condition to report from `armed`, which
/// must not be empty.
fn primary_condition(armed: Condition) -> Condition {
    const GROUPED: Condition = Condition::CLAMPED
        .union(Condition::INEXACT)
        .union(Condition::ROUNDED)
        .union(Condition::SUBNORMAL);

    debug_assert!(!armed.is_empty());

    let ungrouped = armed.difference(GROUPED);
    if !ungrouped.is_empty() {
        let bits = ungrouped.bits();
        return Condition::from_bits_retain(bits & bits.wrapping_neg());
    }
    [
        Condition::SUBNORMAL,
        Condition::INEXACT,
        Condition::ROUNDED,
        Condition::CLAMPED,
    ]
    .into_iter()
    .find(|c| armed.contains(*c))
    .unwrap_or(armed)
}

/// A set of conditions shared by clones of a [`Context`].
#[derive(Clone, Debug)]
struct FlagCell(Arc<AtomicU32>);

impl FlagCell {
    fn new(flags: Condition) -> Self {
        Self(Arc::new(AtomicU32::new(flags.bits())))
    }

    fn get(&self) -> Condition {
        Condition::from_bits_retain(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, flags: Condition) {
        self.0.store(flags.bits(), Ordering::Relaxed);
    }

    fn merge(&self, flags: Condition) {
        self.0.fetch_or(flags.bits(), Ordering::Relaxed);
    }
}

/// An error returned when building an invalid [`Context`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContextError {
    /// The precision was negative.
    NegativePrecision,
    /// The smallest exponent was larger than the largest.
    InvertedExponentRange,
    /// The context does not record conditions.
    NoFlags,
}

#[cfg(feature = "std")]
impl std::error::Error for ContextError {}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePrecision => write!(f, "precision cannot be negative"),
            Self::InvertedExponentRange => write!(f, "emin cannot be greater than emax"),
            Self::NoFlags => write!(f, "context does not record flags"),
        }
    }
}

/// Determines how results are rounded to fit a [`Context`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Rounding {
    /// The result must be exact. Inexact results signal
    /// [`INVALID`][Condition::INVALID].
    None,
    /// Rounds away from zero if the discarded digits are
    /// non-zero.
    Up,
    /// Truncates.
    Down,
    /// Rounds to nearest, with ties away from zero.
    HalfUp,
    /// Rounds to nearest, with ties toward zero.
    HalfDown,
    /// Rounds to nearest, with ties to the even neighbor.
    ///
    /// IEEE 754-2008 roundTiesToEven.
    #[default]
    HalfEven,
    /// Rounds toward positive infinity.
    Ceiling,
    /// Rounds toward negative infinity.
    Floor,
    /// Truncates, then, if the discarded digits are non-zero,
    /// rounds away from zero when the last digit is 0 or 5 (in
    /// radix 10) or 0 (in radix 2).
    ///
    /// This allows a result to be rounded again to a shorter
    /// precision without double rounding errors.
    OddOrZeroFiveUp,
    /// Truncates, then, if the discarded digits are non-zero,
    /// rounds away from zero when the kept value is even. This
    /// applies in every radix.
    #[deprecated(note = "use `Rounding::OddOrZeroFiveUp`")]
    Odd,
    /// Truncates, then, if the discarded digits are non-zero,
    /// rounds away from zero when the last digit is 0 or 5 (in
    /// radix 10) or 0 (otherwise).
    #[deprecated(note = "use `Rounding::OddOrZeroFiveUp`")]
    ZeroFiveUp,
}

#[allow(deprecated)]
impl Rounding {
    /// Parses a rounding mode name as used by decTest files.
    pub fn try_from_str(s: &str) -> Option<Self> {
        let mode = match s {
            "ceiling" => Self::Ceiling,
            "down" => Self::Down,
            "floor" => Self::Floor,
            "half_down" => Self::HalfDown,
            "half_even" => Self::HalfEven,
            "half_up" => Self::HalfUp,
            "up" => Self::Up,
            "05up" => Self::OddOrZeroFiveUp,
            "none" => Self::None,
            _ => return None,
        };
        Some(mode)
    }

    /// Resolves [`OddOrZeroFiveUp`][Self::OddOrZeroFiveUp] for
    /// `radix`.
    pub(crate) const fn for_radix(self, radix: u32) -> Self {
        match self {
            Self::OddOrZeroFiveUp => {
                if radix == 2 {
                    Self::Odd
                } else {
                    Self::ZeroFiveUp
                }
            }
            mode => mode,
        }
    }

    /// Reports whether the mode only needs to know whether the
    /// discarded digits were zero.
    pub(crate) const fn is_truncating(self) -> bool {
        !matches!(self, Self::HalfUp | Self::HalfDown | Self::HalfEven)
    }

    /// Reports whether a result that overflows in the direction
    /// of `negative` becomes the largest finite value instead
    /// of an infinity.
    pub(crate) const fn overflows_to_finite(self, negative: bool) -> bool {
        match self {
            Self::Down | Self::Odd | Self::ZeroFiveUp | Self::OddOrZeroFiveUp | Self::None => true,
            Self::Ceiling => negative,
            Self::Floor => !negative,
            _ => false,
        }
    }
}

/// An exceptional condition raised during or after an
/// operation.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Condition(u32);

bitflags! {
    impl Condition: u32 {
        /// Occurs when the result of an operation is not
        /// exact, or when the [OVERFLOW][Condition::OVERFLOW]
        /// or [UNDERFLOW][Condition::UNDERFLOW] conditions
        /// occur.
        const INEXACT = 0x1;
        /// Occurs when the result of an operation is rounded,
        /// even if only zeros were discarded.
        const ROUNDED = 0x2;
        /// Occurs when the result of a conversion or operation
        /// is subnormal (i.e. the adjusted exponent is less
        /// than the minimum allowed exponent before any
        /// rounding).
        const SUBNORMAL = 0x4;
        /// Occurs when the result is inexact and the adjusted
        /// exponent would be smaller (more negative) than the
        /// minimum allowed exponent.
        const UNDERFLOW = 0x8;
        /// Occurs when the adjusted exponent, after rounding,
        /// would be greater than the maximum allowed exponent.
        /// ([INEXACT][Condition::INEXACT] and
        /// [ROUNDED][Condition::ROUNDED] will also be raised.)
        const OVERFLOW = 0x10;
        /// Occurs if the exponent has been modified to fit the
        /// constraints of the context.
        const CLAMPED = 0x20;
        /// Occurs when:
        ///
        /// - An operand to an operation is a signaling NaN.
        /// - An attempt is made to add or subtract infinities
        /// of opposite signs.
        /// - An attempt is made to multiply zero by an
        /// infinity of either sign.
        /// - An attempt is made to divide an infinity by an
        /// infinity, or zero by zero.
        /// - The result would be inexact under
        /// [`Rounding::None`], or cannot be represented
        /// exactly with unlimited precision.
        const INVALID = 0x40;
        /// Occurs when division is attempted with a finite,
        /// non-zero dividend and a divisor with a value of
        /// zero.
        const DIVIDE_BY_ZERO = 0x80;
        /// Occurs when an operand of a simplified arithmetic
        /// operation is rounded before the operation.
        const LOST_DIGITS = 0x100;
    }
}

impl Condition {
    const NAMES: [(Self, &'static str); 9] = [
        (Self::CLAMPED, "Clamped"),
        (Self::DIVIDE_BY_ZERO, "Division_by_zero"),
        (Self::INEXACT, "Inexact"),
        (Self::INVALID, "Invalid_operation"),
        (Self::LOST_DIGITS, "Lost_digits"),
        (Self::OVERFLOW, "Overflow"),
        (Self::ROUNDED, "Rounded"),
        (Self::SUBNORMAL, "Subnormal"),
        (Self::UNDERFLOW, "Underflow"),
    ];

    /// Parses a single condition name as used by decTest
    /// files.
    pub fn try_from_name(s: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(c, _)| *c)
    }
}

impl fmt::Display for Condition {
    /// Writes the conditions as a space separated list of
    /// decTest names, in alphabetical order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (c, name) in Self::NAMES {
            if self.contains(c) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({self})")
    }
}
