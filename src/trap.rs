//! Trap policy.

use core::fmt;

use crate::{
    ctx::{Condition, Context},
    radix::{RadixHost, RadixMath},
};

/// The result of an operation that may trap.
pub type TrapResult<T> = Result<T, Trap<T>>;

/// A trapped condition.
///
/// Returned when an operation raises a condition that its
/// context traps. The error carries the result the operation
/// would have produced had nothing been trapped.
#[derive(Clone, Debug)]
pub struct Trap<T> {
    primary: Condition,
    all: Condition,
    context: Context,
    result: T,
}

impl<T> Trap<T> {
    pub(crate) fn new(primary: Condition, all: Condition, context: Context, result: T) -> Self {
        debug_assert!(all.contains(primary));
        Self {
            primary,
            all,
            context,
            result,
        }
    }

    /// Returns the condition that caused the trap.
    pub const fn primary(&self) -> Condition {
        self.primary
    }

    /// Returns every condition the operation raised, trapped or
    /// not.
    pub const fn all(&self) -> Condition {
        self.all
    }

    /// Returns a snapshot of the context at the time of the
    /// trap.
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the untrapped result of the operation.
    pub const fn result(&self) -> &T {
        &self.result
    }

    /// Consumes the trap, returning the untrapped result.
    pub fn into_result(self) -> T {
        self.result
    }
}

impl<T> fmt::Display for Trap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trapped {} (conditions: {})", self.primary, self.all)
    }
}

#[cfg(feature = "std")]
impl<T: fmt::Debug> std::error::Error for Trap<T> {}

/// Applies a context's trap policy around [`RadixMath`].
///
/// Each operation runs on a non-trapping copy of the context,
/// then records the raised conditions in the caller's context
/// and escalates any that it traps.
pub struct Trappable<H> {
    math: RadixMath<H>,
}

impl<H> Trappable<H> {
    /// Creates the decorator.
    pub const fn new() -> Self {
        Self {
            math: RadixMath::new(),
        }
    }
}

impl<H> Copy for Trappable<H> {}
impl<H> Clone for Trappable<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Default for Trappable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Trappable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trappable").field("math", &self.math).finish()
    }
}

impl<H: RadixHost> Trappable<H> {
    fn run<F>(&self, ctx: &Context, op: F) -> TrapResult<H>
    where
        F: FnOnce(&RadixMath<H>, &Context) -> (H, Condition),
    {
        let (result, flags) = op(&self.math, &ctx.non_trapping());
        ctx.trigger_traps(result, flags)
    }

    /// See [`RadixMath::round_to_precision`].
    pub fn round_to_precision(&self, x: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.round_to_precision(x, c))
    }

    /// See [`RadixMath::negate`].
    pub fn negate(&self, x: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.negate(x, c))
    }

    /// See [`RadixMath::abs`].
    pub fn abs(&self, x: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.abs(x, c))
    }

    /// See [`RadixMath::add`].
    pub fn add(&self, x: &H, y: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.add(x, y, c))
    }

    /// See [`RadixMath::subtract`].
    pub fn subtract(&self, x: &H, y: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.subtract(x, y, c))
    }

    /// See [`RadixMath::multiply`].
    pub fn multiply(&self, x: &H, y: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.multiply(x, y, c))
    }

    /// See [`RadixMath::divide`].
    pub fn divide(&self, x: &H, y: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.divide(x, y, c))
    }

    /// See [`RadixMath::compare_with_context`].
    pub fn compare_with_context(&self, x: &H, y: &H, ctx: &Context) -> TrapResult<H> {
        self.run(ctx, |m, c| m.compare_with_context(x, y, c))
    }
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};

    use super::*;
    use crate::bigfloat::BigFloat;

    const ALL: [Condition; 9] = [
        Condition::INEXACT,
        Condition::ROUNDED,
        Condition::SUBNORMAL,
        Condition::UNDERFLOW,
        Condition::OVERFLOW,
        Condition::CLAMPED,
        Condition::INVALID,
        Condition::DIVIDE_BY_ZERO,
        Condition::LOST_DIGITS,
    ];

    #[test]
    fn test_untrapped_flags() {
        let t = Trappable::<BigFloat>::new();
        let ctx = Context::BINARY64.with_blank_flags();
        let got = t.divide(&BigFloat::ONE, &BigFloat::from_i32(3), &ctx).unwrap();
        assert!(got.is_finite());
        assert_eq!(ctx.flags(), Condition::INEXACT | Condition::ROUNDED);

        let got = t.divide(&BigFloat::ONE, &BigFloat::ZERO, &ctx).unwrap();
        assert_eq!(got, BigFloat::INFINITY);
        assert_eq!(
            ctx.flags(),
            Condition::INEXACT | Condition::ROUNDED | Condition::DIVIDE_BY_ZERO
        );
    }

    #[test]
    fn test_trapped() {
        let t = Trappable::<BigFloat>::new();
        let ctx = Context::BINARY64
            .with_traps(Condition::DIVIDE_BY_ZERO)
            .with_blank_flags();
        // Only Inexact and Rounded: not trapped.
        assert!(t.divide(&BigFloat::ONE, &BigFloat::from_i32(3), &ctx).is_ok());
        ctx.set_flags(Condition::empty()).unwrap();

        let err = t.divide(&BigFloat::ONE, &BigFloat::ZERO, &ctx).unwrap_err();
        assert_eq!(err.primary(), Condition::DIVIDE_BY_ZERO);
        assert_eq!(err.all(), Condition::DIVIDE_BY_ZERO);
        assert_eq!(err.result(), &BigFloat::INFINITY);
        assert_eq!(ctx.flags(), Condition::DIVIDE_BY_ZERO);
        assert_eq!(
            err.to_string(),
            "trapped Division_by_zero (conditions: Division_by_zero)"
        );
        assert_eq!(err.into_result(), BigFloat::INFINITY);
    }

    #[test]
    fn test_trap_without_flags() {
        let t = Trappable::<BigFloat>::new();
        let ctx = Context::BINARY32.with_traps(Condition::INEXACT);
        let err = t
            .add(&BigFloat::ONE, &BigFloat::create(1, -30), &ctx)
            .unwrap_err();
        assert_eq!(err.primary(), Condition::INEXACT);
        assert_eq!(err.all(), Condition::INEXACT | Condition::ROUNDED);
        assert_eq!(err.result(), &BigFloat::ONE);
        assert!(!ctx.has_flags());
    }

    #[test]
    fn test_trap_random() {
        // Traps fire iff a raised condition is trapped; otherwise
        // the raised conditions are recorded.
        let t = Trappable::<BigFloat>::new();
        let mut rng = thread_rng();
        for _ in 0..500 {
            let traps = ALL
                .iter()
                .filter(|_| rng.gen_bool(0.3))
                .fold(Condition::empty(), |acc, c| acc | *c);
            let x = BigFloat::create(rng.gen_range(-1000i64..1000), rng.gen_range(-1100..1100));
            let y = BigFloat::create(rng.gen_range(-1000i64..1000), rng.gen_range(-1100..1100));
            let base = Context::BINARY64.with_blank_flags();
            let (want, raised) = RadixMath::new().divide(&x, &y, &base);

            let ctx = base.with_traps(traps).with_blank_flags();
            match t.divide(&x, &y, &ctx) {
                Ok(got) => {
                    assert!((traps & raised).is_empty(), "{x} / {y}");
                    assert_eq!(got.compare_to_total(&want), core::cmp::Ordering::Equal);
                }
                Err(err) => {
                    assert!(!(traps & raised).is_empty(), "{x} / {y}");
                    assert!((traps & raised).contains(err.primary()));
                    assert_eq!(err.all(), raised);
                }
            }
            assert_eq!(ctx.flags(), raised, "{x} / {y}");
        }
    }
}
