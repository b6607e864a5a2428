//! Runs decTest style test cases against a [`RadixHost`].
//!
//! See <https://speleotrove.com/decimal/dectest.html>.

#![cfg(test)]

pub mod decimal;
mod op;
mod parse;

use std::{error, fmt};

use anyhow::{anyhow, Context as _, Result};

pub use self::parse::parse;
use self::{decimal::Dec, op::Op};
use crate::{
    bigfloat::BigFloat,
    ctx::{Condition, Context},
    radix::{RadixHost, RadixMath},
    trap::Trappable,
};

/// A single test case.
#[derive(Clone, Debug)]
pub struct Case<'a> {
    pub ctx: Context,
    pub name: &'a str,
    pub op: Op<'a>,
    pub result: &'a str,
    pub conditions: Condition,
}

impl Case<'_> {
    pub fn run<B: Backend>(&self) -> Result<(), Failure<'_>> {
        self.try_run::<B>()
            .map_err(|err| Failure { case: self, err })
    }

    fn try_run<B: Backend>(&self) -> Result<()> {
        let math = RadixMath::<B>::new();
        let ctx = &self.ctx;
        let (got, flags) = match self.op {
            Op::Abs(x) => math.abs(&B::parse(x)?, ctx),
            Op::Add(x, y) => math.add(&B::parse(x)?, &B::parse(y)?, ctx),
            Op::Apply(x) => math.round_to_precision(&B::parse(x)?, ctx),
            Op::Compare(x, y) => math.compare_with_context(&B::parse(x)?, &B::parse(y)?, ctx),
            Op::Divide(x, y) => math.divide(&B::parse(x)?, &B::parse(y)?, ctx),
            Op::Minus(x) => math.negate(&B::parse(x)?, ctx),
            Op::Multiply(x, y) => math.multiply(&B::parse(x)?, &B::parse(y)?, ctx),
            Op::Subtract(x, y) => math.subtract(&B::parse(x)?, &B::parse(y)?, ctx),
        };
        self.check(&B::format(&got), flags)?;
        self.check_trapping::<B>()
    }

    fn check(&self, got: &str, flags: Condition) -> Result<()> {
        if got != self.result {
            Err(anyhow!("got {got}, expected {}", self.result))
        } else if flags != self.conditions {
            Err(anyhow!(
                "got conditions `{flags}`, expected `{}`",
                self.conditions
            ))
        } else {
            Ok(())
        }
    }

    /// Runs the case again, trapping every expected condition,
    /// and checks that the trap carries the same result.
    fn check_trapping<B: Backend>(&self) -> Result<()> {
        let ctx = self.ctx.with_traps(self.conditions).with_blank_flags();
        let traps = Trappable::<B>::new();
        let r = match self.op {
            Op::Abs(x) => traps.abs(&B::parse(x)?, &ctx),
            Op::Add(x, y) => traps.add(&B::parse(x)?, &B::parse(y)?, &ctx),
            Op::Apply(x) => traps.round_to_precision(&B::parse(x)?, &ctx),
            Op::Compare(x, y) => traps.compare_with_context(&B::parse(x)?, &B::parse(y)?, &ctx),
            Op::Divide(x, y) => traps.divide(&B::parse(x)?, &B::parse(y)?, &ctx),
            Op::Minus(x) => traps.negate(&B::parse(x)?, &ctx),
            Op::Multiply(x, y) => traps.multiply(&B::parse(x)?, &B::parse(y)?, &ctx),
            Op::Subtract(x, y) => traps.subtract(&B::parse(x)?, &B::parse(y)?, &ctx),
        };
        match r {
            Ok(got) if self.conditions.is_empty() => self.check(&B::format(&got), ctx.flags()),
            Ok(got) => Err(anyhow!("expected a trap, got {}", B::format(&got))),
            Err(trap) => {
                if trap.all() != self.conditions {
                    return Err(anyhow!(
                        "trapped `{}`, expected `{}`",
                        trap.all(),
                        self.conditions
                    ));
                }
                self.check(&B::format(trap.result()), ctx.flags())
            }
        }
    }
}

impl fmt::Display for Case<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.name, self.op, self.result)?;
        if !self.conditions.is_empty() {
            write!(f, " {}", self.conditions)?;
        }
        Ok(())
    }
}

/// A test case failure.
pub struct Failure<'a> {
    case: &'a Case<'a>,
    err: anyhow::Error,
}

impl error::Error for Failure<'_> {}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test failure for `{}`: {}", self.case, self.err)
    }
}

impl fmt::Debug for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A number type the test cases can run against.
pub trait Backend: RadixHost {
    fn parse(s: &str) -> Result<Self>;
    fn format(&self) -> String;
}

impl Backend for Dec {
    fn parse(s: &str) -> Result<Self> {
        Dec::parse(s)
    }

    fn format(&self) -> String {
        self.to_string()
    }
}

/// Numbers are written as `[-]mantissa[p exponent]`, for
/// example `-3p-2` for -0.75, or as `#` followed by the 16 hex
/// digits of an IEEE 754 binary64 encoding.
impl Backend for BigFloat {
    fn parse(s: &str) -> Result<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            let bytes = hex::decode(hex)?;
            let bits = u64::from_be_bytes(bytes.as_slice().try_into()?);
            return Ok(BigFloat::from_double_bits(bits));
        }
        if s
            .trim_start_matches(['-', '+'])
            .starts_with(|c: char| c.is_ascii_alphabetic())
        {
            // Specials share the decimal syntax.
            let d = Dec::parse(s)?;
            return Ok(BigFloat::from_parts(
                d.mantissa().clone(),
                d.exponent().clone(),
                d.value_flags(),
            ));
        }
        let (mant, exp) = s.split_once('p').unwrap_or((s, "0"));
        let neg = mant.starts_with('-');
        let mant: num_bigint::BigInt = mant
            .parse()
            .with_context(|| format!("invalid mantissa: `{s}`"))?;
        let exp: num_bigint::BigInt = exp
            .parse()
            .with_context(|| format!("invalid exponent: `{s}`"))?;
        let x = BigFloat::create(mant, exp);
        Ok(if neg && x.is_zero() { -x } else { x })
    }

    fn format(&self) -> String {
        if !self.is_finite() {
            return self.to_string();
        }
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{}p{}", self.unsigned_mantissa(), self.exponent())
    }
}

/// Runs every case in `s`, reporting all failures at once.
fn run<B: Backend>(s: &str) {
    let cases = parse(s).unwrap();
    let failures: Vec<_> = cases
        .iter()
        .filter_map(|case| case.run::<B>().err())
        .map(|err| err.to_string())
        .collect();
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

macro_rules! dectest {
    ($($name:ident => $backend:ty, $file:literal);+ $(;)?) => {
        $(
            #[test]
            fn $name() {
                run::<$backend>(include_str!(concat!("testdata/", $file)));
            }
        )+
    };
}

mod tests {
    use super::*;

    dectest! {
        test_add => Dec, "add.decTest";
        test_subtract => Dec, "subtract.decTest";
        test_multiply => Dec, "multiply.decTest";
        test_divide => Dec, "divide.decTest";
        test_rounding => Dec, "rounding.decTest";
        test_clamp => Dec, "clamp.decTest";
        test_specials => Dec, "specials.decTest";
        test_binary => BigFloat, "binary.decTest";
    }

    #[test]
    fn test_binary_format() {
        let tests = [
            ("3p-2", "3p-2"),
            ("12", "12p0"),
            ("-3p-2", "-3p-2"),
            ("-0p5", "-0p5"),
            ("#3ff0000000000000", "1p0"),
            ("#c008000000000000", "-3p0"),
            ("#0000000000000001", "1p-1074"),
            ("#7ff0000000000000", "Infinity"),
            ("-Inf", "-Infinity"),
            ("sNaN3", "sNaN3"),
        ];
        for (i, (s, want)) in tests.into_iter().enumerate() {
            let got = <BigFloat as Backend>::parse(s).unwrap();
            assert_eq!(got.format(), want, "#{i}: `{s}`");
        }
    }
}
