//! A minimal decimal floating point type for exercising the
//! engine in radix 10.

use std::fmt;

use anyhow::{bail, Context as _, Result};
use num_bigint::{BigInt, BigUint};

use crate::{
    accum::DigitShiftAccumulator,
    conv::{write_sci, write_special},
    fastint::FastInt,
    radix::{RadixHost, ValueFlags},
};

/// An arbitrary precision decimal number.
#[derive(Clone, Debug)]
pub struct Dec {
    flags: ValueFlags,
    mant: FastInt,
    exp: FastInt,
}

impl Dec {
    /// Parses a number in decimal string form.
    ///
    /// Accepts `[+-]digits[.digits][E[+-]digits]`,
    /// `Inf`/`Infinity`, `NaN[payload]` and `sNaN[payload]`,
    /// in any case.
    pub fn parse(s: &str) -> Result<Self> {
        let (neg, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let lower = rest.to_ascii_lowercase();
        let sign = ValueFlags::sign(neg);

        if lower == "inf" || lower == "infinity" {
            return Ok(Self::from_parts(
                FastInt::ZERO,
                FastInt::ZERO,
                ValueFlags::INFINITY | sign,
            ));
        }
        if let Some(payload) = lower.strip_prefix("snan") {
            let payload = parse_digits(payload, true)?;
            return Ok(Self::from_parts(
                payload,
                FastInt::ZERO,
                ValueFlags::SIGNALING_NAN | sign,
            ));
        }
        if let Some(payload) = lower.strip_prefix("nan") {
            let payload = parse_digits(payload, true)?;
            return Ok(Self::from_parts(
                payload,
                FastInt::ZERO,
                ValueFlags::QUIET_NAN | sign,
            ));
        }

        let (coeff, exp) = match lower.split_once('e') {
            Some((coeff, exp)) => {
                let exp = exp.strip_prefix('+').unwrap_or(exp);
                let exp: BigInt = exp
                    .parse()
                    .with_context(|| format!("invalid exponent: `{s}`"))?;
                (coeff, exp)
            }
            None => (lower.as_str(), BigInt::default()),
        };
        let (int, frac) = coeff.split_once('.').unwrap_or((coeff, ""));
        if int.is_empty() && frac.is_empty() {
            bail!("missing coefficient: `{s}`");
        }
        let mant = parse_digits(&format!("{int}{frac}"), false)
            .with_context(|| format!("invalid coefficient: `{s}`"))?;
        let exp = FastInt::from_bigint(exp) - FastInt::from_u64(frac.len() as u64);
        Ok(Self::from_parts(mant, exp, sign))
    }
}

fn parse_digits(s: &str, allow_empty: bool) -> Result<FastInt> {
    if s.is_empty() {
        if allow_empty {
            return Ok(FastInt::ZERO);
        }
        bail!("no digits");
    }
    if !s.bytes().all(|c| c.is_ascii_digit()) {
        bail!("invalid digits: `{s}`");
    }
    let v: BigUint = s.parse()?;
    Ok(FastInt::from_biguint(v))
}

impl RadixHost for Dec {
    type Accumulator = DigitShiftAccumulator;

    fn mantissa(&self) -> &FastInt {
        &self.mant
    }

    fn exponent(&self) -> &FastInt {
        &self.exp
    }

    fn value_flags(&self) -> ValueFlags {
        self.flags
    }

    fn from_parts(mantissa: FastInt, exponent: FastInt, flags: ValueFlags) -> Self {
        Self {
            flags,
            mant: mantissa,
            exp: exponent,
        }
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.flags;
        if flags.is_special() {
            return write_special(
                f,
                flags.is_negative(),
                flags.contains(ValueFlags::INFINITY),
                flags.contains(ValueFlags::SIGNALING_NAN),
                &self.mant,
            );
        }
        write_sci(f, flags.is_negative(), &self.mant.to_string(), &self.exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let tests = [
            ("0", "0"),
            ("-0", "-0"),
            ("1.50", "1.50"),
            ("+12", "12"),
            (".5", "0.5"),
            ("5.", "5"),
            ("1e3", "1E+3"),
            ("1.23E-10", "1.23E-10"),
            ("0.000001", "0.000001"),
            ("0.0000001", "1E-7"),
            ("1E+100000000000000000000", "1E+100000000000000000000"),
            ("inf", "Infinity"),
            ("-Infinity", "-Infinity"),
            ("NaN", "NaN"),
            ("-nan42", "-NaN42"),
            ("sNaN7", "sNaN7"),
        ];
        for (i, (s, want)) in tests.into_iter().enumerate() {
            let got = Dec::parse(s).unwrap();
            assert_eq!(got.to_string(), want, "#{i}: `{s}`");
        }
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["", "-", ".", "1e", "1x", "NaNx", "1.2.3", "e5"] {
            assert!(Dec::parse(s).is_err(), "`{s}`");
        }
    }
}
