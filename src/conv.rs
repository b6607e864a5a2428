use core::{
    cmp::Ordering,
    fmt::{self, Write},
};

use crate::fastint::FastInt;

/// Writes a finite number with the decimal coefficient `coeff`
/// and exponent `exp` in scientific string form.
///
/// The number is written in plain notation if the exponent is
/// not positive and the adjusted exponent is at least -6.
/// Otherwise it is written in exponential form with one digit
/// before the point.
///
/// See <https://speleotrove.com/decimal/daconvs.html#reftostr>.
pub(crate) fn write_sci<W: Write>(
    w: &mut W,
    negative: bool,
    coeff: &str,
    exp: &FastInt,
) -> fmt::Result {
    debug_assert!(!coeff.is_empty());
    debug_assert!(coeff.bytes().all(|c| c.is_ascii_digit()));

    if negative {
        w.write_char('-')?;
    }

    let n = coeff.len();
    let adjusted = exp + FastInt::from_u64(u64::try_from(n).unwrap_or(u64::MAX)).add_int(-1);

    if exp.signum() <= 0 && adjusted.cmp_int(-6) != Ordering::Less {
        // `exp` is in [-(n+5), 0], so it fits.
        let point = exp
            .neg()
            .to_u64()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or_default();
        if point == 0 {
            return w.write_str(coeff);
        }
        if point < n {
            let (int, frac) = coeff.split_at(n - point);
            return write!(w, "{int}.{frac}");
        }
        w.write_str("0.")?;
        for _ in n..point {
            w.write_char('0')?;
        }
        return w.write_str(coeff);
    }

    // Exponential form
    let (first, rest) = coeff.split_at(1);
    w.write_str(first)?;
    if !rest.is_empty() {
        w.write_char('.')?;
        w.write_str(rest)?;
    }
    let sign = if adjusted.is_negative() { "" } else { "+" };
    write!(w, "E{sign}{adjusted}")
}

/// Writes an infinity or a NaN with the given payload.
pub(crate) fn write_special<W: Write>(
    w: &mut W,
    negative: bool,
    infinite: bool,
    signaling: bool,
    payload: &FastInt,
) -> fmt::Result {
    if negative {
        w.write_char('-')?;
    }
    if infinite {
        return w.write_str("Infinity");
    }
    if signaling {
        w.write_char('s')?;
    }
    w.write_str("NaN")?;
    if !payload.is_zero() {
        write!(w, "{payload}")?;
    }
    Ok(())
}

/// An error returned by a checked conversion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConversionError {
    kind: ConversionErrorKind,
}

impl ConversionError {
    pub(crate) const fn overflow() -> Self {
        Self {
            kind: ConversionErrorKind::Overflow,
        }
    }

    pub(crate) const fn not_finite() -> Self {
        Self {
            kind: ConversionErrorKind::NotFinite,
        }
    }

    pub(crate) const fn not_integer() -> Self {
        Self {
            kind: ConversionErrorKind::NotInteger,
        }
    }

    /// Returns the reason the conversion failed.
    pub const fn kind(&self) -> ConversionErrorKind {
        self.kind
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConversionError {}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// The reason a checked conversion failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ConversionErrorKind {
    /// The value is out of range for the target type.
    Overflow,
    /// The value is an infinity or a NaN.
    NotFinite,
    /// The value has a fractional part.
    NotInteger,
}

impl fmt::Display for ConversionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "value out of range for the target type"),
            Self::NotFinite => write!(f, "value is not finite"),
            Self::NotInteger => write!(f, "value is not an integer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sci(coeff: &str, exp: i64) -> String {
        let mut s = String::new();
        write_sci(&mut s, false, coeff, &FastInt::from_i64(exp)).unwrap();
        s
    }

    #[test]
    fn test_write_sci() {
        // https://speleotrove.com/decimal/daconvs.html#reftostr
        let tests = [
            ("123", 0, "123"),
            ("123", 1, "1.23E+3"),
            ("123", 3, "1.23E+5"),
            ("123", -1, "12.3"),
            ("123", -5, "0.00123"),
            ("123", -10, "1.23E-8"),
            ("5", -6, "0.000005"),
            ("50", -7, "0.0000050"),
            ("5", -7, "5E-7"),
            ("0", 0, "0"),
            ("0", 2, "0E+2"),
            ("0", -6, "0.000000"),
            ("0", -7, "0E-7"),
            ("1", 1, "1E+1"),
            ("12345", -2, "123.45"),
        ];
        for (i, (coeff, exp, want)) in tests.into_iter().enumerate() {
            let got = sci(coeff, exp);
            assert_eq!(got, want, "#{i}: {coeff}E{exp}");
        }
    }

    #[test]
    fn test_write_sci_big_exponent() {
        let exp = FastInt::from_i64(1 << 40);
        let mut s = String::new();
        write_sci(&mut s, true, "25", &exp).unwrap();
        assert_eq!(s, "-2.5E+1099511627777");
    }

    #[test]
    fn test_write_special() {
        let tests = [
            (false, true, false, 0, "Infinity"),
            (true, true, false, 0, "-Infinity"),
            (false, false, false, 0, "NaN"),
            (false, false, true, 0, "sNaN"),
            (true, false, false, 123, "-NaN123"),
            (false, false, true, 45, "sNaN45"),
        ];
        for (i, (neg, inf, snan, payload, want)) in tests.into_iter().enumerate() {
            let mut got = String::new();
            write_special(&mut got, neg, inf, snan, &FastInt::from_i32(payload)).unwrap();
            assert_eq!(got, want, "#{i}");
        }
    }

    #[test]
    fn test_conversion_error() {
        assert_eq!(
            ConversionError::overflow().kind(),
            ConversionErrorKind::Overflow
        );
        assert_eq!(
            ConversionError::not_integer().to_string(),
            "value is not an integer"
        );
    }
}
