use core::fmt;

use alloc::string::ToString;
use num_bigint::BigInt;
use num_traits::Pow;

use super::BigFloat;
use crate::{
    conv::{write_sci, write_special},
    fastint::FastInt,
    radix::MAX_SHIFT_BITS,
};

impl fmt::Display for BigFloat {
    /// Writes the exact decimal value of the number in
    /// scientific string form.
    ///
    /// Numbers whose exponent exceeds
    /// [`MAX_SHIFT_BITS`][crate::MAX_SHIFT_BITS] in magnitude are
    /// written as `mantissa p exponent`, for example `-3p5000000`
    /// for `-3 * 2^5000000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_finite() {
            return write_special(
                f,
                self.is_negative(),
                self.is_infinite(),
                self.is_signaling_nan(),
                &self.mantissa,
            );
        }
        if self.exponent.abs() > FastInt::from_u64(MAX_SHIFT_BITS) {
            let sign = if self.is_negative() { "-" } else { "" };
            return write!(f, "{sign}{}p{}", self.mantissa, self.exponent);
        }
        // m * 2^-k = (m * 5^k) * 10^-k
        let (coeff, exp) = if self.exponent.is_negative() {
            let k = self.exponent.neg();
            let five: BigInt = Pow::pow(BigInt::from(5u8), k.big().magnitude());
            (&self.mantissa * FastInt::from_bigint(five), self.exponent.clone())
        } else {
            let k = self.exponent.to_u64().unwrap_or(u64::MAX);
            (self.mantissa.shl(k), FastInt::ZERO)
        };
        write_sci(f, self.is_negative(), &coeff.to_string(), &exp)
    }
}

impl fmt::Debug for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = u8::from(self.is_negative());
        if self.is_nan() {
            let kind = if self.is_signaling_nan() { "sNaN" } else { "qNaN" };
            write!(f, "[{sign},{kind},{}]", self.mantissa)
        } else if self.is_infinite() {
            write!(f, "[{sign},inf]")
        } else {
            write!(f, "[{sign},{},{}]", self.mantissa, self.exponent)
        }
    }
}
