use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::BigFloat;
use crate::{
    ctx::Context,
    fastint::FastInt,
    radix::RadixMath,
    util,
};

/// An IEEE 754 binary interchange format.
#[derive(Copy, Clone, Debug)]
struct Format {
    /// Total width in bits.
    bits: u32,
    /// Width of the trailing significand field.
    frac_bits: u32,
    /// The largest unbiased exponent, which is also the bias.
    emax: i32,
}

impl Format {
    const HALF: Self = Self {
        bits: 16,
        frac_bits: 10,
        emax: 15,
    };
    const SINGLE: Self = Self {
        bits: 32,
        frac_bits: 23,
        emax: 127,
    };
    const DOUBLE: Self = Self {
        bits: 64,
        frac_bits: 52,
        emax: 1023,
    };

    const fn precision(self) -> u32 {
        self.frac_bits + 1
    }

    const fn exp_mask(self) -> u64 {
        (1 << (self.bits - 1 - self.frac_bits)) - 1
    }

    const fn frac_mask(self) -> u64 {
        (1 << self.frac_bits) - 1
    }

    /// The quiet bit of a NaN.
    const fn quiet_bit(self) -> u64 {
        1 << (self.frac_bits - 1)
    }

    const fn emin(self) -> i32 {
        1 - self.emax
    }

    /// The exponent of the smallest subnormal.
    #[allow(clippy::cast_possible_wrap)]
    const fn etiny(self) -> i32 {
        self.emin() - self.frac_bits as i32
    }

    fn context(self) -> Context {
        let ctx = match self.bits {
            16 => Context::BINARY16,
            32 => Context::BINARY32,
            _ => Context::BINARY64,
        };
        debug_assert_eq!(ctx.precision(), &FastInt::from(self.precision()));
        ctx
    }
}

impl BigFloat {
    /// Returns the IEEE 754 binary64 encoding of the number,
    /// rounding half to even.
    pub fn to_double_bits(&self) -> u64 {
        self.to_bits(Format::DOUBLE)
    }

    /// Returns the IEEE 754 binary32 encoding of the number,
    /// rounding half to even.
    pub fn to_single_bits(&self) -> u32 {
        self.to_bits(Format::SINGLE) as u32
    }

    /// Returns the IEEE 754 binary16 encoding of the number,
    /// rounding half to even.
    pub fn to_half_bits(&self) -> u16 {
        self.to_bits(Format::HALF) as u16
    }

    /// Creates a number from its IEEE 754 binary64 encoding.
    pub fn from_double_bits(bits: u64) -> Self {
        Self::from_bits(bits, Format::DOUBLE)
    }

    /// Creates a number from its IEEE 754 binary32 encoding.
    pub fn from_single_bits(bits: u32) -> Self {
        Self::from_bits(u64::from(bits), Format::SINGLE)
    }

    /// Creates a number from its IEEE 754 binary16 encoding.
    pub fn from_half_bits(bits: u16) -> Self {
        Self::from_bits(u64::from(bits), Format::HALF)
    }

    /// Converts the number to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        f64::from_bits(self.to_double_bits())
    }

    /// Converts the number to the nearest `f32`.
    pub fn to_f32(&self) -> f32 {
        f32::from_bits(self.to_single_bits())
    }

    /// Creates a number from an `f64`, exactly.
    pub fn from_f64(v: f64) -> Self {
        Self::from_double_bits(v.to_bits())
    }

    /// Creates a number from an `f32`, exactly.
    pub fn from_f32(v: f32) -> Self {
        Self::from_single_bits(v.to_bits())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn to_bits(&self, fmt: Format) -> u64 {
        let sign = u64::from(self.is_negative()) << (fmt.bits - 1);
        let special = sign | (fmt.exp_mask() << fmt.frac_bits);

        if self.is_nan() {
            // Keep the low-order bits of the payload that fit
            // below the quiet bit.
            let low = self.mantissa.big().as_ref() & BigInt::from(fmt.quiet_bit() - 1);
            let payload = low.to_u64().unwrap_or_default();
            return if self.is_signaling_nan() {
                special | payload.max(1)
            } else {
                special | fmt.quiet_bit() | payload
            };
        }
        if self.is_infinite() {
            return special;
        }

        let (r, _) = RadixMath::new().round_to_precision(self, &fmt.context());
        if r.is_infinite() {
            return special;
        }
        if r.is_zero() {
            return sign;
        }

        // The rounded number fits the format, so both parts are
        // small.
        let (Some(mut m), Some(mut e)) = (r.mantissa.to_u64(), r.exponent.to_i32()) else {
            return special;
        };
        let len = util::bitlen(m);
        let shift = fmt
            .precision()
            .saturating_sub(len)
            .min(e.saturating_sub(fmt.etiny()).unsigned_abs());
        m <<= shift;
        e -= shift as i32;

        if util::bitlen(m) == fmt.precision() {
            let biased = (e + fmt.frac_bits as i32 + fmt.emax).unsigned_abs();
            sign | (u64::from(biased) << fmt.frac_bits) | (m & fmt.frac_mask())
        } else {
            debug_assert_eq!(e, fmt.etiny());
            sign | m
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn from_bits(bits: u64, fmt: Format) -> Self {
        let negative = (bits >> (fmt.bits - 1)) & 1 == 1;
        let frac = bits & fmt.frac_mask();
        let biased = (bits >> fmt.frac_bits) & fmt.exp_mask();

        if biased == fmt.exp_mask() {
            return if frac == 0 {
                if negative {
                    Self::NEG_INFINITY
                } else {
                    Self::INFINITY
                }
            } else if frac & fmt.quiet_bit() != 0 {
                Self::create_nan(frac & (fmt.quiet_bit() - 1), false, negative)
            } else {
                Self::create_nan(frac, true, negative)
            };
        }

        let (m, e) = if biased == 0 {
            (frac, fmt.etiny())
        } else {
            let e = biased as i32 - fmt.emax - fmt.frac_bits as i32;
            (frac | (1 << fmt.frac_bits), e)
        };
        if m == 0 {
            return if negative {
                Self::NEG_ZERO
            } else {
                Self::ZERO
            };
        }
        let tz = m.trailing_zeros();
        let m = FastInt::from_u64(m >> tz);
        let e = FastInt::from_i32(e + tz as i32);
        Self::create(if negative { m.neg() } else { m }, e)
    }
}
