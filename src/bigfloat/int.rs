use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use super::BigFloat;
use crate::{
    conv::ConversionError,
    fastint::FastInt,
    radix::MAX_SHIFT_BITS,
};

impl BigFloat {
    /// Reports whether the number is a finite integer.
    pub fn is_integer(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        if !self.exponent.is_negative() || self.mantissa.is_zero() {
            return true;
        }
        let tz = self.mantissa.big().trailing_zeros().unwrap_or_default();
        self.exponent.neg() <= FastInt::from_u64(tz)
    }

    /// Converts the number to a `BigInt`, truncating any
    /// fractional part.
    ///
    /// It fails if the number is not finite, or if its
    /// exponent exceeds [`MAX_SHIFT_BITS`][crate::MAX_SHIFT_BITS].
    pub fn to_bigint_checked(&self) -> Result<BigInt, ConversionError> {
        self.to_integer(false)
    }

    /// Converts the number to a `BigInt`.
    ///
    /// It fails if the number is not an integer, or if its
    /// exponent exceeds [`MAX_SHIFT_BITS`][crate::MAX_SHIFT_BITS].
    pub fn to_bigint_exact(&self) -> Result<BigInt, ConversionError> {
        self.to_integer(true)
    }

    /// Converts the number to an `i32`, truncating any
    /// fractional part.
    pub fn to_i32_checked(&self) -> Result<i32, ConversionError> {
        self.to_integer(false)?
            .to_i32()
            .ok_or(ConversionError::overflow())
    }

    /// Converts the number to an `i64`, truncating any
    /// fractional part.
    pub fn to_i64_checked(&self) -> Result<i64, ConversionError> {
        self.to_integer(false)?
            .to_i64()
            .ok_or(ConversionError::overflow())
    }

    /// Converts the number to the nearest `f64`.
    ///
    /// It fails if a finite number is too large to represent.
    /// Infinities and NaNs convert as is.
    pub fn to_f64_checked(&self) -> Result<f64, ConversionError> {
        let v = self.to_f64();
        if self.is_finite() && v.is_infinite() {
            Err(ConversionError::overflow())
        } else {
            Ok(v)
        }
    }

    /// Converts the number to the nearest `f32`.
    ///
    /// It fails if a finite number is too large to represent.
    /// Infinities and NaNs convert as is.
    pub fn to_f32_checked(&self) -> Result<f32, ConversionError> {
        let v = self.to_f32();
        if self.is_finite() && v.is_infinite() {
            Err(ConversionError::overflow())
        } else {
            Ok(v)
        }
    }

    fn to_integer(&self, exact: bool) -> Result<BigInt, ConversionError> {
        if !self.is_finite() {
            return Err(ConversionError::not_finite());
        }
        let mant = self.mantissa.big();
        let v = if self.exponent.is_negative() {
            let shift = self.exponent.neg().to_u64().unwrap_or(u64::MAX);
            if exact && !self.is_integer() {
                return Err(ConversionError::not_integer());
            }
            if shift >= mant.bits() {
                BigInt::zero()
            } else {
                mant.as_ref() >> shift
            }
        } else {
            match self.exponent.to_u64() {
                Some(shift) if shift <= MAX_SHIFT_BITS => mant.as_ref() << shift,
                _ if mant.is_zero() => BigInt::zero(),
                _ => return Err(ConversionError::overflow()),
            }
        };
        Ok(if self.is_negative() { -v } else { v })
    }
}
