//! `bigfp` is a pure Rust, no-std implementation of arbitrary
//! precision binary floating point numbers.
//!
//! # Features
//!
//! - [`BigFloat`]: a binary floating point number with an
//!   unbounded significand and exponent, infinities and quiet
//!   and signaling NaNs with payloads.
//!
//! - [`Context`]: the precision, rounding mode, exponent range
//!   and trap policy an operation runs under. Presets cover the
//!   IEEE 754 binary and decimal interchange formats.
//!
//! - [`RadixMath`]: the rounding engine, generic over any
//!   floating point type that implements [`RadixHost`].
//!
//! - [`Trappable`]: turns trapped [`Condition`]s into [`Trap`]
//!   errors.
//!
//! - [`FastInt`] and the [`ShiftAccumulator`]s: the integer and
//!   digit-removal primitives the engine is built on.
//!
//! # Cargo Features
//!
//! - `std`: Include [`std`] support. Implements
//!   [`std::error::Error`] for the error types. Enabled by
//!   default.
//!
//! - `tracing`: Emit [`tracing`] events when a condition is
//!   trapped, when an operation overflows and when an operation
//!   is refused for exceeding [`MAX_SHIFT_BITS`].
//!
//! [`std`]: https://doc.rust-lang.org/std/
//! [`tracing`]: https://crates.io/crates/tracing

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(any(feature = "std", test)), deny(clippy::std_instead_of_core))]
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(clippy::alloc_instead_of_core)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::cast_precision_loss)]
#![deny(clippy::cast_sign_loss)]
#![deny(clippy::expect_used)]
#![deny(clippy::implicit_saturating_sub)]
#![deny(clippy::indexing_slicing)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::panic)]
#![deny(clippy::ptr_as_ptr)]
#![deny(clippy::string_slice)]
#![deny(clippy::undocumented_unsafe_blocks)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unused_lifetimes)]
#![warn(unused_qualifications)]
#![forbid(unsafe_code)]

extern crate alloc;

mod accum;
mod bigfloat;
mod conv;
mod ctx;
#[cfg(test)]
mod dectest;
mod fastint;
mod macros;
mod radix;
mod trap;
mod util;

pub use accum::{BitShiftAccumulator, DigitShiftAccumulator, ShiftAccumulator};
pub use bigfloat::BigFloat;
pub use conv::{ConversionError, ConversionErrorKind};
pub use ctx::{Condition, Context, ContextError, Rounding};
pub use fastint::FastInt;
pub use radix::{RadixHost, RadixMath, ValueFlags, MAX_SHIFT_BITS};
pub use trap::{Trap, TrapResult, Trappable};

/// Simplifies importing common items.
pub mod prelude {
    pub use super::{BigFloat, Condition, Context, Rounding};
}
