macro_rules! const_assert {
    ($($tt:tt)*) => {
        const _: () = ::core::assert!($($tt)*);
    }
}
pub(crate) use const_assert;

/// The number of powers of ten that fit in a `u64`.
const NUM_POW10: usize = 20;

const_assert!(10u64.checked_pow(NUM_POW10 as u32 - 1).is_some());
const_assert!(10u64.checked_pow(NUM_POW10 as u32).is_none());

/// The largest `n` such that `10^n` fits in a `u64`.
pub(crate) const MAX_POW10: u32 = (NUM_POW10 - 1) as u32;

/// Returns the minimum number of bits required to represent
/// `x`.
///
/// It returns 0 for `x == 0`.
pub(crate) const fn bitlen(x: u64) -> u32 {
    u64::BITS - x.leading_zeros()
}

/// Returns 10^n.
///
/// `n` must be at most [`MAX_POW10`].
pub(crate) const fn pow10(n: u32) -> u64 {
    #[allow(
        clippy::indexing_slicing,
        reason = "This is a const initializer, so panicking is okay."
    )]
    const TABLE: [u64; NUM_POW10] = {
        let mut table = [0; NUM_POW10];
        let mut i = 0;
        while i < table.len() {
            table[i] = 10u64.pow(i as u32);
            i += 1;
        }
        table
    };

    debug_assert!(n <= MAX_POW10);

    #[allow(
        clippy::indexing_slicing,
        reason = "Calling code always checks that `n` is in range"
    )]
    TABLE[n as usize]
}

/// Returns the number of decimal digits in `x`.
///
/// `digits(0)` is 1.
pub(crate) const fn digits(mut x: u64) -> u32 {
    // `x|1` cannot change the digit count: it cannot grow the
    // bit length of a non-zero `x`, and the largest integer
    // below any power of ten is odd.
    x |= 1;

    let r = ((bitlen(x) + 1) * 1233) / 4096;
    // `r` is in [0, 19], so `pow10` cannot panic.
    r + (x >= pow10(r)) as u32
}

/// Returns `(q, d, sticky)` where `q = x / 10^n`, `d` is the
/// most significant of the `n` removed digits and `sticky`
/// reports whether any of the other removed digits are
/// non-zero.
///
/// `n` must be non-zero.
pub(crate) const fn split_digits(x: u64, n: u32) -> (u64, u32, bool) {
    debug_assert!(n > 0);

    if n - 1 > MAX_POW10 || pow10(n - 1) > x {
        // Every digit at or above position `n-1` is a leading
        // zero.
        return (0, 0, x != 0);
    }
    let p = pow10(n - 1);
    let rest = x % p;
    let t = x / p;
    ((t / 10), (t % 10) as u32, rest != 0)
}

/// Returns `(q, d, sticky)` for the `n` low bits of `x`. See
/// [`split_digits`].
pub(crate) const fn split_bits(x: u64, n: u32) -> (u64, u32, bool) {
    debug_assert!(n > 0);

    if n > u64::BITS {
        return (0, 0, x != 0);
    }
    let below = n - 1;
    let rest = if below == 0 { 0 } else { x & (u64::MAX >> (u64::BITS - below)) };
    let d = (x >> below) & 1;
    let q = if n == u64::BITS { 0 } else { x >> n };
    (q, d as u32, rest != 0)
}
