//! Integer power and min/max helpers.

/// `x` raised to `n` by square-and-multiply. Overflow wraps.
pub fn pow(x: i64, n: u32) -> i64 {
    let mut n_result: i64 = 1;
    let mut n_base = x;
    let mut n_exp = n;
    while n_exp != 0 {
        if n_exp % 2 != 0 {
            n_result = n_result.wrapping_mul(n_base);
        }
        n_exp /= 2;
        n_base = n_base.wrapping_mul(n_base);
    }
    n_result
}

pub fn int_max(a: i64, b: i64) -> i64 {
    if a > b { a } else { b }
}

pub fn int_min(a: i64, b: i64) -> i64 {
    if a > b { b } else { a }
}

/// Larger of two floats; returns `b` when the comparison is false (NaN included).
pub fn float_max(a: f64, b: f64) -> f64 {
    if a > b { a } else { b }
}

/// Smaller of two floats; returns `a` when the comparison is false (NaN included).
pub fn float_min(a: f64, b: f64) -> f64 {
    if a > b { b } else { a }
}
