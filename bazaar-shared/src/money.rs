/// Tolerance for comparing currency amounts that went through float arithmetic.
pub const MONEY_EPSILON: f64 = 0.01;

/// Compare two currency amounts within [`MONEY_EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= MONEY_EPSILON
}

/// Round a currency amount to two decimal places.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
