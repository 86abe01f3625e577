//! Numerical stability utilities.
//!
//! Provides safe implementations of the sigmoid-family transforms that are
//! prone to overflow/underflow in naïve form. The guards use explicit cutoffs
//! (`|x| > 20.0`) to keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`, mapping ℝ → (0, 1).
//! - [`safe_log_logistic(x)`]: stable `ln(sigmoid(x)) = -softplus(-x)`,
//!   mapping ℝ → (-∞, 0) without ever forming `sigmoid(x)` itself.
//!
//! # Rationale
//! Discount rates are parameterised as `θ = sigmoid(β)` and raised to
//! powers up to the window length; working with `ln θ` keeps those powers
//! representable when `θ` is near 0 or 1.

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`, which is accurate for
///   large negative `x`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Numerically stable logistic function `sigmoid(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments so it never overflows:
///
/// - `x ≥ 0`: `1 / (1 + exp(-x))`
/// - `x < 0`: `exp(x) / (1 + exp(x))`
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable `ln(sigmoid(x))`.
///
/// Uses the identity `ln(sigmoid(x)) = -softplus(-x)`, so the result stays
/// finite and strictly negative for every finite `x` (down to `x ≈ -∞`,
/// where it tends to `x`).
pub fn safe_log_logistic(x: f64) -> f64 {
    -safe_softplus(-x)
}
