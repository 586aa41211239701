//! Present-value helpers for yearly cash-flow series

/// Discount factor for period `t` at `rate`
pub fn discount_factor(rate: f64, t: usize) -> f64 {
    1.0 / (1.0 + rate).powi(t as i32)
}

/// Net present value of `cashflows` at `rate`
///
/// Entry `t` is discounted by `(1 + rate)^t`, so index 0 is undiscounted.
/// An empty series is worth 0.
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Derivative of [`npv`] with respect to the rate
pub fn npv_derivative(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, &cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// NPV and its derivative in one pass
pub fn npv_and_derivative(rate: f64, cashflows: &[f64]) -> (f64, f64) {
    let mut value = 0.0;
    let mut slope = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        value += cf / discount;
        if t > 0 {
            slope -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (value, slope)
}
