//! Odds format conversion.
//!
//! Every price leaving an adapter is decimal. Providers that quote
//! American moneylines are converted here.

/// Convert an American moneyline to a decimal price.
///
/// Returns `None` for values in the open interval (-100, 100), which are not
/// valid moneylines.
pub fn american_to_decimal(moneyline: f64) -> Option<f64> {
    if !moneyline.is_finite() {
        return None;
    }

    if moneyline >= 100.0 {
        Some(round_price(1.0 + moneyline / 100.0))
    } else if moneyline <= -100.0 {
        Some(round_price(1.0 + 100.0 / moneyline.abs()))
    } else {
        None
    }
}

/// Mean of the given prices, rounded. `None` when empty.
pub fn average_price(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let sum: f64 = prices.iter().sum();
    Some(round_price(sum / prices.len() as f64))
}

/// Round a decimal price to 3 places.
pub fn round_price(price: f64) -> f64 {
    (price * 1000.0).round() / 1000.0
}
