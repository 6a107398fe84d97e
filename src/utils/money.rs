/// Money helpers.
///
/// All monetary values are stored in integer cents to avoid
/// floating-point precision issues; the API accepts and renders
/// major units (e.g. dollars).

/// Convert a major-unit amount to cents (multiply by 100).
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert cents back to major units.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format cents as a display string with 2 decimal places.
pub fn format_cents(cents: i64, currency: &str) -> String {
    format!("{:.2} {}", from_cents(cents), currency)
}

/// Loyalty points earned for a spend: 1 point per 10 currency units,
/// floor-rounded.
pub fn loyalty_points_for(cents: i64) -> i64 {
    if cents <= 0 {
        return 0;
    }
    cents / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(100.0), 10000);
        assert_eq!(to_cents(0.50), 50);
        assert_eq!(to_cents(123.45), 12345);
        assert_eq!(to_cents(499.99), 49999);
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(from_cents(10000), 100.0);
        assert_eq!(from_cents(50), 0.50);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(12345, "USD"), "123.45 USD");
    }

    #[test]
    fn test_loyalty_points_floor() {
        // 1 point per 10 currency units, floored
        assert_eq!(loyalty_points_for(10000), 10); // 100.00 -> 10 points
        assert_eq!(loyalty_points_for(9999), 9); // 99.99 -> 9 points
        assert_eq!(loyalty_points_for(999), 0); // 9.99 -> 0 points
        assert_eq!(loyalty_points_for(-500), 0);
    }
}
