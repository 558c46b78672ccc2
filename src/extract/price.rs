/// Currency symbols stripped before parsing
const CURRENCY_SYMBOLS: &[char] = &['$', '£', '€'];

/// Parses a displayed price into a number
///
/// Currency symbols and thousands separators are stripped and the rest is
/// parsed as a decimal. Anything unparsable, including an empty string,
/// yields 0.
///
/// # Examples
///
/// ```
/// use scrape_n_serve::extract::parse_price;
///
/// assert_eq!(parse_price("$1,299.50"), 1299.5);
/// assert_eq!(parse_price("Call for price"), 0.0);
/// ```
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
