use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in balances.
/// 1 unit = 100 cents, so 100000.00 = 10_000_000 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "-100" -> -10000
/// More than two decimal places is rejected rather than truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::OutOfRange)?
    };

    // Pad the fractional part to exactly two digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => decimal_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        2 => decimal_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
        _ => return Err(ParseCentsError::TooManyDecimals),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::OutOfRange)?;
    Ok(if negative { -cents } else { cents })
}

/// Interest on `cents` at `rate_percent` for one period, rounded to the cent.
/// Example: apply_rate(12_000_000, 1.0) -> Some(120_000)
///
/// Returns `None` when the result does not fit in [`Cents`].
pub fn apply_rate(cents: Cents, rate_percent: f64) -> Option<Cents> {
    let interest = (cents as f64 * rate_percent / 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !interest.is_finite() || interest >= i64::MAX as f64 || interest < i64::MIN as f64 {
        return None;
    }
    Some(interest as Cents)
}

/// Split `cents` into `parts` equal shares, rounded half away from zero.
/// `parts` must be positive. A share is never larger in magnitude than `cents`.
pub fn divide_evenly(cents: Cents, parts: i64) -> Cents {
    debug_assert!(parts > 0);
    let parts = i128::from(parts);
    let doubled = 2 * i128::from(cents).abs() + parts;
    let share = doubled / (2 * parts);
    (if cents < 0 { -share } else { share }) as Cents
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooManyDecimals,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooManyDecimals => write!(f, "at most two decimal places"),
            ParseCentsError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
