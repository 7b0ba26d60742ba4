//! Display formatting for dashboard values

/// Placeholder shown when a ratio has no denominator
pub const PLACEHOLDER: &str = "-";

/// Group digits in threes with `,`: 1234567 → "1,234,567"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn format_signed(n: i64) -> String {
    if n < 0 {
        format!("-{}", format_number(n.unsigned_abs()))
    } else {
        format_number(n as u64)
    }
}

/// Revenue in whole thousands, truncated toward zero: 1234567.8 → "1,234k"
pub fn format_revenue(revenue: f64) -> String {
    format!("{}k", format_signed((revenue / 1000.0).trunc() as i64))
}

/// Two-decimal amount with thousand separators: 1234.567 → "1,234.57"
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let int_value: u64 = int_part.parse().unwrap_or(0);
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, format_number(int_value), frac_part)
}

/// Ratio as a two-decimal percentage: 0.5 → "50.00%"
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// `numerator / denominator` rendered by `render`, or the placeholder when the denominator is 0
pub fn ratio_or_placeholder(
    numerator: f64,
    denominator: u64,
    render: impl Fn(f64) -> String,
) -> String {
    if denominator == 0 {
        PLACEHOLDER.to_string()
    } else {
        render(numerator / denominator as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_revenue_truncates_to_thousands() {
        assert_eq!(format_revenue(0.0), "0k");
        assert_eq!(format_revenue(110.0), "0k");
        assert_eq!(format_revenue(999.99), "0k");
        assert_eq!(format_revenue(1000.0), "1k");
        assert_eq!(format_revenue(1_234_567.8), "1,234k");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(110.0), "110.00");
        assert_eq!(format_amount(1234.567), "1,234.57");
        assert_eq!(format_amount(0.004), "0.00");
        assert_eq!(format_amount(-2500.5), "-2,500.50");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_percent(0.98765), "98.77%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn test_ratio_or_placeholder() {
        assert_eq!(ratio_or_placeholder(10.0, 0, format_amount), "-");
        assert_eq!(ratio_or_placeholder(10.0, 4, format_amount), "2.50");
    }
}
