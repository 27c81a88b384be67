//! Presentation helpers for resolved values.

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// Formats a value in compact notation (`999`, `1.5K`, `2M`, `-3.2B`).
///
/// Below a thousand the rounded integer is followed by `unit`. Larger
/// magnitudes get a K/M/B suffix and one decimal, dropped when the quotient is
/// a whole number. The tier is picked after rounding, so `999.6` is `1K` and
/// `999_950` is `1M`.
pub fn format_compact(value: f64, unit: &str) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let magnitude = value.abs();
    let whole = magnitude.round();
    if whole < THOUSAND {
        let sign = if value < 0.0 && whole > 0.0 { "-" } else { "" };
        return format!("{sign}{whole}{unit}");
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let tiers = [(THOUSAND, "K"), (MILLION, "M"), (BILLION, "B")];
    let mut compact = (magnitude / BILLION, "B");
    for (divisor, suffix) in tiers {
        let quotient = (magnitude / divisor * 10.0).round() / 10.0;
        if quotient < THOUSAND || suffix == "B" {
            compact = (quotient, suffix);
            break;
        }
    }

    let (quotient, suffix) = compact;
    if quotient.fract() == 0.0 {
        format!("{sign}{quotient}{suffix}")
    } else {
        format!("{sign}{quotient:.1}{suffix}")
    }
}

pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_uppercase().as_str() {
        "USD" => Some("$"),
        "INR" => Some("₹"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Formats an amount with a currency symbol, thousands separators and two decimals.
///
/// Unknown currency codes are written as a `CODE ` prefix instead of a symbol.
pub fn format_currency(value: f64, code: &str) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let prefix = currency_symbol(code)
        .map_or_else(|| format!("{} ", code.to_uppercase()), str::to_string);

    format!(
        "{sign}{prefix}{}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
