//! Number helpers.

/// Format with en-US thousands separators.
///
/// The fractional part is rounded to at most three digits and trailing zeros
/// are dropped: `1234567.891` → `"1,234,567.891"`, `1000.5` → `"1,000.5"`.
pub fn format_number(num: f64) -> String {
    if num.is_nan() {
        return "NaN".to_string();
    }
    if num.is_infinite() {
        return if num > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let rounded = format!("{:.3}", num.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    if num < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Format an integer with en-US thousands separators.
pub fn format_integer(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let grouped = group_thousands(&digits);
    if num < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `min(max(value, min), max)`.
///
/// With `min > max` the result is `max`, matching the nested min/max form.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    let lower_bounded = if value < min { min } else { value };
    if lower_bounded > max {
        max
    } else {
        lower_bounded
    }
}
