const SUFFIXES: [(i32, &str); 5] = [(0, ""), (3, "K"), (6, "M"), (9, "B"), (12, "T")];

/// Compact magnitude: `1.23K`, `45M`, `0.25`. Values of at least one keep two
/// decimals of their thousands group with trailing zeros trimmed; exponents past
/// trillions fall back to `e<exp>`.
pub fn format_number(number: f64) -> String {
    if number == 0.0 || !number.is_finite() {
        return "0".to_string();
    }
    if number < 1.0 {
        return format!("{number:.2}");
    }

    let mut exponent = (number.log10() / 3.0).floor() as i32 * 3;
    let mut scaled = trim_decimals(number / 10_f64.powi(exponent));
    // 999.999 rounds up into the next group.
    if scaled.parse::<f64>().is_ok_and(|value| value >= 1000.0) {
        exponent += 3;
        scaled = trim_decimals(number / 10_f64.powi(exponent));
    }

    let suffix = SUFFIXES
        .iter()
        .find(|(group, _)| *group == exponent)
        .map(|(_, suffix)| (*suffix).to_string())
        .unwrap_or_else(|| format!("e{exponent}"));
    format!("{scaled}{suffix}")
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `1h 2m 3s`, dropping empty units. Fractions of a second are truncated.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}
