use chrono::{DateTime, Utc};

pub fn remove_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url[..url.len() - 1].to_string()
    } else {
        url.to_string()
    }
}

/// Fixed-decimal amount with thousands separators: `1234.5` → `1,234.50`.
pub fn format_money(amount: f64, decimals: usize) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Chart label in thousands: `1260.0` → `1.3k`.
pub fn format_thousands(amount: f64) -> String {
    format!("{:.1}k", amount / 1000.0)
}

/// Display form of an order timestamp: `05 Mar 2024, 02:30 PM`.
pub fn format_created_at(ts: &DateTime<Utc>) -> String {
    ts.format("%d %b %Y, %I:%M %p").to_string()
}
