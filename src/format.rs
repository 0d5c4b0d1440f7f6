//! Display formatting in the Indonesian locale used by the site.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Groups digits with `.` as in `id-ID`, e.g. `1234567` -> `1.234.567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Whole rupiah, e.g. `Rp 100.000`.
pub fn format_rupiah(value: f64) -> String {
    if !value.is_finite() {
        return "Rp 0".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}Rp {}", sign, format_count(rounded.abs() as u64))
}

/// Rupiah with two decimals, for CPM and daily earnings.
pub fn format_rupiah_precise(value: f64) -> String {
    if !value.is_finite() {
        return "Rp 0,00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}Rp {},{:02}", sign, format_count(cents / 100), cents % 100)
}

/// `1 Oktober 2024`
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS[date.month0() as usize], date.year())
}

/// `01 Okt 2024, 09.30`
pub fn format_datetime(ts: DateTime<Utc>) -> String {
    format!(
        "{:02} {} {}, {:02}.{:02}",
        ts.day(),
        SHORT_MONTHS[ts.month0() as usize],
        ts.year(),
        ts.hour(),
        ts.minute()
    )
}
