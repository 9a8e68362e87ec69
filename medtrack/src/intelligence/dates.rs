use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4}|\d{2})-(\d{1,2})-(\d{1,2})$").ok());

/// Sentinel the extraction prompt uses when no date is legible.
const UNKNOWN_DATE: &str = "unknown";

/// Parses a dispensing date as printed on a bag.
///
/// Accepts `2024-03-09`, `2024.03.09`, `24/3/9` and `2024년 3월 9일`. Two-digit
/// years are taken to be in the 2000s.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN_DATE) || raw == "알 수 없음" {
        return None;
    }

    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let mapped = match ch {
            '년' | '월' | '.' | '/' => Some('-'),
            '일' => None,
            c if c.is_whitespace() => None,
            c => Some(c),
        };
        if let Some(c) = mapped {
            if !(c == '-' && cleaned.ends_with('-')) {
                cleaned.push(c);
            }
        }
    }
    let cleaned = cleaned.trim_matches('-');

    let caps = DATE_PATTERN.as_ref()?.captures(cleaned)?;
    let year_text = &caps[1];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}
