//! Duty-time string conversions.
//!
//! Schedule pages report block and credit as `H:MM`, `HH:MM`, `HHMM` or
//! decimal hours (`12.5`). Stored pairings keep whole minutes.

/// Parse a duty-time string into minutes.
///
/// # Examples
///
/// ```
/// use crewcal_domain::utils::duration::parse_duration_minutes;
///
/// assert_eq!(parse_duration_minutes("12:34"), Some(754));
/// assert_eq!(parse_duration_minutes("0945"), Some(585));
/// assert_eq!(parse_duration_minutes("5.5"), Some(330));
/// assert_eq!(parse_duration_minutes("n/a"), None);
/// ```
#[must_use]
pub fn parse_duration_minutes(raw: &str) -> Option<i64> {
    let value = raw.trim().trim_end_matches(|c: char| c == ',' || c == ';');
    if value.is_empty() {
        return None;
    }

    if let Some((hours, minutes)) = value.split_once(':') {
        let hours: i64 = hours.trim().parse().ok()?;
        let minutes: i64 = minutes.trim().parse().ok()?;
        if !(0..60).contains(&minutes) || hours < 0 {
            return None;
        }
        return hours.checked_mul(60)?.checked_add(minutes);
    }

    if value.contains('.') {
        let hours: f64 = value.parse().ok()?;
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        return Some((hours * 60.0).round() as i64);
    }

    if value.len() >= 3 && value.chars().all(|c| c.is_ascii_digit()) {
        let (hours, minutes) = value.split_at(value.len() - 2);
        let hours: i64 = hours.parse().ok()?;
        let minutes: i64 = minutes.parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        return hours.checked_mul(60)?.checked_add(minutes);
    }

    None
}

/// Render minutes as `H:MM`.
#[must_use]
pub fn format_minutes(total: i64) -> String {
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!("{sign}{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_forms() {
        assert_eq!(parse_duration_minutes("0:45"), Some(45));
        assert_eq!(parse_duration_minutes(" 18:05 "), Some(1085));
        assert_eq!(parse_duration_minutes("3:75"), None);
    }

    #[test]
    fn compact_and_decimal_forms() {
        assert_eq!(parse_duration_minutes("1234"), Some(754));
        assert_eq!(parse_duration_minutes("2.25"), Some(135));
        assert_eq!(parse_duration_minutes("12"), None);
    }

    #[test]
    fn trailing_punctuation_is_ignored() {
        assert_eq!(parse_duration_minutes("6:30,"), Some(390));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("abc"), None);
        assert_eq!(parse_duration_minutes("-1.0"), None);
    }

    #[test]
    fn oversized_figures_are_rejected() {
        assert_eq!(parse_duration_minutes("999999999999999999:00"), None);
        assert_eq!(parse_duration_minutes("99999999999999999900"), None);
        assert_eq!(parse_duration_minutes("153722867280912930:08"), None);
        assert_eq!(parse_duration_minutes("153722867280912930:07"), Some(i64::MAX));
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_minutes(754), "12:34");
        assert_eq!(format_minutes(5), "0:05");
        assert_eq!(format_minutes(-90), "-1:30");
        assert_eq!(format_minutes(i64::MIN), "-153722867280912930:08");
    }
}
