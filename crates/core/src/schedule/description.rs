//! Trip description synthesis.
//!
//! Descriptions are built from the free text of each schedule day. The
//! first day contributes a short header (pairing code, check-in, block out
//! and pay figures); every day then contributes its own section.

use crewcal_domain::{DayRecord, PayFigures};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bblock:\s*(\S+)").expect("BLOCK_REGEX should compile - this is a bug")
});

static CREDIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcredit:\s*(\S+)").expect("CREDIT_REGEX should compile - this is a bug")
});

static VALUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bvalue:\s*(\S+)").expect("VALUE_REGEX should compile - this is a bug")
});

static PAY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpay:\s*(\S+)").expect("PAY_REGEX should compile - this is a bug")
});

static BLOCK_OUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bb(?:lock|lk)\s*out:?\s*(\d{1,2}:?\d{2})")
        .expect("BLOCK_OUT_REGEX should compile - this is a bug")
});

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches([',', ';']).to_string())
        .filter(|value| !value.is_empty())
}

/// Pull `BLOCK:`, `CREDIT:` and `VALUE:` figures out of free text.
///
/// `PAY:` is accepted when no `VALUE:` label is present.
#[must_use]
pub fn extract_pay_figures(text: &str) -> PayFigures {
    PayFigures {
        block: capture(&BLOCK_REGEX, text),
        credit: capture(&CREDIT_REGEX, text),
        value: capture(&VALUE_REGEX, text).or_else(|| capture(&PAY_REGEX, text)),
    }
}

/// Block-out time, normalized to `HH:MM`.
#[must_use]
pub fn extract_block_out(text: &str) -> Option<String> {
    let raw = capture(&BLOCK_OUT_REGEX, text)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let (hours, minutes) = digits.split_at(digits.len() - 2);
    Some(format!("{:0>2}:{minutes}", hours))
}

/// Section heading and body for one day of a trip. `index` is 1-based.
#[must_use]
pub fn day_section(index: u32, day: &DayRecord) -> String {
    let mut section = format!("Day {index} - {}", day.start.format("%a, %b %d"));
    let text = day.description.trim();
    if !text.is_empty() {
        section.push('\n');
        section.push_str(text);
    }
    section
}

/// Header plus first-day section for a freshly opened trip.
#[must_use]
pub fn opening_description(pairing_code: &str, day: &DayRecord, pay: &PayFigures) -> String {
    let block_out = extract_block_out(&day.description);
    let mut out = format!(
        "Pairing: {pairing_code}\nCheck-in: {}\nBlock out: {}\n",
        day.start.format("%H:%M"),
        block_out.as_deref().unwrap_or("-")
    );
    let figures = [("BLOCK", &pay.block), ("CREDIT", &pay.credit), ("VALUE", &pay.value)];
    for (label, figure) in figures {
        if let Some(figure) = figure {
            out.push_str(&format!("{label}: {figure}\n"));
        }
    }
    out.push('\n');
    out.push_str(&day_section(1, day));
    out
}

/// Append a later day's section to an existing description.
pub fn append_day(description: &mut String, index: u32, day: &DayRecord) {
    description.push_str("\n\n");
    description.push_str(&day_section(index, day));
}
