//! Field checks for task input.
//!
//! [`validate_task`] collects every warning and applies the bucket rule: a task
//! needs either a complete schedule (date, from, to) or a time estimate.
//! [`check_update`] stops at the first failing format check and ignores the
//! bucket rule.
//!
//! Empty strings, [`SENTINEL`] and the legacy `"-1"` all mean "not given" and
//! are skipped by the format checks.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::contract::model::{TaskFields, ValidationReport, SENTINEL};

pub const DATE_FORMAT_WARNING: &str = "schedule_date is not in DD/MM/YYYY format.";
pub const FROM_FORMAT_WARNING: &str = "schedule_from is not in valid HH:MM (24-hour) format.";
pub const TO_FORMAT_WARNING: &str = "schedule_to is not in valid HH:MM (24-hour) format.";
pub const ORDER_WARNING: &str = "schedule_to must be later than schedule_from.";
pub const DECIMAL_WARNING: &str = "time_required must be in decimal format without any text.";
pub const BUCKET_WARNING: &str = "WARNING! You either need time required for the task or scheduled date and schedule time. These values are currently missing in your note.";

const LEGACY_SENTINEL: &str = "-1";

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]|0[0-9]|1[0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex")
});

// chrono alone accepts short, signed and space-padded fields.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$").expect("valid date regex"));

/// `true` when the value counts as "not given".
pub fn is_absent(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == SENTINEL || v == LEGACY_SENTINEL
}

/// Strict `DD/MM/YYYY` parse: one or two digit day and month, four digit year.
pub fn parse_schedule_date(value: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}

fn is_valid_date(value: &str) -> bool {
    parse_schedule_date(value).is_some()
}

fn is_valid_time(value: &str) -> bool {
    TIME_RE.is_match(value)
}

fn minutes(value: &str) -> Option<u32> {
    let (h, m) = value.split_once(':')?;
    Some(h.parse::<u32>().ok()? * 60 + m.parse::<u32>().ok()?)
}

/// Decimal literal; `_` is allowed only between two digits (`1_000.5`).
fn is_valid_decimal(value: &str) -> bool {
    if !value.contains('_') {
        return value.parse::<f64>().is_ok();
    }
    let bytes = value.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    grouped && value.replace('_', "").parse::<f64>().is_ok()
}

/// Trimmed value, with the legacy sentinel rewritten to [`SENTINEL`].
fn clean(value: &str) -> String {
    match value.trim() {
        LEGACY_SENTINEL => SENTINEL.to_string(),
        v => v.to_string(),
    }
}

/// Format checks in a fixed order; each failing rule yields its warning.
fn format_failures(fields: &TaskFields) -> impl Iterator<Item = &'static str> {
    let date = fields.schedule_date.trim();
    let from = fields.schedule_from.trim();
    let to = fields.schedule_to.trim();
    let time = fields.time_required.trim();

    let date_bad = !is_absent(date) && !is_valid_date(date);
    let from_ok = !is_absent(from) && is_valid_time(from);
    let to_ok = !is_absent(to) && is_valid_time(to);
    let from_bad = !is_absent(from) && !from_ok;
    let to_bad = !is_absent(to) && !to_ok;
    let order_bad = from_ok && to_ok && minutes(to) <= minutes(from);
    let decimal_bad = !is_absent(time) && !is_valid_decimal(time);

    [
        (date_bad, DATE_FORMAT_WARNING),
        (from_bad, FROM_FORMAT_WARNING),
        (to_bad, TO_FORMAT_WARNING),
        (order_bad, ORDER_WARNING),
        (decimal_bad, DECIMAL_WARNING),
    ]
    .into_iter()
    .filter_map(|(failed, warning)| failed.then_some(warning))
}

/// Run every check and return the warnings with a normalized copy of the input.
pub fn validate_task(fields: &TaskFields) -> ValidationReport {
    let mut warnings: Vec<String> = format_failures(fields).map(str::to_string).collect();

    let mut normalized = fields.clone();
    normalized.schedule_date = clean(&fields.schedule_date);
    normalized.schedule_from = clean(&fields.schedule_from);
    normalized.schedule_to = clean(&fields.schedule_to);
    normalized.time_required = clean(&fields.time_required);

    let has_schedule = [
        &fields.schedule_date,
        &fields.schedule_from,
        &fields.schedule_to,
    ]
    .iter()
    .all(|v| !is_absent(v));
    if !has_schedule {
        normalized.schedule_date = SENTINEL.to_string();
        normalized.schedule_from = SENTINEL.to_string();
        normalized.schedule_to = SENTINEL.to_string();
    }

    if !has_schedule && is_absent(&fields.time_required) {
        warnings.push(BUCKET_WARNING.to_string());
    }

    ValidationReport {
        is_valid: warnings.is_empty(),
        warnings,
        normalized,
    }
}

/// First failing format check, if any.
pub fn check_update(fields: &TaskFields) -> Result<(), &'static str> {
    match format_failures(fields).next() {
        Some(warning) => Err(warning),
        None => Ok(()),
    }
}
