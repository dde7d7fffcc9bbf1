//! Deadline conversion: admin wall-clock input in a named zone to a UTC
//! instant.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use fob_core::error::DomainError;

/// Accepted format for a full local date and time.
pub const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Accepted format for a time on the current local date.
pub const LOCAL_TIME_FORMAT: &str = "%H:%M";

/// Resolves a zone name to a time zone.
///
/// Accepts IANA names plus the common North American abbreviations, which
/// map to their DST-observing region (`CST` is `America/Chicago`).
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unrecognized zone.
pub fn parse_source_zone(zone: &str) -> Result<Tz, DomainError> {
    let trimmed = zone.trim();
    let alias = match trimmed.to_ascii_uppercase().as_str() {
        "CST" | "CDT" | "CT" => Some(chrono_tz::America::Chicago),
        "EST" | "EDT" | "ET" => Some(chrono_tz::America::New_York),
        "MST" | "MDT" | "MT" => Some(chrono_tz::America::Denver),
        "PST" | "PDT" | "PT" => Some(chrono_tz::America::Los_Angeles),
        "UTC" | "GMT" | "Z" => Some(Tz::UTC),
        _ => None,
    };
    match alias {
        Some(tz) => Ok(tz),
        None => trimmed
            .parse::<Tz>()
            .map_err(|_| DomainError::Validation(format!("unknown time zone: {trimmed}"))),
    }
}

/// Parses `YYYY-MM-DD HH:MM`, or `HH:MM` on today's date in `zone`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the input matches neither format.
pub fn parse_local_time(
    input: &str,
    zone: Tz,
    now: DateTime<Utc>,
) -> Result<NaiveDateTime, DomainError> {
    let input = input.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, LOCAL_DATE_TIME_FORMAT) {
        return Ok(naive);
    }
    if let Ok(time) = NaiveTime::parse_from_str(input, LOCAL_TIME_FORMAT) {
        let today = now.with_timezone(&zone).date_naive();
        return Ok(today.and_time(time));
    }
    Err(DomainError::Validation(format!(
        "invalid deadline {input:?}: expected YYYY-MM-DD HH:MM or HH:MM"
    )))
}

/// Converts a wall-clock time in `zone` to UTC, applying that zone's offset
/// (daylight saving included) on that date. A time repeated by a fall-back
/// transition resolves to its earlier occurrence.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the time was skipped by a
/// spring-forward transition.
pub fn local_to_utc(naive: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>, DomainError> {
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "{naive} does not exist in {zone} (skipped by a daylight-saving change)"
            ))
        })
}

/// Full deadline resolution: zone lookup, parsing, conversion, and the
/// future-instant check.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a bad zone or time, or when the
/// resulting instant is not after `now`.
pub fn resolve_deadline(
    local_time: &str,
    source_zone: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    let zone = parse_source_zone(source_zone)?;
    let naive = parse_local_time(local_time, zone, now)?;
    let deadline = local_to_utc(naive, zone)?;
    if deadline <= now {
        return Err(DomainError::Validation(format!(
            "deadline {} is in the past",
            deadline.to_rfc3339()
        )));
    }
    Ok(deadline)
}
