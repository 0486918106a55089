//! Field converters shared by the GGA and RMC decoders.
//!
//! All of these are pure: the only outside input, the calendar day used to
//! anchor a UTC time of day, comes in through [`DecodeContext`].

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::error::{DecodeError, ReaderError};

/// Kilometres per hour in one knot.
pub const KMH_PER_KNOT: f64 = 1.852;

/// Default local offset from UTC (KST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Minimum length of a `ddmm.mmmm` field (two degree digits plus two minute digits).
const MIN_DMS_LEN: usize = 4;
/// Length of the `hhmmss` and `ddmmyy` fields.
const TIME_DATE_LEN: usize = 6;

/// Inputs to time conversion that do not come from the sentence itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    /// Offset applied to UTC times of day.
    pub offset: FixedOffset,
    /// The UTC calendar day a time of day is assumed to fall on.
    pub today: NaiveDate,
}

impl DecodeContext {
    pub fn new(offset: FixedOffset, today: NaiveDate) -> Self {
        Self { offset, today }
    }

    /// Context anchored to the system clock's current UTC date.
    pub fn now(offset: FixedOffset) -> Self {
        Self::new(offset, Utc::now().date_naive())
    }
}

/// Build a fixed offset from a whole number of hours east of UTC.
pub fn utc_offset(hours: i32) -> crate::Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(ReaderError::InvalidUtcOffset(hours))
}

/// Convert an NMEA `ddmm.mmmm` field and its hemisphere letter to signed
/// decimal degrees, rounded to six decimal places.
///
/// The first two characters are whole degrees and the rest are minutes.
/// `S` and `W` negate the result. Empty, short or malformed input yields
/// [`DecodeError::CoordinateUnavailable`].
pub fn dms_to_decimal(dms: &str, hemisphere: &str) -> Result<f64, DecodeError> {
    if dms.len() < MIN_DMS_LEN {
        return Err(DecodeError::CoordinateUnavailable);
    }
    let (Some(deg), Some(min)) = (dms.get(..2), dms.get(2..)) else {
        return Err(DecodeError::CoordinateUnavailable);
    };
    if !deg.bytes().all(|b| b.is_ascii_digit())
        || !min.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return Err(DecodeError::CoordinateUnavailable);
    }

    let degrees: f64 = deg.parse().map_err(|_| DecodeError::CoordinateUnavailable)?;
    let minutes: f64 = min.parse().map_err(|_| DecodeError::CoordinateUnavailable)?;

    let mut decimal = degrees + minutes / 60.0;
    if hemisphere == "S" || hemisphere == "W" {
        decimal = -decimal;
    }
    Ok(round_to(decimal, 6))
}

/// Convert an `hhmmss` UTC time of day to local time.
///
/// The time is placed on `ctx.today` before the offset is applied, so a
/// sentence sent just before UTC midnight but received after it lands on the
/// wrong day. Returns `Ok(None)` for fields shorter than six characters.
pub fn utc_time_to_local(
    raw: &str,
    ctx: &DecodeContext,
) -> Result<Option<DateTime<FixedOffset>>, DecodeError> {
    if raw.len() < TIME_DATE_LEN {
        return Ok(None);
    }
    let hours = two_digits(raw, 0, "time")?;
    let minutes = two_digits(raw, 2, "time")?;
    let seconds = two_digits(raw, 4, "time")?;

    let utc = ctx
        .today
        .and_hms_opt(hours, minutes, seconds)
        .ok_or_else(|| DecodeError::numeric("time", raw))?;
    Ok(Some(Utc.from_utc_datetime(&utc).with_timezone(&ctx.offset)))
}

/// Convert a `ddmmyy` date field. Years are taken to be in the 2000s.
///
/// Returns `None` (unknown date) for fields shorter than six characters and
/// for dates that do not exist, such as the `000000` sent by receivers that
/// have not yet learned the calendar.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() < TIME_DATE_LEN {
        return None;
    }
    let day = two_digits(raw, 0, "date").ok()?;
    let month = two_digits(raw, 2, "date").ok()?;
    let year = 2000 + two_digits(raw, 4, "date").ok()? as i32;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a plain decimal (`-12.5`, `022.4`) as sent in NMEA numeric fields.
///
/// Only an optional leading minus, digits and a single `.` are accepted, so
/// `inf`, `nan` and exponents are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    raw.parse().ok()
}

pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * KMH_PER_KNOT
}

fn two_digits(raw: &str, at: usize, field: &'static str) -> Result<u32, DecodeError> {
    raw.get(at..at + 2)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DecodeError::numeric(field, raw))
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
