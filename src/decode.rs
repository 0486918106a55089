use std::fmt;

use crate::convert::{self, DecodeContext};
use crate::error::DecodeError;
use crate::fix::{Fix, NoSignal};
use crate::sentence::SentenceType;

/// RMC status letter for an active (valid) fix.
const RMC_STATUS_ACTIVE: &str = "A";

/// The result of decoding one framed sentence. Every sentence produces
/// exactly one outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Coordinates decoded. Check `Fix::valid` for the receiver's own status.
    Fix(Fix),
    /// The sentence was well-formed but carried no usable coordinates.
    NoSignal(NoSignal),
    Failure(DecodeFailure),
}

/// A sentence that could not be decoded, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub reason: DecodeError,
    pub sentence: String,
}

impl DecodeOutcome {
    fn failure(reason: DecodeError, sentence: &str) -> Self {
        Self::Failure(DecodeFailure {
            reason,
            sentence: sentence.to_string(),
        })
    }

    /// Returns `true` for a fix the receiver reports as valid.
    pub fn is_valid_fix(&self) -> bool {
        matches!(self, Self::Fix(fix) if fix.valid)
    }
}

/// Classify a complete sentence and run the matching decoder.
pub fn decode_sentence(sentence: &str, ctx: &DecodeContext) -> DecodeOutcome {
    let sentence = sentence.trim();
    match SentenceType::classify(sentence) {
        SentenceType::Gga => decode_gga(sentence, ctx),
        SentenceType::Rmc => decode_rmc(sentence, ctx),
        SentenceType::Unsupported => {
            DecodeOutcome::failure(DecodeError::UnsupportedSentenceType, sentence)
        }
    }
}

/// Decode a `$GPGGA`/`$GNGGA` sentence.
///
/// Fields: 1 = UTC time, 2/3 = latitude and hemisphere, 4/5 = longitude and
/// hemisphere, 9 = altitude in meters.
pub fn decode_gga(sentence: &str, ctx: &DecodeContext) -> DecodeOutcome {
    let parts: Vec<&str> = sentence.split(',').collect();
    if let Err(reason) = check_field_count(SentenceType::Gga, &parts) {
        return DecodeOutcome::failure(reason, sentence);
    }

    let (Ok(latitude), Ok(longitude)) = (
        convert::dms_to_decimal(parts[2], parts[3]),
        convert::dms_to_decimal(parts[4], parts[5]),
    ) else {
        return DecodeOutcome::NoSignal(NoSignal {
            sentence: SentenceType::Gga,
            raw_latitude: parts[2].to_string(),
            raw_longitude: parts[4].to_string(),
            raw_altitude: Some(parts[9].to_string()),
        });
    };

    match gga_fix(&parts, latitude, longitude, ctx) {
        Ok(fix) => DecodeOutcome::Fix(fix),
        Err(reason) => DecodeOutcome::failure(reason, sentence),
    }
}

fn gga_fix(
    parts: &[&str],
    latitude: f64,
    longitude: f64,
    ctx: &DecodeContext,
) -> Result<Fix, DecodeError> {
    Ok(Fix {
        sentence: SentenceType::Gga,
        latitude,
        longitude,
        altitude: parse_optional(parts[9], "altitude")?,
        speed_kmh: None,
        time: convert::utc_time_to_local(parts[1], ctx)?,
        date: None,
        valid: true,
    })
}

/// Decode a `$GPRMC`/`$GNRMC` sentence.
///
/// Fields: 1 = UTC time, 2 = status, 3/4 = latitude and hemisphere, 5/6 =
/// longitude and hemisphere, 7 = speed in knots, 9 = UTC date (`ddmmyy`).
pub fn decode_rmc(sentence: &str, ctx: &DecodeContext) -> DecodeOutcome {
    let parts: Vec<&str> = sentence.split(',').collect();
    if let Err(reason) = check_field_count(SentenceType::Rmc, &parts) {
        return DecodeOutcome::failure(reason, sentence);
    }

    let (Ok(latitude), Ok(longitude)) = (
        convert::dms_to_decimal(parts[3], parts[4]),
        convert::dms_to_decimal(parts[5], parts[6]),
    ) else {
        return DecodeOutcome::NoSignal(NoSignal {
            sentence: SentenceType::Rmc,
            raw_latitude: parts[3].to_string(),
            raw_longitude: parts[5].to_string(),
            raw_altitude: None,
        });
    };

    match rmc_fix(&parts, latitude, longitude, ctx) {
        Ok(fix) => DecodeOutcome::Fix(fix),
        Err(reason) => DecodeOutcome::failure(reason, sentence),
    }
}

fn rmc_fix(
    parts: &[&str],
    latitude: f64,
    longitude: f64,
    ctx: &DecodeContext,
) -> Result<Fix, DecodeError> {
    let knots = convert::parse_decimal(parts[7])
        .ok_or_else(|| DecodeError::numeric("speed", parts[7]))?;
    Ok(Fix {
        sentence: SentenceType::Rmc,
        latitude,
        longitude,
        altitude: None,
        speed_kmh: Some(convert::knots_to_kmh(knots)),
        time: convert::utc_time_to_local(parts[1], ctx)?,
        date: convert::parse_date(parts[9]),
        valid: parts[2] == RMC_STATUS_ACTIVE,
    })
}

fn check_field_count(kind: SentenceType, parts: &[&str]) -> Result<(), DecodeError> {
    let required = kind.required_fields();
    if parts.len() < required {
        return Err(DecodeError::InsufficientFields {
            kind,
            found: parts.len(),
            required,
        });
    }
    Ok(())
}

/// Parse a numeric field that may be left empty by the receiver.
fn parse_optional(raw: &str, field: &'static str) -> Result<Option<f64>, DecodeError> {
    if raw.is_empty() {
        return Ok(None);
    }
    convert::parse_decimal(raw)
        .map(Some)
        .ok_or_else(|| DecodeError::numeric(field, raw))
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DecodeError::UnsupportedSentenceType => {
                write!(f, "지원되지 않는 문장 유형: {}", self.sentence)
            }
            DecodeError::InsufficientFields { kind, .. } => {
                write!(f, "유효하지 않은 GP{kind} 문장입니다: {}", self.sentence)
            }
            reason => write!(f, "데이터 변환 오류: {reason}: {}", self.sentence),
        }
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fix(fix) => write!(f, "{fix}"),
            Self::NoSignal(no_signal) => write!(f, "{no_signal}"),
            Self::Failure(failure) => write!(f, "{failure}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::*;
    use crate::convert::utc_offset;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn ctx() -> DecodeContext {
        DecodeContext::new(
            utc_offset(9).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        )
    }

    fn expect_fix(outcome: DecodeOutcome) -> Fix {
        match outcome {
            DecodeOutcome::Fix(fix) => fix,
            other => panic!("expected fix, got {other:?}"),
        }
    }

    fn expect_failure(outcome: DecodeOutcome) -> DecodeFailure {
        match outcome {
            DecodeOutcome::Failure(failure) => failure,
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_gga() {
        let fix = expect_fix(decode_sentence(GGA, &ctx()));
        assert_eq!(fix.sentence, SentenceType::Gga);
        assert!((fix.latitude - 48.1173).abs() < 1e-9);
        // Degrees are the first two characters, so "01131.000" is 01° 131.000'.
        assert!((fix.longitude - 3.183333).abs() < 1e-9);
        assert_eq!(fix.altitude, Some(545.4));
        assert_eq!(fix.speed_kmh, None);
        assert_eq!(fix.date, None);
        assert!(fix.valid);
        let time = fix.time.unwrap();
        assert_eq!((time.hour(), time.minute(), time.second()), (21, 35, 19));
    }

    #[test]
    fn test_decode_gn_talker() {
        let sentence = GGA.replacen("$GPGGA", "$GNGGA", 1);
        let fix = expect_fix(decode_sentence(&sentence, &ctx()));
        assert_eq!(fix.sentence, SentenceType::Gga);
    }

    #[test]
    fn test_decode_gga_southern_western() {
        let sentence = "$GPGGA,000000,3746.123,S,1230.000,W,1,08,0.9,12.0,M,46.9,M,,*47";
        let fix = expect_fix(decode_gga(sentence, &ctx()));
        assert!((fix.latitude + 37.768717).abs() < 1e-9);
        assert!((fix.longitude + 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_decode_gga_insufficient_fields() {
        let sentence = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert_eq!(
            failure.reason,
            DecodeError::InsufficientFields {
                kind: SentenceType::Gga,
                found: 13,
                required: 14,
            }
        );
        assert_eq!(failure.sentence, sentence);
    }

    #[test]
    fn test_decode_gga_no_signal() {
        let sentence = "$GPGGA,123519,,,,,0,00,99.99,,,,,,*48";
        match decode_sentence(sentence, &ctx()) {
            DecodeOutcome::NoSignal(no_signal) => {
                assert_eq!(no_signal.sentence, SentenceType::Gga);
                assert_eq!(no_signal.raw_latitude, "");
                assert_eq!(no_signal.raw_altitude.as_deref(), Some(""));
            }
            other => panic!("expected no signal, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_gga_one_coordinate_missing() {
        let sentence = "$GPGGA,123519,4807.038,N,,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(matches!(
            decode_sentence(sentence, &ctx()),
            DecodeOutcome::NoSignal(_)
        ));
    }

    #[test]
    fn test_decode_gga_bad_altitude() {
        let sentence = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,5x5.4,M,46.9,M,,*47";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert_eq!(failure.reason, DecodeError::numeric("altitude", "5x5.4"));
    }

    #[test]
    fn test_decode_gga_empty_altitude() {
        let sentence = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,,M,46.9,M,,*47";
        let fix = expect_fix(decode_sentence(sentence, &ctx()));
        assert_eq!(fix.altitude, None);
    }

    #[test]
    fn test_decode_gga_bad_time() {
        let sentence = "$GPGGA,1x3519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert!(matches!(
            failure.reason,
            DecodeError::NumericConversion { field: "time", .. }
        ));
    }

    #[test]
    fn test_decode_gga_short_time_is_unknown() {
        let sentence = "$GPGGA,1235,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let fix = expect_fix(decode_sentence(sentence, &ctx()));
        assert_eq!(fix.time, None);
    }

    #[test]
    fn test_decode_rmc() {
        let fix = expect_fix(decode_sentence(RMC, &ctx()));
        assert_eq!(fix.sentence, SentenceType::Rmc);
        assert!((fix.latitude - 48.1173).abs() < 1e-9);
        assert!((fix.speed_kmh.unwrap() - 41.4848).abs() < 1e-9);
        assert_eq!(fix.date, NaiveDate::from_ymd_opt(2094, 3, 23));
        assert_eq!(fix.altitude, None);
        assert!(fix.valid);
    }

    #[test]
    fn test_decode_rmc_void_status() {
        let sentence = RMC.replacen(",A,", ",V,", 1);
        let fix = expect_fix(decode_sentence(&sentence, &ctx()));
        assert!(!fix.valid);
        assert!(!DecodeOutcome::Fix(fix).is_valid_fix());
    }

    #[test]
    fn test_decode_rmc_no_signal() {
        let sentence = "$GPRMC,123519,V,,,,,,,230394,,,N*53";
        match decode_sentence(sentence, &ctx()) {
            DecodeOutcome::NoSignal(no_signal) => {
                assert_eq!(no_signal.sentence, SentenceType::Rmc);
                assert_eq!(no_signal.raw_altitude, None);
            }
            other => panic!("expected no signal, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rmc_insufficient_fields() {
        let sentence = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert!(matches!(
            failure.reason,
            DecodeError::InsufficientFields {
                kind: SentenceType::Rmc,
                found: 8,
                required: 12,
            }
        ));
        assert_eq!(
            failure.to_string(),
            format!("유효하지 않은 GPRMC 문장입니다: {sentence}")
        );
    }

    #[test]
    fn test_decode_rmc_bad_speed() {
        let sentence = "$GPRMC,123519,A,4807.038,N,01131.000,E,,084.4,230394,003.1,W*6A";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert_eq!(failure.reason, DecodeError::numeric("speed", ""));
        assert!(failure.to_string().starts_with("데이터 변환 오류: "));
    }

    #[test]
    fn test_decode_rmc_short_date_is_unknown() {
        let sentence = "$GPRMC,123519,A,4807.038,N,01131.000,E,0.0,084.4,2303,003.1,W*6A";
        let fix = expect_fix(decode_sentence(sentence, &ctx()));
        assert_eq!(fix.date, None);
        assert!(fix.to_string().starts_with("알 수 없는 날짜 21시 35분 19초"));
    }

    #[test]
    fn test_decode_rmc_unset_date_keeps_fix() {
        let sentence = RMC.replacen("230394", "000000", 1);
        let fix = expect_fix(decode_sentence(&sentence, &ctx()));
        assert!(fix.valid);
        assert!((fix.latitude - 48.1173).abs() < 1e-9);
        assert_eq!(fix.date, None);
        assert!(fix.to_string().starts_with("알 수 없는 날짜 "));
    }

    #[test]
    fn test_decode_rejects_exponent_numbers() {
        let sentence = RMC.replacen("022.4", "1e1", 1);
        let failure = expect_failure(decode_sentence(&sentence, &ctx()));
        assert_eq!(failure.reason, DecodeError::numeric("speed", "1e1"));

        let sentence = GGA.replacen("545.4", "5e2", 1);
        let failure = expect_failure(decode_sentence(&sentence, &ctx()));
        assert_eq!(failure.reason, DecodeError::numeric("altitude", "5e2"));
    }

    #[test]
    fn test_decode_gga_negative_altitude() {
        let sentence = GGA.replacen("545.4", "-12.5", 1);
        let fix = expect_fix(decode_sentence(&sentence, &ctx()));
        assert_eq!(fix.altitude, Some(-12.5));
    }

    #[test]
    fn test_decode_unsupported() {
        let sentence = "$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74";
        let failure = expect_failure(decode_sentence(sentence, &ctx()));
        assert_eq!(failure.reason, DecodeError::UnsupportedSentenceType);
        assert_eq!(failure.to_string(), format!("지원되지 않는 문장 유형: {sentence}"));
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let fix = expect_fix(decode_sentence(&format!("  {GGA}\r"), &ctx()));
        assert_eq!(fix.sentence, SentenceType::Gga);
    }

    #[test]
    fn test_decode_is_deterministic() {
        assert_eq!(decode_sentence(GGA, &ctx()), decode_sentence(GGA, &ctx()));
        assert_eq!(decode_sentence(RMC, &ctx()), decode_sentence(RMC, &ctx()));
    }
}
