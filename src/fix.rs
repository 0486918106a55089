use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::sentence::SentenceType;

/// One decoded GPS observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// Sentence kind the fix came from (`Gga` or `Rmc`).
    pub sentence: SentenceType,
    /// Latitude in decimal degrees (negative = South), six decimal places.
    pub latitude: f64,
    /// Longitude in decimal degrees (negative = West), six decimal places.
    pub longitude: f64,
    /// Altitude in meters. GGA only.
    pub altitude: Option<f64>,
    /// Speed over ground in km/h. RMC only.
    pub speed_kmh: Option<f64>,
    /// Local time of day, offset-adjusted. `None` when the time field was too short.
    pub time: Option<DateTime<FixedOffset>>,
    /// UTC calendar date. RMC only; `None` when the date field was too short.
    pub date: Option<NaiveDate>,
    /// GGA fixes with coordinates are always valid; RMC follows its status field.
    pub valid: bool,
}

/// A GGA/RMC sentence whose coordinate fields were empty or malformed,
/// which is what a receiver without a satellite lock sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoSignal {
    pub sentence: SentenceType,
    pub raw_latitude: String,
    pub raw_longitude: String,
    /// Altitude field as received. GGA only.
    pub raw_altitude: Option<String>,
}

pub(crate) fn format_time(time: Option<&DateTime<FixedOffset>>) -> String {
    match time {
        Some(t) => t.format("%H시 %M분 %S초").to_string(),
        None => "알 수 없는 시간".to_string(),
    }
}

pub(crate) fn format_date(date: Option<&NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y년 %m월 %d일").to_string(),
        None => "알 수 없는 날짜".to_string(),
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = format_time(self.time.as_ref());
        match self.sentence {
            SentenceType::Rmc => {
                let speed = match self.speed_kmh {
                    Some(s) => format!("{s:.2}"),
                    None => "-".to_string(),
                };
                let status = if self.valid { "유효" } else { "유효하지 않음" };
                write!(
                    f,
                    "{} {time}에 위치는 위도 {:.6}°, 경도 {:.6}°이며, 속도는 {speed} km/h입니다. GPS 신호 상태: {status}",
                    format_date(self.date.as_ref()),
                    self.latitude,
                    self.longitude,
                )
            }
            _ => {
                let altitude = match self.altitude {
                    Some(a) => format!("{a}"),
                    None => "-".to_string(),
                };
                write!(
                    f,
                    "{time}에 위도 {:.6}°, 경도 {:.6}°에서 고도는 {altitude} 미터입니다.",
                    self.latitude, self.longitude,
                )
            }
        }
    }
}

impl fmt::Display for NoSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "유효하지 않은 위치 데이터입니다. GPS 신호 없음 ({}: 위도 '{}', 경도 '{}'",
            self.sentence, self.raw_latitude, self.raw_longitude
        )?;
        if let Some(alt) = &self.raw_altitude {
            write!(f, ", 고도 '{alt}'")?;
        }
        write!(f, ")")
    }
}
