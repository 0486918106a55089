use std::fmt;

/// Sentence prefixes recognised as GGA (GPS-only and multi-constellation talkers).
const GGA_PREFIXES: [&str; 2] = ["$GPGGA", "$GNGGA"];
/// Sentence prefixes recognised as RMC.
const RMC_PREFIXES: [&str; 2] = ["$GPRMC", "$GNRMC"];

/// Length of the `$` + talker ID + sentence type prefix.
const PREFIX_LEN: usize = 6;

/// The kind of NMEA-0183 sentence, decided by its six-character prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceType {
    /// Global Positioning System fix data: time, position, altitude.
    Gga,
    /// Recommended minimum data: time, status, position, speed, date.
    Rmc,
    Unsupported,
}

impl SentenceType {
    /// Classify a complete sentence by its prefix (case-sensitive).
    ///
    /// Sentences shorter than six characters are `Unsupported`.
    pub fn classify(sentence: &str) -> Self {
        let Some(prefix) = sentence.get(..PREFIX_LEN) else {
            return Self::Unsupported;
        };
        if GGA_PREFIXES.contains(&prefix) {
            Self::Gga
        } else if RMC_PREFIXES.contains(&prefix) {
            Self::Rmc
        } else {
            Self::Unsupported
        }
    }

    /// Minimum number of comma-separated fields the decoder needs.
    pub fn required_fields(self) -> usize {
        match self {
            Self::Gga => 14,
            Self::Rmc => 12,
            Self::Unsupported => 0,
        }
    }
}

impl fmt::Display for SentenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gga => write!(f, "GGA"),
            Self::Rmc => write!(f, "RMC"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}
