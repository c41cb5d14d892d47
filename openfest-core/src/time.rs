//! Clock times as written in schedule files.
//!
//! Schedules are written by people, so start and end times show up as
//! "10 PM", "2:30 AM", "22:30" or just "2". [`ScheduleTime::parse`] accepts a fixed,
//! ordered list of formats and turns the first match into a time of day.
//!
//! A `ScheduleTime` may run past 23:59 (up to 47:59): "1:00 AM" after a "11:30 PM"
//! set still belongs to the same festival day and is stored as 25:00 so that
//! ordering keeps working.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TimeParseError;

const MINUTES_PER_HOUR: u8 = 60;
const MAX_HOUR: u8 = 48;

/// Formats accepted by [`ScheduleTime::parse`], tried in this order.
///
/// More specific formats come first so that "2:30" is never read as an hour-only time.
pub const ACCEPTED_FORMATS: [TimeFormat; 5] = [
    TimeFormat::HourMinuteMeridiem,
    TimeFormat::Hour24Minute,
    TimeFormat::HourMeridiem,
    TimeFormat::HourMinute,
    TimeFormat::Hour,
];

/// An hour and minute of a festival day. Hours 24..48 are past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScheduleTime {
    hour: u8,
    minute: u8,
}

impl ScheduleTime {
    /// Returns `None` unless `hour < 48` and `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < MAX_HOUR && minute < MINUTES_PER_HOUR).then_some(ScheduleTime { hour, minute })
    }

    /// Parse a human-entered time string into a time of day (`hour < 24`).
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let trimmed = value.trim();

        ACCEPTED_FORMATS
            .iter()
            .find_map(|format| format.parse(trimmed))
            .ok_or_else(|| TimeParseError::InvalidTimeString {
                value: value.to_string(),
                accepted: ACCEPTED_FORMATS.iter().map(|f| f.pattern()).collect(),
            })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// True for times stored with `hour >= 24`.
    pub fn is_past_midnight(&self) -> bool {
        self.hour >= 24
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hour) * u32::from(MINUTES_PER_HOUR) + u32::from(self.minute)
    }

    /// The same clock time on the following calendar day.
    ///
    /// Only times before midnight can roll over; later times are returned unchanged.
    pub fn rolled_over(self) -> Self {
        if self.is_past_midnight() {
            return self;
        }
        ScheduleTime {
            hour: self.hour + 24,
            minute: self.minute,
        }
    }

    /// `HH:mm` with `HH` allowed to exceed 23.
    pub fn to_clock_string(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// "h:mm a" rendering of the wall-clock time, e.g. "2:30 PM".
    pub fn to_twelve_hour_string(&self) -> String {
        let hour = self.hour % 24;
        let meridiem = if hour < 12 { "AM" } else { "PM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute, meridiem)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_twelve_hour_string())?;
        if self.is_past_midnight() {
            write!(f, " (+1 day)")?;
        }
        Ok(())
    }
}

impl FromStr for ScheduleTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScheduleTime::parse(s)
    }
}

/// One of the accepted time-string layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `h:mm a`, e.g. "2:30 PM"
    HourMinuteMeridiem,
    /// `HH:mm`, e.g. "14:30"
    Hour24Minute,
    /// `h a`, e.g. "2 PM"
    HourMeridiem,
    /// `h:mm`, e.g. "2:30"
    HourMinute,
    /// `h`, e.g. "2"
    Hour,
}

impl TimeFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            TimeFormat::HourMinuteMeridiem => "h:mm a",
            TimeFormat::Hour24Minute => "HH:mm",
            TimeFormat::HourMeridiem => "h a",
            TimeFormat::HourMinute => "h:mm",
            TimeFormat::Hour => "h",
        }
    }

    /// Parse an already-trimmed string with this format.
    pub fn parse(self, value: &str) -> Option<ScheduleTime> {
        match self {
            TimeFormat::HourMinuteMeridiem => {
                let (body, meridiem) = split_meridiem(value)?;
                let (hour, minute) = body.split_once(':')?;
                let hour = meridiem.to_24_hour(parse_hour_12(hour)?);
                ScheduleTime::new(hour, parse_minute(minute)?)
            }
            TimeFormat::Hour24Minute => {
                let (hour, minute) = value.split_once(':')?;
                ScheduleTime::new(parse_hour_24(hour)?, parse_minute(minute)?)
            }
            TimeFormat::HourMeridiem => {
                let (body, meridiem) = split_meridiem(value)?;
                let hour = meridiem.to_24_hour(parse_hour_12(body)?);
                ScheduleTime::new(hour, 0)
            }
            TimeFormat::HourMinute => {
                let (hour, minute) = value.split_once(':')?;
                ScheduleTime::new(parse_hour_12(hour)?, parse_minute(minute)?)
            }
            TimeFormat::Hour => ScheduleTime::new(parse_hour_12(value)?, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn to_24_hour(self, hour_12: u8) -> u8 {
        match (self, hour_12) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) => h,
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, h) => h + 12,
        }
    }
}

const MERIDIEM_SUFFIXES: [(&str, Meridiem); 4] = [
    ("a.m.", Meridiem::Am),
    ("p.m.", Meridiem::Pm),
    ("am", Meridiem::Am),
    ("pm", Meridiem::Pm),
];

/// Split "2:30 PM" into ("2:30", Pm). The marker is case-insensitive and the
/// space before it is optional.
fn split_meridiem(value: &str) -> Option<(&str, Meridiem)> {
    let lower = value.to_ascii_lowercase();

    MERIDIEM_SUFFIXES.iter().find_map(|(suffix, meridiem)| {
        if !lower.ends_with(suffix) {
            return None;
        }
        let body = value[..value.len() - suffix.len()].trim_end();
        (!body.is_empty()).then_some((body, *meridiem))
    })
}

fn parse_digits(value: &str, min_len: usize, max_len: usize) -> Option<u8> {
    let len_ok = (min_len..=max_len).contains(&value.len());
    if !len_ok || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_hour_12(value: &str) -> Option<u8> {
    parse_digits(value, 1, 2).filter(|h| (1..=12).contains(h))
}

fn parse_hour_24(value: &str) -> Option<u8> {
    parse_digits(value, 1, 2).filter(|h| *h < 24)
}

fn parse_minute(value: &str) -> Option<u8> {
    parse_digits(value, 2, 2).filter(|m| *m < MINUTES_PER_HOUR)
}
