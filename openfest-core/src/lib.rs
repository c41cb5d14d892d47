//! Core library for openfest.
//!
//! Turns the files of a festival directory into a validated, indexed schedule:
//! - `time` and `performance` decode the loosely written performance records
//! - `resolver` infers end times, rolls times past midnight and checks for overlaps
//! - `schedule` indexes the result by performance, artist and (day, stage) page
//! - `event` ties it together, see [`Event::parse`]

pub mod artist;
pub mod day;
pub mod diagnostics;
pub mod dto;
pub mod error;
pub mod event;
pub mod ids;
pub mod performance;
pub mod resolver;
pub mod schedule;
pub mod stage;
pub mod time;

pub use artist::{Artist, ArtistRef, ArtistRoster, Link};
pub use day::{Day, DayMetadata};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{EventError, PerformanceError, ResolveError, TimeParseError};
pub use event::{Event, EventFiles, NamedFile, ParseOptions, ParsedEvent};
pub use ids::{ArtistId, DayId, PerformanceId, StageId};
pub use performance::StagePerformance;
pub use schedule::Schedule;
pub use stage::{Stage, StageResolver};
pub use time::ScheduleTime;
