//! Error types for openfest.
//!
//! Errors are layered the same way the pipeline is: a time string fails to parse,
//! which makes a performance record invalid, which fails the stage it belongs to,
//! which is reported against the event as a whole.

use thiserror::Error;

use crate::ids::{ArtistId, DayId, PerformanceId, StageId};
use crate::time::ScheduleTime;

/// A time string matched none of the accepted formats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time string '{value}'. Accepted formats: {}", .accepted.join(", "))]
    InvalidTimeString {
        value: String,
        accepted: Vec<&'static str>,
    },
}

/// A single performance record has an invalid shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerformanceError {
    #[error("Invalid start time: {0}")]
    InvalidStartTime(TimeParseError),

    #[error("Invalid end time: {0}")]
    InvalidEndTime(TimeParseError),

    #[error("Both 'artist' and 'artists' are set, use only one")]
    ArtistAndArtistsBothPresent,

    #[error("Performance has neither artists nor a title")]
    NoArtistsOrTitle,

    #[error("'artist' is empty")]
    EmptyArtist,

    #[error("'artists' is empty")]
    EmptyArtists,

    #[error("Artist '{0}' is listed more than once")]
    DuplicateArtist(String),
}

/// The ordered performance list of one stage on one day could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Performance #{} ({label}) is invalid: {source}", .index + 1)]
    Performance {
        index: usize,
        label: String,
        source: PerformanceError,
    },

    #[error("Cannot determine end time for {performance}: it is the last performance on the stage and has no endTime")]
    CannotDetermineEndTimeForPerformance { performance: String },

    #[error("{performance} ends at {end}, which is not after its start at {start}")]
    EndTimeBeforeStartTime {
        performance: String,
        start: ScheduleTime,
        end: ScheduleTime,
    },

    #[error("{first} ends at {first_end}, after {second} starts at {second_start}")]
    OverlappingPerformances {
        first: String,
        first_end: ScheduleTime,
        second: String,
        second_start: ScheduleTime,
    },
}

/// Errors that make an event unparsable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Missing required file {0}")]
    MissingFile(&'static str),

    #[error("Failed to parse {file}: {message}")]
    Yaml { file: String, message: String },

    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("Stage '{name}' is declared more than once (id '{id}')")]
    DuplicateStage { name: String, id: StageId },

    #[error("Artist '{name}' is declared more than once (id '{id}')")]
    DuplicateArtistId { name: String, id: ArtistId },

    #[error("Day '{0}' is declared more than once")]
    DuplicateDay(DayId),

    #[error("Performance id '{id}' on day '{day}' is not unique")]
    DuplicatePerformanceId { id: PerformanceId, day: DayId },

    #[error("{day} / {stage}: {source}")]
    StageDay {
        day: DayId,
        stage: String,
        source: ResolveError,
    },
}

pub type EventResult<T> = Result<T, EventError>;
