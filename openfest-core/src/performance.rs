//! Performance records: decoding raw entries and the fully-timed result.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::artist::ArtistRef;
use crate::dto::PerformanceDto;
use crate::error::PerformanceError;
use crate::ids::{ArtistId, PerformanceId, StageId};
use crate::time::ScheduleTime;

/// A raw record with its times parsed and its artist fields checked.
///
/// The end time is still optional here: it may be implied by the next performance on
/// the same stage, which only the resolver knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPerformance {
    pub start_time: ScheduleTime,
    /// The start time as written in the file, for messages.
    pub time_text: String,
    pub end_time: Option<ScheduleTime>,
    pub custom_title: Option<String>,
    /// Billing order, no duplicates.
    pub artist_names: Vec<String>,
}

impl DecodedPerformance {
    /// Decode one record. Looks at nothing but the record itself.
    pub fn decode(record: &PerformanceDto) -> Result<Self, PerformanceError> {
        let start_time =
            ScheduleTime::parse(&record.time).map_err(PerformanceError::InvalidStartTime)?;
        let end_time = record
            .end_time
            .as_deref()
            .map(ScheduleTime::parse)
            .transpose()
            .map_err(PerformanceError::InvalidEndTime)?;

        let custom_title = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string);

        let artist_names = match (&record.artist, &record.artists) {
            (Some(_), Some(_)) => return Err(PerformanceError::ArtistAndArtistsBothPresent),
            (Some(artist), None) => vec![non_empty_name(artist)?],
            (None, Some(artists)) if artists.is_empty() => {
                return Err(PerformanceError::EmptyArtists);
            }
            (None, Some(artists)) => ordered_unique(artists)?,
            (None, None) if custom_title.is_none() => {
                return Err(PerformanceError::NoArtistsOrTitle);
            }
            (None, None) => Vec::new(),
        };

        Ok(DecodedPerformance {
            start_time,
            time_text: record.time.trim().to_string(),
            end_time,
            custom_title,
            artist_names,
        })
    }

    /// Short description for error messages, e.g. "Prism Sound @ 10 PM".
    pub fn label(&self) -> String {
        describe(self.custom_title.as_deref(), &self.artist_names, &self.time_text)
    }
}

pub(crate) fn describe(
    custom_title: Option<&str>,
    artist_names: &[String],
    time_text: &str,
) -> String {
    let who = match custom_title {
        Some(title) => title.to_string(),
        None => artist_names.join(", "),
    };
    format!("{} @ {}", who, time_text)
}

fn non_empty_name(name: &str) -> Result<String, PerformanceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PerformanceError::EmptyArtist);
    }
    Ok(name.to_string())
}

fn ordered_unique(names: &[String]) -> Result<Vec<String>, PerformanceError> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = non_empty_name(name)?;
        if unique.contains(&name) {
            return Err(PerformanceError::DuplicateArtist(name));
        }
        unique.push(name);
    }
    Ok(unique)
}

/// A performance with absolute start and end, placed on a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePerformance {
    pub id: PerformanceId,
    pub custom_title: Option<String>,
    pub artists: Vec<ArtistRef>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub stage_id: StageId,
}

impl StagePerformance {
    pub fn known_artist_ids(&self) -> impl Iterator<Item = &ArtistId> {
        self.artists.iter().filter_map(ArtistRef::known_id)
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}
