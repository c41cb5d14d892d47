//! Turning one stage's ordered list of records into fully-timed performances.
//!
//! Schedule files list each stage's performances in running order and routinely leave
//! out end times ("until the next act") and dates ("1 AM" after "11 PM" is the same
//! night). Resolution runs in two passes over the whole list:
//!
//! 1. infer: roll times before the stage's first start past midnight, and fill in
//!    missing end times from the next performance's start;
//! 2. validate: every performance must end after it starts and before the next starts.
//!
//! The first violation fails the whole stage-day. Nothing partial comes out.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::artist::ArtistRoster;
use crate::dto::PerformanceDto;
use crate::error::ResolveError;
use crate::ids::{DayId, PerformanceId, StageId};
use crate::performance::{describe, DecodedPerformance, StagePerformance};
use crate::time::ScheduleTime;

/// A performance after end-time inference, still in festival-day clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedPerformance {
    pub start_time: ScheduleTime,
    pub end_time: ScheduleTime,
    /// The start time as written in the file, for messages.
    pub time_text: String,
    pub custom_title: Option<String>,
    pub artist_names: Vec<String>,
}

impl TimedPerformance {
    pub fn label(&self) -> String {
        describe(self.custom_title.as_deref(), &self.artist_names, &self.time_text)
    }
}

/// Decode every record of a stage. Fails on the first invalid record.
pub fn decode_stage(records: &[PerformanceDto]) -> Result<Vec<DecodedPerformance>, ResolveError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            DecodedPerformance::decode(record).map_err(|source| ResolveError::Performance {
                index,
                label: record.label(),
                source,
            })
        })
        .collect()
}

/// Pass 1: assign every performance an end time, rolling times past midnight.
///
/// Any time earlier than the stage's first start is taken to be after midnight. A
/// stage never runs for more than 24 hours and its list never goes back in time.
pub fn infer_end_times(
    performances: &[DecodedPerformance],
) -> Result<Vec<TimedPerformance>, ResolveError> {
    let Some(first) = performances.first() else {
        return Ok(Vec::new());
    };
    let schedule_start = first.start_time;
    let normalize = |time: ScheduleTime| {
        if time < schedule_start {
            time.rolled_over()
        } else {
            time
        }
    };

    performances
        .iter()
        .enumerate()
        .map(|(index, performance)| {
            let end_time = match (performance.end_time, performances.get(index + 1)) {
                (Some(end), _) => normalize(end),
                (None, Some(next)) => normalize(next.start_time),
                (None, None) => {
                    return Err(ResolveError::CannotDetermineEndTimeForPerformance {
                        performance: performance.label(),
                    });
                }
            };

            Ok(TimedPerformance {
                start_time: normalize(performance.start_time),
                end_time,
                time_text: performance.time_text.clone(),
                custom_title: performance.custom_title.clone(),
                artist_names: performance.artist_names.clone(),
            })
        })
        .collect()
}

/// Pass 2: check the finished sequence.
pub fn validate_sequence(performances: &[TimedPerformance]) -> Result<(), ResolveError> {
    for (index, performance) in performances.iter().enumerate() {
        if performance.start_time >= performance.end_time {
            return Err(ResolveError::EndTimeBeforeStartTime {
                performance: performance.label(),
                start: performance.start_time,
                end: performance.end_time,
            });
        }

        if let Some(next) = performances.get(index + 1) {
            if performance.end_time > next.start_time {
                return Err(ResolveError::OverlappingPerformances {
                    first: performance.label(),
                    first_end: performance.end_time,
                    second: next.label(),
                    second_start: next.start_time,
                });
            }
        }
    }

    Ok(())
}

/// Decode, infer and validate one stage's records.
pub fn resolve_stage(records: &[PerformanceDto]) -> Result<Vec<TimedPerformance>, ResolveError> {
    let decoded = decode_stage(records)?;
    let timed = infer_end_times(&decoded)?;
    validate_sequence(&timed)?;
    Ok(timed)
}

/// Write a resolved stage back out as records.
///
/// End times equal to the next performance's start are left out, since resolution
/// infers them again. The last performance always keeps its end time.
pub fn encode_stage(performances: &[TimedPerformance]) -> Vec<PerformanceDto> {
    performances
        .iter()
        .enumerate()
        .map(|(index, performance)| {
            let implied = performances
                .get(index + 1)
                .is_some_and(|next| next.start_time == performance.end_time);

            let (artist, artists) = match performance.artist_names.as_slice() {
                [] => (None, None),
                [single] => (Some(single.clone()), None),
                many => (None, Some(many.to_vec())),
            };

            PerformanceDto {
                title: performance.custom_title.clone(),
                artist,
                artists,
                time: performance.start_time.to_twelve_hour_string(),
                end_time: (!implied).then(|| performance.end_time.to_twelve_hour_string()),
            }
        })
        .collect()
}

/// Longest run of skipped local time in any zone the tz database knows.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Undated days are placed on this date when computing absolute times.
pub fn undated_anchor() -> NaiveDate {
    NaiveDate::default()
}

/// Where a resolved stage list lands: which day, which stage, which timezone.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub day_id: &'a DayId,
    pub date: Option<NaiveDate>,
    pub time_zone: Tz,
    pub stage_id: &'a StageId,
}

impl PageContext<'_> {
    fn instant(&self, time: ScheduleTime) -> DateTime<FixedOffset> {
        let anchor = self.date.unwrap_or_else(undated_anchor);
        let local = anchor.and_time(NaiveTime::MIN)
            + Duration::minutes(i64::from(time.minutes_since_midnight()));

        if let Some(instant) = self.time_zone.from_local_datetime(&local).earliest() {
            return instant.fixed_offset();
        }

        // Skipped by a spring-forward transition: the first minute that exists.
        (1..=MAX_GAP_MINUTES)
            .find_map(|minutes| {
                self.time_zone
                    .from_local_datetime(&(local + Duration::minutes(minutes)))
                    .earliest()
            })
            .unwrap_or_else(|| self.time_zone.from_utc_datetime(&local))
            .fixed_offset()
    }

    /// Start component of a performance id: local date and time, or the day id for
    /// undated days.
    fn start_key(&self, time: ScheduleTime) -> String {
        match self.date {
            Some(date) => {
                let local = date.and_time(NaiveTime::MIN)
                    + Duration::minutes(i64::from(time.minutes_since_midnight()));
                local.format("%Y-%m-%dT%H:%M").to_string()
            }
            None => format!("{}T{}", self.day_id, time.to_clock_string()),
        }
    }
}

/// Give resolved performances their ids, absolute times and artist references.
pub fn place_on_stage(
    performances: &[TimedPerformance],
    page: &PageContext<'_>,
    roster: &ArtistRoster,
) -> Vec<StagePerformance> {
    performances
        .iter()
        .map(|performance| {
            let artists: Vec<_> = performance
                .artist_names
                .iter()
                .map(|name| roster.resolve(name))
                .collect();
            let id = PerformanceId::derive(
                performance.custom_title.as_deref(),
                &artists,
                &page.start_key(performance.start_time),
                page.stage_id,
            );

            StagePerformance {
                id,
                custom_title: performance.custom_title.clone(),
                artists,
                start_time: page.instant(performance.start_time),
                end_time: page.instant(performance.end_time),
                stage_id: page.stage_id.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artist::{Artist, ArtistRef};
    use crate::error::PerformanceError;
    use crate::ids::ArtistId;

    fn entry(artist: &str, time: &str, end_time: Option<&str>) -> PerformanceDto {
        PerformanceDto {
            artist: Some(artist.to_string()),
            time: time.to_string(),
            end_time: end_time.map(str::to_string),
            ..Default::default()
        }
    }

    fn time(hour: u8, minute: u8) -> ScheduleTime {
        ScheduleTime::new(hour, minute).unwrap()
    }

    #[test]
    fn test_midnight_rollover() {
        let records = vec![
            entry("A", "10:30 PM", None),
            entry("B", "12:30 AM", None),
            entry("C", "2:00 AM", None),
            entry("D", "4:00 AM", Some("5:30 AM")),
        ];

        let timed = resolve_stage(&records).unwrap();
        let spans: Vec<_> = timed.iter().map(|p| (p.start_time, p.end_time)).collect();
        assert_eq!(
            spans,
            vec![
                (time(22, 30), time(24, 30)),
                (time(24, 30), time(26, 0)),
                (time(26, 0), time(28, 0)),
                (time(28, 0), time(29, 30)),
            ]
        );

        for pair in timed.windows(2) {
            assert!(pair[0].start_time < pair[1].start_time);
        }
    }

    #[test]
    fn test_missing_end_is_next_start() {
        let records = vec![
            entry("A", "6 PM", None),
            entry("B", "7:15 PM", Some("8 PM")),
        ];
        let timed = resolve_stage(&records).unwrap();
        assert_eq!(timed[0].end_time, time(19, 15));
        assert_eq!(timed[0].end_time, timed[1].start_time);
    }

    #[test]
    fn test_gaps_are_allowed() {
        let records = vec![
            entry("A", "6 PM", Some("7 PM")),
            entry("B", "8 PM", Some("9 PM")),
        ];
        assert!(resolve_stage(&records).is_ok());
    }

    #[test]
    fn test_last_entry_needs_end_time() {
        let records = vec![entry("A", "6 PM", None), entry("B", "7 PM", None)];
        assert_eq!(
            resolve_stage(&records),
            Err(ResolveError::CannotDetermineEndTimeForPerformance {
                performance: "B @ 7 PM".to_string(),
            })
        );
    }

    #[test]
    fn test_overlap_is_an_error() {
        let records = vec![
            entry("A", "4 AM", Some("5:30 AM")),
            entry("B", "5:00 AM", Some("6:30 AM")),
        ];
        assert_eq!(
            resolve_stage(&records),
            Err(ResolveError::OverlappingPerformances {
                first: "A @ 4 AM".to_string(),
                first_end: time(5, 30),
                second: "B @ 5:00 AM".to_string(),
                second_start: time(5, 0),
            })
        );
    }

    #[test]
    fn test_end_before_start() {
        let records = vec![
            entry("A", "6 PM", Some("7 PM")),
            entry("B", "8 PM", Some("7:30 PM")),
        ];
        assert!(matches!(
            resolve_stage(&records),
            Err(ResolveError::EndTimeBeforeStartTime { .. })
        ));
    }

    #[test]
    fn test_zero_length_performance_is_rejected() {
        let records = vec![entry("A", "8 PM", Some("8 PM"))];
        assert!(matches!(
            resolve_stage(&records),
            Err(ResolveError::EndTimeBeforeStartTime { .. })
        ));
    }

    #[test]
    fn test_explicit_end_after_midnight() {
        let records = vec![entry("A", "11 PM", Some("1 AM"))];
        let timed = resolve_stage(&records).unwrap();
        assert_eq!(timed[0].end_time, time(25, 0));
    }

    #[test]
    fn test_empty_stage_resolves_to_nothing() {
        assert_eq!(resolve_stage(&[]), Ok(Vec::new()));
    }

    #[test]
    fn test_decode_errors_name_the_record() {
        let records = vec![
            entry("A", "6 PM", None),
            PerformanceDto {
                time: "7 PM".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(
            resolve_stage(&records),
            Err(ResolveError::Performance {
                index: 1,
                label: "(untitled) @ 7 PM".to_string(),
                source: PerformanceError::NoArtistsOrTitle,
            })
        );
    }

    #[test]
    fn test_encode_omits_inferred_end_times() {
        let records = vec![
            entry("A", "10:30 PM", None),
            entry("B", "12:30 AM", Some("1:45 AM")),
            entry("C", "2:00 AM", Some("3:00 AM")),
        ];
        let timed = resolve_stage(&records).unwrap();
        let encoded = encode_stage(&timed);

        assert_eq!(encoded[0].end_time, None);
        assert_eq!(encoded[1].end_time.as_deref(), Some("1:45 AM"));
        assert_eq!(encoded[2].end_time.as_deref(), Some("3:00 AM"));
        assert_eq!(encoded[1].time, "12:30 AM");
        assert_eq!(encoded[0].artist.as_deref(), Some("A"));

        // Encoding is stable under another decode/resolve round.
        let again = resolve_stage(&encoded).unwrap();
        assert_eq!(again, timed);
        assert_eq!(encode_stage(&again), encoded);
    }

    #[test]
    fn test_encode_multiple_artists_and_titles() {
        let records = vec![PerformanceDto {
            title: Some("B2B".to_string()),
            artists: Some(vec!["A".to_string(), "B".to_string()]),
            time: "9 PM".to_string(),
            end_time: Some("11 PM".to_string()),
            ..Default::default()
        }];
        let encoded = encode_stage(&resolve_stage(&records).unwrap());

        assert_eq!(encoded[0].title.as_deref(), Some("B2B"));
        assert_eq!(encoded[0].artist, None);
        assert_eq!(encoded[0].artists, Some(vec!["A".to_string(), "B".to_string()]));
    }

    #[test]
    fn test_place_on_stage_uses_date_and_time_zone() {
        let records = vec![
            entry("Prism Sound", "11 PM", None),
            entry("Guest", "12:30 AM", Some("2 AM")),
        ];
        let timed = resolve_stage(&records).unwrap();
        let roster =
            ArtistRoster::new(&[Artist::from_markdown("Prism Sound", "").unwrap()]).unwrap();
        let day_id = DayId::from_file_stem("friday");
        let stage_id = StageId::from_name("Mystic Grove");
        let page = PageContext {
            day_id: &day_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 28),
            time_zone: chrono_tz::America::Los_Angeles,
            stage_id: &stage_id,
        };

        let placed = place_on_stage(&timed, &page, &roster);

        assert_eq!(placed[0].start_time.to_rfc3339(), "2024-06-28T23:00:00-07:00");
        assert_eq!(placed[0].end_time.to_rfc3339(), "2024-06-29T00:30:00-07:00");
        assert_eq!(placed[1].end_time.to_rfc3339(), "2024-06-29T02:00:00-07:00");
        assert_eq!(
            placed[0].artists,
            vec![ArtistRef::Known(ArtistId::from_name("Prism Sound"))]
        );
        assert_eq!(
            placed[1].artists,
            vec![ArtistRef::Anonymous("Guest".to_string())]
        );
        assert_eq!(
            placed[1].id.as_str(),
            "|~guest|2024-06-29T00:30|mystic-grove"
        );
        assert_eq!(placed[0].duration(), Duration::minutes(90));
    }

    #[test]
    fn test_place_on_undated_day() {
        let timed = resolve_stage(&[entry("A", "11 PM", Some("1 AM"))]).unwrap();
        let day_id = DayId::from_file_stem("tbd");
        let stage_id = StageId::from_name("Main");
        let page = PageContext {
            day_id: &day_id,
            date: None,
            time_zone: chrono_tz::UTC,
            stage_id: &stage_id,
        };

        let placed = place_on_stage(&timed, &page, &ArtistRoster::default());

        assert_eq!(placed[0].id.as_str(), "|~a|tbdT23:00|main");
        assert_eq!(placed[0].start_time.to_rfc3339(), "1970-01-01T23:00:00+00:00");
        assert_eq!(placed[0].end_time.to_rfc3339(), "1970-01-02T01:00:00+00:00");
    }

    #[test]
    fn test_label_uses_time_as_written() {
        let records = vec![
            entry("A", "14:30", Some("16:00")),
            entry("B", "3:45 PM", Some("5 PM")),
        ];
        assert_eq!(
            resolve_stage(&records),
            Err(ResolveError::OverlappingPerformances {
                first: "A @ 14:30".to_string(),
                first_end: time(16, 0),
                second: "B @ 3:45 PM".to_string(),
                second_start: time(15, 45),
            })
        );
    }

    #[test]
    fn test_place_on_stage_across_dst_gap() {
        // 2:00 to 3:00 AM does not exist in New York on 2024-03-10.
        let records = vec![
            entry("A", "1 AM", None),
            entry("B", "2:30 AM", Some("4:30 AM")),
            entry("C", "5 AM", Some("6 AM")),
        ];
        let timed = resolve_stage(&records).unwrap();
        let day_id = DayId::from_file_stem("sunday");
        let stage_id = StageId::from_name("Main");
        let page = PageContext {
            day_id: &day_id,
            date: NaiveDate::from_ymd_opt(2024, 3, 10),
            time_zone: chrono_tz::America::New_York,
            stage_id: &stage_id,
        };

        let placed = place_on_stage(&timed, &page, &ArtistRoster::default());

        for performance in &placed {
            assert!(performance.start_time < performance.end_time);
        }
        for pair in placed.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
        }

        assert_eq!(placed[0].start_time.to_rfc3339(), "2024-03-10T01:00:00-05:00");
        assert_eq!(placed[0].end_time.to_rfc3339(), "2024-03-10T03:00:00-04:00");
        assert_eq!(placed[1].start_time.to_rfc3339(), "2024-03-10T03:00:00-04:00");
        assert_eq!(placed[1].end_time.to_rfc3339(), "2024-03-10T04:30:00-04:00");
        assert_eq!(placed[0].duration(), Duration::hours(1));
        // Ids keep the wall-clock time from the file.
        assert_eq!(placed[1].id.as_str(), "|~b|2024-03-10T02:30|main");
    }

    #[test]
    fn test_place_on_stage_in_dst_fold_takes_earliest() {
        // 1:00 to 2:00 AM happens twice in New York on 2024-11-03.
        let timed = resolve_stage(&[entry("A", "1:30 AM", Some("3 AM"))]).unwrap();
        let day_id = DayId::from_file_stem("sunday");
        let stage_id = StageId::from_name("Main");
        let page = PageContext {
            day_id: &day_id,
            date: NaiveDate::from_ymd_opt(2024, 11, 3),
            time_zone: chrono_tz::America::New_York,
            stage_id: &stage_id,
        };

        let placed = place_on_stage(&timed, &page, &ArtistRoster::default());
        assert_eq!(placed[0].start_time.to_rfc3339(), "2024-11-03T01:30:00-04:00");
        assert_eq!(placed[0].end_time.to_rfc3339(), "2024-11-03T03:00:00-05:00");
    }
}
