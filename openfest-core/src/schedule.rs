//! The indexed schedule of an event.
//!
//! A [`Schedule`] is built once from fully resolved days and never changes afterwards.
//! Re-parsing an event builds a new one. Every index only holds ids; the performances
//! themselves live in one map, so the indices cannot disagree about a performance.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::day::{Day, DayMetadata};
use crate::error::EventError;
use crate::ids::{ArtistId, DayId, PerformanceId, StageId};
use crate::performance::StagePerformance;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    performances: HashMap<PerformanceId, StagePerformance>,
    artist_index: HashMap<ArtistId, BTreeSet<PerformanceId>>,
    page_index: HashMap<DayId, BTreeMap<StageId, Vec<PerformanceId>>>,
    day_metadata: Vec<DayMetadata>,
}

impl Schedule {
    /// Index resolved days.
    ///
    /// Fails with every duplicate day id and every duplicate performance id found.
    /// Duplicate days are reported, and not indexed further.
    pub fn build(days: Vec<Day>) -> Result<Self, Vec<EventError>> {
        let mut errors = Vec::new();
        let mut schedule = Schedule::default();
        let mut seen_days = HashSet::with_capacity(days.len());

        for day in days {
            if !seen_days.insert(day.id.clone()) {
                errors.push(EventError::DuplicateDay(day.id));
                continue;
            }

            schedule.day_metadata.push(day.metadata());
            let page = schedule.page_index.entry(day.id.clone()).or_default();

            for (stage_id, performances) in day.stage_schedules {
                let mut ids = Vec::with_capacity(performances.len());

                for performance in performances {
                    if schedule.performances.contains_key(&performance.id) {
                        errors.push(EventError::DuplicatePerformanceId {
                            id: performance.id,
                            day: day.id.clone(),
                        });
                        continue;
                    }

                    for artist_id in performance.known_artist_ids() {
                        schedule
                            .artist_index
                            .entry(artist_id.clone())
                            .or_default()
                            .insert(performance.id.clone());
                    }

                    ids.push(performance.id.clone());
                    schedule
                        .performances
                        .insert(performance.id.clone(), performance);
                }

                page.insert(stage_id, ids);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        schedule.day_metadata.sort_by(DayMetadata::display_order);
        Ok(schedule)
    }

    pub fn performance(&self, id: &PerformanceId) -> Option<&StagePerformance> {
        self.performances.get(id)
    }

    /// Ids of every performance featuring a registered artist.
    pub fn performance_ids_for_artist(&self, artist: &ArtistId) -> Option<&BTreeSet<PerformanceId>> {
        self.artist_index.get(artist)
    }

    /// An artist's performances, earliest first. Empty for unknown artists.
    pub fn performances_for_artist(&self, artist: &ArtistId) -> Vec<&StagePerformance> {
        let mut performances: Vec<_> = self
            .performance_ids_for_artist(artist)
            .into_iter()
            .flatten()
            .filter_map(|id| self.performances.get(id))
            .collect();

        performances.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        performances
    }

    /// Ids of one (day, stage) page in running order.
    pub fn page_ids(&self, day: &DayId, stage: &StageId) -> &[PerformanceId] {
        self.page_index
            .get(day)
            .and_then(|stages| stages.get(stage))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// One (day, stage) page in running order.
    pub fn page(&self, day: &DayId, stage: &StageId) -> Vec<&StagePerformance> {
        self.page_ids(day, stage)
            .iter()
            .filter_map(|id| self.performances.get(id))
            .collect()
    }

    /// Stages with at least one performance on `day`, in id order.
    pub fn stage_ids_for_day(&self, day: &DayId) -> Vec<&StageId> {
        self.page_index
            .get(day)
            .map(|stages| stages.keys().collect())
            .unwrap_or_default()
    }

    /// Days in display order: by date, undated days last.
    pub fn day_metadata(&self) -> &[DayMetadata] {
        &self.day_metadata
    }

    pub fn len(&self) -> usize {
        self.performances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.performances.is_empty()
    }

    /// Every performance, by day in display order, then stage, then start.
    pub fn iter(&self) -> impl Iterator<Item = &StagePerformance> + '_ {
        self.day_metadata
            .iter()
            .filter_map(|day| self.page_index.get(&day.id))
            .flat_map(|stages| stages.values())
            .flatten()
            .filter_map(|id| self.performances.get(id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, NaiveDate};

    use super::*;
    use crate::artist::ArtistRef;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn performance(id: &str, stage: &str, start: &str, end: &str, artists: Vec<ArtistRef>) -> StagePerformance {
        StagePerformance {
            id: PerformanceId::derive(Some(id), &[], start, &StageId::from_name(stage)),
            custom_title: Some(id.to_string()),
            artists,
            start_time: at(start),
            end_time: at(end),
            stage_id: StageId::from_name(stage),
        }
    }

    fn known(name: &str) -> ArtistRef {
        ArtistRef::Known(ArtistId::from_name(name))
    }

    fn day(id: &str, date: Option<NaiveDate>, performances: Vec<StagePerformance>) -> Day {
        let mut stage_schedules: BTreeMap<StageId, Vec<StagePerformance>> = BTreeMap::new();
        for performance in performances {
            stage_schedules
                .entry(performance.stage_id.clone())
                .or_default()
                .push(performance);
        }
        Day {
            id: DayId::from_file_stem(id),
            date,
            custom_title: None,
            stage_schedules,
        }
    }

    fn fixture() -> Vec<Day> {
        vec![
            day(
                "saturday",
                NaiveDate::from_ymd_opt(2024, 6, 29),
                vec![performance(
                    "Closing",
                    "Main",
                    "2024-06-29T20:00:00-07:00",
                    "2024-06-29T22:00:00-07:00",
                    vec![known("Prism Sound")],
                )],
            ),
            day(
                "friday",
                NaiveDate::from_ymd_opt(2024, 6, 28),
                vec![
                    performance(
                        "Opening",
                        "Main",
                        "2024-06-28T20:00:00-07:00",
                        "2024-06-28T21:00:00-07:00",
                        vec![known("Prism Sound"), ArtistRef::Anonymous("Guest".to_string())],
                    ),
                    performance(
                        "Late",
                        "Main",
                        "2024-06-28T21:00:00-07:00",
                        "2024-06-28T23:00:00-07:00",
                        vec![known("Sunspot")],
                    ),
                    performance(
                        "Grove",
                        "Grove",
                        "2024-06-28T19:00:00-07:00",
                        "2024-06-28T20:00:00-07:00",
                        vec![],
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn test_indices_are_consistent() {
        let schedule = Schedule::build(fixture()).unwrap();
        assert_eq!(schedule.len(), 4);

        for ids in schedule.artist_index.values() {
            for id in ids {
                assert!(schedule.performance(id).is_some());
            }
        }
        for stages in schedule.page_index.values() {
            for ids in stages.values() {
                for id in ids {
                    assert!(schedule.performance(id).is_some());
                }
            }
        }

        let paged: usize = schedule
            .page_index
            .values()
            .flat_map(|stages| stages.values())
            .map(Vec::len)
            .sum();
        assert_eq!(paged, schedule.len());
    }

    #[test]
    fn test_artist_index_skips_anonymous() {
        let schedule = Schedule::build(fixture()).unwrap();

        assert_eq!(schedule.artist_index.len(), 2);
        assert_eq!(
            schedule
                .performance_ids_for_artist(&ArtistId::from_name("Prism Sound"))
                .map(BTreeSet::len),
            Some(2)
        );
        assert!(schedule
            .performances_for_artist(&ArtistId::from_name("Guest"))
            .is_empty());
    }

    #[test]
    fn test_performances_for_artist_are_chronological() {
        let schedule = Schedule::build(fixture()).unwrap();
        let titles: Vec<_> = schedule
            .performances_for_artist(&ArtistId::from_name("Prism Sound"))
            .iter()
            .map(|p| p.custom_title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Opening", "Closing"]);
    }

    #[test]
    fn test_page_lookup() {
        let schedule = Schedule::build(fixture()).unwrap();
        let friday = DayId::from_file_stem("friday");
        let main = StageId::from_name("Main");

        let titles: Vec<_> = schedule
            .page(&friday, &main)
            .iter()
            .map(|p| p.custom_title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Opening", "Late"]);

        assert!(schedule.page(&friday, &StageId::from_name("Nowhere")).is_empty());
        assert!(schedule.page_ids(&DayId::from_file_stem("monday"), &main).is_empty());

        let stages: Vec<_> = schedule.stage_ids_for_day(&friday).iter().map(|s| s.as_str()).collect();
        assert_eq!(stages, vec!["grove", "main"]);
    }

    #[test]
    fn test_day_metadata_and_iteration_order() {
        let schedule = Schedule::build(fixture()).unwrap();

        let days: Vec<_> = schedule.day_metadata().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(days, vec!["friday", "saturday"]);

        let titles: Vec<_> = schedule
            .iter()
            .map(|p| p.custom_title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Grove", "Opening", "Late", "Closing"]);
    }

    #[test]
    fn test_duplicate_day_and_performance_ids() {
        let mut days = fixture();
        days.push(day("friday", None, vec![]));

        let duplicate = performance(
            "Opening",
            "Main",
            "2024-06-28T20:00:00-07:00",
            "2024-06-28T21:00:00-07:00",
            vec![],
        );
        days.push(day("sunday", None, vec![duplicate.clone()]));

        let errors = Schedule::build(days).unwrap_err();
        assert_eq!(
            errors,
            vec![
                EventError::DuplicateDay(DayId::from_file_stem("friday")),
                EventError::DuplicatePerformanceId {
                    id: duplicate.id,
                    day: DayId::from_file_stem("sunday"),
                },
            ]
        );
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = Schedule::build(Vec::new()).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.iter().count(), 0);
    }
}
