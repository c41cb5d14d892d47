//! The event aggregate, and the conversion of an event directory into one.
//!
//! [`Event::parse`] takes an in-memory snapshot of the event directory ([`EventFiles`])
//! and either returns a fully validated event or every error it found. Reading the
//! directory from disk is the caller's job.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use chrono_tz::Tz;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artist::{Artist, ArtistRef, ArtistRoster};
use crate::day::Day;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dto::{
    decode_yaml, decode_yaml_or_default, ColorSchemeDto, ContactInfoDto, DayScheduleDto,
    EventInfoDto, PerformanceDto, StageDto,
};
use crate::error::{EventError, EventResult};
use crate::ids::{ArtistId, DayId, StageId};
use crate::performance::StagePerformance;
use crate::resolver::{place_on_stage, resolve_stage, PageContext};
use crate::schedule::Schedule;
use crate::stage::{Stage, StageResolver};

pub const EVENT_INFO_FILE: &str = "event-info.yml";
pub const STAGES_FILE: &str = "stages.yml";
pub const CONTACT_INFO_FILE: &str = "contact-info.yml";

/// A file under `schedule/` or `artists/`. `name` is the file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub content: String,
}

impl NamedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        NamedFile {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The contents of an event directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFiles {
    pub event_info: Option<String>,
    pub stages: Option<String>,
    pub contact_info: Option<String>,
    pub schedules: Vec<NamedFile>,
    pub artists: Vec<NamedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Resolve (day, stage) pages on the rayon thread pool.
    pub parallel: bool,
    /// Report only the first error.
    pub fail_fast: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            parallel: true,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub image_url: Option<String>,
    pub site_map_image_url: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub primary_color: String,
    pub workshops_color: Option<String>,
}

impl From<ColorSchemeDto> for ColorScheme {
    fn from(dto: ColorSchemeDto) -> Self {
        ColorScheme {
            primary_color: dto.primary_color,
            workshops_color: dto.workshops_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNumber {
    pub phone_number: String,
    pub title: String,
    pub description: Option<String>,
}

impl From<ContactInfoDto> for ContactNumber {
    fn from(dto: ContactInfoDto) -> Self {
        ContactNumber {
            phone_number: dto.phone_number,
            title: dto.title,
            description: dto.description,
        }
    }
}

/// A parsed and validated festival.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub time_zone: Tz,
    pub info: EventInfo,
    /// Sorted by id.
    pub artists: Vec<Artist>,
    /// In `stages.yml` order.
    pub stages: Vec<Stage>,
    pub schedule: Schedule,
    pub contact_numbers: Vec<ContactNumber>,
    pub color_scheme: Option<ColorScheme>,
    stage_resolver: StageResolver,
    artist_roster: ArtistRoster,
}

/// A successfully parsed event and what was noticed along the way.
#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub event: Event,
    pub diagnostics: Diagnostics,
}

/// A schedule file after decoding, before its stages are resolved.
struct DaySource {
    id: DayId,
    date: Option<NaiveDate>,
    custom_title: Option<String>,
    performances: BTreeMap<String, Vec<PerformanceDto>>,
}

/// One stage on one day: the unit of resolution.
struct PageSource<'a> {
    day: usize,
    stage_name: &'a str,
    stage_id: StageId,
    records: &'a [PerformanceDto],
}

/// Header part of an event: everything but the schedule.
struct Header {
    info: EventInfoDto,
    time_zone: Tz,
    stages: Vec<Stage>,
    stage_resolver: StageResolver,
    contact_numbers: Vec<ContactNumber>,
    artists: Vec<Artist>,
    artist_roster: ArtistRoster,
}

impl Event {
    /// Convert an event directory into an event.
    ///
    /// Header files and schedule files are all decoded before anything fails, so a
    /// single run reports as many problems as possible. Page resolution only starts
    /// once every file decoded.
    pub fn parse(files: &EventFiles, options: ParseOptions) -> Result<ParsedEvent, Vec<EventError>> {
        let mut errors = Vec::new();

        let header = parse_header(files, &mut errors);
        let days = parse_day_files(&files.schedules, &mut errors);

        let Some(header) = header.filter(|_| errors.is_empty()) else {
            return Err(finish_errors(errors, options));
        };

        let mut diagnostics = Diagnostics::default();
        let pages = collect_pages(&days, &header.stage_resolver, &mut diagnostics);

        let resolve = |page: &PageSource<'_>| {
            resolve_page(page, &days[page.day], header.time_zone, &header.artist_roster)
        };
        let resolved: Vec<_> = if options.parallel {
            pages.par_iter().map(resolve).collect()
        } else {
            pages.iter().map(resolve).collect()
        };

        let mut stage_schedules: Vec<BTreeMap<StageId, Vec<StagePerformance>>> =
            vec![BTreeMap::new(); days.len()];
        for (page, result) in pages.iter().zip(resolved) {
            match result {
                Ok(performances) if performances.is_empty() => {}
                Ok(performances) => {
                    stage_schedules[page.day].insert(page.stage_id.clone(), performances);
                }
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(finish_errors(errors, options));
        }

        diagnostics.extend(unknown_artists(stage_schedules.iter()));

        let days: Vec<Day> = days
            .into_iter()
            .zip(stage_schedules)
            .map(|(source, stage_schedules)| Day {
                id: source.id,
                date: source.date,
                custom_title: source.custom_title,
                stage_schedules,
            })
            .collect();

        let schedule = Schedule::build(days).map_err(|errors| finish_errors(errors, options))?;

        debug!(
            "Parsed event '{}': {} performances, {} artists, {} stages",
            header.info.name,
            schedule.len(),
            header.artists.len(),
            header.stages.len()
        );

        let event = Event {
            name: header.info.name,
            time_zone: header.time_zone,
            info: EventInfo {
                image_url: header.info.image_url,
                site_map_image_url: header.info.site_map_image_url,
                address: header.info.address,
            },
            artists: header.artists,
            stages: header.stages,
            schedule,
            contact_numbers: header.contact_numbers,
            color_scheme: header.info.color_scheme.map(ColorScheme::from),
            stage_resolver: header.stage_resolver,
            artist_roster: header.artist_roster,
        };

        Ok(ParsedEvent { event, diagnostics })
    }

    pub fn stage_resolver(&self) -> &StageResolver {
        &self.stage_resolver
    }

    pub fn artist_roster(&self) -> &ArtistRoster {
        &self.artist_roster
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| &stage.id == id)
    }

    pub fn artist(&self, id: &ArtistId) -> Option<&Artist> {
        self.artists
            .binary_search_by(|artist| artist.id.cmp(id))
            .ok()
            .map(|index| &self.artists[index])
    }
}

fn finish_errors(mut errors: Vec<EventError>, options: ParseOptions) -> Vec<EventError> {
    if options.fail_fast {
        errors.truncate(1);
    }
    errors
}

/// Decode the header files. Returns `None` if any of them failed.
fn parse_header(files: &EventFiles, errors: &mut Vec<EventError>) -> Option<Header> {
    let info = record(errors, parse_event_info(files.event_info.as_deref()));
    let time_zone = info
        .as_ref()
        .and_then(|info| record(errors, parse_time_zone(&info.time_zone)));
    let stages = record(errors, parse_stages(files.stages.as_deref()));
    let contact_numbers = record(errors, parse_contact_info(files.contact_info.as_deref()));
    let artists = record(errors, parse_artists(&files.artists));

    let (info, time_zone, stages, contact_numbers, (artists, artist_roster)) =
        (info?, time_zone?, stages?, contact_numbers?, artists?);
    let stage_resolver = record(errors, StageResolver::new(&stages))?;

    Some(Header {
        info,
        time_zone,
        stages,
        stage_resolver,
        contact_numbers,
        artists,
        artist_roster,
    })
}

fn record<T>(errors: &mut Vec<EventError>, result: EventResult<T>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

fn parse_event_info(content: Option<&str>) -> EventResult<EventInfoDto> {
    let content = content.ok_or(EventError::MissingFile(EVENT_INFO_FILE))?;
    decode_yaml(EVENT_INFO_FILE, content)
}

fn parse_time_zone(name: &str) -> EventResult<Tz> {
    name.parse()
        .map_err(|_| EventError::UnknownTimeZone(name.to_string()))
}

fn parse_stages(content: Option<&str>) -> EventResult<Vec<Stage>> {
    let content = content.ok_or(EventError::MissingFile(STAGES_FILE))?;
    let stages: Vec<StageDto> = decode_yaml_or_default(STAGES_FILE, content)?;
    Ok(stages.into_iter().map(Stage::from).collect())
}

fn parse_contact_info(content: Option<&str>) -> EventResult<Vec<ContactNumber>> {
    let Some(content) = content else {
        return Ok(Vec::new());
    };
    let contacts: Vec<ContactInfoDto> = decode_yaml_or_default(CONTACT_INFO_FILE, content)?;
    Ok(contacts.into_iter().map(ContactNumber::from).collect())
}

fn parse_artists(files: &[NamedFile]) -> EventResult<(Vec<Artist>, ArtistRoster)> {
    let mut artists = files
        .iter()
        .map(|file| Artist::from_markdown(&file.name, &file.content))
        .collect::<EventResult<Vec<_>>>()?;
    let roster = ArtistRoster::new(&artists)?;
    artists.sort_by(|a, b| a.id.cmp(&b.id));
    Ok((artists, roster))
}

fn parse_day_files(files: &[NamedFile], errors: &mut Vec<EventError>) -> Vec<DaySource> {
    files
        .iter()
        .filter_map(|file| {
            let label = format!("schedule/{}.yml", file.name);
            let dto: DayScheduleDto = record(errors, decode_yaml_or_default(&label, &file.content))?;

            let id = if file.name.trim().is_empty() {
                DayId::from_parts(dto.custom_title.as_deref(), dto.date)
            } else {
                DayId::from_file_stem(&file.name)
            };

            Some(DaySource {
                id,
                date: dto.date,
                custom_title: dto.custom_title,
                performances: dto.performances,
            })
        })
        .collect()
}

/// Pair every stage list with its stage. Lists under unknown stage names are dropped.
fn collect_pages<'a>(
    days: &'a [DaySource],
    stages: &StageResolver,
    diagnostics: &mut Diagnostics,
) -> Vec<PageSource<'a>> {
    let mut pages = Vec::new();

    for (index, day) in days.iter().enumerate() {
        for (stage_name, records) in &day.performances {
            match stages.resolve(stage_name) {
                Some(stage_id) => pages.push(PageSource {
                    day: index,
                    stage_name,
                    stage_id: stage_id.clone(),
                    records,
                }),
                None => {
                    warn!(
                        "Skipping {} performances on unknown stage '{}' ({})",
                        records.len(),
                        stage_name,
                        day.id
                    );
                    diagnostics.push(Diagnostic::UnknownStage {
                        day: day.id.clone(),
                        stage: stage_name.clone(),
                        dropped: records.len(),
                    });
                }
            }
        }
    }

    pages
}

fn resolve_page(
    page: &PageSource<'_>,
    day: &DaySource,
    time_zone: Tz,
    roster: &ArtistRoster,
) -> EventResult<Vec<StagePerformance>> {
    let timed = resolve_stage(page.records).map_err(|source| EventError::StageDay {
        day: day.id.clone(),
        stage: page.stage_name.to_string(),
        source,
    })?;

    let context = PageContext {
        day_id: &day.id,
        date: day.date,
        time_zone,
        stage_id: &page.stage_id,
    };
    let performances = place_on_stage(&timed, &context, roster);

    debug!(
        "Resolved {} / {}: {} performances",
        day.id,
        page.stage_id,
        performances.len()
    );

    Ok(performances)
}

/// Names of every artist without an artist file, each once, sorted.
fn unknown_artists<'a>(
    pages: impl Iterator<Item = &'a BTreeMap<StageId, Vec<StagePerformance>>>,
) -> impl Iterator<Item = Diagnostic> {
    let names: BTreeSet<String> = pages
        .flat_map(|stages| stages.values())
        .flatten()
        .flat_map(|performance| &performance.artists)
        .filter_map(|artist| match artist {
            ArtistRef::Anonymous(name) => Some(name.clone()),
            ArtistRef::Known(_) => None,
        })
        .collect();

    names.into_iter().map(|name| Diagnostic::UnknownArtist { name })
}
