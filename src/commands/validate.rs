use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use openfest_core::{Diagnostic, Event, EventError, ParseOptions, ParsedEvent};
use serde::Serialize;

use crate::loader;
use crate::render::Render;

/// What `validate` reports about an event that parsed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub name: String,
    pub time_zone: String,
    pub stages: usize,
    pub artists: usize,
    pub performances: usize,
    pub days: Vec<DaySummary>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub stages: usize,
    pub performances: usize,
}

impl Summary {
    pub fn new(parsed: &ParsedEvent) -> Self {
        let event: &Event = &parsed.event;
        let schedule = &event.schedule;

        let days = schedule
            .day_metadata()
            .iter()
            .map(|day| {
                let stages = schedule.stage_ids_for_day(&day.id);
                DaySummary {
                    id: day.id.to_string(),
                    title: day.title(),
                    date: day.date,
                    performances: stages
                        .iter()
                        .map(|stage| schedule.page_ids(&day.id, stage).len())
                        .sum(),
                    stages: stages.len(),
                }
            })
            .collect();

        Summary {
            name: event.name.clone(),
            time_zone: event.time_zone.name().to_string(),
            stages: event.stages.len(),
            artists: event.artists.len(),
            performances: schedule.len(),
            days,
            diagnostics: parsed.diagnostics.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum Report<'a> {
    Valid {
        #[serde(flatten)]
        summary: &'a Summary,
    },
    Invalid {
        errors: Vec<String>,
    },
}

pub fn run(path: &Path, options: ParseOptions, json: bool) -> Result<()> {
    let files = loader::load(path)?;

    match Event::parse(&files, options) {
        Ok(parsed) => {
            let summary = Summary::new(&parsed);
            if json {
                println!("{}", serde_json::to_string_pretty(&Report::Valid { summary: &summary })?);
            } else {
                println!("{}", summary.render());
            }
            Ok(())
        }
        Err(errors) => {
            if json {
                let report = Report::Invalid {
                    errors: errors.iter().map(EventError::to_string).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", errors.render());
            }
            anyhow::bail!(
                "{} is not a valid event ({} {})",
                path.display(),
                errors.len(),
                if errors.len() == 1 { "error" } else { "errors" }
            );
        }
    }
}
