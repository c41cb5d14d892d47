//! A day of the festival: one schedule file, its stages and their performances.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{DayId, StageId};
use crate::performance::StagePerformance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub date: Option<NaiveDate>,
    pub custom_title: Option<String>,
    /// Running order per stage. Stages with no performances are absent.
    pub stage_schedules: BTreeMap<StageId, Vec<StagePerformance>>,
}

impl Day {
    pub fn metadata(&self) -> DayMetadata {
        DayMetadata {
            id: self.id.clone(),
            date: self.date,
            custom_title: self.custom_title.clone(),
        }
    }

    pub fn performance_count(&self) -> usize {
        self.stage_schedules.values().map(Vec::len).sum()
    }
}

/// What a day picker needs to know about a day, without its performances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayMetadata {
    pub id: DayId,
    pub date: Option<NaiveDate>,
    pub custom_title: Option<String>,
}

impl DayMetadata {
    /// The custom title, else the weekday and date, else the id.
    pub fn title(&self) -> String {
        match (&self.custom_title, self.date) {
            (Some(title), _) => title.clone(),
            (None, Some(date)) => date.format("%A, %B %-d").to_string(),
            (None, None) => self.id.to_string(),
        }
    }

    /// Dated days first, by date; then undated days. Ties break on id.
    pub fn display_order(&self, other: &Self) -> Ordering {
        let by_date = match (self.date, other.date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| self.id.cmp(&other.id))
    }
}
