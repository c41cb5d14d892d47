//! Identifiers for stages, artists, days and performances.
//!
//! Every identifier is derived from content (names, filenames, titles, times) so that
//! parsing the same event directory twice produces the same ids. No counters, no UUIDs.

use std::borrow::Borrow;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::artist::ArtistRef;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Slug of a stage's display name.
    StageId
}

string_id! {
    /// Slug of an artist's name (the artist file's stem).
    ArtistId
}

string_id! {
    /// One schedule page: a schedule file.
    DayId
}

string_id! {
    /// `title|artists|start|stage`, see [`PerformanceId::derive`].
    PerformanceId
}

/// Slug of `name`, or `fallback` when nothing slug-able is left.
fn slug_or(name: &str, fallback: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

impl StageId {
    pub fn from_name(name: &str) -> Self {
        StageId(slug_or(name, "stage"))
    }
}

impl ArtistId {
    pub fn from_name(name: &str) -> Self {
        ArtistId(slug_or(name, "artist"))
    }
}

impl DayId {
    /// Day ids come from the schedule file's name, e.g. `friday.yml` → `friday`.
    pub fn from_file_stem(stem: &str) -> Self {
        DayId(slug_or(stem, "day"))
    }

    /// Fallback for days without a file name: `"{title}-{date}"`, whichever parts exist.
    pub fn from_parts(custom_title: Option<&str>, date: Option<NaiveDate>) -> Self {
        let date = date.map(|d| d.format("%Y-%m-%d").to_string());
        let parts: Vec<&str> = custom_title
            .into_iter()
            .chain(date.as_deref())
            .collect();
        DayId(slug_or(&parts.join("-"), "day"))
    }
}

impl PerformanceId {
    /// Compose a performance id from its content.
    ///
    /// `start` is the event-local start of the performance (`2024-06-28T22:30`, or
    /// `<day id>T22:30` for undated days). Anonymous artists are prefixed with `~` so
    /// they never collide with a registered artist of the same slug.
    pub fn derive(
        custom_title: Option<&str>,
        artists: &[ArtistRef],
        start: &str,
        stage: &StageId,
    ) -> Self {
        let artists = artists
            .iter()
            .map(|artist| match artist {
                ArtistRef::Known(id) => id.to_string(),
                ArtistRef::Anonymous(name) => format!("~{}", slug_or(name, "artist")),
            })
            .collect::<Vec<_>>()
            .join("+");

        PerformanceId(format!(
            "{}|{}|{}|{}",
            custom_title.unwrap_or_default(),
            artists,
            start,
            stage
        ))
    }
}
