//! Shapes of the files in an event directory, as they are written on disk.
//!
//! These types are decoded straight from YAML and carry no validation beyond what serde
//! does. The rest of the crate converts them into domain types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::artist::Link;
use crate::error::{EventError, EventResult};

/// `event-info.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfoDto {
    pub name: String,
    pub time_zone: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "siteMapImageURL")]
    pub site_map_image_url: Option<String>,
    pub address: Option<String>,
    pub color_scheme: Option<ColorSchemeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSchemeDto {
    pub primary_color: String,
    pub workshops_color: Option<String>,
}

/// One entry of `stages.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDto {
    pub name: String,
    pub color: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

/// One entry of `contact-info.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoDto {
    pub phone_number: String,
    pub title: String,
    pub description: Option<String>,
}

/// A file under `schedule/`: one day's performances, keyed by stage name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScheduleDto {
    pub custom_title: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub performances: BTreeMap<String, Vec<PerformanceDto>>,
}

/// A raw performance record, one list entry under a stage name.
///
/// `artist` and `artists` are mutually exclusive; that is checked by the decoder,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<String>>,
    #[serde(deserialize_with = "time_string")]
    pub time: String,
    #[serde(
        default,
        deserialize_with = "optional_time_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<String>,
}

impl PerformanceDto {
    /// Short human description used in error messages, e.g. "Prism Sound @ 10 PM".
    pub fn label(&self) -> String {
        let who = match (&self.title, &self.artist, &self.artists) {
            (Some(title), _, _) if !title.trim().is_empty() => title.clone(),
            (_, Some(artist), _) => artist.clone(),
            (_, _, Some(artists)) => artists.join(", "),
            _ => "(untitled)".to_string(),
        };
        format!("{} @ {}", who, self.time)
    }
}

/// Front matter of an artist Markdown file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtistFrontMatter {
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Times are usually strings, but YAML reads a bare `time: 2` as an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeScalar {
    Text(String),
    Integer(i64),
}

impl From<TimeScalar> for String {
    fn from(value: TimeScalar) -> Self {
        match value {
            TimeScalar::Text(s) => s,
            TimeScalar::Integer(n) => n.to_string(),
        }
    }
}

fn time_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    TimeScalar::deserialize(deserializer).map(String::from)
}

fn optional_time_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<TimeScalar>::deserialize(deserializer).map(|value| value.map(String::from))
}

/// Decode one YAML document, naming `file` in the error.
pub fn decode_yaml<T: DeserializeOwned>(file: &str, content: &str) -> EventResult<T> {
    serde_yaml::from_str(content).map_err(|e| EventError::Yaml {
        file: file.to_string(),
        message: e.to_string(),
    })
}

/// Like [`decode_yaml`], but an empty document decodes to `T::default()`.
pub fn decode_yaml_or_default<T: DeserializeOwned + Default>(
    file: &str,
    content: &str,
) -> EventResult<T> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    decode_yaml(file, content)
}
