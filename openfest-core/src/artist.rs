//! Artists and references to them from the schedule.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dto::{decode_yaml_or_default, ArtistFrontMatter};
use crate::error::{EventError, EventResult};
use crate::ids::ArtistId;

/// An artist declared by a Markdown file under `artists/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Artist {
    /// Build an artist from its file: `name` is the file stem, `content` the Markdown
    /// with optional YAML front matter.
    pub fn from_markdown(name: &str, content: &str) -> EventResult<Self> {
        let (front_matter, body) = split_front_matter(content);
        let file = format!("artists/{}.md", name);

        let front_matter: ArtistFrontMatter = match front_matter {
            Some(yaml) => decode_yaml_or_default(&file, yaml)?,
            None => ArtistFrontMatter::default(),
        };

        let bio = body.trim();

        Ok(Artist {
            id: ArtistId::from_name(name),
            name: name.to_string(),
            bio: (!bio.is_empty()).then(|| bio.to_string()),
            image_url: front_matter.image_url,
            links: front_matter.links,
        })
    }
}

/// Split `---`-delimited front matter from the body.
///
/// Content without an opening `---` line, or without a closing one, is all body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, content)
}

/// An artist named in the schedule.
///
/// Schedules may name people that have no artist file (guests, typos). Those stay
/// `Anonymous` instead of failing the parse, and never enter the artist index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtistRef {
    Known(ArtistId),
    Anonymous(String),
}

impl ArtistRef {
    pub fn known_id(&self) -> Option<&ArtistId> {
        match self {
            ArtistRef::Known(id) => Some(id),
            ArtistRef::Anonymous(_) => None,
        }
    }
}

/// Name → id table for the artists of an event.
#[derive(Debug, Clone, Default)]
pub struct ArtistRoster {
    by_name: HashMap<String, ArtistId>,
}

impl ArtistRoster {
    /// Fails on the first two artists whose names slug to the same id.
    pub fn new(artists: &[Artist]) -> EventResult<Self> {
        let mut by_name = HashMap::with_capacity(artists.len());
        let mut seen = HashSet::with_capacity(artists.len());

        for artist in artists {
            if !seen.insert(artist.id.clone()) {
                return Err(EventError::DuplicateArtistId {
                    name: artist.name.clone(),
                    id: artist.id.clone(),
                });
            }
            by_name.insert(artist.name.clone(), artist.id.clone());
        }

        Ok(ArtistRoster { by_name })
    }

    pub fn id_for(&self, name: &str) -> Option<&ArtistId> {
        self.by_name.get(name)
    }

    /// Exact-match lookup; anything not on the roster becomes `Anonymous`.
    pub fn resolve(&self, name: &str) -> ArtistRef {
        match self.id_for(name) {
            Some(id) => ArtistRef::Known(id.clone()),
            None => ArtistRef::Anonymous(name.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
