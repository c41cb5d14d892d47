//! Problems that do not stop an event from parsing, but that someone should look at.

use std::fmt;

use serde::Serialize;

use crate::ids::DayId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A schedule file lists performances under a stage name not in `stages.yml`.
    /// Those performances are left out of the schedule.
    UnknownStage {
        day: DayId,
        stage: String,
        dropped: usize,
    },

    /// A performance names an artist that has no file under `artists/`.
    UnknownArtist { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownStage {
                day,
                stage,
                dropped,
            } => write!(
                f,
                "{}: unknown stage '{}', skipped {} performance{}",
                day,
                stage,
                dropped,
                if *dropped == 1 { "" } else { "s" }
            ),
            Diagnostic::UnknownArtist { name } => {
                write!(f, "'{}' has no artist file", name)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn unknown_stages(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnknownStage { .. }))
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let stage = Diagnostic::UnknownStage {
            day: DayId::from_file_stem("friday"),
            stage: "Main Stage".to_string(),
            dropped: 1,
        };
        assert_eq!(
            stage.to_string(),
            "friday: unknown stage 'Main Stage', skipped 1 performance"
        );

        let artist = Diagnostic::UnknownArtist {
            name: "Special Guest".to_string(),
        };
        assert_eq!(artist.to_string(), "'Special Guest' has no artist file");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let diagnostic = Diagnostic::UnknownStage {
            day: DayId::from_file_stem("friday"),
            stage: "Main".to_string(),
            dropped: 2,
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "unknownStage");
        assert_eq!(json["day"], "friday");
        assert_eq!(json["dropped"], 2);
    }

    #[test]
    fn test_unknown_stages_filter() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(Diagnostic::UnknownArtist {
            name: "X".to_string(),
        });
        diagnostics.push(Diagnostic::UnknownStage {
            day: DayId::from_file_stem("friday"),
            stage: "Main".to_string(),
            dropped: 2,
        });

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.unknown_stages().count(), 1);
    }
}
