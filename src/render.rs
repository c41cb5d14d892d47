//! Colored terminal rendering for validation results.

use owo_colors::OwoColorize;

use openfest_core::{Diagnostic, EventError};

use crate::commands::validate::{DaySummary, Summary};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Diagnostic {
    fn render(&self) -> String {
        format!("{} {}", "!".yellow(), self.to_string().yellow())
    }
}

impl Render for EventError {
    fn render(&self) -> String {
        format!("{} {}", "✗".red(), self.to_string().red())
    }
}

impl Render for [EventError] {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.len().to_string().red().bold(),
            pluralize("error", self.len()).red()
        )];
        lines.extend(self.iter().map(|e| format!("   {}", e.render())));
        lines.join("\n")
    }
}

impl Render for DaySummary {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.title.bold(),
            format!(
                "({}, {} {} on {} {})",
                self.id,
                self.performances,
                pluralize("performance", self.performances),
                self.stages,
                pluralize("stage", self.stages)
            )
            .dimmed()
        )
    }
}

impl Render for Summary {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("{} {} {}", "✓".green(), self.name.bold(), self.time_zone.dimmed()),
            format!(
                "   {} {}, {} {}, {} {}",
                self.stages,
                pluralize("stage", self.stages),
                self.artists,
                pluralize("artist", self.artists),
                self.performances,
                pluralize("performance", self.performances)
            ),
        ];

        if !self.days.is_empty() {
            lines.push(String::new());
            lines.extend(self.days.iter().map(|day| format!("   {}", day.render())));
        }

        if !self.diagnostics.is_empty() {
            lines.push(String::new());
            lines.extend(self.diagnostics.iter().map(|d| format!("   {}", d.render())));
        }

        lines.join("\n")
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
