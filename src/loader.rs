//! Read an event directory into memory.
//!
//! ```text
//! event-info.yml
//! stages.yml
//! contact-info.yml      (optional)
//! schedule/<day>.yml
//! artists/<name>.md
//! ```
//!
//! `.yaml` works wherever `.yml` does. Anything else in the directory is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use openfest_core::event::{CONTACT_INFO_FILE, EVENT_INFO_FILE, STAGES_FILE};
use openfest_core::{EventFiles, NamedFile};
use tracing::debug;

const YAML_EXTENSIONS: [&str; 2] = ["yml", "yaml"];
const MARKDOWN_EXTENSIONS: [&str; 1] = ["md"];

pub fn load(dir: &Path) -> Result<EventFiles> {
    if !dir.is_dir() {
        anyhow::bail!("'{}' is not a directory", dir.display());
    }

    let files = EventFiles {
        event_info: read_optional(dir, EVENT_INFO_FILE)?,
        stages: read_optional(dir, STAGES_FILE)?,
        contact_info: read_optional(dir, CONTACT_INFO_FILE)?,
        schedules: read_named(&dir.join("schedule"), &YAML_EXTENSIONS)?,
        artists: read_named(&dir.join("artists"), &MARKDOWN_EXTENSIONS)?,
    };

    debug!(
        "Loaded {}: {} schedule files, {} artist files",
        dir.display(),
        files.schedules.len(),
        files.artists.len()
    );

    Ok(files)
}

/// Read `name`, or the same file with a `.yaml` extension.
fn read_optional(dir: &Path, name: &str) -> Result<Option<String>> {
    let primary = dir.join(name);
    let alternate = primary.with_extension("yaml");

    for path in [primary, alternate] {
        if path.is_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            return Ok(Some(content));
        }
    }

    Ok(None)
}

/// Every file in `dir` with one of `extensions`, sorted by name. A missing directory
/// has no files.
fn read_named(dir: &Path, extensions: &[&str]) -> Result<Vec<NamedFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Could not read {}", dir.display()))? {
        let path = entry?.path();

        if path.is_file()
            && let Some(extension) = path.extension().and_then(|e| e.to_str())
            && extensions.contains(&extension)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            files.push(NamedFile::new(stem, content));
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
