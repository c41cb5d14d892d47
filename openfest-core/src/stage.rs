//! Stages and the stage-name resolution table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dto::StageDto;
use crate::error::{EventError, EventResult};
use crate::ids::StageId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

impl From<StageDto> for Stage {
    fn from(dto: StageDto) -> Self {
        Stage {
            id: StageId::from_name(&dto.name),
            name: dto.name,
            color: dto.color,
            image_url: dto.image_url,
        }
    }
}

/// Maps the stage names used as keys in schedule files to stage ids.
#[derive(Debug, Clone, Default)]
pub struct StageResolver {
    by_name: HashMap<String, StageId>,
}

impl StageResolver {
    /// Every stage id must be unique.
    pub fn new(stages: &[Stage]) -> EventResult<Self> {
        let mut by_name = HashMap::with_capacity(stages.len());
        let mut seen = HashSet::with_capacity(stages.len());

        for stage in stages {
            if !seen.insert(stage.id.clone()) {
                return Err(EventError::DuplicateStage {
                    name: stage.name.clone(),
                    id: stage.id.clone(),
                });
            }
            by_name.insert(stage.name.clone(), stage.id.clone());
        }

        Ok(StageResolver { by_name })
    }

    /// Exact-match lookup of a stage name.
    pub fn resolve(&self, name: &str) -> Option<&StageId> {
        self.by_name.get(name)
    }
}
