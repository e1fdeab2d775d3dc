//! Endgame atlas completion checklist.
//!
//! A fixed guide of phases, each a list of steps the player ticks off by id
//! in the `atlas-completion` namespace. The guide is read from
//! `atlas_guide.json`; progress over it lives in [`crate::progress`].

use serde::{Deserialize, Serialize};

use exile_data::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasStep {
    pub id: Id,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasPhase {
    pub phase: String,
    #[serde(default)]
    pub steps: Vec<AtlasStep>,
}

/// The phases of the atlas guide, in play order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtlasGuide {
    pub phases: Vec<AtlasPhase>,
}

impl AtlasGuide {
    pub fn steps(&self) -> impl Iterator<Item = &AtlasStep> {
        self.phases.iter().flat_map(|p| &p.steps)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.steps().map(|s| s.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&AtlasStep> {
        self.steps().find(|s| s.id == id)
    }
}
