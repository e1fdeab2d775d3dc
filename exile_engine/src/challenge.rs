//! Atlas challenge checklist and its links to route steps.
//!
//! Some challenges are completed by killing a specific boss or by running a
//! labyrinth tier. The matcher walks a parsed route and attaches the relevant
//! challenge to each step, so the CLI can show it next to the step.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use exile_data::{AscendVersion, Fragment, Id, RouteSection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDef {
    pub id: Id,
    pub text: String,
}

/// Challenge checklist plus the boss and labyrinth links, as stored in
/// `challenges.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeData {
    #[serde(default)]
    pub challenges: Vec<ChallengeDef>,
    /// Boss name -> challenge ids, one entry per appearance of the boss.
    #[serde(default)]
    pub bosses: BTreeMap<String, Vec<Id>>,
    #[serde(default)]
    pub ascend: BTreeMap<AscendVersion, Id>,
}

impl ChallengeData {
    pub fn ids(&self) -> Vec<&str> {
        self.challenges.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ChallengeDef> {
        self.challenges.iter().find(|c| c.id == id)
    }
}

/// Challenges attached to one fragment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChallenges {
    pub section: usize,
    pub step: usize,
    pub challenge_ids: Vec<Id>,
}

pub struct ChallengeMatcher<'a> {
    data: &'a ChallengeData,
}

impl<'a> ChallengeMatcher<'a> {
    pub fn new(data: &'a ChallengeData) -> Self {
        Self { data }
    }

    /// Walk `route` in order and attach challenges to the steps that earn them.
    ///
    /// The n-th kill of a boss uses the n-th entry of that boss's list; kills
    /// past the end of the list reuse the last entry.
    pub fn annotate(&self, route: &[RouteSection]) -> Vec<StepChallenges> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut out = Vec::new();
        for (section_index, section) in route.iter().enumerate() {
            for (step_index, step) in section.fragment_steps() {
                let mut ids = Vec::new();
                for fragment in step.fragments() {
                    match fragment {
                        Fragment::Kill { value } => {
                            let Some(refs) = self.data.bosses.get(value.as_str()) else {
                                continue;
                            };
                            let count = seen.entry(value.as_str()).or_default();
                            if let Some(id) = refs.get((*count).min(refs.len().saturating_sub(1))) {
                                ids.push(id.clone());
                            }
                            *count += 1;
                        },
                        Fragment::Ascend { version } => {
                            if let Some(id) = self.data.ascend.get(version) {
                                ids.push(id.clone());
                            }
                        },
                        _ => {},
                    }
                }
                if !ids.is_empty() {
                    out.push(StepChallenges {
                        section: section_index,
                        step: step_index,
                        challenge_ids: ids,
                    });
                }
            }
        }
        out
    }
}
