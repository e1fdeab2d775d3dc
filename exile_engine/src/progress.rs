//! Derived progress over parsed routes.
//!
//! Every function here is a pure read of a route and a [`ToggleStore`]. Only
//! keys belonging to steps that exist in the route are ever read, so stale
//! toggles from an older route layout never inflate a count.

use serde::Serialize;

use exile_data::{FragmentStep, RouteSection, Step, step_key};

use crate::atlas::AtlasGuide;
use crate::toggle_store::{Namespace, ToggleStore};

/// Number of atlas bosses tracked by the voidstone route.
pub const VOIDSTONE_TOTAL: usize = exile_route::VOIDSTONE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSummary {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = self.completed as f32 / self.total as f32;
            ratio * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub name: String,
    pub completed: usize,
    pub total: usize,
}

impl SectionSummary {
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            completed: self.completed,
            total: self.total,
        }
    }
}

/// The first section with unfinished steps, and those steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSection<'a> {
    pub index: usize,
    pub section: &'a RouteSection,
    /// Unfinished fragment steps with their position in the section.
    pub pending: Vec<(usize, &'a FragmentStep)>,
}

fn section_summary(section_index: usize, section: &RouteSection, store: &dyn ToggleStore, ns: Namespace) -> SectionSummary {
    let mut summary = SectionSummary {
        name: section.name.clone(),
        completed: 0,
        total: 0,
    };
    for (step_index, _) in section.fragment_steps() {
        summary.total += 1;
        if store.get(ns, &step_key(section_index, step_index)) {
            summary.completed += 1;
        }
    }
    summary
}

fn sum(sections: &[SectionSummary]) -> ProgressSummary {
    sections.iter().fold(ProgressSummary::default(), |acc, s| ProgressSummary {
        completed: acc.completed + s.completed,
        total: acc.total + s.total,
    })
}

/// Per-section completion of the act route, in route order.
pub fn section_summaries(route: &[RouteSection], store: &dyn ToggleStore) -> Vec<SectionSummary> {
    route
        .iter()
        .enumerate()
        .map(|(idx, section)| section_summary(idx, section, store, Namespace::ROUTE))
        .collect()
}

/// Completed over total fragment steps of the act route. Gem steps are
/// tracked separately by [`gem_summary`].
pub fn route_summary(route: &[RouteSection], store: &dyn ToggleStore) -> ProgressSummary {
    sum(&section_summaries(route, store))
}

fn first_incomplete<'a>(route: &'a [RouteSection], store: &dyn ToggleStore, ns: Namespace) -> Option<CurrentSection<'a>> {
    route.iter().enumerate().find_map(|(index, section)| {
        let pending: Vec<(usize, &FragmentStep)> = section
            .fragment_steps()
            .filter(|(step_index, _)| !store.get(ns, &step_key(index, *step_index)))
            .collect();
        (!pending.is_empty()).then_some(CurrentSection { index, section, pending })
    })
}

/// The first section that is not fully complete, or `None` once every
/// section is done.
pub fn current_section<'a>(route: &'a [RouteSection], store: &dyn ToggleStore) -> Option<CurrentSection<'a>> {
    first_incomplete(route, store, Namespace::ROUTE)
}

/// Same as [`current_section`] for the voidstone route.
pub fn current_voidstone_section<'a>(route: &'a [RouteSection], store: &dyn ToggleStore) -> Option<CurrentSection<'a>> {
    first_incomplete(route, store, Namespace::VOIDSTONE)
}

/// Boss steps are fragment steps holding exactly one `kill` fragment.
fn is_boss_step(step: &FragmentStep) -> bool {
    step.kill_count() == 1
}

/// Bosses killed, out of a fixed four.
pub fn voidstone_summary(route: &[RouteSection], store: &dyn ToggleStore) -> ProgressSummary {
    let killed = route
        .iter()
        .enumerate()
        .flat_map(|(s, section)| {
            section
                .fragment_steps()
                .filter(|(_, step)| is_boss_step(step))
                .map(move |(i, _)| (s, i))
        })
        .filter(|&(s, i)| store.get(Namespace::VOIDSTONE, &step_key(s, i)))
        .count();
    ProgressSummary {
        completed: killed.min(VOIDSTONE_TOTAL),
        total: VOIDSTONE_TOTAL,
    }
}

/// Per-section completion of the voidstone route.
pub fn voidstone_section_summaries(route: &[RouteSection], store: &dyn ToggleStore) -> Vec<SectionSummary> {
    route
        .iter()
        .enumerate()
        .map(|(idx, section)| section_summary(idx, section, store, Namespace::VOIDSTONE))
        .collect()
}

/// Gem steps acquired, keyed by gem id.
pub fn gem_summary(route: &[RouteSection], store: &dyn ToggleStore) -> ProgressSummary {
    let gems: Vec<&str> = route
        .iter()
        .flat_map(|s| &s.steps)
        .filter_map(Step::as_gem_step)
        .map(|g| g.required_gem.id.as_str())
        .collect();
    ProgressSummary {
        completed: gems.iter().filter(|id| store.get(Namespace::GEMS, id)).count(),
        total: gems.len(),
    }
}

/// Completed challenges out of the known challenge ids.
pub fn challenge_summary<S: AsRef<str>>(challenge_ids: &[S], store: &dyn ToggleStore) -> ProgressSummary {
    ProgressSummary {
        completed: challenge_ids
            .iter()
            .filter(|id| store.get(Namespace::CHALLENGES, id.as_ref()))
            .count(),
        total: challenge_ids.len(),
    }
}

/// Ticked atlas guide steps out of all steps in the guide.
pub fn atlas_summary(guide: &AtlasGuide, store: &dyn ToggleStore) -> ProgressSummary {
    sum(&atlas_phase_summaries(guide, store))
}

/// Per-phase completion of the atlas guide, in guide order.
pub fn atlas_phase_summaries(guide: &AtlasGuide, store: &dyn ToggleStore) -> Vec<SectionSummary> {
    guide
        .phases
        .iter()
        .map(|phase| SectionSummary {
            name: phase.phase.clone(),
            completed: phase.steps.iter().filter(|s| store.get(Namespace::ATLAS, &s.id)).count(),
            total: phase.steps.len(),
        })
        .collect()
}
