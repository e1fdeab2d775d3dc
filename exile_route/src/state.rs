use std::collections::BTreeSet;

use exile_data::Id;

use crate::gems::GemQueue;

/// Everything the resolver remembers while walking a route.
///
/// One state is threaded through every line of a route group (all act files,
/// or all four voidstone files) and dropped once the group is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteState {
    pub current_area_id: Option<Id>,
    pub last_town_area_id: Option<Id>,
    pub portal_area_id: Option<Id>,
    pub acquired_waypoints: BTreeSet<Id>,
    pub completed_quests: BTreeSet<Id>,
    pub gem_queue: GemQueue,
}

impl RouteState {
    pub fn new(gem_queue: GemQueue) -> Self {
        Self {
            gem_queue,
            ..Self::default()
        }
    }
}
