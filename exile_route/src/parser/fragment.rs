//! Tag resolution: raw tags become typed fragments.
//!
//! Movement tags (`enter`, `waypoint`, `portal`, `logout`) and `quest` update
//! the route state as a side effect, so tags must be resolved in source order.

use exile_data::{AreaDef, AscendVersion, Fragment, FragmentKind, ReferenceData, RewardType};

use super::TagAst;
use crate::error::RouteErrorKind;
use crate::state::RouteState;

/// Resolve one tag against the reference data, updating `state`.
///
/// # Errors
/// Returns the first unknown keyword, arity mismatch, unknown reference or
/// movement inconsistency found in the tag.
pub(crate) fn resolve_tag(
    tag: &TagAst,
    state: &mut RouteState,
    reference: &ReferenceData,
) -> Result<Fragment, RouteErrorKind> {
    let kind =
        FragmentKind::from_keyword(&tag.keyword).ok_or_else(|| RouteErrorKind::UnknownFragment(tag.keyword.clone()))?;
    if kind.variant_for(tag.args.len()).is_none() {
        return Err(RouteErrorKind::BadArity {
            kind,
            args: tag.args.len(),
        });
    }
    let args = tag.args.as_slice();
    let first = || args.first().cloned().unwrap_or_default();

    let fragment = match kind {
        FragmentKind::Kill => Fragment::Kill { value: first() },
        FragmentKind::Arena => Fragment::Arena { value: first() },
        FragmentKind::QuestText => Fragment::QuestText { value: first() },
        FragmentKind::Generic => Fragment::Generic { value: first() },
        FragmentKind::League => Fragment::League { value: first() },
        FragmentKind::Copy => Fragment::Copy { text: first() },
        FragmentKind::Trial => Fragment::Trial,
        FragmentKind::Area => {
            let area = lookup_area(reference, &first())?;
            state.current_area_id = Some(area.id.clone());
            Fragment::Area { area_id: area.id.clone() }
        },
        FragmentKind::Enter => {
            let area = lookup_area(reference, &first())?;
            arrive(state, area);
            Fragment::Enter { area_id: area.id.clone() }
        },
        FragmentKind::Logout => {
            let town = state.last_town_area_id.clone().ok_or(RouteErrorKind::NoTownVisited)?;
            state.current_area_id = Some(town.clone());
            state.portal_area_id = None;
            Fragment::Logout { area_id: town }
        },
        FragmentKind::Waypoint => match args.first() {
            None => Fragment::Waypoint,
            Some(dst) => {
                let area = lookup_area(reference, dst)?;
                if !area.has_waypoint {
                    return Err(RouteErrorKind::NoWaypointInArea(area.id.clone()));
                }
                if !state.acquired_waypoints.contains(&area.id) {
                    return Err(RouteErrorKind::WaypointNotUnlocked(area.id.clone()));
                }
                let src = state.current_area_id.clone().ok_or(RouteErrorKind::NoCurrentArea)?;
                arrive(state, area);
                Fragment::WaypointUse {
                    dst_area_id: area.id.clone(),
                    src_area_id: src,
                }
            },
        },
        FragmentKind::WaypointGet => {
            let current = state.current_area_id.clone().ok_or(RouteErrorKind::NoCurrentArea)?;
            let area = lookup_area(reference, &current)?;
            if !area.has_waypoint {
                return Err(RouteErrorKind::NoWaypointInArea(current));
            }
            state.acquired_waypoints.insert(current);
            Fragment::WaypointGet
        },
        FragmentKind::Portal => match first().to_ascii_lowercase().as_str() {
            "set" => {
                let current = state.current_area_id.clone().ok_or(RouteErrorKind::NoCurrentArea)?;
                state.portal_area_id = Some(current);
                Fragment::PortalSet
            },
            "use" => {
                let dst = state.portal_area_id.take().ok_or(RouteErrorKind::NoPortalSet)?;
                state.current_area_id = Some(dst.clone());
                Fragment::PortalUse { dst_area_id: dst }
            },
            _ => return Err(RouteErrorKind::InvalidPortalAction(first())),
        },
        FragmentKind::Quest => {
            let quest_id = first();
            let quest = reference
                .quest(&quest_id)
                .ok_or_else(|| RouteErrorKind::UnknownQuest(quest_id.clone()))?;
            let reward_offers: Vec<String> = if args.len() > 1 {
                let listed = args[1..].to_vec();
                if let Some(missing) = listed.iter().find(|id| !quest.reward_offers.contains_key(*id)) {
                    return Err(RouteErrorKind::UnknownRewardOffer {
                        quest: quest_id,
                        offer: missing.clone(),
                    });
                }
                listed
            } else {
                quest.reward_offers.keys().cloned().collect()
            };
            state.completed_quests.insert(quest.id.clone());
            state.gem_queue.unlock_offers(quest, &reward_offers, reference);
            Fragment::Quest {
                quest_id: quest.id.clone(),
                reward_offers,
            }
        },
        FragmentKind::RewardQuest => {
            let item = first();
            if let Some(gem) = reference.find_gem(&item) {
                state.gem_queue.note_route_reward(gem, RewardType::Quest, reference);
            }
            Fragment::RewardQuest { item }
        },
        FragmentKind::RewardVendor => {
            let item = first();
            if let Some(gem) = reference.find_gem(&item) {
                state.gem_queue.note_route_reward(gem, RewardType::Vendor, reference);
            }
            Fragment::RewardVendor {
                item,
                cost: args.get(1).cloned(),
            }
        },
        FragmentKind::Ascend => {
            let raw = first();
            let version = AscendVersion::from_keyword(&raw).ok_or(RouteErrorKind::InvalidAscendVersion(raw))?;
            Fragment::Ascend { version }
        },
        FragmentKind::Crafting => {
            let area_id = match args.first() {
                Some(id) => id.clone(),
                None => state.current_area_id.clone().ok_or(RouteErrorKind::NoCurrentArea)?,
            };
            let area = lookup_area(reference, &area_id)?;
            Fragment::Crafting {
                crafting_recipes: area.crafting_recipes.clone(),
            }
        },
        FragmentKind::Dir => Fragment::Dir {
            dir_index: parse_direction(&first())?,
        },
    };
    Ok(fragment)
}

fn lookup_area<'a>(reference: &'a ReferenceData, id: &str) -> Result<&'a AreaDef, RouteErrorKind> {
    reference
        .area(id)
        .ok_or_else(|| RouteErrorKind::UnknownArea(id.to_string()))
}

/// Move into `area`. Towns become the logout target and their waypoint is
/// activated on arrival.
fn arrive(state: &mut RouteState, area: &AreaDef) {
    state.current_area_id = Some(area.id.clone());
    if area.is_town_area {
        state.last_town_area_id = Some(area.id.clone());
        if area.has_waypoint {
            state.acquired_waypoints.insert(area.id.clone());
        }
    }
}

/// Compass angles accepted by `dir`, clockwise from up.
const DIRECTIONS: [u16; 8] = [0, 45, 90, 135, 180, 225, 270, 315];

/// Degrees to an index into [`DIRECTIONS`].
fn parse_direction(raw: &str) -> Result<u8, RouteErrorKind> {
    raw.parse::<u16>()
        .ok()
        .and_then(|deg| DIRECTIONS.iter().position(|&d| d == deg))
        .and_then(|idx| u8::try_from(idx).ok())
        .ok_or_else(|| RouteErrorKind::InvalidDirection(raw.to_string()))
}
