//! Plain-text rendering of route steps for terminal output.

use exile_data::{Fragment, FragmentStep, GemStep, Part, ReferenceData, RewardType};

fn area_name<'a>(reference: &'a ReferenceData, id: &'a str) -> &'a str {
    reference.area(id).map_or(id, |a| a.name.as_str())
}

/// Render one fragment as player-facing text. Direction hints render empty.
pub fn fragment_text(fragment: &Fragment, reference: &ReferenceData) -> String {
    match fragment {
        Fragment::Kill { value } => format!("Kill {value}"),
        Fragment::Arena { value } | Fragment::QuestText { value } | Fragment::Generic { value } => value.clone(),
        Fragment::League { value } => format!("[{value}]"),
        Fragment::Area { area_id } => area_name(reference, area_id).to_string(),
        Fragment::Enter { area_id } => format!("➞ {}", area_name(reference, area_id)),
        Fragment::Logout { area_id } => format!("Logout ➞ {}", area_name(reference, area_id)),
        Fragment::Waypoint | Fragment::WaypointGet => "Waypoint".to_string(),
        Fragment::WaypointUse { dst_area_id, .. } => format!("Waypoint ➞ {}", area_name(reference, dst_area_id)),
        Fragment::PortalSet => "Set Portal".to_string(),
        Fragment::PortalUse { dst_area_id } => format!("Portal ➞ {}", area_name(reference, dst_area_id)),
        Fragment::Quest { quest_id, .. } => reference.quest(quest_id).map_or(quest_id.clone(), |q| q.name.clone()),
        Fragment::RewardQuest { item } => item.clone(),
        Fragment::RewardVendor { item, cost } => match cost {
            Some(cost) => format!("{item} ({cost})"),
            None => item.clone(),
        },
        Fragment::Trial => "Trial of Ascendancy".to_string(),
        Fragment::Ascend { .. } => "Ascend".to_string(),
        Fragment::Crafting { crafting_recipes } => format!("Craft: {}", crafting_recipes.join(", ")),
        Fragment::Dir { .. } => String::new(),
        Fragment::Copy { text } => text.clone(),
    }
}

/// Render a parts list, dropping empty pieces and joining the rest with a space.
pub fn parts_text(parts: &[Part], reference: &ReferenceData) -> String {
    parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => text.trim().to_string(),
            Part::Fragment(fragment) => fragment_text(fragment, reference),
        })
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn step_text(step: &FragmentStep, reference: &ReferenceData) -> String {
    parts_text(&step.parts, reference)
}

pub fn gem_step_text(step: &GemStep, reference: &ReferenceData) -> String {
    let name = reference
        .gem(&step.required_gem.id)
        .map_or(step.required_gem.id.as_str(), |g| g.name.as_str());
    let how = match step.reward_type {
        RewardType::Quest => "Take",
        RewardType::Vendor => "Buy",
    };
    if step.count > 1 {
        format!("{how} {name} x{}", step.count)
    } else {
        format!("{how} {name}")
    }
}
