//! Game reference tables consumed by the route parser.
//!
//! These are loaded once per session (see `exile_engine::loader`) and treated
//! as read-only afterwards. Maps are ordered so every lookup that walks them
//! (reward offers in particular) is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defs::{CharacterClass, GemQuestRef, GemRef, Id, RequiredGem, RewardType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub act: u32,
    #[serde(default)]
    pub is_town_area: bool,
    #[serde(default)]
    pub has_waypoint: bool,
    #[serde(default)]
    pub crafting_recipes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub act: u32,
    #[serde(default)]
    pub reward_offers: BTreeMap<Id, RewardOfferDef>,
}

/// One reward offer of a quest: a pick-one quest reward table plus the gems a
/// vendor sells afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardOfferDef {
    #[serde(default)]
    pub quest_npc: String,
    #[serde(default)]
    pub quest: BTreeMap<Id, QuestRewardDef>,
    #[serde(default)]
    pub vendor: BTreeMap<Id, VendorRewardDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestRewardDef {
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VendorRewardDef {
    #[serde(default)]
    pub npc: String,
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub is_support: bool,
    #[serde(default)]
    pub required_level: u32,
}

/// Everything the parser needs to resolve ids inside route tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub areas: BTreeMap<Id, AreaDef>,
    #[serde(default)]
    pub quests: BTreeMap<Id, QuestDef>,
    #[serde(default)]
    pub gems: BTreeMap<Id, GemDef>,
    /// Awakened support id -> base support id.
    #[serde(default)]
    pub awakened_gem_lookup: BTreeMap<Id, Id>,
    /// Vaal skill id -> base skill id.
    #[serde(default)]
    pub vaal_gem_lookup: BTreeMap<Id, Id>,
}

/// Class filter shared by quest and vendor tables. An empty list means every
/// class; a missing class (no build imported) accepts any listing.
pub fn available_to(classes: &[CharacterClass], class: Option<CharacterClass>) -> bool {
    match class {
        Some(class) => classes.is_empty() || classes.contains(&class),
        None => true,
    }
}

impl RewardOfferDef {
    /// Whether this offer provides `gem_id` to `class` through the given channel.
    pub fn offers(&self, gem_id: &str, class: Option<CharacterClass>, reward_type: RewardType) -> bool {
        match reward_type {
            RewardType::Quest => self
                .quest
                .get(gem_id)
                .is_some_and(|reward| available_to(&reward.classes, class)),
            RewardType::Vendor => self
                .vendor
                .get(gem_id)
                .is_some_and(|reward| available_to(&reward.classes, class)),
        }
    }
}

impl ReferenceData {
    pub fn area(&self, id: &str) -> Option<&AreaDef> {
        self.areas.get(id)
    }

    pub fn quest(&self, id: &str) -> Option<&QuestDef> {
        self.quests.get(id)
    }

    pub fn gem(&self, id: &str) -> Option<&GemDef> {
        self.gems.get(id)
    }

    /// Normalize vaal and awakened gem ids to the base gem handed out by quests.
    pub fn canonical_gem_id<'a>(&'a self, id: &'a str) -> &'a str {
        if let Some(base) = self.vaal_gem_lookup.get(id) {
            return base;
        }
        if let Some(base) = self.awakened_gem_lookup.get(id) {
            return base;
        }
        id
    }

    /// Find a gem by id first, then by case-insensitive display name.
    pub fn find_gem(&self, raw: &str) -> Option<&GemDef> {
        let raw = raw.trim();
        self.gems.get(raw).or_else(|| {
            self.gems
                .values()
                .find(|gem| gem.name.eq_ignore_ascii_case(raw))
        })
    }

    /// Quests ordered by act then id, which is the order a character meets them.
    pub fn quests_in_act_order(&self) -> Vec<&QuestDef> {
        let mut quests: Vec<&QuestDef> = self.quests.values().collect();
        quests.sort_by(|a, b| a.act.cmp(&b.act).then_with(|| a.id.cmp(&b.id)));
        quests
    }

    /// Cross-reference every reward offer for where `required` can be obtained.
    pub fn gem_ref(&self, required: &RequiredGem, class: Option<CharacterClass>) -> GemRef {
        let canonical = self.canonical_gem_id(&required.id);
        let mut quests = Vec::new();
        for quest in self.quests_in_act_order() {
            for (offer_id, offer) in &quest.reward_offers {
                if offer.offers(canonical, class, RewardType::Quest) || offer.offers(canonical, class, RewardType::Vendor)
                {
                    quests.push(GemQuestRef {
                        quest_id: quest.id.clone(),
                        reward_offer_id: offer_id.clone(),
                    });
                }
            }
        }
        GemRef {
            id: required.id.clone(),
            note: required.note.clone(),
            count: required.count,
            quests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.gems.insert(
            "frostbolt".into(),
            GemDef {
                id: "frostbolt".into(),
                name: "Frostbolt".into(),
                is_support: false,
                required_level: 1,
            },
        );
        data.vaal_gem_lookup.insert("vaal_frostbolt".into(), "frostbolt".into());
        let mut offer = RewardOfferDef::default();
        offer.quest.insert(
            "frostbolt".into(),
            QuestRewardDef {
                classes: vec![CharacterClass::Witch],
            },
        );
        offer.vendor.insert("frostbolt".into(), VendorRewardDef::default());
        let mut quest = QuestDef {
            id: "a1q1".into(),
            name: "Enemy at the Gate".into(),
            act: 1,
            reward_offers: BTreeMap::new(),
        };
        quest.reward_offers.insert("0".into(), offer);
        data.quests.insert(quest.id.clone(), quest);
        data
    }

    #[test]
    fn vaal_ids_map_to_base_gem() {
        let data = data();
        assert_eq!(data.canonical_gem_id("vaal_frostbolt"), "frostbolt");
        assert_eq!(data.canonical_gem_id("frostbolt"), "frostbolt");
    }

    #[test]
    fn empty_vendor_class_list_is_open_to_everyone() {
        let data = data();
        let offer = &data.quests["a1q1"].reward_offers["0"];
        let marauder = Some(CharacterClass::Marauder);
        assert!(!offer.offers("frostbolt", marauder, RewardType::Quest));
        assert!(offer.offers("frostbolt", marauder, RewardType::Vendor));
        assert!(offer.offers("frostbolt", None, RewardType::Quest));
    }

    #[test]
    fn gem_ref_lists_matching_offers() {
        let data = data();
        let gem = data.gem_ref(&RequiredGem::new("vaal_frostbolt"), Some(CharacterClass::Witch));
        assert_eq!(gem.id, "vaal_frostbolt");
        assert_eq!(gem.quests.len(), 1);
        assert_eq!(gem.quests[0].quest_id, "a1q1");
        assert_eq!(gem.quests[0].reward_offer_id, "0");
    }

    #[test]
    fn find_gem_accepts_display_names() {
        let data = data();
        assert_eq!(data.find_gem("frostbolt").map(|g| g.id.as_str()), Some("frostbolt"));
        assert_eq!(data.find_gem("FROSTBOLT ").map(|g| g.id.as_str()), Some("frostbolt"));
        assert!(data.find_gem("Fireball").is_none());
    }
}
