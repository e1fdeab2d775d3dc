use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier used for areas, quests, gems and reward offers.
pub type Id = String;

/// A typed, resolved token within a route step.
///
/// Serialized with a `type` tag so parsed routes stay readable by the
/// downstream tooling that consumes exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    Kill {
        value: String,
    },
    Arena {
        value: String,
    },
    Area {
        #[serde(rename = "areaId")]
        area_id: Id,
    },
    Enter {
        #[serde(rename = "areaId")]
        area_id: Id,
    },
    Logout {
        #[serde(rename = "areaId")]
        area_id: Id,
    },
    Waypoint,
    WaypointUse {
        #[serde(rename = "dstAreaId")]
        dst_area_id: Id,
        #[serde(rename = "srcAreaId")]
        src_area_id: Id,
    },
    WaypointGet,
    PortalSet,
    PortalUse {
        #[serde(rename = "dstAreaId")]
        dst_area_id: Id,
    },
    Quest {
        #[serde(rename = "questId")]
        quest_id: Id,
        #[serde(rename = "rewardOffers")]
        reward_offers: Vec<Id>,
    },
    QuestText {
        value: String,
    },
    Generic {
        value: String,
    },
    League {
        value: String,
    },
    RewardQuest {
        item: String,
    },
    RewardVendor {
        item: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<String>,
    },
    Trial,
    Ascend {
        version: AscendVersion,
    },
    Crafting {
        #[serde(rename = "craftingRecipes")]
        crafting_recipes: Vec<String>,
    },
    Dir {
        #[serde(rename = "dirIndex")]
        dir_index: u8,
    },
    Copy {
        text: String,
    },
}

impl Fragment {
    pub fn is_kill(&self) -> bool {
        matches!(self, Fragment::Kill { .. })
    }
}

/// Labyrinth difficulty tiers accepted by the `ascend` fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AscendVersion {
    Normal,
    Cruel,
    Merciless,
    Eternal,
}

impl AscendVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            AscendVersion::Normal => "normal",
            AscendVersion::Cruel => "cruel",
            AscendVersion::Merciless => "merciless",
            AscendVersion::Eternal => "eternal",
        }
    }

    pub fn from_keyword(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(AscendVersion::Normal),
            "cruel" => Some(AscendVersion::Cruel),
            "merciless" => Some(AscendVersion::Merciless),
            "eternal" => Some(AscendVersion::Eternal),
            _ => None,
        }
    }
}

/// One element of a fragment step: literal text or a typed fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text(String),
    Fragment(Fragment),
}

impl Part {
    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            Part::Fragment(f) => Some(f),
            Part::Text(_) => None,
        }
    }
}

impl From<Fragment> for Part {
    fn from(value: Fragment) -> Self {
        Part::Fragment(value)
    }
}

impl From<&str> for Part {
    fn from(value: &str) -> Self {
        Part::Text(value.to_string())
    }
}

/// How a gem reward is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Quest,
    Vendor,
}

/// Playable character classes, used to filter reward availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterClass {
    Marauder,
    Duelist,
    Ranger,
    Shadow,
    Witch,
    Templar,
    Scion,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 7] = [
        CharacterClass::Marauder,
        CharacterClass::Duelist,
        CharacterClass::Ranger,
        CharacterClass::Shadow,
        CharacterClass::Witch,
        CharacterClass::Templar,
        CharacterClass::Scion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CharacterClass::Marauder => "Marauder",
            CharacterClass::Duelist => "Duelist",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Shadow => "Shadow",
            CharacterClass::Witch => "Witch",
            CharacterClass::Templar => "Templar",
            CharacterClass::Scion => "Scion",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        CharacterClass::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gem the imported build needs, before reward lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequiredGem {
    pub id: Id,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_gem_count")]
    pub count: u32,
}

impl RequiredGem {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            note: String::new(),
            count: 1,
        }
    }
}

fn default_gem_count() -> u32 {
    1
}

/// Where a gem can be obtained for the character's class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemQuestRef {
    #[serde(rename = "questId")]
    pub quest_id: Id,
    #[serde(rename = "rewardOfferId")]
    pub reward_offer_id: Id,
}

/// A required gem together with every quest reward offer that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemRef {
    pub id: Id,
    pub note: String,
    pub count: u32,
    #[serde(default)]
    pub quests: Vec<GemQuestRef>,
}

/// One renderable, completable route instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentStep {
    pub parts: Vec<Part>,
}

impl FragmentStep {
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.parts.iter().filter_map(Part::as_fragment)
    }

    /// Number of `kill` fragments in this step.
    pub fn kill_count(&self) -> usize {
        self.fragments().filter(|f| f.is_kill()).count()
    }
}

/// A skill gem acquisition point injected after the step that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemStep {
    #[serde(rename = "requiredGem")]
    pub required_gem: GemRef,
    pub count: u32,
    #[serde(rename = "rewardType")]
    pub reward_type: RewardType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    #[serde(rename = "fragment_step")]
    Fragment(FragmentStep),
    #[serde(rename = "gem_step")]
    Gem(GemStep),
}

impl Step {
    pub fn as_fragment_step(&self) -> Option<&FragmentStep> {
        match self {
            Step::Fragment(step) => Some(step),
            Step::Gem(_) => None,
        }
    }

    pub fn as_gem_step(&self) -> Option<&GemStep> {
        match self {
            Step::Gem(step) => Some(step),
            Step::Fragment(_) => None,
        }
    }

    pub fn is_fragment_step(&self) -> bool {
        matches!(self, Step::Fragment(_))
    }
}

/// A named, ordered group of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSection {
    pub name: String,
    pub steps: Vec<Step>,
}

impl RouteSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Fragment steps paired with their positional index within the section.
    pub fn fragment_steps(&self) -> impl Iterator<Item = (usize, &FragmentStep)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(idx, step)| step.as_fragment_step().map(|s| (idx, s)))
    }
}

/// A fully parsed route.
pub type Route = Vec<RouteSection>;

/// Build the positional toggle key for a step: `"<section>,<step>"`.
pub fn step_key(section_index: usize, step_index: usize) -> String {
    format!("{section_index},{step_index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_fragment_serializes_with_type_tag() {
        let part = Part::Fragment(Fragment::Kill { value: "Hillock".into() });
        let json = serde_json::to_string(&part).unwrap();
        assert_eq!(json, r#"{"type":"kill","value":"Hillock"}"#);
    }

    #[test]
    fn parts_mix_text_and_fragments() {
        let step = FragmentStep {
            parts: vec!["Kill Hillock ".into(), Fragment::Kill { value: "Hillock".into() }.into()],
        };
        let json = serde_json::to_string(&Step::Fragment(step.clone())).unwrap();
        assert_eq!(
            json,
            r#"{"type":"fragment_step","parts":["Kill Hillock ",{"type":"kill","value":"Hillock"}]}"#
        );
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Step::Fragment(step));
    }

    #[test]
    fn unit_fragments_carry_only_their_tag() {
        let json = serde_json::to_string(&Fragment::WaypointGet).unwrap();
        assert_eq!(json, r#"{"type":"waypoint_get"}"#);
    }

    #[test]
    fn kill_count_ignores_other_fragments() {
        let step = FragmentStep {
            parts: vec![
                Fragment::Enter { area_id: "a".into() }.into(),
                Fragment::Kill { value: "The Maven".into() }.into(),
            ],
        };
        assert_eq!(step.kill_count(), 1);
    }

    #[test]
    fn class_names_parse_case_insensitively() {
        assert_eq!(CharacterClass::from_name("witch"), Some(CharacterClass::Witch));
        assert_eq!(CharacterClass::from_name("Necromancer"), None);
    }

    #[test]
    fn step_key_is_comma_separated() {
        assert_eq!(step_key(3, 14), "3,14");
    }
}
