//! Route fragment vocabulary.
//!
//! Each tag keyword that may appear in route source text, the variants it
//! accepts and the named parameters of each variant. The parser checks tag
//! arity against this table, and help/documentation output is generated
//! from it.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::defs::{Fragment, RouteSection};

/// Tag keywords recognised in route source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Kill,
    Arena,
    Area,
    Enter,
    Logout,
    Waypoint,
    WaypointGet,
    Portal,
    Quest,
    QuestText,
    Generic,
    League,
    RewardQuest,
    RewardVendor,
    Trial,
    Ascend,
    Crafting,
    Dir,
    Copy,
}

/// A named parameter of a fragment variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FragmentParameter {
    pub name: &'static str,
    pub description: &'static str,
    /// Trailing parameter that may appear zero or more times.
    pub repeated: bool,
}

/// One accepted shape of a fragment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FragmentVariant {
    pub description: &'static str,
    pub parameters: &'static [FragmentParameter],
}

impl FragmentVariant {
    /// Whether a tag with `arg_count` arguments matches this variant.
    pub fn accepts(&self, arg_count: usize) -> bool {
        match self.parameters.last() {
            Some(last) if last.repeated => arg_count + 1 >= self.parameters.len(),
            _ => arg_count == self.parameters.len(),
        }
    }
}

const fn param(name: &'static str, description: &'static str) -> FragmentParameter {
    FragmentParameter {
        name,
        description,
        repeated: false,
    }
}

const TEXT: FragmentParameter = param("text", "Text to display");
const AREA_ID: FragmentParameter = param("area_id", "Area Id used internally by Path Of Exile");

const KILL: &[FragmentVariant] = &[FragmentVariant {
    description: "Kill a monster, certain bosses unlock waypoints",
    parameters: &[TEXT],
}];
const ARENA: &[FragmentVariant] = &[FragmentVariant {
    description: "Sub-areas inside true areas",
    parameters: &[TEXT],
}];
const AREA: &[FragmentVariant] = &[FragmentVariant {
    description: "Lookup an area",
    parameters: &[AREA_ID],
}];
const ENTER: &[FragmentVariant] = &[FragmentVariant {
    description: "Enter an area",
    parameters: &[AREA_ID],
}];
const LOGOUT: &[FragmentVariant] = &[FragmentVariant {
    description: "Logout or Exit to Character Selection, removes portals",
    parameters: &[],
}];
const WAYPOINT: &[FragmentVariant] = &[
    FragmentVariant {
        description: "A waypoint",
        parameters: &[],
    },
    FragmentVariant {
        description: "Use a waypoint to travel to a destination area",
        parameters: &[param("area_id", "Destination area Id")],
    },
];
const WAYPOINT_GET: &[FragmentVariant] = &[FragmentVariant {
    description: "Activate the waypoint in the current area",
    parameters: &[],
}];
const PORTAL: &[FragmentVariant] = &[FragmentVariant {
    description: "Set or use a Town Portal",
    parameters: &[param("action", "set or use")],
}];
const QUEST: &[FragmentVariant] = &[FragmentVariant {
    description: "Complete a quest, optionally specifying reward offer ids",
    parameters: &[
        param("quest_id", "Quest Id used internally by Path Of Exile"),
        FragmentParameter {
            name: "reward_offer_id",
            description: "Reward offer to take, defaults to every offer of the quest",
            repeated: true,
        },
    ],
}];
const QUEST_TEXT: &[FragmentVariant] = &[FragmentVariant {
    description: "Highlighted quest instruction text",
    parameters: &[TEXT],
}];
const GENERIC: &[FragmentVariant] = &[FragmentVariant {
    description: "Generic text",
    parameters: &[TEXT],
}];
const LEAGUE: &[FragmentVariant] = &[FragmentVariant {
    description: "A league mechanic interaction, rendered with a distinct highlight colour",
    parameters: &[param("text", "League mechanic name or instruction")],
}];
const REWARD_QUEST: &[FragmentVariant] = &[FragmentVariant {
    description: "Quest rewards a player should take",
    parameters: &[TEXT],
}];
const REWARD_VENDOR: &[FragmentVariant] = &[
    FragmentVariant {
        description: "Vendor rewards a player should buy",
        parameters: &[TEXT],
    },
    FragmentVariant {
        description: "Vendor rewards a player should buy",
        parameters: &[
            TEXT,
            param("cost", "Currency cost, wisdom/transmutation/alteration/chance/alchemy"),
        ],
    },
];
const TRIAL: &[FragmentVariant] = &[FragmentVariant {
    description: "Complete the ascendancy trial in the current area",
    parameters: &[],
}];
const ASCEND: &[FragmentVariant] = &[FragmentVariant {
    description: "Complete The Lord's Labyrinth",
    parameters: &[param("version", "Version to complete, normal/cruel/merciless/eternal")],
}];
const CRAFTING: &[FragmentVariant] = &[
    FragmentVariant {
        description: "Get the crafting recipe in the current area",
        parameters: &[],
    },
    FragmentVariant {
        description: "Get the crafting recipe in the given area",
        parameters: &[AREA_ID],
    },
];
const DIR: &[FragmentVariant] = &[FragmentVariant {
    description: "A direction",
    parameters: &[param("number", "Number of degrees in multiples of 45, where 0 = Up")],
}];
const COPY: &[FragmentVariant] = &[FragmentVariant {
    description: "One click copy",
    parameters: &[param("text", "Text to copy")],
}];

impl FragmentKind {
    pub const ALL: [FragmentKind; 19] = [
        FragmentKind::Kill,
        FragmentKind::Arena,
        FragmentKind::Area,
        FragmentKind::Enter,
        FragmentKind::Logout,
        FragmentKind::Waypoint,
        FragmentKind::WaypointGet,
        FragmentKind::Portal,
        FragmentKind::Quest,
        FragmentKind::QuestText,
        FragmentKind::Generic,
        FragmentKind::League,
        FragmentKind::RewardQuest,
        FragmentKind::RewardVendor,
        FragmentKind::Trial,
        FragmentKind::Ascend,
        FragmentKind::Crafting,
        FragmentKind::Dir,
        FragmentKind::Copy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FragmentKind::Kill => "kill",
            FragmentKind::Arena => "arena",
            FragmentKind::Area => "area",
            FragmentKind::Enter => "enter",
            FragmentKind::Logout => "logout",
            FragmentKind::Waypoint => "waypoint",
            FragmentKind::WaypointGet => "waypoint_get",
            FragmentKind::Portal => "portal",
            FragmentKind::Quest => "quest",
            FragmentKind::QuestText => "quest_text",
            FragmentKind::Generic => "generic",
            FragmentKind::League => "league",
            FragmentKind::RewardQuest => "reward_quest",
            FragmentKind::RewardVendor => "reward_vendor",
            FragmentKind::Trial => "trial",
            FragmentKind::Ascend => "ascend",
            FragmentKind::Crafting => "crafting",
            FragmentKind::Dir => "dir",
            FragmentKind::Copy => "copy",
        }
    }

    pub fn from_keyword(raw: &str) -> Option<Self> {
        FragmentKind::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    /// Declared variants for this keyword.
    pub fn variants(self) -> &'static [FragmentVariant] {
        match self {
            FragmentKind::Kill => KILL,
            FragmentKind::Arena => ARENA,
            FragmentKind::Area => AREA,
            FragmentKind::Enter => ENTER,
            FragmentKind::Logout => LOGOUT,
            FragmentKind::Waypoint => WAYPOINT,
            FragmentKind::WaypointGet => WAYPOINT_GET,
            FragmentKind::Portal => PORTAL,
            FragmentKind::Quest => QUEST,
            FragmentKind::QuestText => QUEST_TEXT,
            FragmentKind::Generic => GENERIC,
            FragmentKind::League => LEAGUE,
            FragmentKind::RewardQuest => REWARD_QUEST,
            FragmentKind::RewardVendor => REWARD_VENDOR,
            FragmentKind::Trial => TRIAL,
            FragmentKind::Ascend => ASCEND,
            FragmentKind::Crafting => CRAFTING,
            FragmentKind::Dir => DIR,
            FragmentKind::Copy => COPY,
        }
    }

    /// The first declared variant accepting `arg_count` arguments.
    pub fn variant_for(self, arg_count: usize) -> Option<&'static FragmentVariant> {
        self.variants().iter().find(|v| v.accepts(arg_count))
    }

    /// The source keyword a resolved fragment was written with.
    pub fn of(fragment: &Fragment) -> FragmentKind {
        match fragment {
            Fragment::Kill { .. } => FragmentKind::Kill,
            Fragment::Arena { .. } => FragmentKind::Arena,
            Fragment::Area { .. } => FragmentKind::Area,
            Fragment::Enter { .. } => FragmentKind::Enter,
            Fragment::Logout { .. } => FragmentKind::Logout,
            Fragment::Waypoint | Fragment::WaypointUse { .. } => FragmentKind::Waypoint,
            Fragment::WaypointGet => FragmentKind::WaypointGet,
            Fragment::PortalSet | Fragment::PortalUse { .. } => FragmentKind::Portal,
            Fragment::Quest { .. } => FragmentKind::Quest,
            Fragment::QuestText { .. } => FragmentKind::QuestText,
            Fragment::Generic { .. } => FragmentKind::Generic,
            Fragment::League { .. } => FragmentKind::League,
            Fragment::RewardQuest { .. } => FragmentKind::RewardQuest,
            Fragment::RewardVendor { .. } => FragmentKind::RewardVendor,
            Fragment::Trial => FragmentKind::Trial,
            Fragment::Ascend { .. } => FragmentKind::Ascend,
            Fragment::Crafting { .. } => FragmentKind::Crafting,
            Fragment::Dir { .. } => FragmentKind::Dir,
            Fragment::Copy { .. } => FragmentKind::Copy,
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full keyword -> variants table, in declaration order.
pub fn lookup() -> Vec<(FragmentKind, &'static [FragmentVariant])> {
    FragmentKind::ALL
        .into_iter()
        .map(|kind| (kind, kind.variants()))
        .collect()
}

/// Render the vocabulary as a plain-text help listing.
pub fn describe() -> String {
    let mut out = String::new();
    for (kind, variants) in lookup() {
        for variant in variants {
            let params = variant
                .parameters
                .iter()
                .map(|p| if p.repeated { format!("|{}...", p.name) } else { format!("|{}", p.name) })
                .collect::<String>();
            out.push_str(&format!("{{{kind}{params}}}  {}\n", variant.description));
        }
    }
    out
}

/// How many times each tag keyword occurs in a resolved route.
pub fn usage(route: &[RouteSection]) -> BTreeMap<FragmentKind, usize> {
    let mut counts = BTreeMap::new();
    for section in route {
        for (_, step) in section.fragment_steps() {
            for fragment in step.fragments() {
                *counts.entry(FragmentKind::of(fragment)).or_insert(0) += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{FragmentStep, Part, Step};

    #[test]
    fn keywords_round_trip() {
        for kind in FragmentKind::ALL {
            assert_eq!(FragmentKind::from_keyword(kind.as_str()), Some(kind));
        }
        assert_eq!(FragmentKind::from_keyword("teleport"), None);
    }

    #[test]
    fn waypoint_has_bare_and_targeted_variants() {
        assert!(FragmentKind::Waypoint.variant_for(0).is_some());
        assert!(FragmentKind::Waypoint.variant_for(1).is_some());
        assert!(FragmentKind::Waypoint.variant_for(2).is_none());
    }

    #[test]
    fn quest_accepts_any_number_of_offers() {
        assert!(FragmentKind::Quest.variant_for(0).is_none());
        assert!(FragmentKind::Quest.variant_for(1).is_some());
        assert!(FragmentKind::Quest.variant_for(4).is_some());
    }

    #[test]
    fn resolved_fragments_map_back_to_keywords() {
        let used = Fragment::WaypointUse {
            dst_area_id: "1_1_town".into(),
            src_area_id: "1_1_2".into(),
        };
        assert_eq!(FragmentKind::of(&used), FragmentKind::Waypoint);
        assert_eq!(FragmentKind::of(&Fragment::PortalSet), FragmentKind::Portal);
    }

    #[test]
    fn usage_counts_portal_set_and_use_under_one_keyword() {
        let mut section = RouteSection::new("Act 1");
        section.steps.push(Step::Fragment(FragmentStep {
            parts: vec![
                Part::Fragment(Fragment::PortalSet),
                Part::Text(" then ".into()),
                Part::Fragment(Fragment::PortalUse {
                    dst_area_id: "1_1_town".into(),
                }),
                Part::Fragment(Fragment::Trial),
            ],
        }));
        let counts = usage(&[section]);
        assert_eq!(counts.get(&FragmentKind::Portal), Some(&2));
        assert_eq!(counts.get(&FragmentKind::Trial), Some(&1));
        assert_eq!(counts.get(&FragmentKind::Kill), None);
    }

    #[test]
    fn help_lists_every_keyword() {
        let help = describe();
        for kind in FragmentKind::ALL {
            assert!(help.contains(&format!("{{{kind}")), "missing {kind}");
        }
    }
}
