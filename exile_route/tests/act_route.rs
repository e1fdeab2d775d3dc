use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use exile_data::{CharacterClass, Fragment, Part, ReferenceData, RequiredGem, RewardType, Route, Step};
use exile_route::{ParseOptions, RouteErrorKind, RouteFile, load_reference_dir, parse_route};
use serde_json::json;

fn reference() -> ReferenceData {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data");
    load_reference_dir(&dir).expect("fixture reference data loads")
}

fn act_files() -> Vec<RouteFile> {
    vec![
        RouteFile::new("act_1.txt", include_str!("fixtures/act_1.txt")),
        RouteFile::new("act_2.txt", include_str!("fixtures/act_2.txt")),
    ]
}

fn witch_build(defines: &[&str]) -> ParseOptions {
    ParseOptions {
        class: Some(CharacterClass::Witch),
        required_gems: ["freezing_pulse", "fireball", "added_cold_damage_support", "vaal_fireball"]
            .into_iter()
            .map(RequiredGem::new)
            .collect(),
        defines: defines.iter().map(|d| d.to_string()).collect(),
    }
}

fn gem_steps(route: &Route) -> Vec<(String, RewardType)> {
    route
        .iter()
        .flat_map(|s| &s.steps)
        .filter_map(Step::as_gem_step)
        .map(|g| (g.required_gem.id.clone(), g.reward_type))
        .collect()
}

#[test]
fn single_kill_line_splits_into_text_and_fragment() {
    let files = [RouteFile::new("act_1.txt", "#Act 1\nKill Hillock {kill:Hillock}\n")];
    let route = parse_route(&files, &ReferenceData::default(), &ParseOptions::default()).expect("parse ok");
    assert_eq!(
        serde_json::to_value(&route).unwrap(),
        json!([{
            "name": "Act 1",
            "steps": [{
                "type": "fragment_step",
                "parts": ["Kill Hillock ", {"type": "kill", "value": "Hillock"}]
            }]
        }])
    );
}

#[test]
fn unknown_area_fails_the_whole_parse() {
    let files = [RouteFile::new("act_1.txt", "#Act 1\nKill {kill|Hillock}\n{enter|1_9_9}\n")];
    let err = parse_route(&files, &reference(), &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind, RouteErrorKind::UnknownArea("1_9_9".into()));
    let message = err.to_string();
    assert!(message.contains("unknown area id '1_9_9'"), "{message}");
    assert!(message.starts_with("act_1.txt:3 (section 'Act 1')"), "{message}");
}

#[test]
fn act_route_resolves_sections_and_movement() {
    let route = parse_route(&act_files(), &reference(), &witch_build(&[])).expect("parse ok");
    let names: Vec<&str> = route.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Act 1", "Act 2"]);
    assert_eq!(route[0].steps.len(), 9);
    assert_eq!(route[1].steps.len(), 2);

    let tidal = route[0].steps[5].as_fragment_step().unwrap();
    assert!(tidal.fragments().any(|f| *f
        == Fragment::Crafting {
            crafting_recipes: vec!["Added Cold Damage".into()]
        }));

    let back = route[0].steps[8].as_fragment_step().unwrap();
    assert_eq!(
        back.parts[0],
        Part::Fragment(Fragment::PortalUse {
            dst_area_id: "1_1_4_1".into()
        })
    );
    assert!(back.fragments().any(|f| *f == Fragment::Dir { dir_index: 2 }));

    let logout = route[1].steps[0].as_fragment_step().unwrap();
    assert_eq!(
        logout.parts[0],
        Part::Fragment(Fragment::Logout {
            area_id: "1_1_town".into()
        })
    );
    let waypoint = route[1].steps[1].as_fragment_step().unwrap();
    assert_eq!(
        waypoint.parts,
        vec![Part::Fragment(Fragment::WaypointUse {
            dst_area_id: "1_1_2".into(),
            src_area_id: "1_1_town".into(),
        })]
    );
}

#[test]
fn gem_steps_follow_the_quest_that_unlocks_them() {
    let route = parse_route(&act_files(), &reference(), &witch_build(&[])).expect("parse ok");
    assert_eq!(
        gem_steps(&route),
        vec![
            ("freezing_pulse".to_string(), RewardType::Quest),
            ("fireball".to_string(), RewardType::Vendor),
            ("added_cold_damage_support".to_string(), RewardType::Quest),
        ]
    );
    let steps = &route[0].steps;
    assert!(steps[1].is_fragment_step());
    assert!(steps[2].as_gem_step().is_some());
    assert!(steps[3].as_gem_step().is_some());
    assert!(steps[7].as_gem_step().is_some());

    let pulse = steps[2].as_gem_step().unwrap();
    assert_eq!(pulse.required_gem.quests.len(), 1);
    assert_eq!(pulse.required_gem.quests[0].quest_id, "a1q1");
}

#[test]
fn each_gem_is_placed_once() {
    for defines in [&[][..], &["LEAGUE_START"][..]] {
        let route = parse_route(&act_files(), &reference(), &witch_build(defines)).expect("parse ok");
        let data = reference();
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        for (id, _) in gem_steps(&route) {
            *seen.entry(data.canonical_gem_id(&id).to_string()).or_default() += 1;
        }
        assert!(seen.values().all(|count| *count == 1), "{seen:?}");
        assert_eq!(seen.len(), 3);
    }
}

#[test]
fn defines_gate_lines() {
    let plain = parse_route(&act_files(), &reference(), &witch_build(&[])).expect("parse ok");
    let league = parse_route(&act_files(), &reference(), &witch_build(&["LEAGUE_START"])).expect("parse ok");
    assert_eq!(league[0].steps.len(), plain[0].steps.len() + 1);
    let extra = league[0].steps[4].as_fragment_step().unwrap();
    assert!(extra.fragments().any(|f| matches!(f, Fragment::RewardQuest { item } if item == "Freezing Pulse")));
}

#[test]
fn parsing_is_deterministic() {
    let options = witch_build(&["LEAGUE_START"]);
    let first = parse_route(&act_files(), &reference(), &options).expect("parse ok");
    let second = parse_route(&act_files(), &reference(), &options).expect("parse ok");
    assert_eq!(first, second);
}

#[test]
fn every_visible_line_yields_exactly_one_fragment_step() {
    let files = act_files();
    let route = parse_route(&files, &reference(), &ParseOptions::default()).expect("parse ok");
    let no_defines = BTreeSet::new();
    let content_lines: usize = files
        .iter()
        .map(|f| {
            exile_route::preprocess(f, &no_defines)
                .unwrap()
                .into_iter()
                .filter(|l| matches!(l.kind, exile_route::LineKind::Content(_)))
                .count()
        })
        .sum();
    let fragment_steps: usize = route
        .iter()
        .map(|s| s.steps.iter().filter(|st| st.is_fragment_step()).count())
        .sum();
    assert_eq!(fragment_steps, content_lines);
}

#[test]
fn route_authored_rewards_are_placed_without_a_build() {
    let files = [RouteFile::new(
        "act_1.txt",
        "#Act 1\n{enter|1_1_town} {quest|a1q1}\nbuy {reward_vendor|Molten Strike}\n",
    )];
    let route = parse_route(&files, &reference(), &ParseOptions::default()).expect("parse ok");
    assert_eq!(gem_steps(&route), vec![("molten_strike".to_string(), RewardType::Vendor)]);
    assert!(route[0].steps[2].as_gem_step().is_some());
}

#[test]
fn route_reward_before_its_quest_waits_for_the_unlock() {
    let files = [RouteFile::new(
        "act_1.txt",
        "#Act 1\n{enter|1_1_1} Take {reward_quest|Freezing Pulse}\n{enter|1_1_town} {quest|a1q1}\n",
    )];
    let options = ParseOptions {
        class: Some(CharacterClass::Marauder),
        required_gems: vec![RequiredGem::new("freezing_pulse")],
        defines: BTreeSet::new(),
    };
    let route = parse_route(&files, &reference(), &options).expect("parse ok");
    assert_eq!(gem_steps(&route), vec![("freezing_pulse".to_string(), RewardType::Vendor)]);
    let steps = &route[0].steps;
    assert!(steps[0].is_fragment_step() && steps[1].is_fragment_step());
    assert_eq!(steps[2].as_gem_step().map(|g| g.required_gem.id.as_str()), Some("freezing_pulse"));
}
