use std::collections::BTreeSet;

use exile_data::{ReferenceData, Step};
use exile_route::{RouteErrorKind, RouteFile, VOIDSTONE_COUNT, parse_voidstone_route};

const BOSSES: [&str; VOIDSTONE_COUNT] = ["The Eater of Worlds", "The Searing Exarch", "The Maven", "The Uber Elder"];

fn files() -> Vec<RouteFile> {
    BOSSES
        .iter()
        .enumerate()
        .map(|(idx, boss)| {
            RouteFile::new(
                format!("voidstone_{idx}.txt"),
                format!("#section {boss}\nPrepare the map device\nKill {{kill|{boss}}}\n{{reward_quest|Fireball}}\n"),
            )
        })
        .collect()
}

#[test]
fn files_are_assembled_in_the_configured_order() {
    let route = parse_voidstone_route(&files(), &[2, 0, 3, 1], &ReferenceData::default(), &BTreeSet::new())
        .expect("parse ok");
    let names: Vec<&str> = route.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["The Maven", "The Eater of Worlds", "The Uber Elder", "The Searing Exarch"]
    );
}

#[test]
fn voidstone_routes_never_carry_gem_steps() {
    let mut reference = ReferenceData::default();
    reference.gems.insert(
        "fireball".into(),
        exile_data::GemDef {
            id: "fireball".into(),
            name: "Fireball".into(),
            is_support: false,
            required_level: 1,
        },
    );
    let route = parse_voidstone_route(&files(), &[0, 1, 2, 3], &reference, &BTreeSet::new()).expect("parse ok");
    assert!(route.iter().flat_map(|s| &s.steps).all(Step::is_fragment_step));
    assert!(route.iter().all(|s| s.steps.len() == 3));
    let kill_steps = route
        .iter()
        .flat_map(|s| s.steps.iter().filter_map(Step::as_fragment_step))
        .filter(|s| s.kill_count() == 1)
        .count();
    assert_eq!(kill_steps, VOIDSTONE_COUNT);
}

#[test]
fn duplicate_positions_are_rejected() {
    let err = parse_voidstone_route(&files(), &[0, 0, 1, 2], &ReferenceData::default(), &BTreeSet::new()).unwrap_err();
    assert_eq!(err.kind, RouteErrorKind::InvalidVoidstoneOrder(vec![0, 0, 1, 2]));
    assert!(err.location.is_none());
}
