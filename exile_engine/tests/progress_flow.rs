use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use exile_data::{ReferenceData, Route, step_key};
use exile_engine::loader::{load_atlas_guide, load_challenges, load_reference, load_route_files};
use exile_engine::{
    ChallengeMatcher, ExileConfig, FileToggleStore, MemoryToggleStore, Namespace, ParseStatus, ProgressSummary,
    RouteRequest, RouteSession, ToggleStore, atlas_phase_summaries, atlas_summary, current_section, export_route, gem_summary, load_config, route_summary,
    section_summaries, voidstone_summary,
};
use tempfile::tempdir;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn config() -> ExileConfig {
    load_config(&data_dir().join("exile.toml"))
}

fn session() -> Result<RouteSession> {
    let mut session = RouteSession::new();
    session.install_reference(load_reference(&data_dir())?);
    Ok(session)
}

fn ready(session: &mut RouteSession, request: &RouteRequest) -> Arc<Route> {
    let (ticket, status) = session.try_parse(request);
    assert!(session.accept(ticket, status.clone()));
    match status {
        ParseStatus::Ready(route) => route,
        other => panic!("expected a parsed route, got {other:?}"),
    }
}

fn act_route() -> Result<(Arc<Route>, ReferenceData)> {
    let mut session = session()?;
    let files = load_route_files(&data_dir().join("routes/act"))?;
    let route = ready(&mut session, &RouteRequest::act(files, config().parse_options()));
    let reference = session.reference().cloned().expect("installed");
    Ok((route, reference))
}

#[test]
fn finishing_act_one_moves_to_act_two() -> Result<()> {
    let (route, _) = act_route()?;
    let mut store = MemoryToggleStore::new();
    assert_eq!(route_summary(&route, &store), ProgressSummary { completed: 0, total: 8 });

    let act_one: Vec<usize> = route[0].fragment_steps().map(|(i, _)| i).collect();
    assert_eq!(act_one, vec![0, 1, 4, 5, 6, 8]);
    for i in act_one {
        store.set(Namespace::ROUTE, &step_key(0, i), true)?;
    }
    assert_eq!(route_summary(&route, &store), ProgressSummary { completed: 6, total: 8 });
    let sections = section_summaries(&route, &store);
    assert!(sections[0].summary().is_complete());
    assert_eq!(sections[1].summary(), ProgressSummary { completed: 0, total: 2 });
    let current = current_section(&route, &store).expect("act 2 pending");
    assert_eq!(current.section.name, "Act 2");
    Ok(())
}

#[test]
fn build_gems_are_tracked_by_id() -> Result<()> {
    let (route, _) = act_route()?;
    let mut store = MemoryToggleStore::new();
    store.set(Namespace::GEMS, "fireball", true)?;
    assert_eq!(gem_summary(&route, &store), ProgressSummary { completed: 1, total: 3 });
    Ok(())
}

#[test]
fn voidstone_route_follows_the_chosen_order() -> Result<()> {
    let mut session = session()?;
    let files = load_route_files(&data_dir().join("routes/voidstone"))?;
    let route = ready(
        &mut session,
        &RouteRequest::voidstone(files, vec![3, 2, 1, 0], config().parse_options()),
    );
    let names: Vec<&str> = route.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["The Uber Elder", "The Maven", "The Searing Exarch", "The Eater of Worlds"]
    );

    let mut store = MemoryToggleStore::new();
    store.set(Namespace::VOIDSTONE, &step_key(0, 1), true)?;
    store.set(Namespace::VOIDSTONE, &step_key(1, 1), true)?;
    store.set(Namespace::VOIDSTONE, &step_key(2, 0), true)?;
    assert_eq!(voidstone_summary(&route, &store), ProgressSummary { completed: 2, total: 4 });
    Ok(())
}

#[test]
fn export_without_build_code_ends_with_none() -> Result<()> {
    let (route, _) = act_route()?;
    let text = export_route(&route, None)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), route.len() + 1);
    assert_eq!(items.last(), Some(&serde_json::Value::from("pob-code:none")));
    Ok(())
}

#[test]
fn hillock_step_carries_its_challenge() -> Result<()> {
    let (route, _) = act_route()?;
    let challenges = load_challenges(&data_dir())?;
    let tagged = ChallengeMatcher::new(&challenges).annotate(&route);
    assert_eq!(tagged.len(), 1);
    assert_eq!((tagged[0].section, tagged[0].step), (0, 0));
    assert_eq!(tagged[0].challenge_ids, vec!["hillock-1".to_string()]);
    Ok(())
}

#[test]
fn progress_survives_reopening_and_reset_is_scoped() -> Result<()> {
    let (route, _) = act_route()?;
    let dir = tempdir()?;
    let path = dir.path().join("progress.ron");
    {
        let mut store = FileToggleStore::open(&path)?;
        store.set(Namespace::ROUTE, &step_key(0, 0), true)?;
        store.set(Namespace::GEMS, "freezing_pulse", true)?;
    }
    let mut store = FileToggleStore::open(&path)?;
    assert_eq!(route_summary(&route, &store).completed, 1);
    store.clear_all(Namespace::ROUTE)?;
    assert_eq!(route_summary(&route, &store).completed, 0);
    assert_eq!(gem_summary(&route, &store).completed, 1);
    Ok(())
}

#[test]
fn atlas_guide_progress_survives_a_route_reset() -> Result<()> {
    let guide = load_atlas_guide(&data_dir())?;
    assert_eq!(guide.phases.len(), 4);
    let dir = tempdir()?;
    let mut store = FileToggleStore::open(&dir.path().join("progress.ron"))?;
    store.set(Namespace::ATLAS, "kirac-missions", true)?;
    store.set(Namespace::ATLAS, "maven-kill", true)?;
    store.set(Namespace::ROUTE, &step_key(0, 0), true)?;
    store.clear_all(Namespace::ROUTE)?;

    assert_eq!(atlas_summary(&guide, &store), ProgressSummary { completed: 2, total: 19 });
    let phases = atlas_phase_summaries(&guide, &store);
    assert_eq!(phases[0].name, "Phase 1: White Maps");
    assert_eq!(phases[0].summary(), ProgressSummary { completed: 1, total: 4 });
    assert_eq!(phases[2].summary(), ProgressSummary { completed: 1, total: 5 });
    Ok(())
}
