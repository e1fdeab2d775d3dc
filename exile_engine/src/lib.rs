#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const EXILE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod atlas;
pub mod challenge;
pub mod config;
pub mod export;
pub mod loader;
pub mod progress;
pub mod session;
pub mod style;
pub mod text;
pub mod toggle_store;

pub use atlas::{AtlasGuide, AtlasPhase, AtlasStep};
pub use challenge::{ChallengeData, ChallengeMatcher, StepChallenges};
pub use config::{ExileConfig, load_config};
pub use export::{export_route, import_route};
pub use progress::{
    CurrentSection, ProgressSummary, SectionSummary, atlas_phase_summaries, atlas_summary, challenge_summary, current_section, current_voidstone_section, gem_summary, route_summary,
    section_summaries, voidstone_section_summaries, voidstone_summary,
};
pub use session::{ParseStatus, RouteKind, RouteRequest, RouteSession, Ticket};
pub use toggle_store::{FileToggleStore, MemoryToggleStore, Namespace, ToggleStore};
