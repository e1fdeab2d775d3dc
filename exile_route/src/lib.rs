//! exile_route: parser and resolver for Exile Progression routes.
//!
//! Route files are plain text. Each line is either a section heading
//! (`#section Act 1` or `#Act 1`), a preprocessor directive, a `//` comment,
//! or a content line mixing literal text with fragment tags:
//!
//! ```text
//! #section Act 1
//! {enter|1_1_town} Talk to {quest_text|Tarkleigh}
//! Kill {kill:Hillock}, take {waypoint_get}
//! ```
//!
//! Parsing threads a [`RouteState`] (current area, unlocked waypoints,
//! completed quests, queued build gems) through every line and produces a
//! [`Route`]: ordered sections of fragment steps and injected gem steps.

use std::collections::BTreeSet;

use log::info;

use exile_data::{CharacterClass, ReferenceData, RequiredGem, Route};

mod error;
mod gems;
pub mod parser;
pub mod preprocess;
mod reference_files;
pub mod resolver;
mod sources;
mod state;

pub use error::{Location, RouteError, RouteErrorKind};
pub use gems::GemQueue;
pub use parser::{Segment, TagAst, parse_line};
pub use preprocess::{LineKind, SourceLine, preprocess};
pub use reference_files::{AREAS_FILE, GEM_REMAPS_FILE, GEMS_FILE, QUESTS_FILE, ReferenceLoadError, load_reference_dir};
pub use resolver::{parse_files, resolve_line};
pub use sources::{SourceError, natural_cmp, read_route_files};
pub use state::RouteState;

/// Number of voidstone route files, one per atlas boss.
pub const VOIDSTONE_COUNT: usize = 4;

/// A named route source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteFile {
    pub name: String,
    pub contents: String,
}

impl RouteFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Build data and preprocessor defines that shape the act route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub class: Option<CharacterClass>,
    pub required_gems: Vec<RequiredGem>,
    pub defines: BTreeSet<String>,
}

/// Parse the act route. All files share one state and gem queue.
///
/// # Errors
/// Returns the first [`RouteError`] found; nothing is returned for a route
/// that fails anywhere.
pub fn parse_route(files: &[RouteFile], reference: &ReferenceData, options: &ParseOptions) -> Result<Route, RouteError> {
    let queue = GemQueue::new(options.class, &options.required_gems, reference)?;
    info!(
        "parsing act route: {} file(s), {} queued gem(s), class {}",
        files.len(),
        queue.pending().count(),
        options.class.map_or("none", CharacterClass::as_str)
    );
    parse_files(files, reference, RouteState::new(queue), &options.defines)
}

/// Parse the voidstone routes, assembled in the user's chosen boss order.
///
/// `order[i]` is the index into `files` of the i-th boss to run. No gem
/// steps are injected.
///
/// # Errors
/// [`RouteErrorKind::VoidstoneFileCount`] or
/// [`RouteErrorKind::InvalidVoidstoneOrder`] for bad input, otherwise the
/// first parse error.
pub fn parse_voidstone_route(
    files: &[RouteFile],
    order: &[usize],
    reference: &ReferenceData,
    defines: &BTreeSet<String>,
) -> Result<Route, RouteError> {
    if files.len() != VOIDSTONE_COUNT {
        return Err(RouteErrorKind::VoidstoneFileCount {
            expected: VOIDSTONE_COUNT,
            actual: files.len(),
        }
        .into());
    }
    validate_voidstone_order(order)?;
    let ordered: Vec<RouteFile> = order.iter().map(|&idx| files[idx].clone()).collect();
    info!("parsing voidstone route in order {order:?}");
    parse_files(&ordered, reference, RouteState::new(GemQueue::disabled()), defines)
}

/// Check that `order` is a permutation of `0..VOIDSTONE_COUNT`.
///
/// # Errors
/// [`RouteErrorKind::InvalidVoidstoneOrder`] carrying the rejected order.
pub fn validate_voidstone_order(order: &[usize]) -> Result<(), RouteErrorKind> {
    let seen: BTreeSet<usize> = order.iter().copied().collect();
    if order.len() == VOIDSTONE_COUNT && seen.len() == VOIDSTONE_COUNT && seen.iter().all(|&i| i < VOIDSTONE_COUNT) {
        Ok(())
    } else {
        Err(RouteErrorKind::InvalidVoidstoneOrder(order.to_vec()))
    }
}
