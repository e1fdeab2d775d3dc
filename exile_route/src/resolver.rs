//! Route resolution: preprocessed lines folded into sections and steps.

use std::collections::BTreeSet;

use log::{debug, info};

use exile_data::{FragmentStep, Part, ReferenceData, Route, RouteSection, Step};

use crate::RouteFile;
use crate::error::{RouteError, RouteErrorKind};
use crate::parser::fragment::resolve_tag;
use crate::parser::{Segment, parse_line};
use crate::preprocess::{LineKind, SourceLine, preprocess};
use crate::state::RouteState;

/// Resolve one content line.
///
/// Consumes the state and hands back the updated one together with the
/// steps the line produced: at most one fragment step, followed by any gem
/// steps its quest or reward tags unlocked. Section headings produce nothing.
///
/// # Errors
/// Any syntax or resolution error, located at `line`.
pub fn resolve_line(
    mut state: RouteState,
    reference: &ReferenceData,
    line: &SourceLine,
) -> Result<(RouteState, Vec<Step>), RouteError> {
    let LineKind::Content(text) = &line.kind else {
        return Ok((state, Vec::new()));
    };
    let segments = parse_line(text).map_err(|kind| RouteError::at(kind, line.location()))?;

    let mut parts = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => parts.push(Part::Text(text)),
            Segment::Tag(tag) => {
                let fragment =
                    resolve_tag(&tag, &mut state, reference).map_err(|kind| RouteError::at(kind, line.location()))?;
                parts.push(Part::Fragment(fragment));
            },
        }
    }

    let mut steps = Vec::new();
    if parts.iter().any(is_visible) {
        steps.push(Step::Fragment(FragmentStep { parts }));
    }
    steps.extend(state.gem_queue.take_ready().into_iter().map(Step::Gem));
    Ok((state, steps))
}

fn is_visible(part: &Part) -> bool {
    match part {
        Part::Text(text) => !text.trim().is_empty(),
        Part::Fragment(_) => true,
    }
}

/// Parse a group of route files sharing one state.
///
/// # Errors
/// The first error encountered; no partial route is returned.
pub fn parse_files(
    files: &[RouteFile],
    reference: &ReferenceData,
    mut state: RouteState,
    defines: &BTreeSet<String>,
) -> Result<Route, RouteError> {
    let mut sections: Vec<RouteSection> = Vec::new();
    for file in files {
        debug!("resolving route file '{}'", file.name);
        for line in preprocess(file, defines)? {
            match &line.kind {
                LineKind::Section(name) => sections.push(RouteSection::new(name.clone())),
                LineKind::Content(_) => {
                    let Some(section) = sections.last_mut() else {
                        return Err(RouteError::at(RouteErrorKind::ContentOutsideSection, line.location()));
                    };
                    let (next, steps) = resolve_line(state, reference, &line).map_err(|e| e.in_section(&section.name))?;
                    state = next;
                    section.steps.extend(steps);
                },
            }
        }
    }
    let steps: usize = sections.iter().map(|s| s.steps.len()).sum();
    info!(
        "parsed {} route file(s) into {} section(s) with {} step(s)",
        files.len(),
        sections.len(),
        steps
    );
    Ok(sections)
}
