//! Errors raised while turning route source into sections.

use std::fmt;

use exile_data::FragmentKind;

/// Where in the route sources an error was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: String,
    /// 1-based line number within `file`.
    pub line: usize,
    /// Section open at the time, if any.
    pub section: Option<String>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            section: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(section) = &self.section {
            write!(f, " (section '{section}')")?;
        }
        Ok(())
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteErrorKind {
    #[error("syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },
    #[error("unknown fragment kind '{0}'")]
    UnknownFragment(String),
    #[error("fragment '{kind}' does not accept {args} argument(s)")]
    BadArity { kind: FragmentKind, args: usize },
    #[error("unknown area id '{0}'")]
    UnknownArea(String),
    #[error("unknown quest id '{0}'")]
    UnknownQuest(String),
    #[error("quest '{quest}' has no reward offer '{offer}'")]
    UnknownRewardOffer { quest: String, offer: String },
    #[error("unknown gem id '{0}'")]
    UnknownGem(String),
    #[error("invalid direction '{0}', expected a multiple of 45 from 0 to 315")]
    InvalidDirection(String),
    #[error("invalid ascend version '{0}', expected normal, cruel, merciless or eternal")]
    InvalidAscendVersion(String),
    #[error("invalid portal action '{0}', expected set or use")]
    InvalidPortalAction(String),
    #[error("waypoint in '{0}' has not been unlocked")]
    WaypointNotUnlocked(String),
    #[error("area '{0}' has no waypoint")]
    NoWaypointInArea(String),
    #[error("no portal has been set")]
    NoPortalSet,
    #[error("logout before any town was visited")]
    NoTownVisited,
    #[error("no current area, enter an area first")]
    NoCurrentArea,
    #[error("content before the first section heading")]
    ContentOutsideSection,
    #[error("section heading without a name")]
    EmptySectionName,
    #[error("unbalanced preprocessor directive: {0}")]
    UnbalancedDirective(String),
    #[error("unsupported preprocessor directive '{0}', only #ifdef, #ifndef and #endif are recognised")]
    UnknownDirective(String),
    #[error("invalid voidstone order {0:?}, expected a permutation of 0..4")]
    InvalidVoidstoneOrder(Vec<usize>),
    #[error("voidstone route needs {expected} files, got {actual}")]
    VoidstoneFileCount { expected: usize, actual: usize },
}

/// A route failure together with its source location, when it has one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{kind}", .location.as_ref().map(|l| format!("{l}: ")).unwrap_or_default())]
pub struct RouteError {
    pub kind: RouteErrorKind,
    pub location: Option<Location>,
}

impl RouteError {
    pub fn at(kind: RouteErrorKind, location: Location) -> Self {
        Self {
            kind,
            location: Some(location),
        }
    }

    /// Attach the enclosing section name to the location.
    #[must_use]
    pub fn in_section(mut self, name: &str) -> Self {
        if let Some(location) = self.location.as_mut() {
            location.section = Some(name.to_string());
        }
        self
    }
}

impl From<RouteErrorKind> for RouteError {
    fn from(kind: RouteErrorKind) -> Self {
        Self { kind, location: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_file_line_and_section() {
        let err = RouteError::at(RouteErrorKind::UnknownArea("1_9_9".into()), Location::new("act-1.txt", 12))
            .in_section("Act 1");
        assert_eq!(
            err.to_string(),
            "act-1.txt:12 (section 'Act 1'): unknown area id '1_9_9'"
        );
    }

    #[test]
    fn unlocated_errors_print_only_the_kind() {
        let err = RouteError::from(RouteErrorKind::InvalidVoidstoneOrder(vec![0, 0, 1, 2]));
        assert_eq!(
            err.to_string(),
            "invalid voidstone order [0, 0, 1, 2], expected a permutation of 0..4"
        );
    }
}
