//! Line classification and conditional compilation.
//!
//! Route files are line oriented. Before any fragment parsing, each file is
//! reduced to section headings and content lines: blank lines and `//`
//! comments are dropped and `#ifdef NAME` / `#ifndef NAME` / `#endif` blocks
//! are kept or skipped according to the active defines. Other C-style
//! directives such as `#else` or `#define` are rejected. Any other line
//! starting with `#` is a section heading, written `#section Name` or `#Name`.

use std::collections::BTreeSet;

use crate::RouteFile;
use crate::error::{Location, RouteError, RouteErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Section(String),
    Content(String),
}

/// A surviving line with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub file: String,
    pub line: usize,
    pub kind: LineKind,
}

impl SourceLine {
    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line)
    }
}

enum Directive<'a> {
    IfDef(&'a str),
    IfNotDef(&'a str),
    EndIf,
    Unsupported(&'a str),
}

/// Preprocessor words with no meaning in route files.
const UNSUPPORTED_DIRECTIVES: [&str; 10] = [
    "#if", "#else", "#elif", "#elifdef", "#elifndef", "#define", "#undef", "#include", "#pragma", "#error",
];

fn directive(line: &str) -> Option<Directive<'_>> {
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word {
        "#ifdef" => Some(Directive::IfDef(rest.trim())),
        "#ifndef" => Some(Directive::IfNotDef(rest.trim())),
        "#endif" => Some(Directive::EndIf),
        _ if UNSUPPORTED_DIRECTIVES.contains(&word) => Some(Directive::Unsupported(word)),
        _ => None,
    }
}

fn heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    let name = match rest.strip_prefix("section") {
        Some(name) if name.is_empty() || name.starts_with(char::is_whitespace) => name,
        _ => rest,
    };
    Some(name.trim())
}

/// Classify every line of `file`, honouring `#ifdef` blocks.
///
/// # Errors
/// Returns [`RouteErrorKind::UnbalancedDirective`] for a stray `#endif`, an
/// `#ifdef` without a name or a block left open at end of file,
/// [`RouteErrorKind::UnknownDirective`] for directives like `#else`, and
/// [`RouteErrorKind::EmptySectionName`] for a bare `#`.
pub fn preprocess(file: &RouteFile, defines: &BTreeSet<String>) -> Result<Vec<SourceLine>, RouteError> {
    let mut out = Vec::new();
    // One entry per open block: whether its lines are kept, and where it opened.
    let mut stack: Vec<(bool, usize)> = Vec::new();

    for (idx, raw) in file.contents.lines().enumerate() {
        let line_no = idx + 1;
        let at = || Location::new(file.name.clone(), line_no);
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let active = stack.iter().all(|(kept, _)| *kept);

        if let Some(directive) = directive(line) {
            match directive {
                Directive::IfDef(name) | Directive::IfNotDef(name) if name.is_empty() => {
                    return Err(RouteError::at(
                        RouteErrorKind::UnbalancedDirective(format!("'{line}' needs a name")),
                        at(),
                    ));
                },
                Directive::IfDef(name) => {
                    stack.push((defines.contains(name), line_no));
                },
                Directive::IfNotDef(name) => {
                    stack.push((!defines.contains(name), line_no));
                },
                Directive::Unsupported(word) => {
                    return Err(RouteError::at(RouteErrorKind::UnknownDirective(word.to_string()), at()));
                },
                Directive::EndIf => {
                    if stack.pop().is_none() {
                        return Err(RouteError::at(
                            RouteErrorKind::UnbalancedDirective("#endif without #ifdef".into()),
                            at(),
                        ));
                    }
                },
            }
            continue;
        }
        if !active {
            continue;
        }

        let kind = match heading(line) {
            Some("") => return Err(RouteError::at(RouteErrorKind::EmptySectionName, at())),
            Some(name) => LineKind::Section(name.to_string()),
            None => LineKind::Content(line.to_string()),
        };
        out.push(SourceLine {
            file: file.name.clone(),
            line: line_no,
            kind,
        });
    }

    if let Some((_, opened)) = stack.last() {
        return Err(RouteError::at(
            RouteErrorKind::UnbalancedDirective("#ifdef without #endif".into()),
            Location::new(file.name.clone(), *opened),
        ));
    }
    Ok(out)
}
