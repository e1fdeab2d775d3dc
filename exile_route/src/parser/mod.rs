//! Line parser for the route fragment language.
//!
//! Wraps the Pest-generated grammar and splits one content line into literal
//! text and raw fragment tags. Tags are resolved into typed fragments by
//! [`fragment::resolve_tag`], which needs the reference data and the running
//! route state.

use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::error::RouteErrorKind;

pub(crate) mod fragment;
mod helpers;

use helpers::{syntax_error, unescape};

#[derive(PestParser)]
#[grammar = "src/grammar.pest"]
struct RouteLineParser;

/// A fragment tag as written, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAst {
    pub keyword: String,
    /// Arguments with escapes decoded and surrounding whitespace trimmed.
    pub args: Vec<String>,
    /// 1-based column of the opening brace.
    pub column: usize,
}

/// One piece of a content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Tag(TagAst),
}

/// Split a content line into text and tag segments.
///
/// # Errors
/// Returns [`RouteErrorKind::Syntax`] for unbalanced braces, empty keywords
/// or a dangling escape.
pub fn parse_line(source: &str) -> Result<Vec<Segment>, RouteErrorKind> {
    let mut pairs = RouteLineParser::parse(Rule::line, source).map_err(|e| syntax_error(&e))?;
    let Some(line) = pairs.next() else {
        return Ok(Vec::new());
    };
    let mut segments = Vec::new();
    for pair in line.into_inner() {
        match pair.as_rule() {
            Rule::text => segments.push(Segment::Text(unescape(pair.as_str()))),
            Rule::tag => {
                let column = pair.as_span().start_pos().line_col().1;
                let mut inner = pair.into_inner();
                let keyword = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
                let args = inner.map(|p| unescape(p.as_str()).trim().to_string()).collect();
                segments.push(Segment::Tag(TagAst { keyword, args, column }));
            },
            _ => {},
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(keyword: &str, args: &[&str], column: usize) -> Segment {
        Segment::Tag(TagAst {
            keyword: keyword.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            column,
        })
    }

    #[test]
    fn colon_separator_is_accepted() {
        let segments = parse_line("Kill Hillock {kill:Hillock}").unwrap();
        assert_eq!(segments, vec![Segment::Text("Kill Hillock ".into()), tag("kill", &["Hillock"], 14)]);
    }

    #[test]
    fn pipe_separated_arguments_are_trimmed() {
        let segments = parse_line("{quest| a1q1 | 0 |1}").unwrap();
        assert_eq!(segments, vec![tag("quest", &["a1q1", "0", "1"], 1)]);
    }

    #[test]
    fn bare_tags_have_no_arguments() {
        let segments = parse_line("{waypoint_get} then {logout}").unwrap();
        assert_eq!(
            segments,
            vec![
                tag("waypoint_get", &[], 1),
                Segment::Text(" then ".into()),
                tag("logout", &[], 21),
            ]
        );
    }

    #[test]
    fn escaped_braces_stay_in_text() {
        let segments = parse_line(r"Type \{gg\} in chat").unwrap();
        assert_eq!(segments, vec![Segment::Text("Type {gg} in chat".into())]);
    }

    #[test]
    fn unclosed_tag_is_a_syntax_error() {
        let err = parse_line("Kill {kill|Hillock").unwrap_err();
        assert!(matches!(err, RouteErrorKind::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn stray_closing_brace_is_a_syntax_error() {
        let err = parse_line("oops } here").unwrap_err();
        assert!(matches!(err, RouteErrorKind::Syntax { column: 6, .. }), "{err:?}");
    }

    #[test]
    fn empty_keyword_is_a_syntax_error() {
        assert!(parse_line("{}").is_err());
        assert!(parse_line("{|x}").is_err());
    }

    #[test]
    fn empty_line_has_no_segments() {
        assert!(parse_line("").unwrap().is_empty());
    }
}
