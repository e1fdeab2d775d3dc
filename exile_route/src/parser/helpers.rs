use pest::error::{Error, LineColLocation};

use super::Rule;
use crate::error::RouteErrorKind;

/// Drop the backslash from `\x` escapes; a trailing lone backslash is kept.
pub(super) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub(super) fn syntax_error(err: &Error<Rule>) -> RouteErrorKind {
    let column = match err.line_col {
        LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
    };
    let message = match &err.variant {
        pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected: Vec<&str> = positives.iter().map(describe_rule).collect();
            format!("expected {}", expected.join(" or "))
        },
        other => other.message().into_owned(),
    };
    RouteErrorKind::Syntax { column, message }
}

fn describe_rule(rule: &Rule) -> &'static str {
    match rule {
        Rule::tag => "a fragment tag",
        Rule::keyword => "a fragment keyword",
        Rule::arg => "a tag argument",
        Rule::text => "text",
        Rule::EOI => "end of line",
        _ => "valid route text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_pipes_and_backslashes() {
        assert_eq!(unescape(r"a\|b"), "a|b");
        assert_eq!(unescape(r"c:\\dir"), r"c:\dir");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
