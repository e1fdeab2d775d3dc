//! Styling helpers for terminal output.
//!
//! The [`RouteStyle`] trait applies ANSI styling via the `colored` crate.
//! It is implemented for `&str` and `String` so literals and rendered step
//! text can be styled directly.

use colored::{ColoredString, Colorize};

pub trait RouteStyle {
    fn section_style(&self) -> ColoredString;
    fn heading_style(&self) -> ColoredString;
    fn step_pending_style(&self) -> ColoredString;
    fn step_done_style(&self) -> ColoredString;
    fn gem_style(&self) -> ColoredString;
    fn challenge_style(&self) -> ColoredString;
    fn percent_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl RouteStyle for &str {
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(223, 77, 10)
    }
    fn heading_style(&self) -> ColoredString {
        self.bold().underline()
    }
    fn step_pending_style(&self) -> ColoredString {
        self.truecolor(220, 220, 220)
    }
    fn step_done_style(&self) -> ColoredString {
        self.dimmed().strikethrough()
    }
    fn gem_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60)
    }
    fn challenge_style(&self) -> ColoredString {
        self.italic().truecolor(220, 40, 220)
    }
    fn percent_style(&self) -> ColoredString {
        self.bold().truecolor(220, 180, 40)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
}

impl RouteStyle for String {
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn step_pending_style(&self) -> ColoredString {
        self.as_str().step_pending_style()
    }
    fn step_done_style(&self) -> ColoredString {
        self.as_str().step_done_style()
    }
    fn gem_style(&self) -> ColoredString {
        self.as_str().gem_style()
    }
    fn challenge_style(&self) -> ColoredString {
        self.as_str().challenge_style()
    }
    fn percent_style(&self) -> ColoredString {
        self.as_str().percent_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
