//! Terminal styling helpers

use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::Display;

/// Success mark
pub const CHECK: &str = "✓";

/// Failure mark
pub const CROSS: &str = "✗";

/// Semantic styles, only applied when stdout supports color
pub trait Stylize: Display + Sized {
    /// Secondary information
    fn muted(&self) -> String {
        self.styled(Style::new().dimmed())
    }

    /// Headings and key names
    fn emphasis(&self) -> String {
        self.styled(Style::new().bold())
    }

    /// Branch names and values
    fn accent(&self) -> String {
        self.styled(Style::new().cyan())
    }

    /// Completed actions
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Warnings
    fn warn(&self) -> String {
        self.styled(Style::new().yellow())
    }

    /// Failures
    fn error(&self) -> String {
        self.styled(Style::new().red().bold())
    }

    #[doc(hidden)]
    fn styled(&self, style: Style) -> String {
        format!(
            "{}",
            self.if_supports_color(Stream::Stdout, |text| text.style(style))
        )
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Right arrow for list items
pub fn arrow() -> String {
    "→".muted()
}
