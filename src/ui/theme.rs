//! Terminal styles; plain when stdout is not a terminal

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    /// Field labels in detail views
    pub label: Style,
}

impl Theme {
    pub fn detect() -> Self {
        Self::for_terminal(console::Term::stdout().is_term())
    }

    pub fn for_terminal(colored: bool) -> Self {
        if !colored {
            return Self {
                header: Style::new(),
                success: Style::new(),
                warn: Style::new(),
                label: Style::new(),
            };
        }
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
