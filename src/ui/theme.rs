use owo_colors::Style;

/// Styles for the few things the CLI colors
#[derive(Debug, Clone)]
pub struct Theme {
    /// Command banners and section titles
    pub heading: Style,
    pub ok: Style,
    pub failure: Style,
    /// Labels of key/value lines
    pub muted: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            heading: pick(Style::new().yellow().bold()),
            ok: pick(Style::new().green().bold()),
            failure: pick(Style::new().red().bold()),
            muted: pick(Style::new().bright_black()),
        }
    }

    /// Color only on a terminal, and never when `NO_COLOR` is set
    pub fn detect() -> Self {
        let colored = std::env::var_os("NO_COLOR").is_none() && console::Term::stdout().is_term();
        Self::new(colored)
    }
}
