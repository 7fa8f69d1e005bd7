use std::fmt::Display;
use std::sync::OnceLock;
use owo_colors::OwoColorize;
use super::{Icons, Theme};

static PRINTER: OnceLock<Printer> = OnceLock::new();

/// Human-readable CLI output. Everything but errors goes to stdout and is
/// suppressed in quiet mode.
#[derive(Debug, Clone)]
pub struct Printer {
    quiet: bool,
    theme: Theme,
}

/// The process-wide printer, configured from the environment on first use
pub fn printer() -> &'static Printer {
    PRINTER.get_or_init(Printer::from_env)
}

/// `COFFEEHOUSE_QUIET=1` (or `true`) silences everything except errors
pub fn quiet_from(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Printer {
    pub fn new(quiet: bool, theme: Theme) -> Self {
        Self { quiet, theme }
    }

    pub fn from_env() -> Self {
        let quiet = quiet_from(std::env::var("COFFEEHOUSE_QUIET").ok().as_deref());
        Self::new(quiet, Theme::detect())
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn line(&self, text: impl Display) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    pub fn header(&self, text: &str) {
        self.line(format_args!("{} {}", Icons::COFFEE, text.style(self.theme.heading)));
    }

    pub fn section(&self, title: &str) {
        self.line("");
        self.line(format_args!("━{}━", title.style(self.theme.heading)));
    }

    pub fn success(&self, text: &str) {
        self.line(format_args!("{} {}", Icons::CHECK, text.style(self.theme.ok)));
    }

    /// `label: value`, indented under the previous line
    pub fn field(&self, label: &str, value: impl Display) {
        self.line(format_args!("  {} {}", format!("{}:", label).style(self.theme.muted), value));
    }

    /// A rendered table or a placeholder when there are no rows
    pub fn table(&self, rendered: Option<String>) {
        match rendered {
            Some(table) => self.line(table),
            None => self.line(format_args!("{} No rows.", Icons::EMPTY)),
        }
    }

    pub fn error(&self, text: &str) {
        eprintln!("{} {}", Icons::CROSS, text.style(self.theme.failure));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_values() {
        assert!(quiet_from(Some("1")));
        assert!(quiet_from(Some("TRUE")));
        assert!(!quiet_from(Some("0")));
        assert!(!quiet_from(None));
    }

    #[test]
    fn test_plain_theme_has_no_escapes() {
        let theme = Theme::new(false);
        assert_eq!(format!("{}", "Menu".style(theme.heading)), "Menu");
        let colored = Theme::new(true);
        assert_ne!(format!("{}", "Menu".style(colored.heading)), "Menu");
    }

    #[test]
    fn test_quiet_printer() {
        assert!(Printer::new(true, Theme::new(false)).is_quiet());
    }
}
