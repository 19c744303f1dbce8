//! Human-readable and JSON output
//!
//! Every command writes through a [`Formatter`] so quiet, JSON and
//! no-color modes behave the same everywhere.

use console::Style;
use serde::Serialize;

use super::OutputConfig;

/// Color theme for styled output
#[derive(Debug, Clone)]
pub struct Theme {
    /// Directory names - blue + bold
    pub dir: Style,
    /// Object sizes - green
    pub size: Style,
    /// Timestamps - dim
    pub date: Style,
    /// Storage zone and file names in messages - bold
    pub name: Style,
    pub success: Style,
    pub error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            dir: Style::new().blue().bold(),
            size: Style::new().green(),
            date: Style::new().dim(),
            name: Style::new().bold(),
            success: Style::new().green(),
            error: Style::new().red(),
        }
    }
}

impl Theme {
    /// A theme that applies no styling
    pub fn plain() -> Self {
        Self {
            dir: Style::new(),
            size: Style::new(),
            date: Style::new(),
            name: Style::new(),
            success: Style::new(),
            error: Style::new(),
        }
    }
}

/// Formatter for CLI output
///
/// In JSON mode stdout carries nothing but JSON documents; messages go to
/// stderr or are dropped.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        let theme = if config.no_color || config.json {
            Theme::plain()
        } else {
            Theme::default()
        };
        Self { config, theme }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    // ========== Style helper methods ==========

    pub fn style_dir(&self, text: &str) -> String {
        self.theme.dir.apply_to(text).to_string()
    }

    pub fn style_size(&self, text: &str) -> String {
        self.theme.size.apply_to(text).to_string()
    }

    pub fn style_date(&self, text: &str) -> String {
        self.theme.date.apply_to(text).to_string()
    }

    pub fn style_name(&self, text: &str) -> String {
        self.theme.name.apply_to(text).to_string()
    }

    // ========== Output methods ==========

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        let checkmark = self.theme.success.apply_to("✓");
        println!("{checkmark} {message}");
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            let cross = self.theme.error.apply_to("✗");
            eprintln!("{cross} {message}");
        }
    }

    /// Progress message, shown only with `--verbose`
    pub fn info(&self, message: &str) {
        if !self.config.verbose || self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{message}");
    }

    /// Output a value as pretty-printed JSON
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_styles_directories() {
        console::set_colors_enabled(true);
        let formatter = Formatter::new(OutputConfig::default());
        assert!(!formatter.is_json());
        assert_ne!(formatter.style_dir("images"), "images");
        assert!(formatter.style_dir("images").contains("images"));
    }

    #[test]
    fn test_formatter_json_mode() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(formatter.is_json());
        assert_eq!(formatter.style_size("14 B"), "14 B");
    }

    #[test]
    fn test_plain_theme_leaves_text_alone() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(formatter.style_dir("images"), "images");
        assert_eq!(formatter.style_date("Aug 10 12:34"), "Aug 10 12:34");
        assert_eq!(formatter.style_size("14 B"), "14 B");
        assert_eq!(formatter.style_name("zone"), "zone");
    }
}
