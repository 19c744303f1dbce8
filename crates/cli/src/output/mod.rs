//! Output configuration and formatting

mod formatter;

pub use formatter::Formatter;

/// How command output should be rendered
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, no colors
    pub json: bool,
    pub no_color: bool,
    /// Suppress everything except errors
    pub quiet: bool,
    /// Print progress messages
    pub verbose: bool,
}
