//! Output formatting
//!
//! Every command prints through a [`Formatter`]: styled text for terminals, strict
//! JSON with `--json`.

mod formatter;

pub use formatter::Formatter;

/// Global output switches
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit JSON instead of text
    pub json: bool,
    /// Disable ANSI colors
    pub no_color: bool,
    /// Suppress everything except errors
    pub quiet: bool,
}
