//! Output formatter for human-readable and JSON output
//!
//! Results go to stdout; errors and warnings go to stderr so the output of
//! `paths` and `auth` can be piped or `eval`ed.

use serde::Serialize;

use super::OutputConfig;

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";

/// Formatter for CLI output
///
/// In JSON mode only structured documents are printed: no colors, no
/// status lines.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Prefix a message with a status symbol, colored when enabled
    fn decorate(&self, color: &str, symbol: &str, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{color}m{symbol}\x1b[0m {message}")
        } else {
            format!("{symbol} {message}")
        }
    }

    /// Final status line of a successful command (human mode only)
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{}", self.decorate(GREEN, "✓", message));
    }

    /// Errors are always printed, even in quiet mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!("{error}");
        } else {
            eprintln!("{}", self.decorate(RED, "✗", message));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{}", self.decorate(YELLOW, "⚠", message));
    }

    /// Print a JSON document
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }
}
