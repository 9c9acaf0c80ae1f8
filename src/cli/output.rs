//! Console output for the parmap CLI
//!
//! Human-readable lines go to stderr so that command results printed on
//! stdout can be piped untouched.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✔").green(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    /// Print a header/title
    pub fn header(&self, title: &str) {
        if !self.quiet {
            eprintln!("\n{}", style(title).bold().underlined());
        }
    }

    /// Print a category header with consistent styling
    pub fn category(&self, category: &str) {
        if !self.quiet {
            eprintln!("\n{}", style(category).bold().cyan());
        }
    }

    /// Print a key-value pair with consistent styling
    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            eprintln!("  {} {}", style(key).dim(), styled_value);
        }
    }

    /// Print blank line
    pub fn blank_line(&self) {
        if !self.quiet {
            eprintln!();
        }
    }

    /// Print a command result on stdout, regardless of quiet mode
    pub fn result(&self, content: &str) {
        println!("{content}");
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}
