//! Colored console reporting.
//!
//! Five severity channels (info, success, error, warning, and header),
//! each rendering a colored, prefixed line on **stderr** so stdout remains
//! parseable for scripts. Color is dropped automatically when stderr is not
//! a TTY.

const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const PURPLE: &str = "\x1b[95m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const HEADER_RULE: &str =
    "============================================================";

/// Console reporter handed to the pipelines. Cheap to clone into tasks.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    /// Reporter for stderr; color when stderr is a TTY.
    pub fn stderr() -> Self {
        Self {
            color: atty::is(atty::Stream::Stderr),
        }
    }

    /// Reporter with color disabled (tests, piped output).
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn info(&self, message: &str) {
        self.line(CYAN, "i", message);
    }

    pub fn success(&self, message: &str) {
        self.line(GREEN, "ok", message);
    }

    pub fn error(&self, message: &str) {
        self.line(RED, "error", message);
    }

    pub fn warning(&self, message: &str) {
        self.line(YELLOW, "warning", message);
    }

    /// Emphasized section header between pipeline phases.
    pub fn header(&self, message: &str) {
        if self.color {
            eprintln!("\n{}{}{}{}", BOLD, PURPLE, HEADER_RULE, RESET);
            eprintln!("{}{}{}{}", BOLD, PURPLE, message, RESET);
            eprintln!("{}{}{}{}\n", BOLD, PURPLE, HEADER_RULE, RESET);
        } else {
            eprintln!("\n{}", HEADER_RULE);
            eprintln!("{}", message);
            eprintln!("{}\n", HEADER_RULE);
        }
    }

    fn line(&self, color: &str, prefix: &str, message: &str) {
        if self.color {
            eprintln!("{}[{}] {}{}", color, prefix, message, RESET);
        } else {
            eprintln!("[{}] {}", prefix, message);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stderr()
    }
}
