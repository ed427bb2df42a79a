// Output formatting helpers for CLI commands
//
// The run's report stream goes to stdout uncolored so it can be piped and
// grepped. Diagnostics go to stderr.

use std::io::{self, Write};

/// Write a report heading: `#`, `##`, `###` or `####` followed by the text
pub fn heading(out: &mut impl Write, level: usize, text: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "#".repeat(level.max(1)), text)
}

/// Write an indented report field: "  .label: value"
pub fn field(out: &mut impl Write, label: &str, value: &str) -> io::Result<()> {
    writeln!(out, "  .{}: {}", label, value)
}

/// Write captured tool output between `{{` `}}` markers
pub fn captured(out: &mut impl Write, label: &str, text: &str) -> io::Result<()> {
    writeln!(out, "  .{}:{{{{{}}}}}", label, text)
}

/// Print a status message: "  Status message"
pub fn status(action: &str, message: &str) {
    eprintln!("\x1b[1;36m{:>12}\x1b[0m {}", action, message);
}

/// Print the closing line of a run, green on success and red otherwise
pub fn verdict(success: bool, message: &str) {
    if success {
        eprintln!("\x1b[1;32m  \u{2713}\x1b[0m {}", message);
    } else {
        eprintln!("\x1b[1;31m  \u{2717}\x1b[0m {}", message);
    }
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("\x1b[33m  !\x1b[0m {}", message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("\x1b[1;31merror:\x1b[0m {}", message);
}

/// Print a dim/muted message
pub fn dim(message: &str) {
    eprintln!("\x1b[2m{}\x1b[0m", message);
}
