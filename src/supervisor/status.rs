//! Operator-facing status lines.

use std::io::Write as _;

/// Print a light-grey status line to stdout.
pub fn announce(message: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "\x1b[37m{message}\x1b[0m");
    let _ = out.flush();
}
