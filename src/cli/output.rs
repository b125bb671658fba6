//! Colored status lines for termgraph commands.
//!
//! Data (rendered trees, distances, TOML) goes to stdout uncolored so it can
//! be piped; `colored` already honors NO_COLOR and CLICOLOR_FORCE.

use colored::Colorize;

/// Fatal error from `main`, on stderr.
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Non-fatal assembly notice, e.g. skipped duplicates or unmatched definitions.
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// Completed build summary.
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// `label: value` line, as in `config path`.
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Indented follow-up to a summary line, e.g. the files written.
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Command output proper.
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
