//! Process exit codes, following BSD sysexits.h.
//!
//! [`crate::cli::CliError::exit_code`] maps every failure onto one of these.

pub const OK: i32 = 0;

/// Bad command line, e.g. unknown terms passed to `distance`
pub const USAGE: i32 = 64;

/// Dataset rejected: malformed JSON, duplicate ids, cycles, multiple parents
pub const DATAERR: i32 = 65;

/// Ontology or definitions file does not exist
pub const NOINPUT: i32 = 66;

/// Reading input or writing the bundle failed
pub const IOERR: i32 = 74;

/// Unreadable or invalid configuration layer
pub const CONFIG: i32 = 78;
