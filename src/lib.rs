//! termgraph: compiles an ontology of broader-concept relations into a
//! validated term forest and an all-pairs term distance matrix.
//!
//! The [`domain`] layer holds the two builders and has no I/O. The
//! [`application`] layer reads datasets, feeds both builders and writes the
//! compiled JSON. [`cli`] and [`config`] wire this into the `termgraph` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
