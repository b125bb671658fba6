//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Ontology term graph compiler: validated broader-concept forests and all-pairs term distances
#[derive(Parser, Debug)]
#[command(name = "termgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Additional config file, applied after ./.termgraph.toml
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile tree.json and distances.json from an ontology
    Build {
        /// Ontology JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        ontology: PathBuf,
        /// Definition table JSON file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        definitions: Option<PathBuf>,
        /// Output directory (default: output_dir setting)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
    },

    /// Show the broader-concept hierarchy as tree
    Tree {
        /// Ontology JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        ontology: PathBuf,
    },

    /// Shortest-path distance between two terms
    Distance {
        /// Ontology JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        ontology: PathBuf,
        /// Term name or URI
        from: String,
        /// Term name or URI
        to: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
