//! Command dispatch: one function per subcommand.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{
    load_definitions, load_ontology, term_name_from_uri, write_bundle, OntologyAssembler,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{TreeNodeConvert, UNREACHABLE};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let work_dir = std::env::current_dir().ok();
    let settings = Settings::load(work_dir.as_deref(), cli.config.as_deref())?;
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Build {
            ontology,
            definitions,
            out,
        }) => cmd_build(&settings, ontology, definitions.as_deref(), out.as_deref()),
        Some(Commands::Tree { ontology }) => cmd_tree(&settings, ontology),
        Some(Commands::Distance { ontology, from, to }) => {
            cmd_distance(&settings, ontology, from, to)
        }
        Some(Commands::Config { command }) => cmd_config(&settings, command, work_dir.as_deref()),
        Some(Commands::Completion { .. }) => Ok(()),
        None => Err(CliError::Usage(
            "no command given, run `termgraph --help`".to_string(),
        )),
    }
}

fn require_input(path: &Path) -> CliResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::MissingInput(path.to_path_buf()))
    }
}

fn assemble(
    settings: &Settings,
    ontology: &Path,
    definitions: Option<&Path>,
) -> CliResult<OntologyAssembler> {
    require_input(ontology)?;
    let records = load_ontology(ontology)?;

    let mut assembler = OntologyAssembler::new(settings);
    assembler.ingest(&records)?;

    if let Some(path) = definitions {
        require_input(path)?;
        let rows = load_definitions(path)?;
        assembler.attach_definitions(&rows);
    }
    Ok(assembler)
}

#[instrument(skip(settings))]
fn cmd_build(
    settings: &Settings,
    ontology: &Path,
    definitions: Option<&Path>,
    out: Option<&Path>,
) -> CliResult<()> {
    let assembler = assemble(settings, ontology, definitions)?;
    let bundle = assembler.compile()?;

    let out_dir = out
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.output_dir.clone());
    let written = write_bundle(&bundle, &out_dir, settings.pretty)?;

    let report = &bundle.report;
    output::success(&format!(
        "compiled {} terms, {} relations",
        report.terms, report.relations
    ));
    output::detail(&written.iter().map(|p| p.display()).join(", "));
    if report.duplicates_skipped > 0 {
        output::warning(&format!(
            "skipped {} duplicate terms",
            report.duplicates_skipped
        ));
    }
    if report.definitions_unmatched > 0 {
        output::warning(&format!(
            "{} definitions matched no term",
            report.definitions_unmatched
        ));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_tree(settings: &Settings, ontology: &Path) -> CliResult<()> {
    let assembler = assemble(settings, ontology, None)?;
    let tree = assembler.compile_tree()?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_distance(settings: &Settings, ontology: &Path, from: &str, to: &str) -> CliResult<()> {
    let assembler = assemble(settings, ontology, None)?;
    let distances = assembler.graph().compile();

    let from = term_name_from_uri(from).to_string();
    let to = term_name_from_uri(to).to_string();
    for term in [&from, &to] {
        if distances.index_of(term).is_none() {
            return Err(CliError::InvalidArgs(format!("unknown term: {term}")));
        }
    }

    match distances.distance(&from, &to) {
        Some(UNREACHABLE) | None => output::info("unreachable"),
        Some(d) => output::info(&d),
    }
    Ok(())
}

fn cmd_config(
    settings: &Settings,
    command: &ConfigCommands,
    work_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::action("global", &describe(&path)),
                None => output::action("global", "unavailable"),
            }
            if let Some(dir) = work_dir {
                output::action("local", &describe(&local_config_path(dir)));
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn describe(path: &Path) -> String {
    let state = if path.exists() { "found" } else { "missing" };
    format!("{} ({})", path.display(), state)
}
