//! Ontology assembly: feeds the forest and the term graph from the same
//! records and joins their compiled outputs with definition metadata.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::dataset::{term_name_from_uri, DefinitionRow, OntologyRecord, Term};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    CompiledDistanceMatrix, CompiledForest, DomainError, ForestBuilder, WeightedGraph,
};

pub const TREE_FILE: &str = "tree.json";
pub const DISTANCES_FILE: &str = "distances.json";

/// Counters collected while assembling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyReport {
    /// Distinct terms, including broader concepts without a row of their own
    pub terms: usize,
    /// Broader-concept relations applied
    pub relations: usize,
    pub duplicates_skipped: usize,
    pub excluded: usize,
    pub definitions_matched: usize,
    pub definitions_unmatched: usize,
}

/// Compiled forest and distance matrix over the same term ids.
#[derive(Debug, Clone, Serialize)]
pub struct OntologyBundle {
    pub tree: CompiledForest<String, Term>,
    pub distances: CompiledDistanceMatrix<String>,
    pub report: AssemblyReport,
}

/// Populates both builders in one pass over the ontology, then compiles them.
pub struct OntologyAssembler {
    forest: ForestBuilder<Term, String>,
    graph: WeightedGraph<String>,
    report: AssemblyReport,
    exclude: HashSet<String>,
    skip_duplicates: bool,
    parallel: bool,
}

impl std::fmt::Debug for OntologyAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyAssembler")
            .field("forest", &self.forest)
            .field("graph", &self.graph)
            .field("report", &self.report)
            .finish()
    }
}

impl OntologyAssembler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            forest: ForestBuilder::with_identifier(|term: &Term| term.name.clone())
                .with_root_label(settings.root_label.clone()),
            graph: WeightedGraph::new(),
            report: AssemblyReport::default(),
            exclude: settings.exclude.iter().cloned().collect(),
            skip_duplicates: settings.skip_duplicates,
            parallel: settings.parallel,
        }
    }

    /// Register every record, then apply its broader-concept relation.
    ///
    /// Records are registered before any relation is applied so a term that
    /// appears as a broader reference ahead of its own row is not mistaken
    /// for a duplicate. Ids already known to the assembler, from this batch
    /// or an earlier one, are skipped when `skip_duplicates` is set. Without
    /// it the batch is rejected before anything is registered. Excluded
    /// terms are dropped together with their relations; children of an
    /// excluded term become roots.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn ingest(&mut self, records: &[OntologyRecord]) -> ApplicationResult<()> {
        if !self.skip_duplicates {
            self.check_duplicates(records)?;
        }

        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            let term = Term::from_record(record);
            if self.exclude.contains(&term.name) {
                debug!("excluding term {}", term.name);
                self.report.excluded += 1;
                continue;
            }
            if self.forest.contains(&term.name) {
                debug!("skipping duplicate term {}", term.name);
                self.report.duplicates_skipped += 1;
                continue;
            }
            self.graph.create_node(term.name.clone())?;
            self.forest.create_node(term)?;
            accepted.push(record);
        }

        for record in accepted {
            let Some(broader) = record.broader.as_deref() else {
                continue;
            };
            let parent = Term::from_uri(broader);
            if self.exclude.contains(&parent.name) {
                continue;
            }
            let child = Term::from_record(record);
            let edge = (parent.name.clone(), child.name.clone());
            self.forest.add_child(parent, child)?;
            self.graph.add_edge(edge.0, edge.1)?;
            self.report.relations += 1;
        }

        self.report.terms = self.forest.len();
        info!(
            "ingested {} terms with {} relations",
            self.report.terms, self.report.relations
        );
        Ok(())
    }

    fn check_duplicates(&self, records: &[OntologyRecord]) -> ApplicationResult<()> {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        for record in records {
            let name = term_name_from_uri(&record.id);
            if self.exclude.contains(name) {
                continue;
            }
            if self.forest.contains(&name.to_string()) || !seen.insert(name.to_string()) {
                return Err(DomainError::DuplicateId(name.to_string()).into());
            }
        }
        Ok(())
    }

    /// Join definition rows into the payloads of matching terms.
    #[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub fn attach_definitions(&mut self, rows: &[DefinitionRow]) {
        for row in rows {
            let name = term_name_from_uri(&row.term).to_string();
            match self.forest.get_node_mut(&name) {
                Some(node) => {
                    node.payload.apply_definition(row);
                    self.report.definitions_matched += 1;
                }
                None => {
                    warn!("definition for unknown term {}", name);
                    self.report.definitions_unmatched += 1;
                }
            }
        }
    }

    pub fn report(&self) -> &AssemblyReport {
        &self.report
    }

    pub fn forest(&self) -> &ForestBuilder<Term, String> {
        &self.forest
    }

    pub fn graph(&self) -> &WeightedGraph<String> {
        &self.graph
    }

    /// Compile the forest only, for callers that do not need distances.
    pub fn compile_tree(&self) -> ApplicationResult<CompiledForest<String, Term>> {
        Ok(self.forest.compile()?)
    }

    /// Compile forest and distance matrix; they share no state.
    #[instrument(level = "debug", skip(self))]
    pub fn compile(&self) -> ApplicationResult<OntologyBundle> {
        let (tree, distances) = if self.parallel {
            rayon::join(|| self.forest.compile(), || self.graph.compile())
        } else {
            (self.forest.compile(), self.graph.compile())
        };

        Ok(OntologyBundle {
            tree: tree?,
            distances,
            report: self.report.clone(),
        })
    }
}

/// Write `tree.json` and `distances.json` into `out_dir`.
#[instrument(level = "debug", skip(bundle))]
pub fn write_bundle(
    bundle: &OntologyBundle,
    out_dir: &Path,
    pretty: bool,
) -> ApplicationResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).with_path_context("create output directory", out_dir)?;

    let tree_path = out_dir.join(TREE_FILE);
    write_json(&tree_path, &bundle.tree, pretty)?;
    let distances_path = out_dir.join(DISTANCES_FILE);
    write_json(&distances_path, &bundle.distances, pretty)?;

    Ok(vec![tree_path, distances_path])
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> ApplicationResult<()> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| ApplicationError::OperationFailed {
        context: format!("encode {}", path.display()),
        source: Box::new(e),
    })?;
    std::fs::write(path, encoded).with_path_context("write", path)
}
