//! Application layer: dataset loading and ontology assembly
//!
//! This layer feeds the domain builders from files and joins their outputs.

pub mod assembler;
pub mod dataset;
pub mod error;
pub mod error_ext;

pub use assembler::{write_bundle, AssemblyReport, OntologyAssembler, OntologyBundle};
pub use dataset::{
    load_definitions, load_ontology, term_name_from_uri, DefinitionRow, OntologyRecord, Term,
};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, JsonResultExt};
