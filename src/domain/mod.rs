//! Domain layer: term forest and term graph structures
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod forest;
pub mod graph;
pub mod record;
pub mod tree_view;

pub use error::{DomainError, DomainResult};
pub use forest::{CompiledForest, CompiledNode, ForestBuilder, TreeNode, ROOT_LABEL};
pub use graph::{CompiledDistanceMatrix, GraphNode, WeightedGraph, UNREACHABLE};
pub use record::Named;
pub use tree_view::TreeNodeConvert;
