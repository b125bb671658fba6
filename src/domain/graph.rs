//! Undirected weighted term graph with all-pairs shortest-path compilation.
//!
//! Edge weight is the multiplicity of a relation: every `add_edge` call for
//! the same pair adds one to the weight in both directions.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use generational_arena::{Arena, Index};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Marker for pairs without a connecting path in a compiled matrix.
pub const UNREACHABLE: i64 = -1;

// Large enough that INFINITY + INFINITY stays within i64.
const INFINITY: i64 = i64::MAX / 4;

type Identifier<R, K> = Box<dyn Fn(&R) -> K + Send + Sync>;

#[derive(Debug)]
pub struct GraphNode<K, R> {
    pub id: K,
    /// Accumulated edge weight per neighbor id
    pub neighbors: HashMap<K, u32>,
    pub payload: R,
}

/// Registry of graph nodes keyed by an id extracted from raw records.
pub struct WeightedGraph<R, K = R> {
    arena: Arena<GraphNode<K, R>>,
    index: HashMap<K, Index>,
    order: Vec<Index>,
    identifier: Identifier<R, K>,
}

impl<R> Default for WeightedGraph<R, R>
where
    R: Clone + Eq + Hash + fmt::Display + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> WeightedGraph<R, R>
where
    R: Clone + Eq + Hash + fmt::Display + 'static,
{
    pub fn new() -> Self {
        Self::with_identifier(|record: &R| record.clone())
    }
}

impl<R, K> fmt::Debug for WeightedGraph<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedGraph")
            .field("nodes", &self.arena.len())
            .finish_non_exhaustive()
    }
}

impl<R, K> WeightedGraph<R, K>
where
    K: Clone + Eq + Hash + fmt::Display,
{
    pub fn with_identifier<F>(identifier: F) -> Self
    where
        F: Fn(&R) -> K + Send + Sync + 'static,
    {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            order: Vec::new(),
            identifier: Box::new(identifier),
        }
    }

    /// Register a node without edges. Fails on an already registered id.
    #[instrument(level = "trace", skip_all)]
    pub fn create_node(&mut self, record: R) -> DomainResult<&GraphNode<K, R>> {
        let id = (self.identifier)(&record);
        let idx = self.insert(id, record)?;
        Ok(&self.arena[idx])
    }

    /// Record one occurrence of the undirected relation between two records.
    ///
    /// Both endpoints are created on first reference. A pair whose ids are
    /// equal is rejected with [`DomainError::SelfEdge`] before anything is
    /// registered.
    #[instrument(level = "trace", skip_all)]
    pub fn add_edge(&mut self, first: R, second: R) -> DomainResult<()> {
        let first_id = (self.identifier)(&first);
        let second_id = (self.identifier)(&second);
        if first_id == second_id {
            return Err(DomainError::SelfEdge(first_id.to_string()));
        }

        let a = self.resolve(first_id.clone(), first)?;
        let b = self.resolve(second_id.clone(), second)?;

        if let Some(node) = self.arena.get_mut(a) {
            *node.neighbors.entry(second_id).or_insert(0) += 1;
        }
        if let Some(node) = self.arena.get_mut(b) {
            *node.neighbors.entry(first_id).or_insert(0) += 1;
        }
        Ok(())
    }

    pub fn get_node(&self, id: &K) -> Option<&GraphNode<K, R>> {
        self.index.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn get_node_mut(&mut self, id: &K) -> Option<&mut GraphNode<K, R>> {
        match self.index.get(id) {
            Some(&idx) => self.arena.get_mut(idx),
            None => None,
        }
    }

    /// Accumulated weight of the edge between `a` and `b`, if any.
    pub fn edge_weight(&self, a: &K, b: &K) -> Option<u32> {
        self.get_node(a)
            .and_then(|node| node.neighbors.get(b))
            .copied()
    }

    /// Registered ids in insertion order.
    pub fn node_ids(&self) -> Vec<K> {
        self.iter().map(|node| node.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphNode<K, R>> + '_ {
        self.order.iter().filter_map(move |&idx| self.arena.get(idx))
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.iter().map(|node| node.neighbors.len()).sum::<usize>() / 2
    }

    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.order.clear();
    }

    /// Compute shortest path weights between every pair of nodes.
    ///
    /// Runs Floyd-Warshall in O(n³); call once per dataset. `ids` and
    /// `matrix` of the result are a paired snapshot: row and column `i`
    /// belong to `ids[i]`.
    #[instrument(level = "debug", skip(self), fields(nodes = self.arena.len()))]
    pub fn compile(&self) -> CompiledDistanceMatrix<K> {
        let ids = self.node_ids();
        let n = ids.len();
        let position: HashMap<&K, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

        let mut matrix = vec![vec![INFINITY; n]; n];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 0;
        }
        for (i, node) in self.iter().enumerate() {
            for (neighbor, &weight) in &node.neighbors {
                if let Some(&j) = position.get(neighbor) {
                    matrix[i][j] = i64::from(weight);
                }
            }
        }

        relax_all_pairs(&mut matrix);

        for cell in matrix.iter_mut().flatten() {
            if *cell >= INFINITY {
                *cell = UNREACHABLE;
            }
        }
        debug!("compiled {}x{} distance matrix", n, n);
        CompiledDistanceMatrix { ids, matrix }
    }

    fn resolve(&mut self, id: K, record: R) -> DomainResult<Index> {
        match self.index.get(&id) {
            Some(&idx) => Ok(idx),
            None => self.insert(id, record),
        }
    }

    fn insert(&mut self, id: K, record: R) -> DomainResult<Index> {
        if self.index.contains_key(&id) {
            return Err(DomainError::DuplicateId(id.to_string()));
        }
        let idx = self.arena.insert(GraphNode {
            id: id.clone(),
            neighbors: HashMap::new(),
            payload: record,
        });
        self.index.insert(id, idx);
        self.order.push(idx);
        Ok(idx)
    }
}

/// Floyd-Warshall relaxation with the intermediate node `k` as outer loop.
///
/// Row `k` does not change during pass `k` (its diagonal is 0), so a copy of
/// it can be read while the other rows are updated in place.
fn relax_all_pairs(matrix: &mut [Vec<i64>]) {
    let n = matrix.len();
    for k in 0..n {
        let via = matrix[k].clone();
        for row in matrix.iter_mut() {
            let to_k = row[k];
            if to_k >= INFINITY {
                continue;
            }
            for (cell, &from_k) in row.iter_mut().zip(&via) {
                let candidate = to_k + from_k;
                if candidate < *cell {
                    *cell = candidate;
                }
            }
        }
    }
}

/// All-pairs distances with `-1` marking unreachable pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledDistanceMatrix<K> {
    pub ids: Vec<K>,
    pub matrix: Vec<Vec<i64>>,
}

impl<K: PartialEq> CompiledDistanceMatrix<K> {
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    /// Distance between two ids; `Some(UNREACHABLE)` if no path exists,
    /// `None` if either id is not part of this compilation.
    pub fn distance(&self, a: &K, b: &K) -> Option<i64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.matrix.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_symmetric(&self) -> bool {
        self.matrix
            .iter()
            .enumerate()
            .all(|(i, row)| row.iter().enumerate().all(|(j, &d)| self.matrix[j][i] == d))
    }
}
