//! Forest builder: an arena-backed registry of term nodes with single-parent
//! enforcement and a validated compile step.
//!
//! Nodes are created lazily by [`ForestBuilder::add_child`] or explicitly by
//! [`ForestBuilder::create_node`]. [`ForestBuilder::compile`] gathers every
//! parentless node under a synthetic root and walks the result depth-first;
//! any revisit (or any node left unreachable from a root) is reported as a
//! cycle and no tree is returned.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use generational_arena::{Arena, Index};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::Named;

/// Label of the synthetic wrapper that holds all root-level trees.
pub const ROOT_LABEL: &str = "root";

type Identifier<R, K> = Box<dyn Fn(&R) -> K + Send + Sync>;

/// Registered node in the forest arena.
#[derive(Debug)]
pub struct TreeNode<K, R> {
    /// Registry key, unique within the builder
    pub id: K,
    /// Human-readable label, the record's name or the rendered id
    pub display_name: String,
    /// Id of the parent node, None until attached as a child
    pub parent: Option<K>,
    /// Arena indices of child nodes, in attachment order
    pub children: Vec<Index>,
    /// Caller-supplied record, opaque to the builder
    pub payload: R,
}

/// Builds a forest from parent/child relations between raw records.
///
/// `R` is the raw record type, `K` the key extracted from it. With
/// [`ForestBuilder::new`] the record is its own key.
pub struct ForestBuilder<R, K = R> {
    arena: Arena<TreeNode<K, R>>,
    index: HashMap<K, Index>,
    order: Vec<Index>,
    identifier: Identifier<R, K>,
    root_label: String,
}

impl<R> Default for ForestBuilder<R, R>
where
    R: Named + Clone + Eq + Hash + fmt::Display + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ForestBuilder<R, R>
where
    R: Named + Clone + Eq + Hash + fmt::Display + 'static,
{
    /// Builder whose records are their own ids.
    pub fn new() -> Self {
        Self::with_identifier(|record: &R| record.clone())
    }
}

impl<R, K> fmt::Debug for ForestBuilder<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForestBuilder")
            .field("nodes", &self.arena.len())
            .field("root_label", &self.root_label)
            .finish_non_exhaustive()
    }
}

impl<R, K> ForestBuilder<R, K>
where
    R: Named,
    K: Clone + Eq + Hash + fmt::Display,
{
    /// Builder with a caller-supplied key extractor.
    pub fn with_identifier<F>(identifier: F) -> Self
    where
        F: Fn(&R) -> K + Send + Sync + 'static,
    {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            order: Vec::new(),
            identifier: Box::new(identifier),
            root_label: ROOT_LABEL.to_string(),
        }
    }

    /// Replace the display name of the synthetic root produced by `compile`.
    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    /// Register a new node for `record`.
    ///
    /// Fails with [`DomainError::DuplicateId`] if the record's id is already
    /// registered.
    #[instrument(level = "trace", skip_all)]
    pub fn create_node(&mut self, record: R) -> DomainResult<&TreeNode<K, R>> {
        let id = (self.identifier)(&record);
        let idx = self.insert(id, record)?;
        Ok(&self.arena[idx])
    }

    /// Attach `child` below `parent`, creating either node on first reference.
    ///
    /// Children keep the order of their `add_child` calls. A child that
    /// already has a parent is rejected with [`DomainError::AlreadyHasParent`]
    /// and nothing is mutated.
    #[instrument(level = "trace", skip_all)]
    pub fn add_child(&mut self, parent: R, child: R) -> DomainResult<()> {
        let parent_id = (self.identifier)(&parent);
        let child_id = (self.identifier)(&child);

        if parent_id == child_id {
            return Err(DomainError::SelfParent(child_id.to_string()));
        }
        if let Some(existing) = self.get_node(&child_id).and_then(|n| n.parent.as_ref()) {
            return Err(DomainError::AlreadyHasParent {
                child: child_id.to_string(),
                parent: existing.to_string(),
            });
        }

        let parent_idx = self.resolve(parent_id.clone(), parent)?;
        let child_idx = self.resolve(child_id, child)?;

        if let Some(node) = self.arena.get_mut(child_idx) {
            node.parent = Some(parent_id);
        }
        if let Some(node) = self.arena.get_mut(parent_idx) {
            node.children.push(child_idx);
        }
        Ok(())
    }

    pub fn get_node(&self, id: &K) -> Option<&TreeNode<K, R>> {
        self.index.get(id).and_then(|&idx| self.arena.get(idx))
    }

    /// Mutable access to a node, used to enrich payloads after building.
    pub fn get_node_mut(&mut self, id: &K) -> Option<&mut TreeNode<K, R>> {
        match self.index.get(id) {
            Some(&idx) => self.arena.get_mut(idx),
            None => None,
        }
    }

    /// Resolve an arena index returned in a node's `children`.
    pub fn node_at(&self, idx: Index) -> Option<&TreeNode<K, R>> {
        self.arena.get(idx)
    }

    /// Registered ids in insertion order.
    pub fn node_ids(&self) -> Vec<K> {
        self.iter().map(|node| node.id.clone()).collect()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<K, R>> + '_ {
        self.order.iter().filter_map(move |&idx| self.arena.get(idx))
    }

    /// Ids of nodes that were never attached as a child.
    pub fn roots(&self) -> Vec<&K> {
        self.iter()
            .filter(|node| node.parent.is_none())
            .map(|node| &node.id)
            .collect()
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

    /// Drop every node. Only meant for re-initialisation between runs.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.order.clear();
    }

    /// Validate the registry and produce a snapshot of the forest.
    ///
    /// Parentless nodes become children of a synthetic root. Any node visited
    /// twice during the depth-first pass, or not reachable from a root at all,
    /// yields [`DomainError::CycleDetected`].
    #[instrument(level = "debug", skip(self), fields(nodes = self.arena.len()))]
    pub fn compile(&self) -> DomainResult<CompiledForest<K, R>>
    where
        R: Clone,
    {
        let roots: Vec<Index> = self
            .order
            .iter()
            .copied()
            .filter(|&idx| self.arena.get(idx).is_some_and(|n| n.parent.is_none()))
            .collect();

        self.validate(&roots)?;

        let children = self.snapshot(&roots);
        debug!("compiled forest with {} root-level trees", roots.len());
        Ok(CompiledForest {
            display_name: self.root_label.clone(),
            children,
        })
    }

    fn validate(&self, roots: &[Index]) -> DomainResult<()> {
        let mut visited: HashSet<Index> = HashSet::with_capacity(self.arena.len());
        let mut stack: Vec<Index> = roots.iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            if !visited.insert(current) {
                return Err(DomainError::CycleDetected(node.id.to_string()));
            }
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }

        // Members of a closed loop all carry a parent, so no root reaches them.
        if let Some(node) = self
            .order
            .iter()
            .filter(|&&idx| !visited.contains(&idx))
            .find_map(|&idx| self.arena.get(idx))
        {
            return Err(DomainError::CycleDetected(node.id.to_string()));
        }
        Ok(())
    }

    /// Build compiled trees bottom-up without recursion.
    ///
    /// Nodes are listed in pre-order together with the slot of their parent
    /// (slot 0 is the synthetic root), then assembled in reverse so every
    /// child is finished before its parent.
    fn snapshot(&self, roots: &[Index]) -> Vec<CompiledNode<K, R>>
    where
        R: Clone,
    {
        let mut order: Vec<(usize, Index)> = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(usize, Index)> = roots.iter().rev().map(|&idx| (0, idx)).collect();
        while let Some((parent, idx)) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            order.push((parent, idx));
            let slot = order.len();
            for &child in node.children.iter().rev() {
                stack.push((slot, child));
            }
        }

        let mut built: Vec<Vec<CompiledNode<K, R>>> = (0..=order.len()).map(|_| Vec::new()).collect();
        for (pos, &(parent, idx)) in order.iter().enumerate().rev() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let mut children = std::mem::take(&mut built[pos + 1]);
            children.reverse();
            built[parent].push(CompiledNode {
                id: node.id.clone(),
                display_name: node.display_name.clone(),
                children,
                payload: node.payload.clone(),
            });
        }

        let mut top = std::mem::take(&mut built[0]);
        top.reverse();
        top
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
        let display_name = record
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| id.to_string());
        let idx = self.arena.insert(TreeNode {
            id: id.clone(),
            display_name,
            parent: None,
            children: Vec::new(),
            payload: record,
        });
        self.index.insert(id, idx);
        self.order.push(idx);
        Ok(idx)
    }
}

/// Validated forest snapshot: a synthetic root holding every root-level tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledForest<K, P> {
    pub display_name: String,
    pub children: Vec<CompiledNode<K, P>>,
}

/// One node of a compiled forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledNode<K, P> {
    pub id: K,
    pub display_name: String,
    pub children: Vec<CompiledNode<K, P>>,
    pub payload: P,
}

impl<K, P> CompiledForest<K, P> {
    /// Number of nodes, not counting the synthetic root.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth of the deepest root-level tree; a lone root counts as 1.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Pre-order walk yielding each node with its depth (root-level = 1).
    pub fn iter(&self) -> PreOrder<'_, K, P> {
        PreOrder::new(&self.children)
    }

    /// Ids of all nodes without children, in pre-order.
    pub fn leaf_ids(&self) -> Vec<&K> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.id)
            .collect()
    }

    pub fn find(&self, id: &K) -> Option<&CompiledNode<K, P>>
    where
        K: PartialEq,
    {
        self.iter().map(|(_, node)| node).find(|node| &node.id == id)
    }
}

impl<K, P> CompiledNode<K, P> {
    /// Levels in this subtree; a leaf counts as 1.
    pub fn depth(&self) -> usize {
        PreOrder::new(std::slice::from_ref(self))
            .map(|(depth, _)| depth)
            .max()
            .unwrap_or(1)
    }
}

// Deep chains would otherwise be dropped one stack frame per level.
impl<K, P> Drop for CompiledNode<K, P> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

pub struct PreOrder<'a, K, P> {
    stack: Vec<(usize, &'a CompiledNode<K, P>)>,
}

impl<'a, K, P> PreOrder<'a, K, P> {
    fn new(roots: &'a [CompiledNode<K, P>]) -> Self {
        // Reverse push keeps left-to-right order on pop.
        let stack = roots.iter().rev().map(|node| (1, node)).collect();
        Self { stack }
    }
}

impl<'a, K, P> Iterator for PreOrder<'a, K, P> {
    type Item = (usize, &'a CompiledNode<K, P>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
