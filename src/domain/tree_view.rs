//! Terminal rendering of compiled forests.

use termtree::Tree;
use tracing::instrument;

use crate::domain::forest::{CompiledForest, CompiledNode};

/// Conversion into a `termtree::Tree` labelled with display names.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<K, P> TreeNodeConvert for CompiledNode<K, P> {
    fn to_tree_string(&self) -> Tree<String> {
        render(&self.display_name, &self.children)
    }
}

impl<K, P> TreeNodeConvert for CompiledForest<K, P> {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        render(&self.display_name, &self.children)
    }
}

/// Build the display tree with an explicit stack; slot 0 is `label`.
fn render<K, P>(label: &str, roots: &[CompiledNode<K, P>]) -> Tree<String> {
    let mut order: Vec<(usize, &CompiledNode<K, P>)> = Vec::new();
    let mut stack: Vec<(usize, &CompiledNode<K, P>)> = roots.iter().rev().map(|n| (0, n)).collect();
    while let Some((parent, node)) = stack.pop() {
        order.push((parent, node));
        let slot = order.len();
        for child in node.children.iter().rev() {
            stack.push((slot, child));
        }
    }

    let mut leaves: Vec<Vec<Tree<String>>> = (0..=order.len()).map(|_| Vec::new()).collect();
    for (pos, &(parent, node)) in order.iter().enumerate().rev() {
        let mut children = std::mem::take(&mut leaves[pos + 1]);
        children.reverse();
        leaves[parent].push(Tree::new(node.display_name.clone()).with_leaves(children));
    }

    let mut top = std::mem::take(&mut leaves[0]);
    top.reverse();
    Tree::new(label.to_string()).with_leaves(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forest::ForestBuilder;

    #[test]
    fn given_compiled_forest_when_rendering_then_nests_display_names() {
        let mut builder: ForestBuilder<String> = ForestBuilder::new();
        builder.add_child("animal".into(), "dog".into()).unwrap();
        builder.add_child("animal".into(), "cat".into()).unwrap();
        let forest = builder.compile().unwrap();

        let rendered = forest.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "root");
        assert!(lines[1].ends_with("animal"));
        assert!(lines[2].ends_with("dog"));
        assert!(lines[3].ends_with("cat"));
    }

    #[test]
    fn given_subtree_when_rendering_then_node_is_top_label() {
        let mut builder: ForestBuilder<String> = ForestBuilder::new();
        builder.add_child("a".into(), "b".into()).unwrap();
        builder.add_child("b".into(), "c".into()).unwrap();
        let forest = builder.compile().unwrap();

        let rendered = forest.children[0].children[0].to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "b");
        assert!(lines[1].ends_with('c'));
    }
}
