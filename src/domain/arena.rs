use std::fmt;

use tracing::instrument;

use crate::domain::entities::Tone;
use crate::domain::error::{DomainError, DomainResult};

/// Identity of a tree node: its insertion index. Doubles as the arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Side of the parent a node hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Left,
    Right,
}

/// Tree node in the arena-based binary search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BstNode {
    pub id: NodeId,
    pub value: i32,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Set while an insertion descends through this node
    pub on_insert_path: bool,
    /// Set on the node an insertion just created
    pub is_new_node: bool,
    /// Side of the parent this node was linked on, None for the root
    pub branch: Option<Branch>,
}

impl BstNode {
    fn new(id: NodeId, value: i32, parent: Option<NodeId>, branch: Option<Branch>) -> Self {
        Self {
            id,
            value,
            parent,
            left: None,
            right: None,
            on_insert_path: true,
            is_new_node: true,
            branch,
        }
    }

    fn child(&self, branch: Branch) -> Option<NodeId> {
        match branch {
            Branch::Left => self.left,
            Branch::Right => self.right,
        }
    }

    /// Cosmetic branch marking: right children take the selected tone,
    /// left children the resolved tone, the root has none.
    pub fn color(&self) -> Option<Tone> {
        self.branch.map(|branch| match branch {
            Branch::Right => Tone::Selected,
            Branch::Left => Tone::Resolved,
        })
    }
}

/// Arena-based binary search tree.
///
/// Nodes live in a `Vec` indexed by their [`NodeId`], so identities are
/// handed out in strict insertion order and a render diff by identity is a
/// plain index lookup. The tree is write-once: nodes are never removed.
#[derive(Debug, Clone)]
pub struct BstArena {
    nodes: Vec<BstNode>,
}

impl BstArena {
    /// Create a tree holding `value` as root (node 0, highlighted like any fresh node).
    pub fn with_root(value: i32) -> Self {
        Self {
            nodes: vec![BstNode::new(NodeId(0), value, None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> DomainResult<&BstNode> {
        self.nodes.get(id.0).ok_or(DomainError::UnknownNode(id))
    }

    /// All nodes in identity order.
    pub fn nodes(&self) -> &[BstNode] {
        &self.nodes
    }

    /// Insert without a render hook.
    pub fn insert(&mut self, value: i32) -> NodeId {
        self.insert_with(value, |_, _| {})
    }

    /// Descend from the root marking the insert path, link a new node at the
    /// first free slot, hand the tree to `on_linked` while the path is still
    /// highlighted, then clear every highlight.
    ///
    /// Lesser values go left; ties and greater values go right.
    #[instrument(level = "trace", skip(self, on_linked))]
    pub fn insert_with<F>(&mut self, value: i32, on_linked: F) -> NodeId
    where
        F: FnOnce(&BstArena, NodeId),
    {
        let mut current = self.root();
        let (parent, branch) = loop {
            let node = &mut self.nodes[current.0];
            node.on_insert_path = true;
            let branch = if value < node.value {
                Branch::Left
            } else {
                Branch::Right
            };
            match node.child(branch) {
                Some(next) => current = next,
                None => break (current, branch),
            }
        };

        let id = NodeId(self.nodes.len());
        self.nodes
            .push(BstNode::new(id, value, Some(parent), Some(branch)));
        let parent_node = &mut self.nodes[parent.0];
        match branch {
            Branch::Left => parent_node.left = Some(id),
            Branch::Right => parent_node.right = Some(id),
        }

        on_linked(self, id);
        self.clear_highlights();
        id
    }

    /// In-order traversal: every node exactly once, ascending by value.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&BstNode),
    {
        for node in self.iter_inorder() {
            visit(node);
        }
    }

    pub fn iter_inorder(&self) -> InOrderIterator<'_> {
        InOrderIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn clear_highlights(&mut self) {
        for node in &mut self.nodes {
            node.on_insert_path = false;
            node.is_new_node = false;
        }
    }

    /// Parent to child pairs, ordered by child identity.
    pub fn links(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .filter_map(|node| node.parent.map(|parent| (parent, node.id)))
            .collect()
    }

    /// Number of levels; a lone root has depth 1.
    pub fn depth(&self) -> usize {
        self.calculate_depth(Some(self.root()))
    }

    fn calculate_depth(&self, node: Option<NodeId>) -> usize {
        match node.and_then(|id| self.nodes.get(id.0)) {
            Some(node) => {
                1 + self
                    .calculate_depth(node.left)
                    .max(self.calculate_depth(node.right))
            }
            None => 0,
        }
    }

    /// Depth of a single node, the root sitting at 0.
    pub fn level(&self, id: NodeId) -> DomainResult<usize> {
        Ok(self.insert_path(id)?.len() - 1)
    }

    /// Nodes from the root down to `id`, inclusive.
    pub fn insert_path(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.get(parent)?;
        }
        path.reverse();
        Ok(path)
    }

    fn fmt_subtree(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id.0];
        write!(f, "{}", node.value)?;
        if node.left.is_none() && node.right.is_none() {
            return Ok(());
        }
        f.write_str("{")?;
        if let Some(left) = node.left {
            f.write_str("L:")?;
            self.fmt_subtree(left, f)?;
        }
        if let Some(right) = node.right {
            if node.left.is_some() {
                f.write_str(",")?;
            }
            f.write_str("R:")?;
            self.fmt_subtree(right, f)?;
        }
        f.write_str("}")
    }
}

/// Compact structure notation, e.g. `5{L:3{L:1},R:8}`.
impl fmt::Display for BstArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(self.root(), f)
    }
}

pub struct InOrderIterator<'a> {
    arena: &'a BstArena,
    stack: Vec<NodeId>,
    next: Option<NodeId>,
}

impl<'a> InOrderIterator<'a> {
    fn new(arena: &'a BstArena) -> Self {
        Self {
            arena,
            stack: Vec::new(),
            next: Some(arena.root()),
        }
    }
}

impl<'a> Iterator for InOrderIterator<'a> {
    type Item = &'a BstNode;

    fn next(&mut self) -> Option<Self::Item> {
        // Slide down the left spine, then emit and step into the right subtree
        while let Some(id) = self.next {
            self.stack.push(id);
            self.next = self.arena.nodes.get(id.0).and_then(|node| node.left);
        }
        let id = self.stack.pop()?;
        let node = self.arena.nodes.get(id.0)?;
        self.next = node.right;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(values: &[i32]) -> BstArena {
        let mut tree = BstArena::with_root(values[0]);
        for &value in &values[1..] {
            tree.insert(value);
        }
        tree
    }

    #[test]
    fn given_5_3_8_1_when_inserted_then_shape_matches() {
        let tree = build(&[5, 3, 8, 1]);
        assert_eq!(tree.to_string(), "5{L:3{L:1},R:8}");
        assert_eq!(tree.depth(), 3);
        assert_eq!(
            tree.links(),
            vec![(NodeId(0), NodeId(1)), (NodeId(0), NodeId(2)), (NodeId(1), NodeId(3))]
        );
    }

    #[test]
    fn given_duplicate_when_inserted_then_routed_right() {
        let tree = build(&[5, 5, 5]);
        assert_eq!(tree.to_string(), "5{R:5{R:5}}");
        assert_eq!(tree.get(NodeId(1)).unwrap().branch, Some(Branch::Right));
    }

    #[test]
    fn given_insert_with_hook_when_linked_then_path_is_highlighted_during_hook() {
        let mut tree = build(&[50, 20, 80]);
        let mut seen = Vec::new();
        let id = tree.insert_with(30, |tree, id| {
            seen = tree
                .nodes()
                .iter()
                .filter(|n| n.on_insert_path)
                .map(|n| n.value)
                .collect();
            assert!(tree.get(id).unwrap().is_new_node);
        });
        assert_eq!(seen, vec![50, 20, 30]);
        assert_eq!(tree.insert_path(id).unwrap(), vec![NodeId(0), NodeId(1), NodeId(3)]);
        assert!(tree.nodes().iter().all(|n| !n.on_insert_path && !n.is_new_node));
    }

    #[test]
    fn given_branch_when_color_then_left_resolved_right_selected() {
        let tree = build(&[5, 3, 8]);
        assert_eq!(tree.get(NodeId(0)).unwrap().color(), None);
        assert_eq!(tree.get(NodeId(1)).unwrap().color(), Some(Tone::Resolved));
        assert_eq!(tree.get(NodeId(2)).unwrap().color(), Some(Tone::Selected));
    }

    #[test]
    fn given_unknown_id_when_get_then_error() {
        let tree = build(&[1]);
        assert_eq!(tree.get(NodeId(4)).unwrap_err(), DomainError::UnknownNode(NodeId(4)));
        assert_eq!(tree.level(NodeId(0)).unwrap(), 0);
    }
}
