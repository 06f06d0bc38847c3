//! Tree layout: node positions for a render pass

use std::collections::HashMap;

use crate::domain::{BstArena, NodeId};

/// Position of one node inside the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Computes node positions for a tree.
pub trait TreeLayout: Send + Sync {
    /// Positions for every node, in identity order.
    fn layout(&self, tree: &BstArena) -> Vec<NodePosition>;
}

/// Layered layout: x follows a node's in-order rank, y its depth.
///
/// For a search tree the in-order rank equals the value order, so no two
/// nodes share a column and links never cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyLayout {
    pub width: f64,
    pub height: f64,
}

impl TidyLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl TreeLayout for TidyLayout {
    fn layout(&self, tree: &BstArena) -> Vec<NodePosition> {
        let ranks: HashMap<NodeId, usize> = tree
            .iter_inorder()
            .enumerate()
            .map(|(rank, node)| (node.id, rank))
            .collect();

        let columns = tree.len().saturating_sub(1);
        let rows = tree.depth().saturating_sub(1);
        let spread = |index: usize, slots: usize, extent: f64| {
            if slots == 0 {
                extent / 2.0
            } else {
                index as f64 * extent / slots as f64
            }
        };

        tree.nodes()
            .iter()
            .map(|node| {
                let rank = ranks.get(&node.id).copied().unwrap_or_default();
                let level = tree.level(node.id).unwrap_or_default();
                NodePosition {
                    id: node.id,
                    x: spread(rank, columns, self.width),
                    y: if rows == 0 {
                        0.0
                    } else {
                        level as f64 * self.height / rows as f64
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_single_root_when_layout_then_centered_on_top() {
        let tree = BstArena::with_root(7);
        let positions = TidyLayout::new(100.0, 50.0).layout(&tree);
        assert_eq!(positions, vec![NodePosition { id: NodeId(0), x: 50.0, y: 0.0 }]);
    }

    #[test]
    fn given_5_3_8_1_when_layout_then_columns_follow_value_order() {
        let mut tree = BstArena::with_root(5);
        for value in [3, 8, 1] {
            tree.insert(value);
        }
        let positions = TidyLayout::new(300.0, 100.0).layout(&tree);
        let x: Vec<f64> = positions.iter().map(|p| p.x).collect();
        let y: Vec<f64> = positions.iter().map(|p| p.y).collect();
        // ids: 5 -> 0, 3 -> 1, 8 -> 2, 1 -> 3
        assert_eq!(x, vec![200.0, 100.0, 300.0, 0.0]);
        assert_eq!(y, vec![0.0, 50.0, 50.0, 100.0]);
    }
}
