use serde::{Deserialize, Serialize};

/// Index of a node in the tree arena. Equal to the node label.
pub type NodeId = usize;

/// A node of a strictly binary coalescent tree.
///
/// Topology fields are fixed once the node is part of a validated [`Tree`](crate::tree::tree::Tree). Only the
/// branch length is expected to change afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub label: NodeId,
  pub parent: Option<NodeId>,
  pub child_left: Option<NodeId>,
  pub child_right: Option<NodeId>,

  /// Time from this node to its parent
  pub branch_length: f64,

  /// Number of mutations mapped to the branch above this node
  pub num_events: u32,

  /// First SNP (inclusive) spanned by the branch
  pub snp_begin: usize,

  /// Last SNP (exclusive) spanned by the branch
  pub snp_end: usize,
}

impl Node {
  pub fn leaf(label: NodeId) -> Self {
    Self {
      label,
      ..Self::default()
    }
  }

  #[inline]
  pub const fn is_leaf(&self) -> bool {
    self.child_left.is_none() && self.child_right.is_none()
  }

  #[inline]
  pub const fn is_root(&self) -> bool {
    self.parent.is_none()
  }

  /// Both children, if the node is a complete internal node
  #[inline]
  pub const fn children(&self) -> Option<[NodeId; 2]> {
    match (self.child_left, self.child_right) {
      (Some(left), Some(right)) => Some([left, right]),
      _ => None,
    }
  }
}
