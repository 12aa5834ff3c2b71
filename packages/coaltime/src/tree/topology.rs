use crate::tree::node::NodeId;

/// Flat, infallible view of a validated binary tree topology.
///
/// Leaves are `0..N`, internal nodes are `N..2N-1` and the root is `2N-2`. The root is recorded as its own parent,
/// so that the parent lookup needs no branching in the sampler hot loops. Use [`Topology::is_root`] to tell it apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
  num_leaves: usize,
  parents: Vec<NodeId>,
  children: Vec<[NodeId; 2]>,
}

impl Topology {
  pub(crate) fn new(num_leaves: usize, parents: Vec<NodeId>, children: Vec<[NodeId; 2]>) -> Self {
    debug_assert_eq!(parents.len(), 2 * num_leaves - 1);
    debug_assert_eq!(children.len(), num_leaves - 1);
    Self {
      num_leaves,
      parents,
      children,
    }
  }

  #[inline]
  pub const fn num_leaves(&self) -> usize {
    self.num_leaves
  }

  #[inline]
  pub const fn num_nodes(&self) -> usize {
    2 * self.num_leaves - 1
  }

  #[inline]
  pub const fn root(&self) -> NodeId {
    2 * self.num_leaves - 2
  }

  #[inline]
  pub const fn is_root(&self, node: NodeId) -> bool {
    node == self.root()
  }

  #[inline]
  pub const fn is_leaf(&self, node: NodeId) -> bool {
    node < self.num_leaves
  }

  /// Parent of the node. The root is its own parent.
  #[inline]
  pub fn parent(&self, node: NodeId) -> NodeId {
    self.parents[node]
  }

  /// Children of an internal node.
  #[inline]
  pub fn children(&self, node: NodeId) -> [NodeId; 2] {
    debug_assert!(!self.is_leaf(node), "leaf {node} has no children");
    self.children[node - self.num_leaves]
  }

  /// Internal nodes, in label order
  pub fn internal_nodes(&self) -> impl Iterator<Item = NodeId> {
    self.num_leaves..self.num_nodes()
  }
}
