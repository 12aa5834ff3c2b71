use crate::make_error;
use crate::tree::node::{Node, NodeId};
use crate::tree::topology::Topology;
use eyre::{Report, WrapErr};

/// Strictly binary coalescent tree over `N` leaves, stored as an arena of `2N-1` nodes.
///
/// Invariants, checked on construction:
///  - node at index `i` has label `i`
///  - leaves are `0..N`, internal nodes are `N..2N-1`, the root is `2N-2`
///  - every internal node has exactly two distinct children, and every parent label exceeds its children's labels
///  - parent and child references agree with each other
///  - `snp_begin <= snp_end` on every branch
///
/// The label ordering makes the identity a valid initial order of coalescence events.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
  nodes: Vec<Node>,
  topology: Topology,
}

impl Tree {
  pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, Report> {
    let topology = validate(&nodes).wrap_err("When validating tree topology")?;
    Ok(Self { nodes, topology })
  }

  /// Build a tree from the parent label of every node (`None` for the root).
  ///
  /// Children are assigned in ascending label order: the smaller child label becomes the left child.
  pub fn from_parents(parents: &[Option<NodeId>]) -> Result<Self, Report> {
    let mut nodes: Vec<Node> = (0..parents.len()).map(Node::leaf).collect();

    for (label, &parent) in parents.iter().enumerate() {
      let Some(parent) = parent else { continue };
      if parent >= nodes.len() {
        return make_error!("Node {label} refers to parent {parent}, which does not exist");
      }
      nodes[label].parent = Some(parent);
      let parent_node = &mut nodes[parent];
      if parent_node.child_left.is_none() {
        parent_node.child_left = Some(label);
      } else if parent_node.child_right.is_none() {
        parent_node.child_right = Some(label);
      } else {
        return make_error!("Node {parent} has more than two children");
      }
    }

    Self::from_nodes(nodes)
  }

  #[inline]
  pub const fn num_leaves(&self) -> usize {
    self.topology.num_leaves()
  }

  #[inline]
  pub fn num_nodes(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub const fn root(&self) -> NodeId {
    self.topology.root()
  }

  #[inline]
  pub const fn topology(&self) -> &Topology {
    &self.topology
  }

  #[inline]
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn into_nodes(self) -> Vec<Node> {
    self.nodes
  }

  #[inline]
  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id]
  }

  #[inline]
  pub fn branch_length(&self, id: NodeId) -> f64 {
    self.nodes[id].branch_length
  }

  #[inline]
  pub fn set_branch_length(&mut self, id: NodeId, branch_length: f64) {
    self.nodes[id].branch_length = branch_length;
  }

  /// Distance from the leaves to every node, following left children.
  ///
  /// Only meaningful when branch lengths are consistent (ultrametric over the leaves).
  pub fn node_heights(&self) -> Vec<f64> {
    let mut heights = vec![0.0; self.num_nodes()];
    for node in self.topology.internal_nodes() {
      let [left, _] = self.topology.children(node);
      heights[node] = heights[left] + self.nodes[left].branch_length;
    }
    heights
  }
}

fn validate(nodes: &[Node]) -> Result<Topology, Report> {
  let num_nodes = nodes.len();
  if num_nodes < 3 || num_nodes % 2 == 0 {
    return make_error!("Expected 2N-1 nodes with N >= 2, but found {num_nodes} nodes");
  }
  let num_leaves = (num_nodes + 1) / 2;
  let root = num_nodes - 1;

  let mut parents = vec![root; num_nodes];
  let mut children = Vec::with_capacity(num_leaves - 1);

  for (index, node) in nodes.iter().enumerate() {
    if node.label != index {
      return make_error!("Node at position {index} has label {}", node.label);
    }

    if node.snp_begin > node.snp_end {
      return make_error!(
        "Node {index} spans an inconsistent SNP interval [{}, {})",
        node.snp_begin,
        node.snp_end
      );
    }

    match node.parent {
      None if index == root => {}
      None => return make_error!("Node {index} has no parent, but only the root {root} may have none"),
      Some(_) if index == root => return make_error!("Root {root} must not have a parent"),
      Some(parent) => {
        if parent >= num_nodes {
          return make_error!("Node {index} refers to parent {parent}, which does not exist");
        }
        if parent <= index {
          return make_error!("Node {index} has parent {parent}, but parent labels must exceed child labels");
        }
        let is_child_of_parent = nodes[parent].child_left == Some(index) || nodes[parent].child_right == Some(index);
        if !is_child_of_parent {
          return make_error!("Node {index} names {parent} as its parent, but {parent} does not list it as a child");
        }
        parents[index] = parent;
      }
    }

    if index < num_leaves {
      if !node.is_leaf() {
        return make_error!("Node {index} is expected to be a leaf (N = {num_leaves}), but it has children");
      }
    } else {
      let Some([left, right]) = node.children() else {
        return make_error!("Internal node {index} must have exactly two children");
      };
      if left == right {
        return make_error!("Internal node {index} lists child {left} twice");
      }
      for child in [left, right] {
        if child >= index {
          return make_error!("Internal node {index} has child {child}, but child labels must be smaller");
        }
        if nodes[child].parent != Some(index) {
          return make_error!("Node {index} lists {child} as a child, but {child} does not name it as its parent");
        }
      }
      children.push([left, right]);
    }
  }

  Ok(Topology::new(num_leaves, parents, children))
}
