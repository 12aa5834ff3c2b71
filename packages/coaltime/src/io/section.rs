use crate::estimate::estimator::EstimationReport;
use crate::make_error;
use crate::tree::node::NodeId;
use crate::tree::tree::Tree;
use eyre::{Report, WrapErr};
use serde::{Deserialize, Serialize};

/// A genome section: the trees of consecutive genomic intervals over the same samples, and the per-site distance
/// weights of the section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionDocument {
  pub num_leaves: usize,
  pub num_sites: usize,
  pub site_weights: Vec<f64>,
  pub trees: Vec<TreeRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
  pub nodes: Vec<NodeRecord>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub report: Option<EstimationReport>,
}

/// A node, identified by its position in the list
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
  /// Parent label, `null` for the root
  pub parent: Option<NodeId>,

  #[serde(default)]
  pub num_events: u32,

  #[serde(default)]
  pub snp_begin: usize,

  #[serde(default)]
  pub snp_end: usize,

  /// In generations
  #[serde(default)]
  pub branch_length: f64,
}

impl SectionDocument {
  pub fn validate(&self) -> Result<(), Report> {
    if self.site_weights.len() != self.num_sites {
      return make_error!(
        "Section declares {} sites, but has {} site weights",
        self.num_sites,
        self.site_weights.len()
      );
    }
    if let Some(weight) = self.site_weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
      return make_error!("Site weights must be finite and non-negative, but found {weight}");
    }
    let num_nodes = 2 * self.num_leaves.max(1) - 1;
    for (index, tree) in self.trees.iter().enumerate() {
      if tree.nodes.len() != num_nodes {
        return make_error!(
          "Tree {index} has {} nodes, but a tree over {} leaves has {num_nodes}",
          tree.nodes.len(),
          self.num_leaves
        );
      }
    }
    Ok(())
  }
}

impl TreeRecord {
  pub fn to_tree(&self) -> Result<Tree, Report> {
    let parents: Vec<Option<NodeId>> = self.nodes.iter().map(|node| node.parent).collect();
    let mut nodes = Tree::from_parents(&parents)?.into_nodes();
    for (node, record) in nodes.iter_mut().zip(&self.nodes) {
      node.num_events = record.num_events;
      node.snp_begin = record.snp_begin;
      node.snp_end = record.snp_end;
      node.branch_length = record.branch_length;
    }
    Tree::from_nodes(nodes).wrap_err("When reading tree annotations")
  }

  pub fn from_tree(tree: &Tree, report: Option<EstimationReport>) -> Self {
    let nodes = tree
      .nodes()
      .iter()
      .map(|node| NodeRecord {
        parent: node.parent,
        num_events: node.num_events,
        snp_begin: node.snp_begin,
        snp_end: node.snp_end,
        branch_length: node.branch_length,
      })
      .collect();
    Self { nodes, report }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::json::json_read_str;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  const SECTION_JSON: &str = r#"{
    "num_leaves": 3,
    "num_sites": 4,
    "site_weights": [1.0, 1.0, 2.0, 1.0],
    "trees": [
      {
        "nodes": [
          { "parent": 3, "num_events": 2, "snp_begin": 0, "snp_end": 2 },
          { "parent": 3, "num_events": 1, "snp_begin": 2, "snp_end": 3 },
          { "parent": 4 },
          { "parent": 4, "num_events": 1, "snp_begin": 3, "snp_end": 3 },
          { "parent": null }
        ]
      }
    ]
  }"#;

  #[rstest]
  fn reads_section_document() -> Result<(), Report> {
    let section: SectionDocument = json_read_str(SECTION_JSON)?;
    section.validate()?;
    let tree = section.trees[0].to_tree()?;
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.node(3).children(), Some([0, 1]));
    assert_eq!(tree.node(0).num_events, 2);
    assert_eq!(tree.node(1).snp_begin, 2);
    assert_eq!(tree.node(2).num_events, 0);
    Ok(())
  }

  #[rstest]
  fn writes_back_branch_lengths() -> Result<(), Report> {
    let section: SectionDocument = json_read_str(SECTION_JSON)?;
    let mut tree = section.trees[0].to_tree()?;
    tree.set_branch_length(2, 120.0);
    let record = TreeRecord::from_tree(&tree, None);
    assert_eq!(record.nodes[2].branch_length, 120.0);
    assert_eq!(record.nodes[4].parent, None);
    assert_eq!(record.nodes[0], section.trees[0].nodes[0]);
    Ok(())
  }

  #[rstest]
  fn rejects_inconsistent_section() -> Result<(), Report> {
    let mut section: SectionDocument = json_read_str(SECTION_JSON)?;
    section.num_sites = 5;
    assert!(section.validate().is_err());
    section.num_sites = 4;
    section.num_leaves = 4;
    assert!(section.validate().is_err());
    Ok(())
  }
}
