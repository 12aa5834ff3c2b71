use crate::io::file::create_file_or_stdout;
use crate::tree::node::NodeId;
use crate::tree::tree::Tree;
use crate::utils::float_fmt::float_to_digits;
use eyre::{Report, WrapErr};
use log::warn;
use smart_default::SmartDefault;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Debug, SmartDefault)]
pub struct WriteNwkOptions {
  /// Format branch lengths keeping this many significant digits
  #[default(Some(6))]
  pub weight_significant_digits: Option<u8>,

  /// Format branch lengths keeping this many decimal digits
  pub weight_decimal_digits: Option<i8>,
}

/// Write trees in Newick format, one per line. Leaves are named by their labels.
pub fn write_nwk_file<'t>(
  filepath: impl AsRef<Path>,
  trees: impl IntoIterator<Item = &'t Tree>,
  options: &WriteNwkOptions,
) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let mut f = create_file_or_stdout(filepath)?;
  for tree in trees {
    write_nwk_writer(&mut f, tree, options)?;
    writeln!(f)?;
  }
  f.flush()
    .wrap_err_with(|| format!("When writing Newick file '{}'", filepath.display()))
}

pub fn write_nwk_str(tree: &Tree, options: &WriteNwkOptions) -> Result<String, Report> {
  let mut buf = Vec::new();
  write_nwk_writer(&mut buf, tree, options)?;
  Ok(String::from_utf8(buf)?)
}

pub fn write_nwk_writer(writer: &mut impl Write, tree: &Tree, options: &WriteNwkOptions) -> Result<(), Report> {
  let topology = tree.topology();

  let mut stack: Vec<(NodeId, usize)> = vec![(tree.root(), 0)];
  while let Some((node, child_visit)) = stack.pop() {
    let num_children = if topology.is_leaf(node) { 0 } else { 2 };

    if child_visit < num_children {
      stack.push((node, child_visit + 1));
      if child_visit == 0 {
        write!(writer, "(")?;
      } else {
        write!(writer, ",")?;
      }
      stack.push((topology.children(node)[child_visit], 0));
    } else {
      if child_visit > 0 {
        write!(writer, ")")?;
      }
      if topology.is_leaf(node) {
        write!(writer, "{node}")?;
      }
      if !topology.is_root(node) {
        write!(writer, ":{}", format_weight(tree.branch_length(node), options))?;
      }
    }
  }

  write!(writer, ";")?;
  Ok(())
}

pub fn format_weight(weight: f64, options: &WriteNwkOptions) -> String {
  if !weight.is_finite() {
    warn!("When converting tree to Newick: branch length is invalid: '{weight}'");
  }
  float_to_digits(weight, options.weight_significant_digits, options.weight_decimal_digits)
}
