use crate::make_error;
use crate::tree::tree::Tree;
use eyre::Report;

/// Expected number of mutations per unit of coalescent time on the branch above every node.
///
/// Sums the per-site distance weights over the SNP span `[snp_begin, snp_end)` of each branch, plus half the weight of
/// each flanking site (the site before `snp_begin`, if any, and the site at `snp_end`, unless it is the last site), and
/// scales the sum by `Ne * mu`.
pub fn mutation_rates(
  tree: &Tree,
  site_weights: &[f64],
  effective_size: f64,
  mutation_rate: f64,
) -> Result<Vec<f64>, Report> {
  let num_sites = site_weights.len();
  let scale = effective_size * mutation_rate;

  tree
    .nodes()
    .iter()
    .map(|node| {
      let (begin, end) = (node.snp_begin, node.snp_end);
      if end >= num_sites {
        return make_error!(
          "Node {} spans SNPs [{begin}, {end}), but there are only {num_sites} sites",
          node.label
        );
      }

      let mut weight: f64 = site_weights[begin..end].iter().sum();
      if begin > 0 {
        weight += 0.5 * site_weights[begin - 1];
      }
      if end < num_sites - 1 {
        weight += 0.5 * site_weights[end];
      }
      Ok(weight * scale)
    })
    .collect()
}
