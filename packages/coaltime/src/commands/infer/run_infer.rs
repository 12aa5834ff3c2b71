use crate::commands::infer::infer_args::CoaltimeInferArgs;
use crate::estimate::estimator::{estimate_branch_lengths, EstimationReport};
use crate::estimate::options::{EstimatorOptions, EstimatorParams};
use crate::estimate::population::PopulationHistory;
use crate::io::coal::read_coal_file;
use crate::io::json::{json_read_file, json_write_file, JsonPretty};
use crate::io::nwk::{write_nwk_file, WriteNwkOptions};
use crate::io::section::{SectionDocument, TreeRecord};
use crate::tree::tree::Tree;
use crate::utils::float_fmt::float_to_significant_digits;
use crate::utils::random::{draw_seeds, get_random_number_generator, section_seed};
use eyre::{Report, WrapErr};
use itertools::{Itertools, MinMaxResult};
use log::{debug, info, warn};
use rayon::prelude::*;

pub fn run_infer(infer_args: &CoaltimeInferArgs) -> Result<(), Report> {
  let CoaltimeInferArgs {
    input,
    output,
    output_nwk,
    coal,
    seed,
    chunk_index,
    section,
    ..
  } = infer_args;

  let params = infer_args.params();
  params.validate()?;
  let options = infer_args.options();
  options.validate()?;

  let document: SectionDocument = json_read_file(input)?;
  document
    .validate()
    .wrap_err_with(|| format!("When validating section '{}'", input.display()))?;

  let history = coal
    .as_ref()
    .map(|coal| read_coal_file(coal, params.effective_size))
    .transpose()?;

  let mut section_rng = get_random_number_generator(seed.map(|seed| section_seed(seed, *chunk_index, *section)));
  let seeds = draw_seeds(&mut section_rng, document.trees.len());

  info!(
    "Estimating branch lengths of {} trees over {} leaves ({} population size)",
    document.trees.len(),
    document.num_leaves,
    if history.is_some() { "variable" } else { "constant" }
  );

  let estimated = estimate_section(&document, &seeds, &params, &options, history.as_ref())?;
  summarize(&estimated);

  if let Some(output_nwk) = output_nwk {
    write_nwk_file(output_nwk, estimated.iter().map(|(tree, _)| tree), &WriteNwkOptions::default())?;
  }

  let trees = estimated
    .iter()
    .map(|(tree, report)| TreeRecord::from_tree(tree, Some(*report)))
    .collect();
  json_write_file(output, &SectionDocument { trees, ..document }, JsonPretty(true))
}

/// Estimate every tree of a section in parallel. Tree `i` uses `seeds[i]`, so results do not depend on scheduling.
pub fn estimate_section(
  document: &SectionDocument,
  seeds: &[u64],
  params: &EstimatorParams,
  options: &EstimatorOptions,
  history: Option<&PopulationHistory>,
) -> Result<Vec<(Tree, EstimationReport)>, Report> {
  document
    .trees
    .par_iter()
    .zip(seeds)
    .enumerate()
    .map(|(index, (record, &seed))| {
      let mut tree = record.to_tree().wrap_err_with(|| format!("When reading tree {index}"))?;
      let report = estimate_branch_lengths(&mut tree, &document.site_weights, params, options, history, Some(seed))
        .wrap_err_with(|| format!("When estimating branch lengths of tree {index}"))?;
      debug!(
        "Tree {index}: {} proposals, acceptance rate {}, converged: {}",
        report.num_proposals(),
        float_to_significant_digits(report.acceptance_rate(), 3),
        report.converged()
      );
      Ok((tree, report))
    })
    .collect()
}

fn summarize(estimated: &[(Tree, EstimationReport)]) {
  let num_trees = estimated.len();
  let num_converged = estimated.iter().filter(|(_, report)| report.converged()).count();
  let num_proposals: u64 = estimated.iter().map(|(_, report)| report.num_proposals()).sum();

  if num_converged < num_trees {
    warn!(
      "{} of {num_trees} trees stopped at the iteration cap before converging",
      num_trees - num_converged
    );
  }
  info!("Estimated {num_trees} trees with {num_proposals} proposals in total");

  if let MinMaxResult::MinMax(min, max) = estimated.iter().map(|(_, report)| report.acceptance_rate()).minmax() {
    info!(
      "Acceptance rates range from {} to {}",
      float_to_significant_digits(min, 3),
      float_to_significant_digits(max, 3)
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::json::json_read_str;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  const SECTION_JSON: &str = r#"{
    "num_leaves": 4,
    "num_sites": 6,
    "site_weights": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    "trees": [
      {
        "nodes": [
          { "parent": 4, "num_events": 2, "snp_begin": 0, "snp_end": 2 },
          { "parent": 4, "num_events": 1, "snp_begin": 0, "snp_end": 2 },
          { "parent": 5, "num_events": 3, "snp_begin": 2, "snp_end": 4 },
          { "parent": 5, "num_events": 1, "snp_begin": 2, "snp_end": 4 },
          { "parent": 6, "num_events": 2, "snp_begin": 4, "snp_end": 5 },
          { "parent": 6, "num_events": 1, "snp_begin": 1, "snp_end": 3 },
          { "parent": null }
        ]
      },
      {
        "nodes": [
          { "parent": 4, "num_events": 1, "snp_begin": 0, "snp_end": 3 },
          { "parent": 4, "num_events": 1, "snp_begin": 0, "snp_end": 3 },
          { "parent": 5, "num_events": 0, "snp_begin": 3, "snp_end": 4 },
          { "parent": 6, "num_events": 4, "snp_begin": 1, "snp_end": 5 },
          { "parent": 5, "num_events": 2, "snp_begin": 2, "snp_end": 3 },
          { "parent": 6, "num_events": 1, "snp_begin": 4, "snp_end": 5 },
          { "parent": null }
        ]
      }
    ]
  }"#;

  #[rstest]
  fn estimates_section_reproducibly() -> Result<(), Report> {
    let document: SectionDocument = json_read_str(SECTION_JSON)?;
    document.validate()?;
    let params = EstimatorParams {
      effective_size: 1000.0,
      mutation_rate: 1e-3,
    };
    let options = EstimatorOptions::default();
    let seeds = draw_seeds(&mut get_random_number_generator(Some(section_seed(1, 0, 2))), 2);

    let first = estimate_section(&document, &seeds, &params, &options, None)?;
    let second = estimate_section(&document, &seeds, &params, &options, None)?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|(_, report)| report.converged()));
    Ok(())
  }
}
