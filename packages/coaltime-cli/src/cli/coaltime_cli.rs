#![allow(clippy::large_enum_variant)]

use crate::cli::jobs::Jobs;
use crate::cli::verbosity::Verbosity;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use coaltime::commands::infer::infer_args::CoaltimeInferArgs;
use coaltime::utils::global_init::setup_logger;
use eyre::Report;
use std::fmt::Debug;
use std::io;

#[derive(Parser, Debug)]
#[clap(name = "coaltime")]
#[clap(author, version)]
#[clap(verbatim_doc_comment)]
/// Branch lengths of genealogical trees by Markov chain Monte Carlo sampling of coalescence times
///
/// Given tree topologies with mutations mapped onto their branches, samples event times under a Poisson mutation
/// model and a coalescent prior, and writes the averaged branch lengths in generations.
pub struct CoaltimeArgs {
  #[clap(subcommand)]
  pub command: CoaltimeCommands,

  #[clap(flatten)]
  pub verbosity: Verbosity,

  #[clap(flatten)]
  pub jobs: Jobs,
}

#[derive(Subcommand, Debug)]
#[clap(verbatim_doc_comment)]
pub enum CoaltimeCommands {
  /// Generate shell completions.
  ///
  /// This will print the completions file contents to the console. Refer to your shell's documentation on how to install the completions.
  ///
  /// Example for Ubuntu Linux:
  ///
  ///    coaltime completions bash > ~/.local/share/bash-completion/coaltime
  ///
  Completions {
    /// Name of the shell to generate appropriate completions
    #[clap(value_name = "SHELL", value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
  },

  /// Estimates branch lengths of every tree in a genome section. Trees are processed in parallel.
  Infer(CoaltimeInferArgs),
}

pub fn generate_shell_completions(shell: Shell) -> Result<(), Report> {
  let mut command = CoaltimeArgs::command();
  let bin_name = command.get_name().to_owned();
  generate(shell, &mut command, bin_name, &mut io::stdout());
  Ok(())
}

pub fn coaltime_parse_cli_args() -> Result<CoaltimeArgs, Report> {
  let args = CoaltimeArgs::parse();
  setup_logger(args.verbosity.get_filter_level());
  Ok(args)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  fn verifies_command_definition() {
    CoaltimeArgs::command().debug_assert();
  }

  #[rstest]
  fn parses_infer_arguments() -> Result<(), Report> {
    let args = CoaltimeArgs::try_parse_from([
      "coaltime",
      "infer",
      "section.json",
      "-o",
      "out.json",
      "--coal",
      "history.coal",
      "--seed",
      "7",
      "--section",
      "3",
      "-j",
      "2",
    ])?;
    assert_eq!(args.jobs.jobs, 2);
    let CoaltimeCommands::Infer(infer_args) = args.command else {
      panic!("Expected the infer command");
    };
    assert_eq!(infer_args.seed, Some(7));
    assert_eq!(infer_args.section, 3);
    assert_eq!(infer_args.chunk_index, 0);
    assert_eq!(infer_args.options().retime_probability, None);
    Ok(())
  }
}
