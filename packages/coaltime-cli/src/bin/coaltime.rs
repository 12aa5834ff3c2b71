use coaltime::commands::infer::run_infer::run_infer;
use coaltime::utils::global_init::global_init;
use coaltime_cli::cli::coaltime_cli::{coaltime_parse_cli_args, generate_shell_completions, CoaltimeCommands};
use ctor::ctor;
use eyre::Report;
use log::info;

#[ctor]
fn init() {
  global_init();
}

fn main() -> Result<(), Report> {
  let args = coaltime_parse_cli_args()?;

  info!("{:#?}", &args);

  args.jobs.build_global_pool()?;

  match args.command {
    CoaltimeCommands::Completions { shell } => {
      generate_shell_completions(shell)?;
    }
    CoaltimeCommands::Infer(infer_args) => {
      run_infer(&infer_args)?;
    }
  }

  Ok(())
}
