use clap::Args;
use eyre::Report;

#[derive(Args, Debug, Clone)]
pub struct Jobs {
  /// Number of trees estimated concurrently. If not specified, all available CPU threads will be used.
  #[clap(global = true, display_order = 90, long, short = 'j', default_value_t = num_cpus::get())]
  pub jobs: usize,
}

impl Jobs {
  /// Set up the global rayon pool. A single job runs on the calling thread.
  pub fn build_global_pool(&self) -> Result<(), Report> {
    let builder = rayon::ThreadPoolBuilder::new().num_threads(self.jobs);
    let builder = if self.jobs == 1 {
      builder.use_current_thread()
    } else {
      builder
    };
    builder.build_global()?;
    Ok(())
  }
}
