pub mod commands;
pub mod constants;
pub mod estimate;
pub mod io;
pub mod tree;
pub mod utils;

#[cfg(test)]
mod tests {
  use crate::utils::global_init::global_init;
  use ctor::ctor;

  #[ctor]
  fn init() {
    global_init();
  }
}
