#![allow(clippy::pub_use)]

use eyre::Report;

pub fn report_to_string(report: &Report) -> String {
  let strings: Vec<String> = report.chain().map(std::string::ToString::to_string).collect();
  strings.join(": ")
}

#[macro_export(local_inner_macros)]
macro_rules! make_error {
  ($($arg:tt)*) => {
    {
      Err(eyre::eyre!(std::format!($($arg)*)))
    }
  };
}

pub use make_error;

#[macro_export(local_inner_macros)]
macro_rules! make_report {
  ($($arg:tt)*) => {
    {
      eyre::eyre!($($arg)*)
    }
  };
}

pub use make_report;

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn joins_report_chain() {
    let report = make_report!("Node 3 has no parent").wrap_err("When validating tree topology");
    assert_eq!(
      report_to_string(&report),
      "When validating tree topology: Node 3 has no parent"
    );
  }
}
