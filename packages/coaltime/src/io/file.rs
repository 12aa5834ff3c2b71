use crate::io::fs::ensure_dir;
use eyre::{Report, WrapErr};
use log::{info, warn};
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

const TTY_WARNING: &str = r#"Reading from standard input which is a TTY (e.g. an interactive terminal). This is likely not what you meant. Instead:

 - if you want to read a section from the output of another program, try:

    cat /path/to/section.json | coaltime infer - <your other flags>

 - if you want to read from a file, don't forget to provide a path:

    coaltime infer /path/to/section.json
"#;

const BUF_SIZE: usize = 32 * 1024;

pub fn open_stdin() -> Result<Box<dyn BufRead>, Report> {
  info!("Reading from standard input");
  if stdin().is_terminal() {
    warn!("{TTY_WARNING}");
  }
  Ok(Box::new(BufReader::new(stdin())))
}

/// Open file for reading given a filepath. If the filepath is None or `-`, then read from stdin.
pub fn open_file_or_stdin<P: AsRef<Path>>(filepath: &Option<P>) -> Result<Box<dyn BufRead>, Report> {
  match filepath {
    Some(filepath) => {
      let filepath = filepath.as_ref();
      if is_path_stdin(filepath) {
        open_stdin()
      } else {
        let file = File::open(filepath).wrap_err_with(|| format!("When opening file '{}'", filepath.display()))?;
        Ok(Box::new(BufReader::with_capacity(BUF_SIZE, file)))
      }
    }
    None => open_stdin(),
  }
}

/// Open file for writing. If the parent directory does not exist it will be created recursively. Path `-` writes to
/// stdout.
pub fn create_file_or_stdout(filepath: impl AsRef<Path>) -> Result<Box<dyn Write + Send>, Report> {
  let filepath = filepath.as_ref();

  let file: Box<dyn Write + Send> = if is_path_stdout(filepath) {
    info!("File path is '{}'. Writing to standard output.", filepath.display());
    Box::new(stdout())
  } else {
    ensure_dir(filepath)?;
    Box::new(File::create(filepath).wrap_err_with(|| format!("When creating file: '{}'", filepath.display()))?)
  };

  Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, file)))
}

pub fn is_path_stdin(filepath: impl AsRef<Path>) -> bool {
  let filepath = filepath.as_ref();
  filepath == PathBuf::from("-") || filepath == PathBuf::from("/dev/stdin")
}

pub fn is_path_stdout(filepath: impl AsRef<Path>) -> bool {
  let filepath = filepath.as_ref();
  filepath == PathBuf::from("-") || filepath == PathBuf::from("/dev/stdout")
}
