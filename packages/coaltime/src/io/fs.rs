use crate::io::file::open_file_or_stdin;
use crate::make_report;
use eyre::{Report, WrapErr};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs};

pub fn absolute_path(path: impl AsRef<Path>) -> Result<PathBuf, Report> {
  let path = path.as_ref();

  let absolute_path = if path.is_absolute() {
    path.to_path_buf()
  } else {
    env::current_dir()?.join(path)
  };

  Ok(absolute_path)
}

pub fn ensure_dir(filepath: impl AsRef<Path>) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  {
    let parent_dir = filepath
      .parent()
      .ok_or_else(|| make_report!("Unable to get parent path for '{}'", filepath.display()))?;

    let parent_path = absolute_path(parent_dir)?;

    fs::create_dir_all(&parent_path).wrap_err_with(|| format!("When creating directory '{}'", parent_path.display()))
  }
  .wrap_err_with(|| format!("When ensuring parent directory for '{}'", filepath.display()))
}

pub fn filename_maybe(filepath: impl AsRef<Path>) -> Option<String> {
  filepath.as_ref().file_name()?.to_str()?.to_owned().into()
}

/// Reads entire file into a string, using a buffered reader
pub fn read_file_to_string(filepath: impl AsRef<Path>) -> Result<String, Report> {
  let filepath = filepath.as_ref();
  let mut file = open_file_or_stdin(&Some(filepath))?;
  let mut data = String::new();
  file
    .read_to_string(&mut data)
    .wrap_err_with(|| format!("When reading file: '{}'", filepath.display()))?;
  Ok(data)
}
