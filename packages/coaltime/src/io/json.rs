use crate::io::file::{create_file_or_stdout, open_file_or_stdin};
use eyre::{Report, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::{de::Read, Deserializer};
use std::io::{Cursor, Write};
use std::path::Path;

pub fn json_read_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(filepath: P) -> Result<T, Report> {
  let filepath = filepath.as_ref();
  json_read(open_file_or_stdin(&Some(filepath))?)
    .wrap_err_with(|| format!("When reading JSON file: '{}'", filepath.display()))
}

pub fn json_read_str<T: for<'de> Deserialize<'de>>(s: impl AsRef<str>) -> Result<T, Report> {
  json_read(Cursor::new(s.as_ref())).wrap_err("When reading JSON string")
}

pub fn json_read<T: for<'de> Deserialize<'de>>(reader: impl std::io::Read) -> Result<T, Report> {
  let mut de = Deserializer::from_reader(reader);
  deserialize_without_recursion_limit(&mut de).wrap_err("When reading JSON")
}

/// Deeply nested trees exceed the default recursion limit of serde_json
fn deserialize_without_recursion_limit<'de, R: Read<'de>, T: Deserialize<'de>>(
  de: &mut Deserializer<R>,
) -> Result<T, Report> {
  de.disable_recursion_limit();
  let de = serde_stacker::Deserializer::new(de);
  let obj = T::deserialize(de).wrap_err("When parsing JSON")?;
  Ok(obj)
}

#[derive(Clone, Copy, Debug)]
pub struct JsonPretty(pub bool);

pub fn json_write_file<T: Serialize>(filepath: impl AsRef<Path>, obj: &T, pretty: JsonPretty) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  json_write(create_file_or_stdout(filepath)?, &obj, pretty)
    .wrap_err_with(|| format!("When writing JSON file: '{}'", filepath.display()))
}

pub fn json_write_str<T: Serialize>(obj: &T, pretty: JsonPretty) -> Result<String, Report> {
  if pretty.0 {
    serde_json::to_string_pretty(obj)
  } else {
    serde_json::to_string(obj)
  }
  .wrap_err("When writing JSON string")
}

pub fn json_write<W: Write, T: Serialize>(mut writer: W, obj: &T, pretty: JsonPretty) -> Result<(), Report> {
  if pretty.0 {
    serde_json::to_writer_pretty(&mut writer, &obj)
  } else {
    serde_json::to_writer(&mut writer, &obj)
  }
  .wrap_err("When writing JSON")?;
  writeln!(writer)?;
  writer.flush().wrap_err("When flushing JSON output")
}
