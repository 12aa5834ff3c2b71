pub mod coal;
pub mod file;
pub mod fs;
pub mod json;
pub mod nwk;
pub mod section;
