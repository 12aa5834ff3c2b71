pub mod node;
pub mod topology;
#[allow(clippy::module_inception)]
pub mod tree;
