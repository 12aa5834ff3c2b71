pub mod infer_args;
pub mod run_infer;
