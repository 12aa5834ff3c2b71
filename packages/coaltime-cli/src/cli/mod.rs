pub mod coaltime_cli;
pub mod jobs;
pub mod verbosity;
