pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectorsArgs, SynthArgs};
pub use output::{DetectorInfo, OutputFormat, OutputFormatter};
