use webentry::cli::commands::{CliArgs, Commands};
use webentry::cli::handlers::{handle_detectors, handle_synth};
use webentry::util::logging::{self, LoggingConfig};
use webentry::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("webentry v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Synth(synth_args) => handle_synth(synth_args, args.quiet),
        Commands::Detectors(detectors_args) => handle_detectors(detectors_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level) = args.log_level.as_deref().and_then(logging::parse_level) {
        config.level = level;
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    logging::init_logging(config);
}
