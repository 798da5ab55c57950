use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Synthetic entry points for servlet-based web applications
#[derive(Parser, Debug)]
#[command(
    name = "webentry",
    about = "Synthesizes an analyzable entry point for a servlet-based web application",
    version,
    long_about = "webentry reads an exploded web application (web.xml, struts-config.xml) \
                  together with a JSON index of its class signatures, detects every \
                  container-managed component and writes a driver that replays the \
                  container's initialization and dispatch sequence."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only print the driver"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect components and synthesize the entry point",
        long_about = "Runs every active detector over the web application, then writes the \
                      synthesized driver.\n\n\
                      Examples:\n  \
                      webentry synth ./build/webapp\n  \
                      webentry synth ./build/webapp --classes classes.json --format json\n  \
                      webentry synth ./build/webapp --detectors servlet -o driver.txt"
    )]
    Synth(SynthArgs),

    #[command(about = "List the available detectors and the templates they contribute")]
    Detectors(DetectorsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct SynthArgs {
    #[arg(value_name = "PATH", help = "Root of the exploded web application")]
    pub webapp: PathBuf,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "JSON class index of the application's compiled classes"
    )]
    pub classes: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "text", help = "Output format")]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        value_name = "NAMES",
        help = "Comma-separated detectors to run (overrides WEBENTRY_DETECTORS)"
    )]
    pub detectors: Option<String>,

    #[arg(long, value_name = "CLASS", help = "Class name of the synthesized driver")]
    pub driver_class: Option<String>,

    #[arg(long, help = "Skip the source pass of detectors whose check files are missing")]
    pub strict_check_files: bool,

    #[arg(long, help = "Exit with status 2 when any error diagnostic was reported")]
    pub fail_on_error: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectorsArgs {
    #[arg(short = 'f', long, value_enum, default_value = "text", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Text,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => super::output::OutputFormat::Text,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_synth_args() {
        let args = CliArgs::parse_from(["webentry", "synth", "/srv/webapp"]);
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.webapp, PathBuf::from("/srv/webapp"));
                assert_eq!(synth.format, OutputFormatArg::Text);
                assert!(synth.classes.is_none());
                assert!(synth.detectors.is_none());
                assert!(!synth.strict_check_files);
                assert!(!synth.fail_on_error);
            }
            _ => panic!("Expected Synth command"),
        }
    }

    #[test]
    fn test_synth_with_options() {
        let args = CliArgs::parse_from([
            "webentry",
            "synth",
            "app",
            "--classes",
            "classes.json",
            "--format",
            "json",
            "-d",
            "struts",
            "-o",
            "out.json",
            "-v",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.classes, Some(PathBuf::from("classes.json")));
                assert_eq!(synth.format, OutputFormatArg::Json);
                assert_eq!(synth.detectors.as_deref(), Some("struts"));
                assert_eq!(synth.output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Synth command"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["webentry", "-v", "-q", "detectors"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_detectors_command() {
        let args = CliArgs::parse_from(["webentry", "detectors", "--format", "yaml"]);
        assert!(matches!(
            args.command,
            Commands::Detectors(DetectorsArgs {
                format: OutputFormatArg::Yaml
            })
        ));
    }
}
