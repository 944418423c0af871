use clap::{Parser, Subcommand};

mod common;
mod esptool;
mod info;
mod merged;
mod ota;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

/// Assemble release artifacts from CYD firmware build outputs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ToolOptions {
    /// Increase log verbosity (can be repeated).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(Subcommand, Debug)]
enum ToolCommand {
    /// Create <product>_v<version>[_debug]_FULL.bin in ./bin/ for full flashing.
    Merged(merged::MergedOpts),
    /// Create <product>_v<version>[_debug]_OTA.bin in ./bin/ for OTA updates.
    Ota(ota::OtaOpts),
    /// Show what merged and ota would do, without writing anything.
    Info(info::InfoOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Merged(o) => o.run(),
            Ota(o) => o.run(),
            Info(o) => o.run(),
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let opts = ToolOptions::parse();
    init_logging(opts.verbose);
    opts.command.run()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        ToolOptions::command().debug_assert();
    }

    #[test]
    fn parses_target_options() {
        let opts = ToolOptions::try_parse_from([
            "cydtool",
            "-vv",
            "merged",
            "--project-dir",
            "/proj",
            "--env",
            "debug",
            "--strategy",
            "stitch",
        ])
        .unwrap();
        assert_eq!(opts.verbose, 2);
        assert!(matches!(opts.command, ToolCommand::Merged(_)));
    }
}
