//! Command-line interface for plugterm.

use clap::{Parser, Subcommand};
use plugterm_config::LogLevel;
use plugterm_modules::Capabilities;
use std::path::PathBuf;

/// plugterm - a terminal host with pluggable modules
#[derive(Parser)]
#[command(name = "plugterm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from PATH instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List the built-in modules and the capabilities they implement
    Modules,

    /// Run as an MCP server on stdin/stdout
    Mcp,
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeOptions {
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Log level override from CLI
    pub log_level: Option<LogLevel>,
}

/// Result of CLI processing
#[derive(Debug, PartialEq)]
pub enum CliResult {
    /// Run the terminal host
    Continue(RuntimeOptions),
    /// Run the MCP server instead of the terminal host
    McpServer(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    resolve(Cli::parse())
}

fn resolve(cli: Cli) -> CliResult {
    let options = RuntimeOptions {
        config_path: cli.config,
        log_level: cli.log_level.map(Into::into),
    };
    match cli.command {
        Some(Commands::Modules) => {
            print!("{}", module_listing());
            CliResult::Exit(0)
        }
        Some(Commands::Mcp) => CliResult::McpServer(options),
        None => CliResult::Continue(options),
    }
}

/// One line per built-in module: name, capabilities, description.
pub fn module_listing() -> String {
    let mut out = String::new();
    for mut module in crate::modules::builtin_modules() {
        let capabilities = Capabilities::probe(module.as_mut());
        out.push_str(&format!(
            "{:<16} {:<40} {}\n",
            module.name(),
            capabilities.to_string(),
            module.description()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliResult {
        resolve(Cli::parse_from(std::iter::once("plugterm").chain(args.iter().copied())))
    }

    #[test]
    fn test_default_continues() {
        assert_eq!(parse(&[]), CliResult::Continue(RuntimeOptions::default()));
    }

    #[test]
    fn test_flags() {
        let result = parse(&["--config", "/tmp/p.yaml", "--log-level", "debug"]);
        assert_eq!(
            result,
            CliResult::Continue(RuntimeOptions {
                config_path: Some(PathBuf::from("/tmp/p.yaml")),
                log_level: Some(LogLevel::Debug),
            })
        );
    }

    #[test]
    fn test_mcp_subcommand() {
        assert!(matches!(parse(&["mcp"]), CliResult::McpServer(_)));
    }

    #[test]
    fn test_module_listing_names_every_builtin() {
        let listing = module_listing();
        for name in ["sync-update", "notify", "visual-bell", "box-drawing", "font-zoom"] {
            assert!(listing.contains(name), "missing {name}:\n{listing}");
        }
    }
}
