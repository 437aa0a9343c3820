//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Planwright - LLM project plan generator
#[derive(Parser)]
#[command(
    name = "pw",
    about = "Turns a project description and a deadline into a phased project plan",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service until interrupted
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate one plan and print it as JSON
    Generate {
        /// What the project is about
        #[arg(short, long)]
        description: String,

        /// When it has to be done, free text
        #[arg(short = 't', long)]
        deadline: String,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// List models the provider can generate with
    Models,

    /// Send a short test prompt to each model
    Probe {
        /// Models to try (defaults to the configured chain)
        models: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from(["pw", "generate", "-d", "CRM app", "--deadline", "3 months", "--pretty"]);
        match cli.command {
            Command::Generate {
                description,
                deadline,
                pretty,
            } => {
                assert_eq!(description, "CRM app");
                assert_eq!(deadline, "3 months");
                assert!(pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pw", "probe", "m1", "m2", "-l", "debug", "-c", "x.yml"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
        assert!(matches!(cli.command, Command::Probe { ref models } if models.len() == 2));
    }

    #[test]
    fn test_serve_bind_override() {
        let cli = Cli::parse_from(["pw", "serve", "--bind", "0.0.0.0:8080"]);
        assert!(matches!(cli.command, Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:8080"));
    }
}
