use clap::{Parser, Subcommand};
use metareg::lens::utils::OutputFormat;
use metareg::*;
use tracing::Level;

mod commands;

use commands::config::ConfigArgs;
use commands::delete::DeleteArgs;
use commands::show::ShowArgs;
use metareg::lens::registry::{CreateArgs, EditArgs};

/// Exit code for configuration problems found before any store access
const EXIT_CONFIG: i32 = 2;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.metareg/metareg.toml is used
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all registered databases
    List,

    /// Register a new database
    Create(CreateArgs),

    /// Show the edit form of one database
    Show(ShowArgs),

    /// Change the fields of a registered database
    Edit(EditArgs),

    /// Remove a registered database permanently
    Delete(DeleteArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let config = match MetaregConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let output = cli.output;

    if let Commands::Config(args) = cli.command {
        commands::config::run(&config, args, output);
        return;
    }

    let settings = match config.store_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "set them in {} or via METAREG_* environment variables",
                config.config_file
            );
            std::process::exit(EXIT_CONFIG);
        }
    };

    let provider = ConnectionProvider::new(settings);

    let result = match cli.command {
        Commands::List => commands::list::run(&provider, output),
        Commands::Create(args) => commands::create::run(&provider, args, output),
        Commands::Show(args) => commands::show::run(&provider, args, output),
        Commands::Edit(args) => commands::edit::run(&provider, args, output),
        Commands::Delete(args) => commands::delete::run(&provider, args, output),
        Commands::Config(_) => Ok(()),
    };

    if let Err(e) = provider.close() {
        eprintln!("{}", e);
    }

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "metareg", "list", "--debug", "--config", "/tmp/metareg.toml", "-o", "json",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config.as_deref(), Some("/tmp/metareg.toml"));
        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_edit_positional_id() {
        let cli = Cli::try_parse_from(["metareg", "edit", "db1", "--role", "data-engineer"]).unwrap();
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.id, "db1");
                assert_eq!(args.role, Some(Role::DataEngineer));
            }
            _ => panic!("expected edit command"),
        }
    }
}
