//! sgv - inspect and edit the video settings menu under a platform profile.
//!
//! Every invocation builds the menu from scratch. Pass `--store <file>` to
//! keep values between invocations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::{action, config as config_cmd, profile, set, show, MenuArgs};
use config::Config;

/// sgv - Settings graph for the video options menu.
///
/// Run `sgv` or `sgv show` to print the menu for the configured profile.
#[derive(Parser, Debug)]
#[command(
    name = "sgv",
    author,
    version,
    about = "Settings graph: inspect and edit the video options menu",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the menu with values and edit states (default command).
    Show {
        #[command(flatten)]
        menu: MenuArgs,

        /// Include hidden settings and collections.
        #[arg(short, long)]
        all: bool,

        /// Print presentation rows as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set a setting by its dev name and print what changed.
    Set {
        /// Dev name of the setting, e.g. `WindowMode`.
        name: String,

        /// New value: an option key, an option label or a number.
        value: String,

        #[command(flatten)]
        menu: MenuArgs,

        /// Apply even when the setting is disabled or hidden.
        #[arg(short, long)]
        force: bool,

        /// Print the evaluation pass as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run an action setting.
    Action {
        /// Dev name of the action, e.g. `AutoSetQuality`.
        name: String,

        #[command(flatten)]
        menu: MenuArgs,

        /// Run even when the action is disabled or hidden.
        #[arg(short, long)]
        force: bool,
    },

    /// Print a platform profile as JSON, or list the built-in ones.
    Profile {
        /// Built-in profile name or path to a JSON profile.
        name: Option<String>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    let command = cli.command.unwrap_or(Commands::Show {
        menu: MenuArgs::default(),
        all: false,
        json: false,
    });

    match command {
        Commands::Show { menu, all, json } => {
            let opened = commands::open(&config, &menu, cli.verbose)?;
            show::execute(&opened, all, json)?;
        }

        Commands::Set {
            name,
            value,
            menu,
            force,
            json,
        } => {
            let mut opened = commands::open(&config, &menu, cli.verbose)?;
            set::execute(&mut opened, &name, &value, force, json)?;
            commands::save_store(&menu, &opened)?;
        }

        Commands::Action { name, menu, force } => {
            let mut opened = commands::open(&config, &menu, cli.verbose)?;
            action::execute(&mut opened, &name, force)?;
            commands::save_store(&menu, &opened)?;
        }

        Commands::Profile { name } => match name {
            Some(name) => profile::show(&name)?,
            None => profile::list(&config),
        },

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
