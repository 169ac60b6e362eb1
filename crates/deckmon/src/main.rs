use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    detect_game, init_config, resolve_name, scan_processes, show_config, show_library, DetectArgs,
    InitConfigArgs, LibraryArgs, ResolveArgs, ScanArgs,
};
use miette::Result;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file (defaults to the per-user config directory)
    #[arg(short, long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the game that is running right now
    Detect {
        /// Print the result as a single JSON object
        #[arg(long)]
        json: bool,
    },
    /// List every process that looks like a game, best candidate first
    Scan {
        /// Also print each candidate's command line
        #[arg(long)]
        show_command: bool,
    },
    /// Resolve a raw name (folder, executable, ROM stem) to a display title
    Resolve {
        /// The raw name to resolve
        name: String,

        /// Steam app id or shortcut runtime id hint
        #[arg(short, long)]
        app_id: Option<String>,

        /// Skip online lookups
        #[arg(long)]
        offline: bool,
    },
    /// Summarize the indexed Steam manifests and non-Steam shortcuts
    Library {
        /// List every indexed title
        #[arg(short, long)]
        list: bool,
    },
    /// Inspect or create the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_args() -> Result<Args> {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).map_err(|e| miette::miette!("{}", e))
}

fn main() -> Result<()> {
    let args = parse_args()?;
    utils::logging::init_logging(args.verbose);

    let load = || utils::config::load_config(args.config.as_deref());

    match args.command {
        Commands::Detect { json } => detect_game(load()?.0, DetectArgs { json }),
        Commands::Scan { show_command } => scan_processes(load()?.0, ScanArgs { show_command }),
        Commands::Resolve {
            name,
            app_id,
            offline,
        } => resolve_name(
            load()?.0,
            ResolveArgs {
                name,
                app_id,
                offline,
            },
        ),
        Commands::Library { list } => show_library(load()?.0, LibraryArgs { list }),
        Commands::Config { action } => match action {
            ConfigCommand::Show => {
                let (config, loaded_from) = load()?;
                show_config(&config, loaded_from.as_deref())
            }
            ConfigCommand::Init { force } => init_config(InitConfigArgs {
                path: args.config.clone(),
                force,
            }),
        },
    }
}
