//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// chime — plays your coding agent's session activity as sound.
#[derive(Parser, Debug, Clone)]
#[command(name = "chime")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the chime server and open the event stream.
    Serve(ServeArgs),

    /// Manage sound packs.
    Packs {
        /// Packs subcommand; plain `chime packs` lists them.
        #[command(subcommand)]
        command: Option<PacksCommands>,
    },
}

/// Arguments for `chime serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Session log root to watch (overrides the config file).
    #[arg(long)]
    pub watch_path: Option<String>,

    /// Config file location.
    #[arg(long, env = "CHIME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of static browser UI assets.
    #[arg(long, default_value = "web")]
    pub assets: PathBuf,
}

/// Sound pack subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PacksCommands {
    /// List installed packs and what can be downloaded.
    List,

    /// Download a pack from the registry.
    Install {
        /// Pack slug to install.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve() {
        let cli = Cli::parse_from(["chime", "serve"]);
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.port.is_none());
                assert!(args.watch_path.is_none());
                assert_eq!(args.assets, PathBuf::from("web"));
            }
            Commands::Packs { .. } => panic!("expected serve command"),
        }
    }

    #[test]
    fn cli_respects_port_flag() {
        let cli = Cli::parse_from(["chime", "serve", "-p", "4100"]);
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(4100)),
            Commands::Packs { .. } => panic!("expected serve command"),
        }
    }

    #[test]
    fn cli_respects_watch_path_flag() {
        let cli = Cli::parse_from(["chime", "serve", "--watch-path", "/tmp/logs"]);
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.watch_path.as_deref(), Some("/tmp/logs")),
            Commands::Packs { .. } => panic!("expected serve command"),
        }
    }

    #[test]
    fn cli_parses_bare_packs() {
        let cli = Cli::parse_from(["chime", "packs"]);
        match cli.command {
            Commands::Packs { command } => assert!(command.is_none()),
            Commands::Serve(_) => panic!("expected packs command"),
        }
    }

    #[test]
    fn cli_parses_packs_install() {
        let cli = Cli::parse_from(["chime", "packs", "install", "arcademix"]);
        match cli.command {
            Commands::Packs {
                command: Some(PacksCommands::Install { name }),
            } => assert_eq!(name, "arcademix"),
            _ => panic!("expected packs install command"),
        }
    }
}
