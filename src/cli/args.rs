//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf};

/// Build, preview and publish a generator-driven static blog
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: nearest blogops.toml, searching upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Print every action before it runs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Remove and recreate the output directory
    Clean,

    /// Build the site with the production settings
    #[command(visible_alias = "b")]
    Build,

    /// Clean, then build with the production settings
    Rebuild,

    /// Run the generator in watch mode until interrupted
    Regenerate,

    /// Build the site with the development settings
    Preview,

    /// Serve the output directory over HTTP
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        server: ServeArgs,
    },

    /// Build, then serve the output directory over HTTP
    Reserve {
        #[command(flatten)]
        server: ServeArgs,
    },

    /// Publish the output directory to the hosting branch
    #[command(visible_alias = "travis-deploy")]
    Deploy {
        /// Print the deploy actions without running them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Run `rebuild` before deploying
        #[arg(short, long)]
        build: bool,
    },
}

/// Preview server arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port number to listen on
    #[arg(value_name = "PORT")]
    pub port: Option<u16>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_travis_deploy_alias() {
        let cli = Cli::parse_from(["blogops", "travis-deploy"]);
        assert!(matches!(
            cli.command,
            Commands::Deploy { dry_run: false, build: false }
        ));
    }

    #[test]
    fn test_serve_port_is_optional() {
        let cli = Cli::parse_from(["blogops", "serve"]);
        let Commands::Serve { server } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(server.port, None);

        let cli = Cli::parse_from(["blogops", "reserve", "8080"]);
        let Commands::Reserve { server } = cli.command else {
            panic!("expected reserve");
        };
        assert_eq!(server.port, Some(8080));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["blogops", "build", "-v", "-C", "site.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
    }
}
