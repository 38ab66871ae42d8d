//! blogops - build, preview and publish automation for a static blog.

mod cli;
mod config;
mod core;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build, deploy, serve, workspace};
use config::{Profile, SiteConfig};
use utils::host::{DryRunHost, Host, SystemHost};

fn main() {
    if let Err(e) = run() {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let config = SiteConfig::load(&cli)?;
    let host = SystemHost;

    match &cli.command {
        Commands::Clean => workspace::clean(&config, &host),
        Commands::Build => build::build(&config, &host, Profile::Production),
        Commands::Rebuild => build::rebuild(&config, &host),
        Commands::Regenerate => build::regenerate(&config, &host),
        Commands::Preview => build::preview(&config, &host),
        Commands::Serve { .. } => serve::serve(&config),
        Commands::Reserve { .. } => serve::reserve(&config, &host),
        Commands::Deploy { dry_run, build } => deploy_site(&config, *dry_run, *build),
    }
}

/// `deploy`, optionally rebuilding first; `--dry-run` only prints the actions.
fn deploy_site(config: &SiteConfig, dry_run: bool, rebuild: bool) -> Result<()> {
    let host: &dyn Host = if dry_run { &DryRunHost } else { &SystemHost };

    if rebuild {
        build::rebuild(config, host)?;
    }
    if !dry_run {
        deploy::ensure_built(config)?;
    }
    deploy::deploy(config, host)
}
