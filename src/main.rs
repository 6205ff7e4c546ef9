//! Bladerunner - compile Blade-style templates into plain PHP.

use anyhow::{Context, Result};
use bladerunner::{
    build::{build_site, compile_one},
    cli::{Cli, Commands},
    config::SiteConfig,
    log,
    watch::watch_for_changes_blocking,
};
use clap::Parser;
use std::{
    io::{Write, stdout},
    process::ExitCode,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SiteConfig::from_cli(cli).context("Failed to load config")?;

    match &cli.command {
        Commands::Build { .. } | Commands::Watch { .. } => {
            let built = build_site(&config);
            if !cli.is_watch() {
                return built.map(|_| ());
            }
            // A broken first build gets fixed by editing, so keep watching
            if let Err(e) = built {
                log!("error"; "{:#}", e);
            }
            watch_for_changes_blocking(config, cli)
        }
        Commands::Compile { file, path, .. } => {
            let php = compile_one(&config, file, path.as_deref())?;
            let mut out = stdout().lock();
            out.write_all(php.as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}
