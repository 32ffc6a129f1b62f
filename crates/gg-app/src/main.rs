use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use gg_core::config::RenderConfig;

pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging (--verbose relève au moins à info)
    let mut level = cli.log_level.parse().unwrap_or(log::LevelFilter::Warn);
    if cli.verbose {
        level = level.max(log::LevelFilter::Info);
    }
    env_logger::Builder::new().filter_level(level).init();

    // 3. Valider les options
    cli.validate()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let config = resolve_config(&cli)?;

    // 5. Taille du terminal
    let term = gg_render::terminal::terminal_size(config.term_width, config.term_height);
    log::debug!("terminal {}×{}", term.0, term.1);

    // 6. Convertir
    match cli.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Impossible de créer {}", path.display()))?;
            pipeline::run(&cli.files, &config, term, file)?
                .sync_all()
                .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
        }
        None => {
            pipeline::run(&cli.files, &config, term, io::stdout().lock())?
                .flush()
                .context("Impossible d'écrire sur la sortie standard")?;
        }
    }
    Ok(())
}

/// Config file (if any) under the CLI options, clamped and validated.
fn resolve_config(cli: &cli::Cli) -> Result<RenderConfig> {
    let mut config = match cli.config {
        Some(ref path) => gg_core::config::load_config(path)?,
        None => RenderConfig::default(),
    };
    cli.apply_overrides(&mut config)?;
    config.clamp_all();
    config.validate()?;
    Ok(config)
}
