use anyhow::{Result, anyhow};
use clap::Parser;
use depslice_core::AliasConfig;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "graph")]
#[command(about = "Build the module dependency graph of a JavaScript/TypeScript project")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Seed file to traverse from (repeatable); without seeds the whole repository is graphed
    #[arg(long = "seed")]
    pub seeds: Vec<PathBuf>,

    /// Maximum hop count from the seeds
    #[arg(long, default_value = "10")]
    pub max_depth: usize,

    /// Write the graph JSON here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(skip)]
    pub aliases: AliasConfig,
}

impl Config {
    /// Initialize the config by resolving the root directory and loading path aliases
    pub fn initialize(&mut self) -> Result<()> {
        let root = resolve_root(self.root.take())?;
        info!("Using root directory: {}", root.display());

        debug!("Loading path aliases");
        self.aliases = depslice_core::load_aliases(&root);
        debug!("Found {} path aliases", self.aliases.len());

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

/// Explicit root (canonicalized when possible), else the enclosing git checkout.
pub fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(r) => {
            debug!("Using provided root directory: {:?}", r);
            Ok(r.canonicalize().unwrap_or(r))
        }
        None => {
            debug!("No root provided, searching for git root");
            depslice_core::find_git_root()
        }
    }
}

/// Repository-relative forms of the seed paths; absolute seeds are made
/// relative to `root`, anything outside it is passed through as written.
pub fn relative_seeds(root: &std::path::Path, seeds: &[PathBuf]) -> Vec<String> {
    seeds
        .iter()
        .map(|seed| {
            let abs = if seed.is_absolute() {
                seed.canonicalize().unwrap_or_else(|_| seed.clone())
            } else {
                seed.clone()
            };
            depslice_core::to_relative(root, &abs).unwrap_or_else(|| seed.to_string_lossy().to_string())
        })
        .collect()
}
