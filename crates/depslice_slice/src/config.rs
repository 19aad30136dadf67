use anyhow::{Result, anyhow};
use clap::Parser;
use depslice_core::AliasConfig;
use depslice_graph::resolve_root;
use log::{debug, info};
use std::path::PathBuf;

use crate::{
    budget::Budget,
    slicer::{DEFAULT_MAX_FILE_SIZE, SliceOptions},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "slice")]
#[command(about = "Select the files relevant to a set of seed files within a size or token budget")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Seed file to slice from (repeatable)
    #[arg(long = "seed", required = true)]
    pub seeds: Vec<PathBuf>,

    /// Maximum hop count from the seeds
    #[arg(long, default_value = "5")]
    pub max_depth: usize,

    /// Byte budget for the whole slice (default 400000)
    #[arg(long)]
    pub max_bytes: Option<usize>,

    /// Token budget; takes precedence over any byte budget
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Named context window to derive the token budget from (e.g. gpt-4o, claude-sonnet)
    #[arg(long)]
    pub profile: Option<String>,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Glob of repository-relative paths to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Leave out non-seed files that take part in an import cycle
    #[arg(long)]
    pub skip_circular: bool,

    /// Write the slice JSON here instead of stdout
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

    pub fn budget(&self) -> Result<Budget> {
        Ok(Budget::derive(self.profile.as_deref(), self.max_tokens, self.max_bytes)?)
    }

    pub fn slice_options(&self) -> Result<SliceOptions> {
        let options = SliceOptions {
            max_depth: Some(self.max_depth),
            max_file_size: self.max_file_size,
            skip_circular: self.skip_circular,
            ..SliceOptions::default()
        };
        Ok(options.exclude_patterns(&self.exclude)?)
    }
}
