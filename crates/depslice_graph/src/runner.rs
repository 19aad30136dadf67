use anyhow::Result;
use depslice_core::{DiskSource, FileIndex, Resolver, index_repository};
use log::{debug, info};

use crate::{
    builder::GraphBuilder,
    config::{Config, relative_seeds},
    types::Graph,
};

/// Indexes the repository and builds the graph the config asks for.
///
/// Without seeds the full repository graph is built. With seeds, a
/// [`crate::GraphError::EmptySeedSet`] is returned (inside the `anyhow`
/// error) when none of them exists.
pub fn run_graph(mut cfg: Config) -> Result<Graph> {
    info!("Starting graph build");

    cfg.initialize()?;
    let root = cfg.root()?.clone();

    let source = DiskSource::new(&root);
    let index = FileIndex::new(index_repository(&source)?);
    let resolver = Resolver::new(&cfg.aliases, &source);
    let builder = GraphBuilder::new(&resolver, &index);

    let graph = if cfg.seeds.is_empty() {
        builder.build_full()
    } else {
        let seeds = relative_seeds(&root, &cfg.seeds);
        debug!("Seeds: {:?}", seeds);
        builder.build_seeded(&seeds, cfg.max_depth)?
    };

    debug!("Resolver cache holds {} entries", resolver.cache_len());
    Ok(graph)
}
