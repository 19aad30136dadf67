//! Module dependency graphs for JavaScript/TypeScript projects.
//!
//! Two build modes share one resolver:
//! - **Full**: every indexed file becomes a node, every resolved internal
//!   specifier an edge.
//! - **Seeded**: breadth-first from a set of seed files, bounded by a maximum
//!   depth, with each node's shortest hop count from the seeds.
//!
//! Both modes run cycle detection and flag every node that takes part in a
//! reported cycle.
//!
//! # Examples
//!
//! ```no_run
//! use depslice_graph::{Config, run_graph};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     root: Some(std::path::PathBuf::from("/path/to/project")),
//!     seeds: vec!["src/app/page.tsx".into()],
//!     max_depth: 10,
//!     output: None,
//!     aliases: Default::default(),
//! };
//!
//! let graph = run_graph(cfg)?;
//! println!("{} nodes, {} cycles", graph.stats.total_files, graph.stats.cycle_count);
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod cycles;
mod error;
mod reporter;
mod runner;
mod types;

// Re-export public API
pub use builder::GraphBuilder;
pub use config::{Config, relative_seeds, resolve_root};
pub use cycles::detect_cycles;
pub use error::GraphError;
pub use reporter::print_graph_summary;
pub use runner::run_graph;
pub use types::{Graph, GraphEdge, GraphMode, GraphNode, GraphStats, UnresolvedImport};
