use depslice_core::{FileType, SpecKind};
use serde::{Deserialize, Serialize};

/// How the graph was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GraphMode {
    Full,
    Seeded { seeds: Vec<String>, max_depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Repository-relative path.
    pub id: String,
    pub file_type: FileType,
    pub is_external: bool,
    pub is_circular: bool,
    /// Hop count from the nearest seed; only set in seeded graphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: SpecKind,
}

/// An internal-looking specifier that matched no indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedImport {
    pub from: String,
    pub specifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_files: usize,
    pub total_edges: usize,
    pub static_edges: usize,
    pub dynamic_edges: usize,
    pub type_only_edges: usize,
    pub external_packages: usize,
    pub external_package_names: Vec<String>,
    pub unresolved_imports: usize,
    pub cycle_count: usize,
    pub circular_files: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(flatten)]
    pub mode: GraphMode,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub cycles: Vec<Vec<String>>,
    pub unresolved: Vec<UnresolvedImport>,
    pub stats: GraphStats,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Targets of `id` in edge order.
    pub fn dependencies<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges.iter().filter(move |e| e.from == id).map(|e| e.to.as_str())
    }

    pub fn seeds(&self) -> &[String] {
        match &self.mode {
            GraphMode::Seeded { seeds, .. } => seeds,
            GraphMode::Full => &[],
        }
    }
}
