use dashmap::DashMap;
use depslice_core::{
    FileIndex, FileRecord, FileType, Resolution, Resolver, SOURCE_EXTENSIONS, SpecKind, Specifier,
    imports_for, package_name, to_relative,
};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    path::Path,
};

use crate::{
    cycles::detect_cycles,
    error::GraphError,
    types::{Graph, GraphEdge, GraphMode, GraphNode, GraphStats, UnresolvedImport},
};

/// Builds import graphs from an index and a resolver.
///
/// One builder serves one invocation; it only holds borrowed inputs and a
/// parse cache for files that are reached but were never indexed.
pub struct GraphBuilder<'a> {
    resolver: &'a Resolver<'a>,
    index: &'a FileIndex,
    import_cache: DashMap<String, Vec<Specifier>>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: &'a Resolver<'a>, index: &'a FileIndex) -> Self {
        Self { resolver, index, import_cache: DashMap::new() }
    }

    /// One node per indexed file, one edge per resolved internal specifier.
    pub fn build_full(&self) -> Graph {
        info!("Building full graph over {} indexed files", self.index.len());
        let records: Vec<&FileRecord> = self.index.iter().collect();

        // Resolution is independent per file; appends below stay in record order
        let resolved: Vec<(&FileRecord, Vec<(&Specifier, Resolution)>)> = records
            .par_iter()
            .map(|record| {
                let resolutions = record
                    .imports
                    .iter()
                    .map(|spec| (spec, self.resolver.resolve(&spec.request, &record.relative_path)))
                    .collect();
                (*record, resolutions)
            })
            .collect();

        let mut parts = GraphParts::default();
        for (record, _) in &resolved {
            parts.add_node(&record.relative_path, record.file_type, None);
        }
        for (record, resolutions) in resolved {
            for (spec, resolution) in resolutions {
                match resolution {
                    Resolution::Internal(to) if self.index.contains(&to) => {
                        parts.add_edge(&record.relative_path, to, spec.kind);
                    }
                    Resolution::Internal(to) => {
                        trace!("'{}' resolved to unindexed file {}", spec.request, to);
                        parts.add_unresolved(&record.relative_path, &spec.request);
                    }
                    Resolution::External => parts.add_external(&spec.request),
                    Resolution::Unresolved => parts.add_unresolved(&record.relative_path, &spec.request),
                }
            }
        }

        parts.finish(GraphMode::Full)
    }

    /// Breadth-first traversal from `seeds`, expanding no further than `max_depth`.
    ///
    /// Seeds that do not name an existing file are skipped; if none remain the
    /// build fails with [`GraphError::EmptySeedSet`].
    pub fn build_seeded(&self, seeds: &[String], max_depth: usize) -> Result<Graph, GraphError> {
        let source = self.resolver.source();
        let mut valid_seeds: Vec<String> = Vec::new();
        for seed in seeds {
            match to_relative(Path::new(""), Path::new(seed)) {
                Some(rel) if source.is_file(&rel) => {
                    if !valid_seeds.contains(&rel) {
                        valid_seeds.push(rel);
                    }
                }
                _ => warn!("Skipping seed that does not resolve to a file: {}", seed),
            }
        }
        if valid_seeds.is_empty() {
            return Err(GraphError::EmptySeedSet { requested: seeds.to_vec() });
        }
        info!("Building seeded graph from {} seeds (max depth {})", valid_seeds.len(), max_depth);

        let mut parts = GraphParts::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, usize)> =
            valid_seeds.iter().map(|s| (s.clone(), 0)).collect();

        while let Some((path, depth)) = frontier.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }
            trace!("Finalizing {} at depth {}", path, depth);
            let file_type = self
                .index
                .get(&path)
                .map(|r| r.file_type)
                .unwrap_or_else(|| FileType::for_path(&path));
            parts.add_node(&path, file_type, Some(depth));

            for spec in self.imports_of(&path) {
                match self.resolver.resolve(&spec.request, &path) {
                    // Same node set as full mode: only source files become nodes
                    Resolution::Internal(to) if !is_source_file(&to) => {
                        trace!("'{}' resolved to non-source file {}", spec.request, to);
                        parts.add_unresolved(&path, &spec.request);
                    }
                    Resolution::Internal(to) => {
                        // Nodes at the boundary keep edges but are not expanded
                        if depth < max_depth && !visited.contains(&to) {
                            frontier.push_back((to.clone(), depth + 1));
                        }
                        parts.add_edge(&path, to, spec.kind);
                    }
                    Resolution::External => parts.add_external(&spec.request),
                    Resolution::Unresolved => parts.add_unresolved(&path, &spec.request),
                }
            }
        }

        Ok(parts.finish(GraphMode::Seeded { seeds: valid_seeds, max_depth }))
    }

    fn imports_of(&self, path: &str) -> Vec<Specifier> {
        if let Some(record) = self.index.get(path) {
            return record.imports.clone();
        }
        match imports_for(self.resolver.source(), path, &self.import_cache) {
            Ok(specs) => specs,
            Err(e) => {
                warn!("Error parsing imports for {}: {}", path, e);
                Vec::new()
            }
        }
    }
}

fn is_source_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Append-only accumulator for a graph under construction.
#[derive(Default)]
struct GraphParts {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<(String, String)>,
    packages: BTreeSet<String>,
    unresolved: Vec<UnresolvedImport>,
}

impl GraphParts {
    fn add_node(&mut self, id: &str, file_type: FileType, depth: Option<usize>) {
        self.nodes.push(GraphNode {
            id: id.to_string(),
            file_type,
            is_external: false,
            is_circular: false,
            depth,
        });
    }

    /// Repeated `(from, to)` pairs keep the first kind seen.
    fn add_edge(&mut self, from: &str, to: String, kind: SpecKind) {
        if self.edge_keys.insert((from.to_string(), to.clone())) {
            self.edges.push(GraphEdge { from: from.to_string(), to, kind });
        }
    }

    fn add_external(&mut self, request: &str) {
        self.packages.insert(package_name(request));
    }

    fn add_unresolved(&mut self, from: &str, specifier: &str) {
        self.unresolved.push(UnresolvedImport {
            from: from.to_string(),
            specifier: specifier.to_string(),
        });
    }

    fn finish(self, mode: GraphMode) -> Graph {
        let GraphParts { mut nodes, edges, packages, unresolved, .. } = self;

        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let total_candidates = edges.len();
        let edges: Vec<GraphEdge> =
            edges.into_iter().filter(|e| ids.contains(e.to.as_str())).collect();
        if edges.len() < total_candidates {
            debug!("Dropped {} edges past the depth boundary", total_candidates - edges.len());
        }

        let cycles = detect_cycles(&nodes, &edges);
        let circular: HashSet<&str> = cycles.iter().flatten().map(|s| s.as_str()).collect();
        for node in &mut nodes {
            node.is_circular = circular.contains(node.id.as_str());
        }

        let count_kind = |kind: SpecKind| edges.iter().filter(|e| e.kind == kind).count();
        let stats = GraphStats {
            total_files: nodes.len(),
            total_edges: edges.len(),
            static_edges: count_kind(SpecKind::Static),
            dynamic_edges: count_kind(SpecKind::Dynamic),
            type_only_edges: count_kind(SpecKind::TypeOnly),
            external_packages: packages.len(),
            external_package_names: packages.into_iter().collect(),
            unresolved_imports: unresolved.len(),
            cycle_count: cycles.len(),
            circular_files: circular.len(),
            max_depth: nodes.iter().filter_map(|n| n.depth).max(),
        };
        info!(
            "Graph built: {} nodes, {} edges, {} cycles",
            stats.total_files, stats.total_edges, stats.cycle_count
        );

        Graph { mode, nodes, edges, cycles, unresolved, stats }
    }
}
