use depslice_core::SourceReader;
use depslice_graph::{Graph, GraphBuilder, GraphNode};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, info, trace, warn};
use std::collections::HashSet;

use crate::{
    budget::{Budget, BudgetDimension, estimate_tokens},
    error::SliceError,
    roles::RoleClassifier,
    types::{
        ExcludeReason, ExcludedFile, IncludeReason, IncludedFile, Slice, SliceDecision,
        SliceSummary,
    },
};

/// Per-file cap used when none is configured.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100_000;

/// Filters applied before budget accounting.
#[derive(Debug, Clone)]
pub struct SliceOptions {
    /// Nodes deeper than this are excluded with `depth`.
    pub max_depth: Option<usize>,
    /// Files larger than this many bytes are excluded with `size`.
    pub max_file_size: u64,
    pub exclude: GlobSet,
    /// Exclude non-seed nodes that sit on an import cycle.
    pub skip_circular: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            exclude: GlobSet::empty(),
            skip_circular: false,
        }
    }
}

impl SliceOptions {
    /// Compiles exclusion globs, matched against repository-relative paths.
    pub fn exclude_patterns(mut self, patterns: &[String]) -> Result<Self, SliceError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| SliceError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        self.exclude = builder
            .build()
            .map_err(|source| SliceError::InvalidPattern { pattern: patterns.join(","), source })?;
        Ok(self)
    }
}

/// Greedy budgeted selection over a bounded graph.
pub struct Slicer<'a> {
    source: &'a dyn SourceReader,
    roles: &'a dyn RoleClassifier,
    options: &'a SliceOptions,
}

impl<'a> Slicer<'a> {
    pub fn new(
        source: &'a dyn SourceReader,
        roles: &'a dyn RoleClassifier,
        options: &'a SliceOptions,
    ) -> Self {
        Self { source, roles, options }
    }

    /// Partitions every node of `graph` into included and excluded files.
    ///
    /// Nodes are visited by `(depth, path)`. A node that does not fit the
    /// remaining budget is excluded and the walk continues, so a smaller file
    /// later in the order can still be taken.
    pub fn slice(&self, graph: &Graph, mut budget: Budget, seeds: &[String]) -> Slice {
        let mut order: Vec<&GraphNode> = graph.nodes.iter().collect();
        order.sort_by(|a, b| depth_of(a).cmp(&depth_of(b)).then_with(|| a.id.cmp(&b.id)));

        let seed_set: HashSet<&str> = seeds.iter().map(|s| s.as_str()).collect();
        let mut included: Vec<IncludedFile> = Vec::new();
        let mut excluded: Vec<ExcludedFile> = Vec::new();

        info!(
            "Slicing {} nodes against a {:?} budget of {}",
            order.len(),
            budget.dimension,
            budget.ceiling
        );

        for node in order {
            let depth = depth_of(node);
            let is_seed = seed_set.contains(node.id.as_str());
            match self.decide(node, is_seed, seeds, &mut budget) {
                (SliceDecision::Included { depth, reason }, bytes, cost) => {
                    trace!("Included {} ({:?}, cost {})", node.id, reason, cost);
                    included.push(IncludedFile { path: node.id.clone(), depth, reason, bytes, cost });
                }
                (SliceDecision::Excluded { reason }, _, _) => {
                    trace!("Excluded {} ({:?})", node.id, reason);
                    excluded.push(ExcludedFile { path: node.id.clone(), depth, reason });
                }
            }
        }

        let summary = SliceSummary {
            dimension: budget.dimension,
            ceiling: budget.ceiling,
            used: budget.used,
            considered: included.len() + excluded.len(),
            included_count: included.len(),
            excluded_count: excluded.len(),
            cycles: graph.cycles.clone(),
        };
        info!(
            "Slice complete: {} included, {} excluded, {}/{} used",
            summary.included_count, summary.excluded_count, summary.used, summary.ceiling
        );

        Slice { seed_files: seeds.to_vec(), included, excluded, summary }
    }

    /// Returns the decision with the file's byte size and budget cost
    /// (both zero for exclusions).
    fn decide(
        &self,
        node: &GraphNode,
        is_seed: bool,
        seeds: &[String],
        budget: &mut Budget,
    ) -> (SliceDecision, u64, usize) {
        let excluded = |reason| (SliceDecision::Excluded { reason }, 0, 0);
        let depth = depth_of(node);

        if self.options.exclude.is_match(&node.id) {
            return excluded(ExcludeReason::Pattern);
        }
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return excluded(ExcludeReason::Depth);
        }
        if self.options.skip_circular && node.is_circular && !is_seed {
            return excluded(ExcludeReason::Circular);
        }

        let bytes = match self.source.size(&node.id) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Excluding unreadable file {}: {}", node.id, e);
                return excluded(ExcludeReason::External);
            }
        };
        if bytes > self.options.max_file_size {
            debug!("{} is {} bytes, over the {} byte cap", node.id, bytes, self.options.max_file_size);
            return excluded(ExcludeReason::Size);
        }

        let cost = match budget.dimension {
            BudgetDimension::Bytes => bytes as usize,
            BudgetDimension::Tokens => match self.source.read_to_string(&node.id) {
                Ok(content) => estimate_tokens(&content),
                Err(e) => {
                    warn!("Excluding unreadable file {}: {}", node.id, e);
                    return excluded(ExcludeReason::External);
                }
            },
        };

        if !budget.fits(cost) {
            let reason = match budget.dimension {
                BudgetDimension::Bytes => ExcludeReason::Budget,
                BudgetDimension::Tokens => ExcludeReason::TokenBudget,
            };
            debug!("{} needs {} but only {} remains", node.id, cost, budget.remaining());
            return excluded(reason);
        }
        budget.charge(cost);

        let reason = if is_seed {
            IncludeReason::Seed
        } else {
            self.roles.role(node, seeds).unwrap_or(IncludeReason::Import)
        };
        (SliceDecision::Included { depth, reason }, bytes, cost)
    }
}

/// Builds the seeded graph bounded by `max_depth` and slices it.
///
/// Fails with the graph's `EmptySeedSet` when no seed exists, so callers can
/// tell "nothing to slice" apart from an empty but valid slice.
pub fn slice_from_seeds(
    builder: &GraphBuilder<'_>,
    slicer: &Slicer<'_>,
    seeds: &[String],
    max_depth: usize,
    budget: Budget,
) -> Result<Slice, SliceError> {
    let graph = builder.build_seeded(seeds, max_depth)?;
    debug!(
        "Seeded graph has {} nodes and {} cycles",
        graph.nodes.len(),
        graph.cycles.len()
    );
    Ok(slicer.slice(&graph, budget, graph.seeds()))
}

fn depth_of(node: &GraphNode) -> usize {
    node.depth.unwrap_or(0)
}
