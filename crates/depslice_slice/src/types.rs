use serde::{Deserialize, Serialize};

use crate::budget::BudgetDimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeReason {
    Seed,
    Layout,
    Import,
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludeReason {
    Size,
    Depth,
    Pattern,
    Circular,
    External,
    Budget,
    TokenBudget,
}

/// The verdict for one considered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceDecision {
    Included { depth: usize, reason: IncludeReason },
    Excluded { reason: ExcludeReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedFile {
    pub path: String,
    pub depth: usize,
    pub reason: IncludeReason,
    pub bytes: u64,
    /// Units charged against the budget (bytes or estimated tokens).
    pub cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedFile {
    pub path: String,
    pub depth: usize,
    pub reason: ExcludeReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSummary {
    pub dimension: BudgetDimension,
    pub ceiling: usize,
    pub used: usize,
    pub considered: usize,
    pub included_count: usize,
    pub excluded_count: usize,
    pub cycles: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub seed_files: Vec<String>,
    pub included: Vec<IncludedFile>,
    pub excluded: Vec<ExcludedFile>,
    pub summary: SliceSummary,
}

impl Slice {
    /// The decision recorded for `path`, if it was considered.
    pub fn decision_for(&self, path: &str) -> Option<SliceDecision> {
        if let Some(f) = self.included.iter().find(|f| f.path == path) {
            return Some(SliceDecision::Included { depth: f.depth, reason: f.reason });
        }
        self.excluded
            .iter()
            .find(|f| f.path == path)
            .map(|f| SliceDecision::Excluded { reason: f.reason })
    }
}
