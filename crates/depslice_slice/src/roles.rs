use depslice_core::FileType;
use depslice_graph::GraphNode;
use std::path::Path;

use crate::types::IncludeReason;

/// Tags included files that play a structural role for the seeds.
///
/// Returning `None` leaves the file tagged as a plain import. Seeds are
/// tagged by the slicer before the classifier is asked.
pub trait RoleClassifier: Send + Sync {
    fn role(&self, node: &GraphNode, seeds: &[String]) -> Option<IncludeReason>;
}

/// Path conventions of file-system routed apps: a `layout` file wraps every
/// seed below its directory, and schema files are tagged wherever they appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionRoles;

impl RoleClassifier for ConventionRoles {
    fn role(&self, node: &GraphNode, seeds: &[String]) -> Option<IncludeReason> {
        match node.file_type {
            FileType::Layout => {
                let layout_dir = Path::new(&node.id).parent().unwrap_or(Path::new(""));
                seeds
                    .iter()
                    .any(|seed| {
                        Path::new(seed).parent().is_some_and(|dir| dir.starts_with(layout_dir))
                    })
                    .then_some(IncludeReason::Layout)
            }
            FileType::Schema => Some(IncludeReason::Schema),
            _ => None,
        }
    }
}
