//! Budgeted context slices for JavaScript/TypeScript projects.
//!
//! Starting from a set of seed files, this crate builds the seeded dependency
//! graph and walks its nodes nearest-first, including each file that still
//! fits the budget. The budget is counted either in bytes or in estimated
//! tokens, never both. Every node considered ends up in exactly one of
//! `included` or `excluded`, with the reason recorded.
//!
//! # Examples
//!
//! ```no_run
//! use depslice_slice::{Config, run_slice};
//! use clap::Parser;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from([
//!     "slice",
//!     "--root",
//!     "/path/to/project",
//!     "--seed",
//!     "src/app/page.tsx",
//!     "--profile",
//!     "claude-sonnet",
//! ]);
//!
//! let slice = run_slice(cfg)?;
//! for file in &slice.included {
//!     println!("{} ({} tokens)", file.path, file.cost);
//! }
//! # Ok(())
//! # }
//! ```

mod budget;
mod config;
mod error;
mod reporter;
mod roles;
mod runner;
mod slicer;
mod types;

// Re-export public API
pub use budget::{
    Budget, BudgetDimension, DEFAULT_MAX_BYTES, PROFILES, ResourceProfile, estimate_tokens,
    find_profile,
};
pub use config::Config;
pub use error::SliceError;
pub use reporter::print_slice_summary;
pub use roles::{ConventionRoles, RoleClassifier};
pub use runner::run_slice;
pub use slicer::{DEFAULT_MAX_FILE_SIZE, SliceOptions, Slicer, slice_from_seeds};
pub use types::{
    ExcludeReason, ExcludedFile, IncludeReason, IncludedFile, Slice, SliceDecision, SliceSummary,
};
