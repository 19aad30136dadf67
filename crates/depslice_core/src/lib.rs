//! Core utilities for depslice.
//!
//! This crate provides the pieces shared by graph construction and slicing:
//! - Indexing source files into [`FileRecord`]s (path, type, imports, size, hash)
//! - Parsing import/require/`import()` specifiers from JS/TS files
//! - Resolving specifiers through relative paths and alias prefixes
//! - Reading files through the [`SourceReader`] capability
//! - Configuration utilities (git root finding, tsconfig path aliases)

mod config;
mod constants;
mod indexer;
mod parser;
mod resolver;
mod source;
mod types;

// Re-export public API
pub use config::{AliasConfig, find_git_root, find_git_root_from, load_aliases, read_tsconfig_paths};
pub use constants::{INDEX_FILES, RESOLVE_EXTENSIONS, SOURCE_EXTENSIONS};
pub use indexer::{FileIndex, index_file, index_repository};
pub use parser::{imports_for, parse_imports};
pub use resolver::{Resolution, Resolver, is_relative, package_name};
pub use source::{DiskSource, MemorySource, SourceReader, to_relative};
pub use types::{FileRecord, FileType, SpecKind, Specifier};
