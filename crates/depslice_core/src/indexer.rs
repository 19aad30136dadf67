use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::{
    constants::{SKIPPED_DIRS, SOURCE_EXTENSIONS},
    parser::parse_imports,
    source::{DiskSource, SourceReader, to_relative},
    types::{FileRecord, FileType},
};

/// Walks the repository and records every source file, sorted by path.
pub fn index_repository(source: &DiskSource) -> Result<Vec<FileRecord>> {
    let root = source.root();
    debug!("Walking directory tree from root: {}", root.display());
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|e| {
            !(e.file_type().is_some_and(|t| t.is_dir())
                && e.file_name().to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n)))
        })
        .build();

    let mut paths: Vec<String> = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }
        if let Some(ext) = p.extension().and_then(|e| e.to_str())
            && SOURCE_EXTENSIONS.contains(&ext)
            && let Some(rel) = to_relative(root, p)
        {
            trace!("Found source file: {}", rel);
            paths.push(rel);
        }
    }
    paths.sort();
    debug!("Collected {} source files", paths.len());

    let records: Vec<FileRecord> =
        paths.par_iter().filter_map(|rel| index_file(source, rel)).collect();

    info!("Indexed {} files under {}", records.len(), root.display());
    Ok(records)
}

/// Builds the record for one file; `None` if it cannot be read as text.
pub fn index_file(source: &dyn SourceReader, rel_path: &str) -> Option<FileRecord> {
    let content = match source.read_to_string(rel_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Skipping unreadable file {}: {}", rel_path, e);
            return None;
        }
    };
    Some(FileRecord {
        relative_path: rel_path.to_string(),
        file_type: FileType::for_path(rel_path),
        imports: parse_imports(rel_path, &content),
        size: content.len() as u64,
        hash: format!("{:x}", md5::compute(content.as_bytes())),
    })
}

/// Index records keyed by path, for lookups during traversal.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: BTreeMap<String, FileRecord>,
}

impl FileIndex {
    pub fn new(records: Vec<FileRecord>) -> Self {
        Self { records: records.into_iter().map(|r| (r.relative_path.clone(), r)).collect() }
    }

    pub fn get(&self, rel_path: &str) -> Option<&FileRecord> {
        self.records.get(rel_path)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.records.contains_key(rel_path)
    }

    /// Records in path order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
