use anyhow::Result;
use depslice_core::{DiskSource, FileIndex, Resolver, index_repository};
use depslice_graph::{GraphBuilder, relative_seeds};
use log::{debug, info};

use crate::{
    config::Config,
    roles::ConventionRoles,
    slicer::{Slicer, slice_from_seeds},
    types::Slice,
};

/// Indexes the repository, builds the seeded graph and slices it.
///
/// An unknown profile or a bad exclude glob fails before any file is read.
/// When no seed exists the error wraps a [`crate::SliceError`] for which
/// `is_empty_seed_set()` holds.
pub fn run_slice(mut cfg: Config) -> Result<Slice> {
    info!("Starting slice");

    let budget = cfg.budget()?;
    let options = cfg.slice_options()?;

    cfg.initialize()?;
    let root = cfg.root()?.clone();
    let seeds = relative_seeds(&root, &cfg.seeds);
    debug!("Seeds: {:?}", seeds);

    let source = DiskSource::new(&root);
    let index = FileIndex::new(index_repository(&source)?);
    let resolver = Resolver::new(&cfg.aliases, &source);
    let builder = GraphBuilder::new(&resolver, &index);
    let slicer = Slicer::new(&source, &ConventionRoles, &options);

    let slice = slice_from_seeds(&builder, &slicer, &seeds, cfg.max_depth, budget)?;
    debug!("Resolver cache holds {} entries", resolver.cache_len());
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SliceError, types::ExcludeReason};
    use clap::Parser;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn create_test_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_run_slice() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/app/page.tsx", "import { Button } from '@/components/Button';");
        create_test_file(root, "src/app/layout.tsx", "");
        create_test_file(root, "src/components/Button.tsx", "import './big';");
        create_test_file(root, "src/components/big.ts", &"x".repeat(500));

        let cfg = Config::parse_from([
            "slice",
            "--root",
            root.to_str().unwrap(),
            "--seed",
            "src/app/page.tsx",
            "--max-bytes",
            "200",
        ]);
        let slice = run_slice(cfg).unwrap();

        let included: Vec<&str> = slice.included.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(included, vec!["src/app/page.tsx", "src/components/Button.tsx"]);
        assert_eq!(slice.excluded.len(), 1);
        assert_eq!(slice.excluded[0].path, "src/components/big.ts");
        assert_eq!(slice.excluded[0].reason, ExcludeReason::Budget);
        assert_eq!(slice.seed_files, vec!["src/app/page.tsx".to_string()]);
    }

    #[test]
    fn test_run_slice_missing_seeds() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = Config::parse_from([
            "slice",
            "--root",
            temp_dir.path().to_str().unwrap(),
            "--seed",
            "src/missing.tsx",
        ]);
        let err = run_slice(cfg).unwrap_err();
        let slice_err = err.downcast_ref::<SliceError>().unwrap();
        assert!(slice_err.is_empty_seed_set());
    }

    #[test]
    fn test_run_slice_unknown_profile() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = Config::parse_from([
            "slice",
            "--root",
            temp_dir.path().to_str().unwrap(),
            "--seed",
            "a.ts",
            "--profile",
            "nope",
        ]);
        let err = run_slice(cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<SliceError>(), Some(SliceError::UnknownProfile(_))));
    }
}
