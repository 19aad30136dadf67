use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    config::AliasConfig,
    constants::{INDEX_FILES, RESOLVE_EXTENSIONS, SOURCE_EXTENSIONS},
    source::SourceReader,
};

/// Outcome of resolving one specifier.
///
/// `Unresolved` is an internal reference (relative or aliased) that matched no
/// file; it is kept apart from `External` so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum Resolution {
    Internal(String),
    External,
    Unresolved,
}

impl Resolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Resolution::Internal(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Resolution::External)
    }
}

/// Maps specifiers to repository-relative files.
///
/// Results are memoized per `(source directory, specifier)` for the lifetime
/// of the resolver, which is one build or slice invocation.
pub struct Resolver<'a> {
    aliases: &'a AliasConfig,
    source: &'a dyn SourceReader,
    cache: DashMap<(String, String), Resolution>,
}

impl<'a> Resolver<'a> {
    pub fn new(aliases: &'a AliasConfig, source: &'a dyn SourceReader) -> Self {
        Self { aliases, source, cache: DashMap::new() }
    }

    pub fn source(&self) -> &'a dyn SourceReader {
        self.source
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolves `request` as written in `from_file` (repository-relative).
    pub fn resolve(&self, request: &str, from_file: &str) -> Resolution {
        let request = request.trim();
        if request.is_empty() || request.contains(char::is_whitespace) {
            trace!("Malformed specifier {:?} in {}", request, from_file);
            return Resolution::Unresolved;
        }

        let from_dir = Path::new(from_file)
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        let key = (from_dir, request.to_string());
        if let Some(v) = self.cache.get(&key) {
            trace!("Cache hit for resolve: '{}' from {}", request, from_file);
            return v.clone();
        }
        trace!("Resolving: '{}' from {}", request, from_file);

        let resolved = if is_relative(request) {
            let joined = if key.0.is_empty() {
                request.to_string()
            } else {
                format!("{}/{}", key.0, request)
            };
            let found = match normalize(&joined) {
                Some(base) => self.resolve_file(&base),
                None => {
                    trace!("'{}' from {} escapes the repository root", request, from_file);
                    None
                }
            };
            found.map_or(Resolution::Unresolved, Resolution::Internal)
        } else if let Some((targets, remainder)) = self.aliases.lookup(request) {
            trace!("Alias match for '{}' with remainder '{}'", request, remainder);
            targets
                .iter()
                .find_map(|target| {
                    let joined = if remainder.is_empty() {
                        target.clone()
                    } else {
                        format!("{}/{}", target, remainder)
                    };
                    normalize(&joined).and_then(|base| self.resolve_file(&base))
                })
                .map_or(Resolution::Unresolved, Resolution::Internal)
        } else {
            trace!("Classified '{}' as external", request);
            Resolution::External
        };

        if let Resolution::Internal(path) = &resolved {
            debug!("Resolved '{}' from {} to {}", request, from_file, path);
        }
        self.cache.insert(key, resolved.clone());
        resolved
    }

    /// Tries `base` with each source extension, then as a directory holding an
    /// index file. A recognized source extension on `base` is stripped first.
    fn resolve_file(&self, base: &str) -> Option<String> {
        let ext = Path::new(base).extension().and_then(|e| e.to_str());
        let stripped = match ext {
            Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => &base[..base.len() - ext.len() - 1],
            _ => base,
        };

        if stripped != "." {
            for ext in RESOLVE_EXTENSIONS {
                let candidate = format!("{}.{}", stripped, ext);
                if self.source.is_file(&candidate) {
                    return Some(candidate);
                }
            }
        }

        for index_file in INDEX_FILES {
            let candidate = if stripped == "." {
                index_file.to_string()
            } else {
                format!("{}/{}", stripped, index_file)
            };
            if self.source.is_file(&candidate) {
                return Some(candidate);
            }
        }

        // Non-source references such as `./data.json` only resolve verbatim
        if ext.is_some() && stripped == base && self.source.is_file(base) {
            return Some(base.to_string());
        }

        None
    }
}

pub fn is_relative(request: &str) -> bool {
    request == "." || request == ".." || request.starts_with("./") || request.starts_with("../")
}

/// Cleans a joined relative path; `None` when it climbs out of the root.
fn normalize(joined: &str) -> Option<String> {
    let cleaned = PathBuf::from(clean(joined));
    if cleaned.starts_with("..") || cleaned.is_absolute() {
        return None;
    }
    let s = cleaned.to_string_lossy().replace('\\', "/");
    Some(if s.is_empty() { ".".to_string() } else { s })
}

/// Package name of an external specifier, for stats.
pub fn package_name(request: &str) -> String {
    let mut parts = request.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{}/{}", scope, name),
        (Some(name), _) => name.to_string(),
        _ => request.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DiskSource, MemorySource};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_bare_specifier_is_external() {
        let aliases = AliasConfig::with_defaults();
        let source = MemorySource::new().with_file("node_modules/react/index.js", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("react", "src/a.ts"), Resolution::External);
        assert_eq!(resolver.resolve("@scope/pkg/sub", "src/a.ts"), Resolution::External);
        assert!(resolver.resolve("react", "src/a.ts").is_external());
    }

    #[test]
    fn test_relative_resolution_with_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/app.ts", "import './utils';");
        create_test_file(root, "src/utils.ts", "");
        create_test_file(root, "lib/shared.js", "");

        let aliases = AliasConfig::new();
        let source = DiskSource::new(root);
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(
            resolver.resolve("./utils", "src/app.ts"),
            Resolution::Internal("src/utils.ts".to_string())
        );
        assert_eq!(
            resolver.resolve("../lib/shared", "src/app.ts"),
            Resolution::Internal("lib/shared.js".to_string())
        );
    }

    #[test]
    fn test_emitted_extension_maps_to_authored_source() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/util.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(
            resolver.resolve("./util.js", "src/main.ts"),
            Resolution::Internal("src/util.ts".to_string())
        );
    }

    #[test]
    fn test_typescript_preferred_over_javascript() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/a.js", "").with_file("src/a.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("./a", "src/b.ts").path(), Some("src/a.ts"));
    }

    #[test]
    fn test_directory_index_resolution() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/components/index.tsx", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("./components", "src/main.ts").path(), Some("src/components/index.tsx"));
        assert_eq!(resolver.resolve(".", "src/components/Button.tsx").path(), Some("src/components/index.tsx"));
    }

    #[test]
    fn test_dotted_basename_is_not_stripped() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/user.service.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("./user.service", "src/main.ts").path(), Some("src/user.service.ts"));
    }

    #[test]
    fn test_non_source_extension_resolves_verbatim() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/data.json", "{}");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("./data.json", "src/main.ts").path(), Some("src/data.json"));
    }

    #[test]
    fn test_missing_relative_file_is_unresolved_not_external() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new();
        let resolver = Resolver::new(&aliases, &source);

        let res = resolver.resolve("./missing", "src/main.ts");
        assert_eq!(res, Resolution::Unresolved);
        assert!(!res.is_external());
        assert_eq!(res.path(), None);
    }

    #[test]
    fn test_escaping_root_is_unresolved() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new();
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("../../outside", "src/main.ts"), Resolution::Unresolved);
    }

    #[test]
    fn test_malformed_specifiers_are_unresolved() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new();
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("", "src/main.ts"), Resolution::Unresolved);
        assert_eq!(resolver.resolve("./a b", "src/main.ts"), Resolution::Unresolved);
    }

    #[test]
    fn test_alias_exact_then_index_then_miss() {
        let aliases = AliasConfig::with_defaults();

        let exact = MemorySource::new()
            .with_file("src/lib/auth.ts", "")
            .with_file("src/lib/auth/index.ts", "");
        let resolver = Resolver::new(&aliases, &exact);
        assert_eq!(resolver.resolve("@/lib/auth", "src/app/page.tsx").path(), Some("src/lib/auth.ts"));

        let index_only = MemorySource::new().with_file("src/lib/auth/index.ts", "");
        let resolver = Resolver::new(&aliases, &index_only);
        assert_eq!(
            resolver.resolve("@/lib/auth", "src/app/page.tsx").path(),
            Some("src/lib/auth/index.ts")
        );

        let empty = MemorySource::new();
        let resolver = Resolver::new(&aliases, &empty);
        assert_eq!(resolver.resolve("@/lib/auth", "src/app/page.tsx"), Resolution::Unresolved);
    }

    #[test]
    fn test_root_alias() {
        let aliases = AliasConfig::with_defaults();
        let source = MemorySource::new().with_file("scripts/seed.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("~/scripts/seed", "src/db/index.ts").path(), Some("scripts/seed.ts"));
    }

    #[test]
    fn test_alias_tries_targets_in_order() {
        let mut aliases = AliasConfig::new();
        aliases.insert("@shared", vec!["packages/a".to_string(), "packages/b".to_string()]);
        let source = MemorySource::new().with_file("packages/b/util.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("@shared/util", "src/x.ts").path(), Some("packages/b/util.ts"));
    }

    #[test]
    fn test_cache_keyed_by_directory() {
        let aliases = AliasConfig::new();
        let source = MemorySource::new().with_file("src/a.ts", "").with_file("src/b/a.ts", "");
        let resolver = Resolver::new(&aliases, &source);

        assert_eq!(resolver.resolve("./a", "src/x.ts").path(), Some("src/a.ts"));
        assert_eq!(resolver.resolve("./a", "src/y.ts").path(), Some("src/a.ts"));
        assert_eq!(resolver.resolve("./a", "src/b/z.ts").path(), Some("src/b/a.ts"));
        assert_eq!(resolver.cache_len(), 2);
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("react"), "react");
        assert_eq!(package_name("lodash/fp"), "lodash");
        assert_eq!(package_name("@tanstack/react-query"), "@tanstack/react-query");
        assert_eq!(package_name("@scope/pkg/deep/path"), "@scope/pkg");
        assert_eq!(package_name("node:fs"), "node:fs");
    }
}
