use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use log::{debug, trace, warn};
use path_clean::clean;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Reverse,
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::source::to_relative;

pub fn find_git_root() -> Result<PathBuf> {
    find_git_root_from(&env::current_dir()?)
}

pub fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = start.to_path_buf();
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Prefix → target directories, all relative to the repository root.
///
/// A request matches prefix `p` when it equals `p` or starts with `p/`.
/// The longest matching prefix wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `@` points at the primary source root, `~` at the repository root.
    pub fn with_defaults() -> Self {
        let mut cfg = Self::new();
        cfg.insert("@", vec!["src".to_string()]);
        cfg.insert("~", vec![".".to_string()]);
        cfg
    }

    /// Adds or replaces an alias. Targets that leave the repository are dropped;
    /// an alias left without targets is not registered.
    pub fn insert(&mut self, prefix: &str, targets: Vec<String>) {
        let prefix = prefix.trim_end_matches("/*").trim_end_matches('/');
        if prefix.is_empty() {
            warn!("Ignoring alias with empty prefix");
            return;
        }
        let valid: Vec<String> = targets.iter().filter_map(|t| normalize_target(t)).collect();
        if valid.is_empty() {
            warn!("Ignoring alias '{}': no target inside the repository ({:?})", prefix, targets);
            return;
        }
        trace!("Registered alias '{}' -> {:?}", prefix, valid);
        self.entries.insert(prefix.to_string(), valid);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the alias for `request` and returns its targets with the remainder
    /// after the prefix.
    pub fn lookup<'a>(&'a self, request: &'a str) -> Option<(&'a [String], &'a str)> {
        self.entries
            .iter()
            .filter(|(prefix, _)| {
                request == prefix.as_str()
                    || request.strip_prefix(prefix.as_str()).is_some_and(|r| r.starts_with('/'))
            })
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(prefix, targets)| {
                let remainder = request[prefix.len()..].trim_start_matches('/');
                (targets.as_slice(), remainder)
            })
    }
}

fn normalize_target(target: &str) -> Option<String> {
    let target = target.trim_end_matches("/*");
    if target.is_empty() || Path::new(target).is_absolute() {
        return None;
    }
    let cleaned = PathBuf::from(clean(target));
    if cleaned.starts_with("..") {
        return None;
    }
    let s = cleaned.to_string_lossy().replace('\\', "/");
    Some(if s.is_empty() { ".".to_string() } else { s })
}

/// Builds the alias table: defaults overlaid with every `compilerOptions.paths`
/// found in `tsconfig.json` files below `root`.
pub fn load_aliases(root: &Path) -> AliasConfig {
    let mut aliases = AliasConfig::with_defaults();
    for (alias, targets) in read_tsconfig_paths(root) {
        aliases.insert(&alias, targets);
    }
    debug!("Alias table has {} entries", aliases.len());
    aliases
}

/// Reads `paths` mappings from all tsconfig files, with targets made relative
/// to `root`. Deeper files are applied first so the root tsconfig wins on
/// conflicting aliases.
pub fn read_tsconfig_paths(root: &Path) -> BTreeMap<String, Vec<String>> {
    debug!("Reading tsconfig paths from root: {:?}", root);
    let mut paths = BTreeMap::new();

    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();

    let mut tsconfig_files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some("tsconfig.json") {
            trace!("Found tsconfig at: {:?}", path);
            tsconfig_files.push(path.to_path_buf());
        }
    }
    tsconfig_files.sort_by_key(|p| (Reverse(p.components().count()), p.clone()));

    debug!("Found {} tsconfig.json files", tsconfig_files.len());

    for tsconfig_path in &tsconfig_files {
        let content = match fs::read_to_string(tsconfig_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read {}: {}", tsconfig_path.display(), e);
                continue;
            }
        };
        // Strip comments (simple approach - removes // comments)
        let content_no_comments: String = content
            .lines()
            .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
            .collect::<Vec<_>>()
            .join("\n");

        let json = match serde_json::from_str::<serde_json::Value>(&content_no_comments) {
            Ok(json) => json,
            Err(e) => {
                warn!("Skipping malformed {}: {}", tsconfig_path.display(), e);
                continue;
            }
        };

        if let Some(compiler_options) = json.get("compilerOptions")
            && let Some(paths_obj) = compiler_options.get("paths").and_then(|p| p.as_object())
        {
            let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
            let tsconfig_dir = tsconfig_path.parent().unwrap_or(root);
            let base_path = tsconfig_dir.join(base_url);

            for (alias, targets) in paths_obj {
                let Some(target_arr) = targets.as_array() else {
                    warn!("Alias '{}' in {} is not an array", alias, tsconfig_path.display());
                    continue;
                };
                let resolved_targets: Vec<String> = target_arr
                    .iter()
                    .filter_map(|t| t.as_str())
                    .filter_map(|t| {
                        let abs = PathBuf::from(clean(base_path.join(t.trim_end_matches("/*"))));
                        to_relative(root, &abs).or_else(|| (abs.as_path() == root).then(|| ".".to_string()))
                    })
                    .collect();

                if !resolved_targets.is_empty() {
                    let alias_key = alias.trim_end_matches("/*").to_string();
                    trace!("Found tsconfig path alias: '{}' -> {:?}", alias_key, resolved_targets);
                    paths.insert(alias_key, resolved_targets);
                }
            }
        }
    }

    debug!("Loaded {} tsconfig path aliases", paths.len());
    paths
}
