use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raw module reference taken from an import-like statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specifier {
    pub request: String,
    pub kind: SpecKind,
}

impl Specifier {
    pub fn new(request: impl Into<String>, kind: SpecKind) -> Self {
        Self { request: request.into(), kind }
    }
}

/// How a module is pulled in. Only affects edge metadata, never resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Static,
    Dynamic,
    TypeOnly,
}

impl SpecKind {
    /// Combined kind when one file pulls in the same module more than once.
    /// A runtime import outweighs a lazy one, which outweighs a type-only one.
    pub fn merge(self, other: SpecKind) -> SpecKind {
        if other.weight() > self.weight() { other } else { self }
    }

    fn weight(self) -> u8 {
        match self {
            SpecKind::TypeOnly => 0,
            SpecKind::Dynamic => 1,
            SpecKind::Static => 2,
        }
    }
}

/// Coarse role of a file, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Layout,
    Page,
    Schema,
    Test,
    Config,
    Component,
    Module,
}

impl FileType {
    pub fn for_path(rel_path: &str) -> Self {
        let path = Path::new(rel_path);
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or(rel_path);
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let ext = path.extension().and_then(|e| e.to_str());

        if file_name.contains(".test.") || file_name.contains(".spec.") {
            return FileType::Test;
        }
        if stem == "layout" {
            return FileType::Layout;
        }
        if stem == "page" || stem == "route" {
            return FileType::Page;
        }
        let in_schema_dir = path.parent().is_some_and(|p| {
            p.components().any(|c| matches!(c.as_os_str().to_str(), Some("schema" | "schemas")))
        });
        if stem.to_ascii_lowercase().contains("schema") || in_schema_dir {
            return FileType::Schema;
        }
        if file_name.contains(".config.") {
            return FileType::Config;
        }
        if matches!(ext, Some("tsx") | Some("jsx")) {
            return FileType::Component;
        }
        FileType::Module
    }
}

/// One indexed file. Produced once per scan and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Repository-relative path with forward slashes.
    pub relative_path: String,
    pub file_type: FileType,
    pub imports: Vec<Specifier>,
    pub size: u64,
    pub hash: String,
}
