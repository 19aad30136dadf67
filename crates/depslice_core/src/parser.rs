use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, trace, warn};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::{collections::HashMap, path::Path};

use crate::{
    source::SourceReader,
    types::{SpecKind, Specifier},
};

/// Import specifiers of `rel_path`, read through `source` and memoized in `cache`.
pub fn imports_for(
    source: &dyn SourceReader,
    rel_path: &str,
    cache: &DashMap<String, Vec<Specifier>>,
) -> Result<Vec<Specifier>> {
    if let Some(v) = cache.get(rel_path) {
        trace!("Cache hit for imports: {}", rel_path);
        return Ok(v.clone());
    }
    trace!("Parsing file for imports: {}", rel_path);
    let src =
        source.read_to_string(rel_path).with_context(|| format!("Failed to read {}", rel_path))?;

    let specs = parse_imports(rel_path, &src);
    cache.insert(rel_path.to_string(), specs.clone());
    Ok(specs)
}

/// Extracts specifiers in order of first appearance, at any nesting depth.
///
/// A module requested more than once is reported once, with the strongest
/// kind among its occurrences. Source that fails to parse yields nothing.
pub fn parse_imports(rel_path: &str, src: &str) -> Vec<Specifier> {
    let st = source_type_for(Path::new(rel_path));
    let allocator = Allocator::default();
    let ParserReturn { program, panicked, .. } = OxcParser::new(&allocator, src, st).parse();
    if panicked {
        warn!("Could not parse {}, treating it as having no imports", rel_path);
        return Vec::new();
    }

    let mut collector = ImportCollector::default();
    collector.visit_program(&program);

    debug!("Found {} import specifiers in {}", collector.specs.len(), rel_path);
    collector.specs
}

#[derive(Default)]
struct ImportCollector {
    specs: Vec<Specifier>,
    positions: HashMap<String, usize>,
}

impl ImportCollector {
    fn add(&mut self, request: &str, kind: SpecKind) {
        trace!("Found {:?} import: '{}'", kind, request);
        match self.positions.get(request) {
            Some(&idx) => self.specs[idx].kind = self.specs[idx].kind.merge(kind),
            None => {
                self.positions.insert(request.to_string(), self.specs.len());
                self.specs.push(Specifier::new(request, kind));
            }
        }
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        // `import { type A, type B } from` erases as completely as `import type`
        let all_type_specifiers = decl.specifiers.as_ref().is_some_and(|specifiers| {
            !specifiers.is_empty()
                && specifiers.iter().all(|spec| match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => s.import_kind.is_type(),
                    _ => false,
                })
        });
        let kind = if decl.import_kind.is_type() || all_type_specifiers {
            SpecKind::TypeOnly
        } else {
            SpecKind::Static
        };
        self.add(decl.source.value.as_str(), kind);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            let kind =
                if decl.export_kind.is_type() { SpecKind::TypeOnly } else { SpecKind::Static };
            self.add(source.value.as_str(), kind);
        }
        // export const Page = lazy(() => import('./Page'))
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        let kind = if decl.export_kind.is_type() { SpecKind::TypeOnly } else { SpecKind::Static };
        self.add(decl.source.value.as_str(), kind);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(sl) = &expr.source {
            self.add(sl.value.as_str(), SpecKind::Dynamic);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee
            && callee.name.as_str() == "require"
            && let Some(Expression::StringLiteral(sl)) =
                call.arguments.first().and_then(|arg| arg.as_expression())
        {
            self.add(sl.value.as_str(), SpecKind::Static);
        }
        walk::walk_call_expression(self, call);
    }
}

fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    let mut st = SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")));

    // Anything carrying import/export syntax parses as a module
    if !matches!(ext, Some("cjs") | Some("cts")) {
        st = st.with_module(true);
    }

    st
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn requests(specs: &[Specifier]) -> Vec<&str> {
        specs.iter().map(|s| s.request.as_str()).collect()
    }

    #[test]
    fn test_static_import_forms() {
        let specs = parse_imports(
            "test.js",
            "import foo from './foo';\nimport { bar } from './bar';\nimport * as ns from './ns';\nimport './side-effect';",
        );
        assert_eq!(requests(&specs), vec!["./foo", "./bar", "./ns", "./side-effect"]);
        assert!(specs.iter().all(|s| s.kind == SpecKind::Static));
    }

    #[test]
    fn test_dynamic_import() {
        let specs = parse_imports("test.js", "import('./lazy');");
        assert_eq!(specs, vec![Specifier::new("./lazy", SpecKind::Dynamic)]);
    }

    #[test]
    fn test_dynamic_import_inside_lazy_arrow() {
        let specs = parse_imports(
            "routes.tsx",
            "const Page = lazy(() => import('./Page'));\nconst Other = lazy(async () => { return await import('./Other'); });",
        );
        assert_eq!(
            specs,
            vec![
                Specifier::new("./Page", SpecKind::Dynamic),
                Specifier::new("./Other", SpecKind::Dynamic),
            ]
        );
    }

    #[test]
    fn test_type_only_imports_are_classified() {
        let specs = parse_imports(
            "test.ts",
            "import type { Foo } from './types';\nimport { type Bar } from './bar';\nimport { type Baz, qux } from './mixed';",
        );
        assert_eq!(
            specs,
            vec![
                Specifier::new("./types", SpecKind::TypeOnly),
                Specifier::new("./bar", SpecKind::TypeOnly),
                Specifier::new("./mixed", SpecKind::Static),
            ]
        );
    }

    #[test]
    fn test_re_exports() {
        let specs = parse_imports(
            "index.ts",
            "export { a } from './a';\nexport * from './b';\nexport type { C } from './c';",
        );
        assert_eq!(
            specs,
            vec![
                Specifier::new("./a", SpecKind::Static),
                Specifier::new("./b", SpecKind::Static),
                Specifier::new("./c", SpecKind::TypeOnly),
            ]
        );
    }

    #[test]
    fn test_require_calls_in_expressions() {
        let specs = parse_imports(
            "test.js",
            "const fs = require('fs');\nconst mods = [require('./a'), require('./b')];\nconst mod = cond ? require('./c') : require('./d');\nconst cfg = { db: require('./db') };",
        );
        assert_eq!(requests(&specs), vec!["fs", "./a", "./b", "./c", "./d", "./db"]);
    }

    #[test]
    fn test_duplicates_keep_strongest_kind() {
        let specs =
            parse_imports("test.ts", "import type { A } from './a';\nimport { b } from './a';");
        assert_eq!(specs, vec![Specifier::new("./a", SpecKind::Static)]);

        let specs = parse_imports(
            "test.ts",
            "import type { B } from './b';\nconst load = () => import('./b');\nimport './c';\nrequire('./c');",
        );
        assert_eq!(
            specs,
            vec![Specifier::new("./b", SpecKind::Dynamic), Specifier::new("./c", SpecKind::Static)]
        );
    }

    #[test]
    fn test_nested_dynamic_imports_and_requires() {
        let specs = parse_imports(
            "routes.tsx",
            "export const Page = lazy(() => import('./Page'));\n\
             if (dev) { require('./devtools'); }\n\
             export default function load() { return import('./Other'); }\n\
             function f() { const m = require('./inner'); }\n\
             try { require('./optional'); } catch (e) {}\n\
             class Loader { run() { return import('./method'); } }",
        );
        assert_eq!(
            specs,
            vec![
                Specifier::new("./Page", SpecKind::Dynamic),
                Specifier::new("./devtools", SpecKind::Static),
                Specifier::new("./Other", SpecKind::Dynamic),
                Specifier::new("./inner", SpecKind::Static),
                Specifier::new("./optional", SpecKind::Static),
                Specifier::new("./method", SpecKind::Dynamic),
            ]
        );
    }

    #[test]
    fn test_computed_specifiers_are_ignored() {
        let specs = parse_imports("test.js", "require(name);\nimport(`./pages/${page}`);\nrequire();");
        assert!(specs.is_empty());
    }

    #[test]
    fn test_unparseable_source_yields_no_imports() {
        let specs = parse_imports("broken.ts", "import { a } from './a';\nconst = = ;");
        assert_eq!(specs, Vec::<Specifier>::new());
    }

    #[test]
    fn test_imports_for_uses_cache() {
        let mut source = MemorySource::new().with_file("src/a.ts", "import './b';");
        let cache = DashMap::new();

        let first = imports_for(&source, "src/a.ts", &cache).unwrap();
        source.remove("src/a.ts");
        let second = imports_for(&source, "src/a.ts", &cache).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_imports_for_missing_file_errors() {
        let source = MemorySource::new();
        let cache = DashMap::new();
        assert!(imports_for(&source, "src/missing.ts", &cache).is_err());
    }
}
