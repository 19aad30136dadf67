//! File extensions and resolution order.
//!
//! Every extension list used by the indexer and the resolver lives here so
//! that "is this a source file" and "what does `./foo` resolve to" always
//! agree.

/// Extensions of files the indexer records.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extensions appended to a stripped specifier, in priority order.
///
/// Authored TypeScript wins over emitted JavaScript, so `./util.js` written
/// in a `.ts` project lands on `util.ts`.
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Index file names tried inside a directory, in priority order.
pub const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.mts",
    "index.cts",
    "index.js",
    "index.jsx",
    "index.mjs",
    "index.cjs",
];

/// Directories the indexer never descends into, even without a `.gitignore`.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", ".next"];
