//! Loading pipeline: discover files by extension, parse them in
//! parallel, then merge and resolve sequentially.
//!
//! Parsing is embarrassingly parallel (one task per file, no shared
//! state); merge order and resolution are strictly sequential so that
//! conflict diagnostics and list concatenation stay reproducible.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{Format, Graph};
use crate::grammar;
use crate::model::FileTree;
use crate::structure;
use crate::{Error, Result};

/// Extensions of an annotated map set: one `.mbd` plus its co-located
/// sector files.
const MAP_EXTENSIONS: [&str; 4] = ["mbd", "aux", "base", "desc"];

/// A fully loaded world: the resolved graph plus every non-fatal
/// finding gathered along the way.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load every `*.sii` definition file under `dir` into one graph.
pub fn load_definitions(dir: &Path, recursive: bool) -> Result<Loaded> {
    let files = discover(dir, &["sii"], recursive)?;
    load(files, Format::Definition)
}

/// Load the annotated map set (`.mbd`/`.aux`/`.base`/`.desc`) in `dir`
/// into one graph.
pub fn load_map(dir: &Path) -> Result<Loaded> {
    let files = discover(dir, &MAP_EXTENSIONS, false)?;
    load(files, Format::Map)
}

/// Parse one in-memory definition source into a per-file tree, without
/// merging. For embedders and tests.
pub fn parse_definition_str(
    source: &str,
    name: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<FileTree> {
    let entries = grammar::parse_definition(source, name)?;
    Ok(structure::structuralize_definition(entries, name, diagnostics))
}

/// Parse one in-memory map source into a per-file tree, without merging.
pub fn parse_map_str(
    source: &str,
    name: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<FileTree> {
    let properties = grammar::parse_map(source, name)?;
    Ok(structure::structuralize_map(properties, name, diagnostics))
}

// ============================================================================
// Pipeline
// ============================================================================

struct ParsedFile {
    path: PathBuf,
    size: usize,
    tree: FileTree,
    diagnostics: Diagnostics,
}

fn load(files: Vec<PathBuf>, format: Format) -> Result<Loaded> {
    info!(files = files.len(), ?format, "loading world files");

    // One task per file; rayon's pool bounds the parallelism.
    let results: Vec<Result<ParsedFile>> = files
        .par_iter()
        .map(|path| parse_file(path, format))
        .collect();

    let mut parsed = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(file) => parsed.push(file),
            Err(error) => failures.push(error),
        }
    }
    // Fail-fast only once every file has been attempted, so one report
    // surfaces every malformed file.
    if !failures.is_empty() {
        return Err(Error::LoadFailed { failures });
    }

    // Deterministic merge order: largest file first, ties by path.
    parsed.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

    let mut diagnostics = Diagnostics::new();
    let mut graph = Graph::new();
    for file in parsed {
        diagnostics.extend(file.diagnostics);
        graph.merge_file_tree(file.tree, format, &file.path, &mut diagnostics);
    }
    graph.resolve(&mut diagnostics);

    info!(
        namespaces = graph.namespace_count(),
        nodes = graph.nodes().len(),
        diagnostics = diagnostics.len(),
        "world load complete"
    );
    Ok(Loaded { graph, diagnostics: diagnostics.into_vec() })
}

fn parse_file(path: &Path, format: Format) -> Result<ParsedFile> {
    debug!(path = %path.display(), "parsing world file");
    let source = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut diagnostics = Diagnostics::new();
    let tree = match format {
        Format::Definition => {
            let entries = grammar::parse_definition(&source, path)?;
            structure::structuralize_definition(entries, path, &mut diagnostics)
        }
        Format::Map => {
            let properties = grammar::parse_map(&source, path)?;
            structure::structuralize_map(properties, path, &mut diagnostics)
        }
    };

    Ok(ParsedFile {
        path: path.to_path_buf(),
        size: source.len(),
        tree,
        diagnostics,
    })
}

fn discover(dir: &Path, extensions: &[&str], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, extensions, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(
    dir: &Path,
    extensions: &[&str],
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let read_error = |source| Error::Read {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, extensions, recursive, files)?;
            }
            continue;
        }
        let matched = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matched {
            files.push(path);
        }
    }
    Ok(())
}
