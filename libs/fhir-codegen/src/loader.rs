//! Input discovery and StructureDefinition loading

use crate::error::{Error, Result};
use fhirdecl_models::StructureDefinition;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Expand a glob pattern into the sorted list of matching files.
///
/// Directories matched by the pattern are ignored. Sorting makes the
/// emission order independent of filesystem enumeration order.
pub fn resolve_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern).map_err(|source| Error::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => warn!("Glob entry error: {}", e),
        }
    }

    if files.is_empty() {
        return Err(Error::NoInputFiles {
            pattern: pattern.to_string(),
        });
    }

    files.sort();
    files.dedup();
    debug!(pattern, count = files.len(), "resolved input files");
    Ok(files)
}

/// Read and parse a single StructureDefinition JSON file
pub fn load_structure_definition(path: &Path) -> Result<StructureDefinition> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| Error::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;

    StructureDefinition::from_value(&value).map_err(|source| Error::NotAStructureDefinition {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every file matching the pattern, in sorted path order.
///
/// Fails on the first file that cannot be loaded.
pub fn load_all(pattern: &str) -> Result<Vec<(PathBuf, StructureDefinition)>> {
    let paths = resolve_inputs(pattern)?;
    let mut definitions = Vec::with_capacity(paths.len());

    for path in paths {
        let sd = load_structure_definition(&path)?;
        info!(path = %path.display(), definition = %sd.display_name(), "loaded StructureDefinition");
        definitions.push((path, sd));
    }

    Ok(definitions)
}
