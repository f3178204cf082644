//! Writing generated modules to disk

use crate::error::{Error, Result};
use crate::generators::GeneratedModule;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a generated module to the given output directory.
/// Creates the directory if it does not exist.
///
/// The contents go to a sibling temporary file first and are renamed into
/// place, so an existing module is either fully replaced or left untouched.
pub fn write_module(output_dir: &Path, module: &GeneratedModule) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|source| Error::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(&module.file_name);
    let staging = output_dir.join(format!(".{}.tmp", module.file_name));

    fs::write(&staging, &module.contents).map_err(|source| Error::Io {
        path: staging.clone(),
        source,
    })?;

    if let Err(source) = fs::rename(&staging, &path) {
        let _ = fs::remove_file(&staging);
        return Err(Error::Io { path, source });
    }

    debug!(path = %path.display(), bytes = module.contents.len(), "wrote generated module");
    Ok(path)
}
