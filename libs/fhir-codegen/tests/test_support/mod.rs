#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the JSON fixtures
pub fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Glob pattern for fixture files, e.g. `fixture_pattern("foo.json")`
pub fn fixture_pattern(glob: &str) -> String {
    data_dir().join(glob).to_string_lossy().into_owned()
}

/// Glob pattern below an arbitrary directory
pub fn pattern_in(dir: &Path, glob: &str) -> String {
    dir.join(glob).to_string_lossy().into_owned()
}

/// Write a JSON document into `dir/file_name`
pub fn write_json(dir: &Path, file_name: &str, value: &Value) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

/// Minimal StructureDefinition with the given snapshot elements
pub fn structure_definition(name: &str, elements: Value) -> Value {
    json!({
        "resourceType": "StructureDefinition",
        "id": name,
        "name": name,
        "fhirVersion": "3.0.1",
        "kind": "resource",
        "type": name,
        "snapshot": { "element": elements }
    })
}
