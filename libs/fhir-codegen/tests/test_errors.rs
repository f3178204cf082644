//! Failing compilations and their effect on existing output

use fhirdecl_codegen::{compile_declarations, compile_declarations_with, CompileOptions, Error};
use serde_json::json;
use std::fs;
use std::path::Path;
mod test_support;

use test_support::{fixture_pattern, pattern_in, structure_definition, write_json};

/// Compile `foo.json` into `out` so a later failure has something to leave alone
fn seed_output(out: &Path) -> String {
    compile_declarations(&fixture_pattern("foo.json"), out, "3.0.1").unwrap();
    fs::read_to_string(out.join("declarations.ts")).unwrap()
}

fn assert_untouched(out: &Path, before: &str) {
    let after = fs::read_to_string(out.join("declarations.ts")).unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_empty_glob() {
    let inputs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let before = seed_output(out.path());

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    assert!(matches!(err, Error::NoInputFiles { .. }));
    assert_untouched(out.path(), &before);
}

#[test]
fn test_bad_json() {
    let inputs = tempfile::tempdir().unwrap();
    fs::write(inputs.path().join("broken.json"), "{\"resourceType\": ").unwrap();
    let out = tempfile::tempdir().unwrap();
    let before = seed_output(out.path());

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    match err {
        Error::InvalidJson { path, .. } => assert_eq!(path, inputs.path().join("broken.json")),
        other => panic!("expected InvalidJson, got {other:?}"),
    }
    assert_untouched(out.path(), &before);
}

#[test]
fn test_bad_json_after_good_input() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "a.json",
        &structure_definition("Alpha", json!([{ "path": "Alpha" }])),
    );
    fs::write(inputs.path().join("b.json"), "not json").unwrap();
    let out = tempfile::tempdir().unwrap();

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidJson { .. }));
    assert!(!out.path().join("declarations.ts").exists());
}

#[test]
fn test_not_a_structure_definition() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "patient.json",
        &json!({ "resourceType": "Patient", "id": "example" }),
    );
    let out = tempfile::tempdir().unwrap();

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    assert!(matches!(err, Error::NotAStructureDefinition { .. }));
}

#[test]
fn test_empty_snapshot() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "empty.json",
        &structure_definition("Empty", json!([])),
    );
    let out = tempfile::tempdir().unwrap();
    let before = seed_output(out.path());

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    match err {
        Error::MalformedSchema { name, .. } => assert_eq!(name, "Empty"),
        other => panic!("expected MalformedSchema, got {other:?}"),
    }
    assert_untouched(out.path(), &before);
}

#[test]
fn test_missing_snapshot() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "bare.json",
        &json!({ "resourceType": "StructureDefinition", "name": "Bare" }),
    );
    let out = tempfile::tempdir().unwrap();

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedSchema { .. }));
}

#[test]
fn test_element_outside_root() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "foo.json",
        &structure_definition(
            "Foo",
            json!([
                { "path": "Foo" },
                { "path": "Bar.name", "type": [{ "code": "string" }] }
            ]),
        ),
    );
    let out = tempfile::tempdir().unwrap();

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedSchema { .. }));
}

#[test]
fn test_naming_collision() {
    let inputs = tempfile::tempdir().unwrap();
    write_json(
        inputs.path(),
        "obs.json",
        &structure_definition(
            "Obs",
            json!([
                { "path": "Obs" },
                { "path": "Obs.value[x]", "min": 0, "max": "1", "type": [{ "code": "string" }] },
                { "path": "Obs.valueString", "min": 0, "max": "1", "type": [{ "code": "string" }] }
            ]),
        ),
    );
    let out = tempfile::tempdir().unwrap();
    let before = seed_output(out.path());

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    match err {
        Error::NamingCollision {
            group,
            property,
            path,
        } => {
            assert_eq!(group, "Obs");
            assert_eq!(property, "valueString");
            assert_eq!(path, "Obs.valueString");
        }
        other => panic!("expected NamingCollision, got {other:?}"),
    }
    assert_untouched(out.path(), &before);
}

#[test]
fn test_duplicate_declaration_across_inputs() {
    let inputs = tempfile::tempdir().unwrap();
    let foo = structure_definition("Foo", json!([{ "path": "Foo" }]));
    write_json(inputs.path(), "a.json", &foo);
    write_json(inputs.path(), "b.json", &foo);
    let out = tempfile::tempdir().unwrap();

    let err = compile_declarations(&pattern_in(inputs.path(), "*.json"), out.path(), "3.0.1")
        .unwrap_err();
    match err {
        Error::DuplicateDeclaration { name } => assert_eq!(name, "Foo"),
        other => panic!("expected DuplicateDeclaration, got {other:?}"),
    }
}

#[test]
fn test_invalid_fhir_version() {
    let out = tempfile::tempdir().unwrap();
    let options = CompileOptions {
        fhir_version: "STU3".to_string(),
        ..Default::default()
    };

    let err =
        compile_declarations_with(&fixture_pattern("foo.json"), out.path(), &options).unwrap_err();
    assert!(matches!(err, Error::InvalidFhirVersion(_)));
    assert!(!out.path().join("declarations.ts").exists());
}

#[test]
fn test_version_mismatch_only_warns() {
    let out = tempfile::tempdir().unwrap();
    compile_declarations(&fixture_pattern("foo.json"), out.path(), "4.0.1").unwrap();

    let generated = fs::read_to_string(out.path().join("declarations.ts")).unwrap();
    assert!(generated.starts_with("// Generated from FHIR 4.0.1 StructureDefinitions."));
}
