//! Error types for the declaration compiler

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid glob pattern {pattern}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No input files match {pattern}")]
    NoInputFiles { pattern: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a StructureDefinition: {source}", path.display())]
    NotAStructureDefinition {
        path: PathBuf,
        #[source]
        source: fhirdecl_models::Error,
    },

    #[error("Malformed StructureDefinition {name}: {reason}")]
    MalformedSchema { name: String, reason: String },

    #[error("Property {property} defined twice in {group} (second definition at {path})")]
    NamingCollision {
        group: String,
        property: String,
        path: String,
    },

    #[error("Declaration {name} produced by more than one input")]
    DuplicateDeclaration { name: String },

    #[error("Invalid FHIR version: {0}")]
    InvalidFhirVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
