//! FHIR StructureDefinition models
//!
//! This crate provides the serde structures the declaration compiler reads:
//! `StructureDefinition`, its `Snapshot` and `Differential`, and the
//! `ElementDefinition` fields that drive type generation.
//!
//! # Example
//!
//! ```rust
//! use fhirdecl_models::common::{StructureDefinition, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "id": "Patient",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "name": "Patient",
//!     "kind": "resource",
//!     "type": "Patient",
//!     "snapshot": { "element": [{ "id": "Patient", "path": "Patient" }] }
//! });
//!
//! let sd = StructureDefinition::from_value(&sd_json).unwrap();
//! assert_eq!(sd.name.as_deref(), Some("Patient"));
//! assert_eq!(sd.kind, Some(StructureDefinitionKind::Resource));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
