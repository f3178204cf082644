//! Version-tolerant FHIR models
//!
//! Types that read STU3 and R4 StructureDefinitions alike

pub mod element_definition;
pub mod error;
pub mod structure_definition;

// Re-export commonly used types
pub use element_definition::*;
pub use error::{Error, Result};
pub use structure_definition::*;
