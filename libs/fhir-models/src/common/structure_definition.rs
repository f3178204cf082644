//! FHIR StructureDefinition model
//!
//! Only the parts of a StructureDefinition the declaration compiler reads are
//! modelled; everything else is kept in `extensions`.

use super::element_definition::{Differential, ElementDefinition, Snapshot};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR StructureDefinition resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier for this structure definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Name for this structure definition (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Natural language description of the structure definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// FHIR Version this StructureDefinition targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    /// Kind of structure (primitive-type | complex-type | resource | logical)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StructureDefinitionKind>,

    /// Whether this is an abstract type
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// Type defined or constrained by this structure
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Definition that this type is constrained/specialized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// How this type relates to its base definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// Kind of structure this definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    /// A primitive data type
    PrimitiveType,
    /// A complex data type
    ComplexType,
    /// A resource
    Resource,
    /// A logical model (not directly implementable)
    Logical,
}

/// Relationship between a definition and its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    /// Defines a new type
    Specialization,
    /// Profiles an existing type; the root path is the base type's
    Constraint,
}

impl StructureDefinition {
    /// Create a StructureDefinition holding only a snapshot
    pub fn from_snapshot(name: impl Into<String>, elements: Vec<ElementDefinition>) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            url: None,
            name: Some(name.into()),
            description: None,
            fhir_version: None,
            kind: None,
            is_abstract: None,
            type_: None,
            base_definition: None,
            derivation: None,
            snapshot: Some(Snapshot { element: elements }),
            differential: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let sd: Self = serde_json::from_value(value.clone()).map_err(Error::from)?;
        if sd.resource_type != "StructureDefinition" {
            return Err(Error::InvalidResource(format!(
                "expected resourceType StructureDefinition, found {}",
                sd.resource_type
            )));
        }
        Ok(sd)
    }

    /// Whether this definition profiles an existing type
    pub fn is_constraint(&self) -> bool {
        self.derivation == Some(TypeDerivationRule::Constraint)
    }

    /// Get the root element from snapshot
    pub fn get_root_element(&self) -> Option<&ElementDefinition> {
        self.snapshot.as_ref().and_then(|s| s.root())
    }

    /// Snapshot elements, empty if the snapshot is absent
    pub fn snapshot_elements(&self) -> &[ElementDefinition] {
        self.snapshot
            .as_ref()
            .map(|s| s.element.as_slice())
            .unwrap_or_default()
    }

    /// Differential elements, empty if the differential is absent
    pub fn differential_elements(&self) -> &[ElementDefinition] {
        self.differential
            .as_ref()
            .map(|d| d.element.as_slice())
            .unwrap_or_default()
    }

    /// Best available human label: name, id, type, then root path
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.clone())
            .or_else(|| self.type_.clone())
            .or_else(|| self.get_root_element().map(|e| e.path.clone()))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal() {
        let sd = StructureDefinition::from_value(&json!({
            "resourceType": "StructureDefinition",
            "id": "Foo",
            "kind": "resource",
            "snapshot": {
                "element": [
                    { "path": "Foo" },
                    { "path": "Foo.name", "type": [{ "code": "string" }], "min": 1, "max": "1" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(sd.kind, Some(StructureDefinitionKind::Resource));
        assert_eq!(sd.snapshot_elements().len(), 2);
        assert!(sd.differential_elements().is_empty());
        assert_eq!(sd.get_root_element().map(|e| e.path.as_str()), Some("Foo"));
        assert_eq!(sd.display_name(), "Foo");
    }

    #[test]
    fn test_derivation() {
        let sd = StructureDefinition::from_value(&json!({
            "resourceType": "StructureDefinition",
            "name": "SimpleQuantity",
            "derivation": "constraint",
            "type": "Quantity"
        }))
        .unwrap();
        assert_eq!(sd.derivation, Some(TypeDerivationRule::Constraint));
        assert!(sd.is_constraint());

        let base = StructureDefinition::from_snapshot("Quantity", Vec::new());
        assert!(!base.is_constraint());
    }

    #[test]
    fn test_rejects_other_resource_types() {
        let err = StructureDefinition::from_value(&json!({
            "resourceType": "ValueSet",
            "id": "x"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }

    #[test]
    fn test_missing_resource_type_defaults() {
        let sd = StructureDefinition::from_value(&json!({ "name": "Bar" })).unwrap();
        assert_eq!(sd.resource_type, "StructureDefinition");
        assert_eq!(sd.display_name(), "Bar");
        assert!(sd.get_root_element().is_none());
    }
}
