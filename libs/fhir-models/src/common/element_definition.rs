//! FHIR ElementDefinition model
//!
//! Version-tolerant model for the ElementDefinition fields the declaration
//! compiler reads from StructureDefinition snapshots and differentials.
//! Accepts both the STU3 and the R4 encodings where they differ.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Extension carrying the JSON type of an element whose `type.code` is absent (STU3)
pub const JSON_TYPE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-json-type";

/// Suffix marking a polymorphic (choice) element path
pub const CHOICE_SUFFIX: &str = "[x]";

/// FHIR ElementDefinition - defines an element in a resource or data type structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Name for this particular element (in a slice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Reference to definition of content if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// If this modifies the meaning of other elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,

    /// If this element must be supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Data type for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Primitive extensions on `code` (STU3 puts the JSON type here)
    #[serde(rename = "_code", skip_serializing_if = "Option::is_none")]
    pub code_extension: Option<Value>,

    /// Profile(s) that apply; a string in STU3, an array in R4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,

    /// Target profile(s) for Reference/canonical types; a string in STU3, an array in R4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Value>,
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,

    /// Human explanation of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set (R4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// Source of value set (STU3, uri form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set_uri: Option<String>,

    /// Source of value set (STU3, reference form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set_reference: Option<BindingReference>,
}

/// Minimal Reference used by STU3 bindings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BindingReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Snapshot - a set of elements that define the structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub element: Vec<ElementDefinition>,
}

/// Differential - a set of elements that define changes from the base
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Differential {
    #[serde(default)]
    pub element: Vec<ElementDefinition>,
}

impl Snapshot {
    /// The root element (element 0)
    pub fn root(&self) -> Option<&ElementDefinition> {
        self.element.first()
    }
}

impl ElementDefinition {
    /// Create an element with only a path set
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Check if this element has a slice name
    pub fn is_slice(&self) -> bool {
        self.slice_name.is_some()
    }

    /// Last path segment (e.g. "value[x]" for "Observation.value[x]")
    pub fn terminal_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Get the parent path (everything before the last '.')
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('.').map(|pos| &self.path[..pos])
    }

    /// Check if this element is a descendant of the given path
    pub fn is_descendant_of(&self, parent_path: &str) -> bool {
        self.path.starts_with(parent_path)
            && self.path.len() > parent_path.len()
            && self.path.as_bytes().get(parent_path.len()) == Some(&b'.')
    }

    /// Check if this is a choice type element (ends with [x])
    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with(CHOICE_SUFFIX)
    }

    /// Type entries, empty when the element declares none
    pub fn type_list(&self) -> &[ElementDefinitionType] {
        self.types.as_deref().unwrap_or_default()
    }

    /// Get type codes for this element
    pub fn type_codes(&self) -> Vec<String> {
        self.type_list()
            .iter()
            .filter_map(ElementDefinitionType::effective_code)
            .collect()
    }

    /// Check if element is required (min > 0)
    pub fn is_required(&self) -> bool {
        self.min.unwrap_or(0) > 0
    }

    /// Check if element is array/list (max = "*" or max > 1)
    pub fn is_array(&self) -> bool {
        self.max
            .as_ref()
            .map(|m| m == "*" || m.parse::<u32>().map(|n| n > 1).unwrap_or(false))
            .unwrap_or(false)
    }

    /// `short`, falling back to `definition`
    pub fn description(&self) -> Option<&str> {
        self.short
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.definition.as_deref())
    }
}

impl ElementDefinitionType {
    /// Create a type entry with the given code
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    /// The type code, falling back to the STU3 json-type extension on `_code`
    pub fn effective_code(&self) -> Option<String> {
        if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
            return Some(code.to_string());
        }

        self.code_extension
            .as_ref()
            .and_then(|ext| ext.get("extension"))
            .and_then(|v| v.as_array())
            .and_then(|extensions| {
                extensions.iter().find(|e| {
                    e.get("url").and_then(|u| u.as_str()) == Some(JSON_TYPE_EXTENSION)
                })
            })
            .and_then(|e| e.get("valueString"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    /// Target profiles, accepting either a single string or an array
    pub fn target_profiles(&self) -> Vec<String> {
        string_or_list(self.target_profile.as_ref())
    }
}

impl ElementDefinitionBinding {
    /// The bound value set, whichever encoding the definition uses
    pub fn value_set(&self) -> Option<&str> {
        self.value_set
            .as_deref()
            .or(self.value_set_uri.as_deref())
            .or_else(|| {
                self.value_set_reference
                    .as_ref()
                    .and_then(|r| r.reference.as_deref())
            })
    }
}

fn string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}
