//! Intermediate Representation (IR)
//!
//! Language-agnostic declarations extracted from FHIR StructureDefinitions.
//! The IR is the bridge between the compile pipeline and the language
//! generators; generators never look at ElementDefinitions directly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// All declarations produced by one compile invocation, in emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationSet {
    /// FHIR version the inputs were compiled for
    pub fhir_version: String,
    types: Vec<TypeDeclaration>,
    enums: Vec<EnumDeclaration>,
    names: HashSet<String>,
}

impl DeclarationSet {
    pub fn new(fhir_version: impl Into<String>) -> Self {
        Self {
            fhir_version: fhir_version.into(),
            ..Default::default()
        }
    }

    /// Append a type declaration; names must be unique across the whole set
    pub fn add_type(&mut self, declaration: TypeDeclaration) -> Result<()> {
        self.claim_name(&declaration.name)?;
        self.types.push(declaration);
        Ok(())
    }

    /// Append an enum declaration; names must be unique across the whole set
    pub fn add_enum(&mut self, declaration: EnumDeclaration) -> Result<()> {
        self.claim_name(&declaration.name)?;
        self.enums.push(declaration);
        Ok(())
    }

    fn claim_name(&mut self, name: &str) -> Result<()> {
        if !self.names.insert(name.to_string()) {
            return Err(Error::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn types(&self) -> &[TypeDeclaration] {
        &self.types
    }

    pub fn enums(&self) -> &[EnumDeclaration] {
        &self.enums
    }

    /// Get a type declaration by name
    pub fn get_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.enums.is_empty()
    }

    /// Primitive codes referenced by any property, sorted
    pub fn primitive_references(&self) -> BTreeSet<&str> {
        self.types
            .iter()
            .flat_map(|t| t.properties.iter())
            .flat_map(|p| p.type_expression.refs())
            .filter_map(|r| match r {
                TypeRef::Primitive(code) => Some(code.as_str()),
                TypeRef::Named(_) => None,
            })
            .collect()
    }
}

/// Check if a type code is a FHIR primitive
pub fn is_primitive_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "boolean"
            | "integer"
            | "unsignedInt"
            | "positiveInt"
            | "integer64"
            | "decimal"
            | "string"
            | "code"
            | "id"
            | "markdown"
            | "uri"
            | "url"
            | "canonical"
            | "oid"
            | "uuid"
            | "date"
            | "dateTime"
            | "instant"
            | "time"
            | "base64Binary"
            | "xhtml"
    )
}

/// Kind of generated declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// FHIR Resource (e.g., Patient, Observation)
    Resource,
    /// Complex datatype (e.g., HumanName, Address, Coding)
    ComplexType,
    /// Logical model
    Logical,
    /// Nested group below a resource or datatype (e.g., PatientContact)
    Backbone,
}

/// One generated type: a group of properties sharing a parent path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Declaration name, PascalCase of the parent path (e.g., "PatientContact")
    pub name: String,
    /// Dotted path of the element owning the group (e.g., "Patient.contact")
    pub path: String,
    /// Human-readable description
    pub description: Option<String>,
    pub kind: DeclarationKind,
    /// Properties in first-seen order
    pub properties: Vec<PropertyDescriptor>,
}

/// A property/field within a type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name (e.g., "birthDate", "valueString")
    pub name: String,
    /// Path of the (possibly choice-expanded) element
    pub path: String,
    /// Human-readable description
    pub description: Option<String>,
    pub type_expression: TypeExpression,
    /// min > 0
    pub required: bool,
    /// max == "*" or max > 1
    pub is_array: bool,
    /// Target profiles of Reference types, for documentation
    pub target_profiles: Vec<String>,
}

/// Shape of a property value, without array-ness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpression {
    /// Element declares no usable type code
    Any,
    Single(TypeRef),
    /// Several alternative types
    Union(Vec<TypeRef>),
}

/// Reference to a type by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// FHIR primitive code, provided by the primitives collaborator
    Primitive(String),
    /// Complex type, resource, or generated group declaration
    Named(String),
}

impl TypeRef {
    /// Classify a type code
    pub fn from_code(code: &str) -> Self {
        if is_primitive_type(code) {
            TypeRef::Primitive(code.to_string())
        } else {
            TypeRef::Named(code.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Primitive(name) | TypeRef::Named(name) => name,
        }
    }
}

impl TypeExpression {
    /// Build from a list of references: none is `Any`, one is `Single`
    pub fn from_refs(mut refs: Vec<TypeRef>) -> Self {
        match refs.len() {
            0 => TypeExpression::Any,
            1 => TypeExpression::Single(refs.remove(0)),
            _ => TypeExpression::Union(refs),
        }
    }

    /// All referenced types
    pub fn refs(&self) -> &[TypeRef] {
        match self {
            TypeExpression::Any => &[],
            TypeExpression::Single(r) => std::slice::from_ref(r),
            TypeExpression::Union(refs) => refs,
        }
    }
}

/// An enumeration extracted from an inline pipe-separated code list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    /// Declaration name (e.g., "PatientGenderTypes")
    pub name: String,
    /// Path of the bound element
    pub path: String,
    /// Bound value set, if any
    pub value_set: Option<String>,
    /// Documentation lines
    pub docs: Vec<String>,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member identifier (camelCase of the literal)
    pub name: String,
    /// Code literal as written in the definition
    pub literal: String,
}
