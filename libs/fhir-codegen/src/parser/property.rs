//! Element to property resolution
//!
//! Optionality and array-ness come only from `min`/`max`; the shape comes
//! only from `type[]` and `contentReference`.

use crate::ir::{PropertyDescriptor, TypeExpression, TypeRef};
use crate::naming::{camel_case, pascal_case_path};
use fhirdecl_models::ElementDefinition;

const BACKBONE_ELEMENT: &str = "BackboneElement";
const FHIRPATH_SYSTEM_PREFIX: &str = "http://hl7.org/fhirpath/System.";

/// Resolve one (possibly choice-expanded) element into a property
pub fn resolve_property(element: &ElementDefinition) -> PropertyDescriptor {
    let mut target_profiles = Vec::new();
    for type_entry in element.type_list() {
        for profile in type_entry.target_profiles() {
            if !target_profiles.contains(&profile) {
                target_profiles.push(profile);
            }
        }
    }

    PropertyDescriptor {
        name: camel_case(element.terminal_segment()),
        path: element.path.clone(),
        description: element.description().map(String::from),
        type_expression: resolve_type_expression(element),
        required: element.is_required(),
        is_array: element.is_array(),
        target_profiles,
    }
}

/// Shape of an element's value
pub fn resolve_type_expression(element: &ElementDefinition) -> TypeExpression {
    if let Some(reference) = element.content_reference.as_deref() {
        return TypeExpression::Single(TypeRef::Named(content_reference_name(reference)));
    }

    let mut refs: Vec<TypeRef> = Vec::new();
    for code in element.type_codes() {
        let type_ref = map_type_code(&code, element);
        if !refs.contains(&type_ref) {
            refs.push(type_ref);
        }
    }

    TypeExpression::from_refs(refs)
}

/// Declaration name referenced by a `contentReference`.
///
/// `#Questionnaire.item` and
/// `http://hl7.org/fhir/StructureDefinition/Questionnaire#Questionnaire.item`
/// both resolve to `QuestionnaireItem`.
pub fn content_reference_name(reference: &str) -> String {
    let path = reference
        .rsplit_once('#')
        .map(|(_, path)| path)
        .unwrap_or(reference);
    pascal_case_path(path)
}

fn map_type_code(code: &str, element: &ElementDefinition) -> TypeRef {
    if code == BACKBONE_ELEMENT {
        return TypeRef::Named(pascal_case_path(&element.path));
    }

    if let Some(system_type) = code.strip_prefix(FHIRPATH_SYSTEM_PREFIX) {
        if let Some(primitive) = system_type_primitive(system_type) {
            return TypeRef::Primitive(primitive.to_string());
        }
    }

    TypeRef::from_code(code)
}

/// FHIR primitive matching a FHIRPath system type (R4 snapshots use these for `id`/`url`)
fn system_type_primitive(system_type: &str) -> Option<&'static str> {
    match system_type {
        "String" => Some("string"),
        "Boolean" => Some("boolean"),
        "Integer" => Some("integer"),
        "Decimal" => Some("decimal"),
        "Date" => Some("date"),
        "DateTime" => Some("dateTime"),
        "Time" => Some("time"),
        _ => None,
    }
}
