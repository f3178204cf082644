//! Inline code enumerations
//!
//! Coded elements describe their codes in `short` as a pipe-separated list,
//! e.g. `male | female | other | unknown`. Any bound element whose `short`
//! splits into more than one segment is taken to be such a list, so a `short`
//! that merely contains a `|` is misread as an enumeration.

use crate::ir::{EnumDeclaration, EnumMember};
use crate::naming::{camel_case, pascal_case};
use fhirdecl_models::ElementDefinition;
use std::collections::HashSet;
use tracing::debug;

/// Extract enum declarations from differential elements, in element order
pub fn extract_enums(elements: &[ElementDefinition]) -> Vec<EnumDeclaration> {
    elements.iter().filter_map(extract_enum).collect()
}

/// Enum declaration for one element, if it carries an inline code list
pub fn extract_enum(element: &ElementDefinition) -> Option<EnumDeclaration> {
    let binding = element.binding.as_ref()?;
    let short = element.short.as_deref().filter(|s| !s.is_empty())?;

    let segments: Vec<&str> = short.split('|').collect();
    if segments.len() <= 1 {
        return None;
    }

    let name = enum_name(element);
    let mut literals = HashSet::new();
    let mut names = HashSet::new();
    let members: Vec<EnumMember> = segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty() && literals.insert(*segment))
        .enumerate()
        .map(|(index, segment)| EnumMember {
            name: member_name(segment, index, &mut names),
            literal: segment.to_string(),
        })
        .collect();

    debug!(path = %element.path, name = %name, members = members.len(), "extracted enum");

    Some(EnumDeclaration {
        name,
        path: element.path.clone(),
        value_set: binding.value_set().map(String::from),
        docs: element.definition.iter().cloned().collect(),
        members,
    })
}

/// Camel-cased member name, unique within the enum and never numeric.
///
/// `1` becomes `_1`; a second `inProgress` becomes `inProgress2`.
fn member_name(segment: &str, index: usize, used: &mut HashSet<String>) -> String {
    let mut name = camel_case(segment);
    if name.is_empty() {
        name = format!("_{}", index);
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    let base = name.clone();
    let mut suffix = 2;
    while !used.insert(name.clone()) {
        name = format!("{}{}", base, suffix);
        suffix += 1;
    }
    name
}

/// `PascalCase(id) + "Types"`, keeping identifier characters only
fn enum_name(element: &ElementDefinition) -> String {
    let id = element.id.as_deref().unwrap_or(&element.path);
    let segments: Vec<&str> = id.split('.').collect();
    let mut name = pascal_case(&segments);
    name.retain(|c| c.is_ascii_alphanumeric() || c == '_');
    name.push_str("Types");
    name
}
