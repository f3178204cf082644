//! Parser for FHIR StructureDefinitions
//!
//! Groups snapshot elements into declarations by parent path and extracts
//! inline enumerations from the differential, producing the intermediate
//! representation (IR) the generators render.
//!
//! Element `Patient.contact.name` lands in group `PatientContact` under the
//! property name `name`. Groups and their properties keep first-seen order,
//! which is what makes the generated output deterministic.

pub mod choice;
pub mod enums;
pub mod property;

pub use choice::{expand_choice, ChoicePolicy};
pub use enums::extract_enums;
pub use property::resolve_property;

use crate::error::{Error, Result};
use crate::ir::{
    DeclarationKind, DeclarationSet, EnumDeclaration, PropertyDescriptor, TypeDeclaration,
};
use crate::naming::pascal_case_path;
use fhirdecl_models::{ElementDefinition, StructureDefinition, StructureDefinitionKind};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Options steering how elements become properties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub choice_policy: ChoicePolicy,
}

/// Declarations produced by a single StructureDefinition
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDefinition {
    pub types: Vec<TypeDeclaration>,
    pub enums: Vec<EnumDeclaration>,
}

/// Parse a batch of StructureDefinitions into one declaration set
pub fn parse_batch<'a, I>(
    definitions: I,
    fhir_version: &str,
    options: ParseOptions,
) -> Result<DeclarationSet>
where
    I: IntoIterator<Item = &'a StructureDefinition>,
{
    let definitions: Vec<&StructureDefinition> = definitions.into_iter().collect();
    let mut declarations = DeclarationSet::new(fhir_version);

    // Constraints reuse their base type's root path and so its declaration name
    let specialized: HashSet<String> = definitions
        .iter()
        .filter(|sd| !sd.is_constraint())
        .filter_map(|sd| root_declaration_name(sd))
        .collect();
    let mut constrained: HashSet<String> = HashSet::new();

    for sd in definitions {
        if sd.is_constraint() {
            if let Some(root) = root_declaration_name(sd) {
                if specialized.contains(&root) || !constrained.insert(root.clone()) {
                    warn!(
                        definition = %sd.display_name(),
                        declaration = %root,
                        "skipping constraint on an already declared type"
                    );
                    continue;
                }
            }
        }

        if let Some(declared) = sd.fhir_version.as_deref() {
            if declared != fhir_version {
                warn!(
                    definition = %sd.display_name(),
                    declared,
                    requested = fhir_version,
                    "StructureDefinition targets a different FHIR version"
                );
            }
        }

        let parsed = parse_structure_definition(sd, options)?;
        for declaration in parsed.types {
            declarations.add_type(declaration)?;
        }
        for declaration in parsed.enums {
            declarations.add_enum(declaration)?;
        }
    }

    Ok(declarations)
}

fn root_declaration_name(sd: &StructureDefinition) -> Option<String> {
    sd.get_root_element().map(|root| pascal_case_path(&root.path))
}

/// Parse a single StructureDefinition
pub fn parse_structure_definition(
    sd: &StructureDefinition,
    options: ParseOptions,
) -> Result<ParsedDefinition> {
    let name = sd.display_name();
    let snapshot = sd.snapshot.as_ref().ok_or_else(|| Error::MalformedSchema {
        name: name.clone(),
        reason: "missing snapshot".to_string(),
    })?;

    let mut types = group_elements(&name, &snapshot.element, root_kind(sd), options)?;
    if let Some(root) = types.first_mut() {
        if root.description.is_none() {
            root.description = sd.description.clone();
        }
    }

    let enums = extract_enums(sd.differential_elements());
    debug!(
        definition = %name,
        types = types.len(),
        enums = enums.len(),
        "parsed StructureDefinition"
    );

    Ok(ParsedDefinition { types, enums })
}

fn root_kind(sd: &StructureDefinition) -> DeclarationKind {
    match sd.kind {
        Some(StructureDefinitionKind::Resource) => DeclarationKind::Resource,
        Some(StructureDefinitionKind::Logical) => DeclarationKind::Logical,
        Some(StructureDefinitionKind::ComplexType)
        | Some(StructureDefinitionKind::PrimitiveType)
        | None => DeclarationKind::ComplexType,
    }
}

/// Property group under construction
struct Group {
    path: String,
    description: Option<String>,
    kind: DeclarationKind,
    properties: IndexMap<String, PropertyDescriptor>,
}

impl Group {
    fn new(path: &str, description: Option<&str>, kind: DeclarationKind) -> Self {
        Self {
            path: path.to_string(),
            description: description.map(String::from),
            kind,
            properties: IndexMap::new(),
        }
    }
}

/// Group snapshot elements into type declarations.
///
/// Element 0 is the root and seeds the first group, so a definition without
/// child elements still yields one (empty) declaration. Slices and their
/// children are skipped. Two elements resolving to the same property name in
/// one group fail with [`Error::NamingCollision`].
pub fn group_elements(
    name: &str,
    elements: &[ElementDefinition],
    root_kind: DeclarationKind,
    options: ParseOptions,
) -> Result<Vec<TypeDeclaration>> {
    let (root, children) = elements.split_first().ok_or_else(|| Error::MalformedSchema {
        name: name.to_string(),
        reason: "snapshot has no elements".to_string(),
    })?;

    let owners: HashMap<&str, &ElementDefinition> = elements
        .iter()
        .filter(|e| !is_within_slice(e))
        .map(|e| (e.path.as_str(), e))
        .collect();

    let mut groups: IndexMap<String, Group> = IndexMap::new();
    groups.insert(
        pascal_case_path(&root.path),
        Group::new(&root.path, root.description(), root_kind),
    );

    for element in children {
        if is_within_slice(element) {
            debug!(id = ?element.id, path = %element.path, "skipping slice element");
            continue;
        }

        if !element.is_descendant_of(&root.path) {
            return Err(Error::MalformedSchema {
                name: name.to_string(),
                reason: format!("element {} is not below root {}", element.path, root.path),
            });
        }

        let parent_path = element.parent_path().unwrap_or(&root.path);
        let key = pascal_case_path(parent_path);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            let description = owners.get(parent_path).and_then(|owner| owner.description());
            Group::new(parent_path, description, DeclarationKind::Backbone)
        });

        for alternative in expand_choice(element, options.choice_policy) {
            let property = resolve_property(&alternative);
            if group.properties.contains_key(&property.name) {
                return Err(Error::NamingCollision {
                    group: key,
                    property: property.name,
                    path: alternative.path,
                });
            }
            group.properties.insert(property.name.clone(), property);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(name, group)| TypeDeclaration {
            name,
            path: group.path,
            description: group.description,
            kind: group.kind,
            properties: group.properties.into_values().collect(),
        })
        .collect())
}

/// Slices restate an already declared element; their children carry a `:` in the id
fn is_within_slice(element: &ElementDefinition) -> bool {
    element.is_slice() || element.id.as_deref().is_some_and(|id| id.contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{TypeExpression, TypeRef};
    use fhirdecl_models::{ElementDefinitionType, TypeDerivationRule};

    fn element(path: &str, codes: &[&str], min: u32, max: &str) -> ElementDefinition {
        let mut element = ElementDefinition::new(path);
        element.id = Some(path.to_string());
        element.min = Some(min);
        element.max = Some(max.to_string());
        element.types = Some(
            codes
                .iter()
                .map(|c| ElementDefinitionType::with_code(*c))
                .collect(),
        );
        element
    }

    fn group(elements: Vec<ElementDefinition>) -> Result<Vec<TypeDeclaration>> {
        group_elements("Test", &elements, DeclarationKind::Resource, ParseOptions::default())
    }

    #[test]
    fn test_groups_by_parent_path() {
        let types = group(vec![
            ElementDefinition::new("Patient"),
            element("Patient.active", &["boolean"], 0, "1"),
            element("Patient.contact", &["BackboneElement"], 0, "*"),
            element("Patient.contact.name", &["HumanName"], 0, "1"),
            element("Patient.contact.gender", &["code"], 0, "1"),
            element("Patient.gender", &["code"], 0, "1"),
        ])
        .unwrap();

        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Patient", "PatientContact"]);

        let patient: Vec<&str> = types[0].properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(patient, vec!["active", "contact", "gender"]);
        assert_eq!(types[0].kind, DeclarationKind::Resource);

        let contact: Vec<&str> = types[1].properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(contact, vec!["name", "gender"]);
        assert_eq!(types[1].kind, DeclarationKind::Backbone);
        assert_eq!(types[1].path, "Patient.contact");
    }

    #[test]
    fn test_backbone_description_from_owner() {
        let mut contact = element("Patient.contact", &["BackboneElement"], 0, "*");
        contact.short = Some("A contact party".to_string());

        let types = group(vec![
            ElementDefinition::new("Patient"),
            contact,
            element("Patient.contact.name", &["HumanName"], 0, "1"),
        ])
        .unwrap();

        assert_eq!(types[1].description.as_deref(), Some("A contact party"));
    }

    #[test]
    fn test_root_without_children_still_declared() {
        let types = group(vec![ElementDefinition::new("Basic")]).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Basic");
        assert!(types[0].properties.is_empty());
    }

    #[test]
    fn test_choice_elements_expand_in_place() {
        let types = group(vec![
            ElementDefinition::new("Observation"),
            element("Observation.status", &["code"], 1, "1"),
            element("Observation.value[x]", &["Quantity", "string"], 0, "1"),
            element("Observation.note", &["Annotation"], 0, "*"),
        ])
        .unwrap();

        let names: Vec<&str> = types[0].properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["status", "valueQuantity", "valueString", "note"]);
    }

    #[test]
    fn test_naming_collision_is_an_error() {
        let err = group(vec![
            ElementDefinition::new("Foo"),
            element("Foo.valueString", &["string"], 0, "1"),
            element("Foo.value[x]", &["string", "boolean"], 0, "1"),
        ])
        .unwrap_err();

        match err {
            Error::NamingCollision {
                group,
                property,
                path,
            } => {
                assert_eq!(group, "Foo");
                assert_eq!(property, "valueString");
                assert_eq!(path, "Foo.valueString");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slices_are_skipped() {
        let mut slice = element("Patient.identifier", &["Identifier"], 0, "1");
        slice.slice_name = Some("mrn".to_string());
        slice.id = Some("Patient.identifier:mrn".to_string());
        let mut slice_child = element("Patient.identifier.system", &["uri"], 1, "1");
        slice_child.id = Some("Patient.identifier:mrn.system".to_string());

        let types = group(vec![
            ElementDefinition::new("Patient"),
            element("Patient.identifier", &["Identifier"], 0, "*"),
            slice,
            slice_child,
        ])
        .unwrap();

        assert_eq!(types.len(), 1);
        assert_eq!(types[0].properties.len(), 1);
    }

    #[test]
    fn test_empty_snapshot_is_malformed() {
        let err = group(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedSchema { .. }));
    }

    #[test]
    fn test_foreign_path_is_malformed() {
        let err = group(vec![
            ElementDefinition::new("Foo"),
            element("Bar.name", &["string"], 0, "1"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::MalformedSchema { .. }));
    }

    #[test]
    fn test_missing_snapshot_is_malformed() {
        let mut sd = StructureDefinition::from_snapshot("Foo", Vec::new());
        sd.snapshot = None;
        let err = parse_structure_definition(&sd, ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedSchema { ref reason, .. } if reason == "missing snapshot"));
    }

    #[test]
    fn test_content_reference_points_at_group() {
        let mut nested = element("Questionnaire.item.item", &[], 0, "*");
        nested.content_reference = Some("#Questionnaire.item".to_string());

        let types = group(vec![
            ElementDefinition::new("Questionnaire"),
            element("Questionnaire.item", &["BackboneElement"], 0, "*"),
            element("Questionnaire.item.linkId", &["string"], 1, "1"),
            nested,
        ])
        .unwrap();

        let item = &types[1];
        assert_eq!(item.name, "QuestionnaireItem");
        assert_eq!(
            item.properties[1].type_expression,
            TypeExpression::Single(TypeRef::Named("QuestionnaireItem".to_string()))
        );
    }

    fn quantity_like(name: &str, constraint: bool) -> StructureDefinition {
        let mut sd = StructureDefinition::from_snapshot(
            name,
            vec![
                ElementDefinition::new("Quantity"),
                element("Quantity.value", &["decimal"], 0, "1"),
            ],
        );
        if constraint {
            sd.derivation = Some(TypeDerivationRule::Constraint);
        }
        sd
    }

    #[test]
    fn test_constraints_on_declared_types_are_skipped() {
        let age = quantity_like("Age", true);
        let quantity = quantity_like("Quantity", false);
        let distance = quantity_like("Distance", true);

        let declarations =
            parse_batch([&age, &quantity, &distance], "3.0.1", ParseOptions::default()).unwrap();
        let names: Vec<&str> = declarations.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Quantity"]);
    }

    #[test]
    fn test_first_constraint_declares_missing_base() {
        let age = quantity_like("Age", true);
        let distance = quantity_like("Distance", true);

        let declarations =
            parse_batch([&age, &distance], "3.0.1", ParseOptions::default()).unwrap();
        assert_eq!(declarations.types().len(), 1);
        assert!(declarations.get_type("Quantity").is_some());
    }

    #[test]
    fn test_batch_rejects_duplicate_declarations() {
        let sd = StructureDefinition::from_snapshot("Foo", vec![ElementDefinition::new("Foo")]);
        let err = parse_batch([&sd, &sd], "3.0.1", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateDeclaration { ref name } if name == "Foo"));
    }
}
