//! Choice type (`[x]`) expansion
//!
//! A choice element such as `Observation.value[x]` allowing `Quantity` and
//! `string` becomes one synthetic element per allowed type:
//! `Observation.valueQuantity` and `Observation.valueString`.

use crate::naming::{camel_case, pascal_case};
use fhirdecl_models::{ElementDefinition, ElementDefinitionType, CHOICE_SUFFIX};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// How the cardinality of a choice element carries over to its alternatives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChoicePolicy {
    /// Every alternative keeps the source `min`/`max`. A required choice
    /// element therefore makes every alternative required.
    #[default]
    InheritCardinality,
    /// Every alternative is optional; `max` is kept.
    Optional,
}

/// Expand an element into its concrete alternatives.
///
/// Elements whose path does not end in `[x]` come back unchanged as the only
/// item. Type entries sharing a code (STU3 lists `Reference` once per target)
/// collapse into one alternative carrying all of them.
pub fn expand_choice(element: &ElementDefinition, policy: ChoicePolicy) -> Vec<ElementDefinition> {
    if !element.is_choice_type() {
        return vec![element.clone()];
    }

    let terminal = element.terminal_segment();
    let base = terminal.trim_end_matches(CHOICE_SUFFIX);
    let parent = element.parent_path();

    let mut by_code: IndexMap<String, Vec<ElementDefinitionType>> = IndexMap::new();
    for type_entry in element.type_list() {
        if let Some(code) = type_entry.effective_code() {
            by_code.entry(code).or_default().push(type_entry.clone());
        }
    }

    if by_code.is_empty() {
        warn!(path = %element.path, "choice element declares no types; no alternatives generated");
        return Vec::new();
    }

    by_code
        .into_iter()
        .map(|(code, types)| {
            let name = format!("{}{}", camel_case(base), pascal_case(&[code.as_str()]));
            debug!(path = %element.path, alternative = %name, "expanded choice alternative");

            let mut alternative = element.clone();
            alternative.path = match parent {
                Some(parent) => format!("{}.{}", parent, name),
                None => name.clone(),
            };
            alternative.id = element
                .id
                .as_deref()
                .map(|id| match id.strip_suffix(terminal) {
                    Some(prefix) => format!("{}{}", prefix, name),
                    None => id.to_string(),
                });
            alternative.types = Some(types);

            if policy == ChoicePolicy::Optional {
                alternative.min = Some(0);
            }

            alternative
        })
        .collect()
}
