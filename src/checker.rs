//! Reconciliation of backend model fields against TypeScript interfaces.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::diagnostics::{
    blank_mismatch_message, missing_field_message, missing_interface_message,
    unordered_properties_message,
};
use crate::naming::{is_ordered_subsequence, snake_to_camel};
use crate::python_model::BackendModel;
use crate::ts_interfaces::TsInterface;

#[derive(Debug, Clone, Default)]
/// Caller-supplied options for a reconciliation run.
pub struct CheckOptions {
    /// Also check that `blank=True` fields are optional in the interfaces.
    pub check_blank: bool,
    /// Backend model name to candidate interface names, tried instead of the
    /// model name itself. Not mutated by the checker.
    pub name_conversions: BTreeMap<String, Vec<String>>,
}

/// Reconciles models against interfaces and returns one diagnostic string per
/// mismatch, in model declaration order. An empty list means fully synced.
///
/// Per model: no matched interface short-circuits to a single
/// missing-interface diagnostic; otherwise field coverage runs first, then
/// blank/optional agreement (independent of coverage), then property ordering
/// (only when every field was accounted for, at most one diagnostic per
/// model).
pub fn reconcile(
    models: &[BackendModel],
    interfaces: &[TsInterface],
    ignored_fields: &BTreeSet<String>,
    models_path: &Path,
    types_path: &Path,
    options: &CheckOptions,
) -> Vec<String> {
    let mut diagnostics = Vec::new();

    for model in models {
        let matched = matching_interfaces(model, interfaces, options);
        if matched.is_empty() {
            diagnostics.push(missing_interface_message(&model.name));
            continue;
        }

        let matched_names: Vec<&str> = matched.iter().map(|i| i.name.as_str()).collect();
        let mut any_missing = false;

        for field in &model.fields {
            if !field_is_accounted_for(field, &matched, ignored_fields) {
                let camel = snake_to_camel(field);
                diagnostics.push(missing_field_message(
                    field,
                    &camel,
                    &model.name,
                    &matched_names,
                ));
                any_missing = true;
            }
        }

        if options.check_blank && !model.blank_fields.is_empty() {
            // Iterate in field declaration order for stable output.
            for field in model.fields.iter().filter(|f| model.blank_fields.contains(*f)) {
                let camel = snake_to_camel(field);
                let optional_somewhere = matched
                    .iter()
                    .any(|interface| interface.optional_properties.contains(&camel));
                if !optional_somewhere {
                    diagnostics.push(blank_mismatch_message(
                        field,
                        &camel,
                        &model.name,
                        &matched_names,
                    ));
                }
            }
        }

        if !any_missing && !properties_ordered(model, &matched) {
            diagnostics.push(unordered_properties_message(models_path, types_path));
        }
    }

    diagnostics
}

/// Interfaces whose name exactly equals one of the candidates for this model.
/// Candidates come from the conversion table when an entry exists, otherwise
/// the model name itself. No case folding, no fuzzy matching.
fn matching_interfaces<'a>(
    model: &BackendModel,
    interfaces: &'a [TsInterface],
    options: &CheckOptions,
) -> Vec<&'a TsInterface> {
    let fallback = [model.name.clone()];
    let candidates: &[String] = match options.name_conversions.get(&model.name) {
        Some(names) => names,
        None => &fallback,
    };

    interfaces
        .iter()
        .filter(|interface| candidates.iter().any(|c| *c == interface.name))
        .collect()
}

fn field_is_accounted_for(
    field: &str,
    matched: &[&TsInterface],
    ignored_fields: &BTreeSet<String>,
) -> bool {
    let camel = snake_to_camel(field);
    ignored_fields.contains(&camel)
        || ignored_fields.contains(field)
        || matched
            .iter()
            .any(|interface| interface.properties.iter().any(|p| *p == camel))
}

/// Every matched interface must list its properties as an order-preserving
/// subsequence of the model's camelCased field sequence.
fn properties_ordered(model: &BackendModel, matched: &[&TsInterface]) -> bool {
    // A model without fields is vacuously ordered.
    if model.fields.is_empty() {
        return true;
    }

    let camel_fields: Vec<String> = model.fields.iter().map(|f| snake_to_camel(f)).collect();

    matched
        .iter()
        .all(|interface| is_ordered_subsequence(&camel_fields, &interface.properties))
}
