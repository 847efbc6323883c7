//! Message templates for the four diagnostic kinds.
//!
//! Pure string assembly; the checker decides when each message is emitted.

use std::path::Path;

use crate::ts_interfaces::IGNORE_MARKER;

pub fn missing_interface_message(model_name: &str) -> String {
    format!(
        "\nNo matching TypeScript interface found for model: {model_name}\
         \nPlease name your TypeScript interfaces the same as the corresponding backend models.\
         \nYou can also use the 'model_name_conversions' option within the configuration file.\
         \nThe key is the backend model name and the value is a list of the corresponding interfaces.\
         \nThis option is also how you can break larger backend models into multiple interfaces that extend one another."
    )
}

pub fn missing_field_message(
    field: &str,
    camel_field: &str,
    model_name: &str,
    interface_names: &[&str],
) -> String {
    let interface_or_interfaces = if interface_names.len() == 1 {
        "interface"
    } else {
        "interfaces"
    };

    format!(
        "\nField '{field}' (camelCase: '{camel_field}') from model '{model_name}' is missing in the TypeScript interfaces.\
         \nExpected to find this field in the frontend {interface_or_interfaces}: {}\
         \nTo ignore this field, add the following comment to the TypeScript file: '// {IGNORE_MARKER} {camel_field}'",
        interface_names.join(", ")
    )
}

pub fn blank_mismatch_message(
    field: &str,
    camel_field: &str,
    model_name: &str,
    interface_names: &[&str],
) -> String {
    format!(
        "\nField '{field}' of model '{model_name}' allows blank values, but '{camel_field}' is not optional in the matched TypeScript interfaces.\
         \nMark the property as optional ('{camel_field}?:') in one of: {}",
        interface_names.join(", ")
    )
}

pub fn unordered_properties_message(models_path: &Path, types_path: &Path) -> String {
    format!(
        "\nThe properties of the interface file {} are unordered.\
         \nAll interface properties should exactly match the order of the corresponding fields in the {} backend model.\
         \nIf the model is synced with multiple interfaces, then their properties should follow the order prescribed by the model fields.",
        types_path.display(),
        models_path.display()
    )
}
