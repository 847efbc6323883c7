pub mod checker;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod python_model;
pub mod ts_interfaces;

use std::path::Path;

pub use checker::{reconcile, CheckOptions};
pub use config::{load_config, CheckConfig, ConfiguredCheck};
pub use error::CheckError;
pub use python_model::{extract_model_fields, BackendModel};
pub use ts_interfaces::{TsInterface, TsInterfaceFile, IGNORE_MARKER};

/// Checks a backend models file against a TypeScript interfaces file.
///
/// Composes model extraction, interface parsing, and reconciliation. Returns
/// one diagnostic string per mismatch; an empty list means the files are fully
/// synced. Fails only on I/O errors or an unparsable models file — semantic
/// mismatches are data, not errors.
pub fn check_files(
    models_path: &Path,
    types_path: &Path,
    options: &CheckOptions,
) -> Result<Vec<String>, CheckError> {
    let models = extract_model_fields(models_path)?;
    let interface_file = TsInterfaceFile::load(types_path)?;
    let interfaces = interface_file.parse_interfaces();
    let ignored_fields = interface_file.ignored_fields();

    Ok(reconcile(
        &models,
        &interfaces,
        &ignored_fields,
        models_path,
        types_path,
        options,
    ))
}
