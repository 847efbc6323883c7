//! Loader for the `.ts-model-check.yaml` configuration file.
//!
//! The file is parsed with a deliberately small YAML subset (nested mappings,
//! sequences of scalars, booleans, quoted and bare strings) into a
//! `serde_json::Value`, then shaped into [`CheckConfig`] with strict key
//! validation. Loading is an explicit call; nothing is read at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::CheckError;

const MAX_CONFIG_LINES: usize = 10_000;

#[derive(Debug, Clone)]
/// One configured models-file / interfaces-file pair.
pub struct ConfiguredCheck {
    /// User-chosen label for the pair (for example `auth` or `events`).
    pub name: String,
    pub backend_model_path: PathBuf,
    pub frontend_interface_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
/// Parsed configuration file contents.
pub struct CheckConfig {
    pub checks: Vec<ConfiguredCheck>,
    pub check_blank: bool,
    /// Backend model name to candidate interface names.
    pub name_conversions: BTreeMap<String, Vec<String>>,
}

/// Reads and parses a configuration file.
pub fn load_config(path: &Path) -> Result<CheckConfig, CheckError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration file content. Unknown keys are rejected.
pub fn parse_config(content: &str) -> Result<CheckConfig, CheckError> {
    let value = parse_yaml_subset(content).map_err(CheckError::Config)?;
    let root = value
        .as_object()
        .ok_or_else(|| CheckError::Config("config root must be a mapping".to_string()))?;

    let mut config = CheckConfig::default();

    for (key, entry) in root {
        match key.as_str() {
            "checks" => config.checks = parse_checks(entry)?,
            "check_blank" => {
                config.check_blank = entry.as_bool().ok_or_else(|| {
                    CheckError::Config("'check_blank' must be true or false".to_string())
                })?;
            }
            "model_name_conversions" => {
                config.name_conversions = parse_conversions(entry)?;
            }
            other => {
                return Err(CheckError::Config(format!(
                    "unknown config key '{other}'"
                )));
            }
        }
    }

    Ok(config)
}

fn parse_checks(value: &JsonValue) -> Result<Vec<ConfiguredCheck>, CheckError> {
    let entries = value
        .as_object()
        .ok_or_else(|| CheckError::Config("'checks' must be a mapping".to_string()))?;

    let mut checks = Vec::new();
    for (name, entry) in entries {
        let pair = entry.as_object().ok_or_else(|| {
            CheckError::Config(format!("check '{name}' must be a mapping of paths"))
        })?;

        let mut backend = None;
        let mut frontend = None;
        for (key, path) in pair {
            let path = path.as_str().ok_or_else(|| {
                CheckError::Config(format!("check '{name}': '{key}' must be a string path"))
            })?;
            match key.as_str() {
                "backend_model_path" => backend = Some(PathBuf::from(path)),
                "frontend_interface_path" => frontend = Some(PathBuf::from(path)),
                other => {
                    return Err(CheckError::Config(format!(
                        "check '{name}': unknown key '{other}'"
                    )));
                }
            }
        }

        checks.push(ConfiguredCheck {
            name: name.clone(),
            backend_model_path: backend.ok_or_else(|| {
                CheckError::Config(format!("check '{name}' must define backend_model_path"))
            })?,
            frontend_interface_path: frontend.ok_or_else(|| {
                CheckError::Config(format!(
                    "check '{name}' must define frontend_interface_path"
                ))
            })?,
        });
    }

    Ok(checks)
}

fn parse_conversions(value: &JsonValue) -> Result<BTreeMap<String, Vec<String>>, CheckError> {
    let entries = value.as_object().ok_or_else(|| {
        CheckError::Config("'model_name_conversions' must be a mapping".to_string())
    })?;

    let mut conversions = BTreeMap::new();
    for (model, names) in entries {
        let list = names.as_array().ok_or_else(|| {
            CheckError::Config(format!(
                "conversion for '{model}' must be a list of interface names"
            ))
        })?;

        let mut candidates = Vec::new();
        for name in list {
            let name = name.as_str().ok_or_else(|| {
                CheckError::Config(format!("conversion for '{model}' must list strings"))
            })?;
            candidates.push(name.to_string());
        }
        conversions.insert(model.clone(), candidates);
    }

    Ok(conversions)
}

// MARK: YAML subset

fn parse_yaml_subset(input: &str) -> Result<JsonValue, String> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw))
        .filter(|(_, raw)| {
            let trimmed = raw.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect();

    if lines.len() > MAX_CONFIG_LINES {
        return Err(format!(
            "config exceeds max supported line count ({MAX_CONFIG_LINES})"
        ));
    }
    if lines.is_empty() {
        return Ok(JsonValue::Object(JsonMap::new()));
    }

    let mut idx = 0usize;
    let indent = leading_spaces(lines[0].1);
    let value = parse_block(&lines, &mut idx, indent)?;
    if idx < lines.len() {
        return Err(format!(
            "unexpected content at line {}: '{}'",
            lines[idx].0,
            lines[idx].1.trim()
        ));
    }

    Ok(value)
}

fn parse_block(lines: &[(usize, &str)], idx: &mut usize, indent: usize) -> Result<JsonValue, String> {
    let (number, raw) = lines[*idx];
    let current_indent = leading_spaces(raw);
    if current_indent != indent {
        return Err(format!(
            "unexpected indentation at line {number}: expected {indent}, found {current_indent}"
        ));
    }

    if raw.trim_start().starts_with("- ") || raw.trim() == "-" {
        parse_sequence(lines, idx, indent)
    } else {
        parse_mapping(lines, idx, indent)
    }
}

fn parse_sequence(
    lines: &[(usize, &str)],
    idx: &mut usize,
    indent: usize,
) -> Result<JsonValue, String> {
    let mut items = Vec::new();

    while *idx < lines.len() {
        let (number, raw) = lines[*idx];
        if leading_spaces(raw) != indent {
            break;
        }
        let trimmed = raw.trim_start();
        let Some(rest) = trimmed.strip_prefix('-') else {
            break;
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(format!("empty sequence item at line {number}"));
        }
        items.push(parse_scalar(rest));
        *idx += 1;
    }

    Ok(JsonValue::Array(items))
}

fn parse_mapping(
    lines: &[(usize, &str)],
    idx: &mut usize,
    indent: usize,
) -> Result<JsonValue, String> {
    let mut map = JsonMap::new();

    while *idx < lines.len() {
        let (number, raw) = lines[*idx];
        let current_indent = leading_spaces(raw);
        if current_indent < indent {
            break;
        }
        if current_indent > indent {
            return Err(format!(
                "unexpected indentation at line {number}: expected {indent}, found {current_indent}"
            ));
        }

        let trimmed = raw.trim();
        let Some((key, rest)) = trimmed.split_once(':') else {
            return Err(format!("expected 'key: value' at line {number}"));
        };
        let key = unquote(key.trim());
        if key.is_empty() {
            return Err(format!("empty mapping key at line {number}"));
        }
        if map.contains_key(&key) {
            return Err(format!("duplicate key '{key}' at line {number}"));
        }

        let rest = rest.trim();
        *idx += 1;

        let value = if rest.is_empty() {
            let Some(&(_, next)) = lines.get(*idx) else {
                return Err(format!("key '{key}' at line {number} has no value"));
            };
            let next_indent = leading_spaces(next);
            if next_indent <= indent {
                return Err(format!("key '{key}' at line {number} has no value"));
            }
            parse_block(lines, idx, next_indent)?
        } else {
            parse_scalar(rest)
        };

        map.insert(key, value);
    }

    Ok(JsonValue::Object(map))
}

fn parse_scalar(text: &str) -> JsonValue {
    match text {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        _ => {
            if let Ok(number) = text.parse::<i64>() {
                JsonValue::Number(number.into())
            } else {
                JsonValue::String(unquote(text))
            }
        }
    }
}

fn unquote(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn leading_spaces(raw: &str) -> usize {
    raw.chars().take_while(|c| *c == ' ').count()
}
