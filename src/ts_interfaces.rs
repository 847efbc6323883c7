//! Scanner for TypeScript interface blocks, properties, and ignore
//! annotations.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::CheckError;

/// Comment marker that declares a field intentionally backend-only, file-wide:
/// `// ts-model-check: ignore field <identifier>`.
pub const IGNORE_MARKER: &str = "ts-model-check: ignore field";

#[derive(Debug, Clone)]
/// One frontend interface block extracted from the source text.
pub struct TsInterface {
    /// Interface name.
    pub name: String,
    /// Property names in textual order; names from ignore-annotation comments
    /// inside the body are interleaved at their textual position.
    pub properties: Vec<String>,
    /// Properties explicitly marked optional with `?:`.
    pub optional_properties: BTreeSet<String>,
    /// Names this interface extends. Informational only; parents are not
    /// resolved or flattened.
    pub parents: Vec<String>,
}

#[derive(Debug)]
/// A loaded TypeScript source file. Content is read once at construction;
/// recreate the value to pick up file changes.
pub struct TsInterfaceFile {
    content: String,
}

impl TsInterfaceFile {
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let content = fs::read_to_string(path)?;
        Ok(Self { content })
    }

    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Extracts every interface block in declaration order.
    ///
    /// Bodies are matched up to the first closing brace, so a property whose
    /// type annotation contains braces truncates the block there. When two
    /// blocks share a name, the later one wins.
    pub fn parse_interfaces(&self) -> Vec<TsInterface> {
        let interface_re = Regex::new(
            r"(?:export\s+|declare\s+)?\binterface\s+(\w+)(?:\s+extends\s+([^{]+))?\s*\{([\s\S]*?)\}",
        )
        .expect("valid regex");

        let mut interfaces: Vec<TsInterface> = Vec::new();
        for captures in interface_re.captures_iter(&self.content) {
            let name = captures[1].to_string();
            let parents = captures
                .get(2)
                .map(|parents| {
                    parents
                        .as_str()
                        .split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let body = captures.get(3).map(|b| b.as_str()).unwrap_or("");

            let interface = TsInterface {
                name,
                properties: extract_properties(body),
                optional_properties: extract_optional_properties(body),
                parents,
            };

            if let Some(existing) = interfaces.iter_mut().find(|i| i.name == interface.name) {
                *existing = interface;
            } else {
                interfaces.push(interface);
            }
        }

        interfaces
    }

    /// Collects every ignore-annotated field name anywhere in the file.
    pub fn ignored_fields(&self) -> BTreeSet<String> {
        let ignore_re =
            Regex::new(r"//.*?ts-model-check:\s*ignore\s+field\s+(\w+)").expect("valid regex");
        ignore_re
            .captures_iter(&self.content)
            .map(|captures| captures[1].to_string())
            .collect()
    }
}

/// Extracts property declarations and ignore-annotated names from an interface
/// body, preserving their interleaved textual order.
///
/// Each line is split at `//` so ordinary comments never contribute
/// identifier-colon false positives; only the ignore-annotation form counts
/// from comment text.
fn extract_properties(body: &str) -> Vec<String> {
    let declaration_re = Regex::new(r"(?:readonly\s+)?(\w+)\s*\??\s*:").expect("valid regex");
    let ignore_re =
        Regex::new(r"//.*?ts-model-check:\s*ignore\s+field\s+(\w+)").expect("valid regex");

    let mut properties = Vec::new();
    for line in body.lines() {
        let (code, comment) = match line.find("//") {
            Some(pos) => line.split_at(pos),
            None => (line, ""),
        };

        for captures in declaration_re.captures_iter(code) {
            properties.push(captures[1].to_string());
        }
        if let Some(captures) = ignore_re.captures(comment) {
            properties.push(captures[1].to_string());
        }
    }

    properties
}

/// Optional markers are only recognized on single-line declarations: leading
/// whitespace, optional `readonly`, identifier, then `?:`.
fn extract_optional_properties(body: &str) -> BTreeSet<String> {
    let optional_re = Regex::new(r"^\s*(?:readonly\s+)?(\w+)\?:").expect("valid regex");
    body.lines()
        .filter_map(|line| optional_re.captures(line))
        .map(|captures| captures[1].to_string())
        .collect()
}
