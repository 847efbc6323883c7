//! Identifier normalization and ordering helpers shared by the checker.

/// Converts a snake_case identifier to camelCase, preserving segments that are
/// already camelCased.
///
/// Empty strings and private identifiers (leading underscore) are returned
/// unchanged. Consecutive underscores contribute nothing.
pub fn snake_to_camel(input: &str) -> String {
    if input.is_empty() || input.starts_with('_') {
        return input.to_string();
    }

    let mut result = String::with_capacity(input.len());

    for (i, word) in input.split('_').enumerate() {
        if word.is_empty() {
            continue;
        }

        let mut chars = word.chars();
        let first = chars.next().expect("non-empty segment");
        let rest: String = chars.collect();

        if i == 0 {
            result.extend(first.to_lowercase());
        } else {
            result.extend(first.to_uppercase());
        }
        if rest.chars().any(|c| c.is_uppercase()) {
            // Already camelCased beyond the first letter; keep as written so
            // normalization is idempotent.
            result.push_str(&rest);
        } else {
            result.push_str(&rest.to_lowercase());
        }
    }

    result
}

/// Returns true if `candidate` is an order-preserving subsequence of
/// `reference`: each candidate element must be found by a single forward scan
/// through the reference, without reuse or backtracking.
pub fn is_ordered_subsequence<T: PartialEq>(reference: &[T], candidate: &[T]) -> bool {
    let mut cursor = 0usize;
    for item in candidate {
        match reference[cursor..].iter().position(|r| r == item) {
            Some(offset) => cursor += offset + 1,
            None => return false,
        }
    }

    true
}
