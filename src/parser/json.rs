// src/parser/json.rs
// Low-level helpers for pulling JSON out of model text

/// Strip markdown code fences from a string.
pub fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();

    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(json) = rest.strip_suffix("```") {
            return json.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(json) = rest.strip_suffix("```") {
            return json.trim();
        }
    }

    trimmed
}

/// Byte range of the first balanced `{...}` or `[...]` block.
///
/// Brackets inside string literals are ignored. Returns `None` while the
/// block is still open.
pub fn balanced_block(s: &str) -> Option<(usize, usize)> {
    let start = s.find(['{', '['])?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, start + i + 1));
                }
            }
            _ => {}
        }
    }
    None
}
