//! Locating a JSON object inside free-form model output.
//!
//! Models often wrap the requested object in a markdown fence or add a
//! sentence before or after it. Extraction only finds the candidate text;
//! callers still deserialize it strictly against their own schema.

/// Return the first JSON object embedded in `response`.
///
/// Looks, in order, at:
/// 1. a ` ```json ` fenced block
/// 2. a bare ` ``` ` fenced block whose content starts with `{`
/// 3. the first balanced `{ ... }` span that is valid JSON
pub fn extract_json_object(response: &str) -> Option<String> {
    let trimmed = response.trim();

    if let Some(inner) = fenced_block(trimmed, "```json") {
        return Some(inner.to_string());
    }

    if let Some(inner) = fenced_block(trimmed, "```")
        && inner.starts_with('{')
    {
        return Some(inner.to_string());
    }

    first_balanced_object(trimmed)
}

fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let len = text[start..].find("```")?;
    Some(text[start..start + len].trim())
}

/// Scan every `{` and return the first balanced span that parses as JSON.
fn first_balanced_object(text: &str) -> Option<String> {
    text.match_indices('{')
        .filter_map(|(idx, _)| balanced_span(&text[idx..]))
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
        .map(str::to_string)
}

/// Slice `text` (which starts at `{`) up to its matching `}`.
///
/// Braces inside string literals, including escaped quotes, are ignored.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
