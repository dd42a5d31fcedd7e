use serde::de::DeserializeOwned;

/// Best-effort structured extraction from free-form model output.
///
/// Scans for the first balanced `{...}` or `[...]` span (string and
/// escape aware, so braces inside string literals don't confuse the
/// depth count), tolerating prose before and after, then parses it with
/// serde. `None` on no span, unbalanced span, or schema mismatch;
/// callers treat that identically to a failed call.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let span = balanced_span(text)?;
    serde_json::from_str(span).ok()
}

/// Find the first balanced top-level JSON object or array span
fn balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{' || b == b'[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
