//! Regenerate the BibTeX text of a record for display and copying.

use std::fmt::Write;

use crate::{BibEntry, FormatError};

/// Returned by [`generate_raw`] when a record cannot be regenerated.
pub const RAW_PLACEHOLDER: &str = "@comment{Error generating BibTeX}";

/// Field names are padded to this width.
const FIELD_WIDTH: usize = 12;

/// BibTeX text of `entry`, or [`RAW_PLACEHOLDER`] if it cannot be produced.
pub fn generate_raw(entry: &BibEntry) -> String {
    match try_generate_raw(entry) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key = %entry.citation_key, error = %e, "could not regenerate BibTeX");
            RAW_PLACEHOLDER.to_string()
        }
    }
}

/// BibTeX text of `entry`, fields in their stored order.
pub fn try_generate_raw(entry: &BibEntry) -> Result<String, FormatError> {
    if entry.entry_type.trim().is_empty() {
        return Err(FormatError::MissingType(entry.citation_key.clone()));
    }

    let mut raw = String::new();
    writeln!(raw, "@{}{{{},", entry.entry_type, entry.citation_key)?;
    for (name, value) in &entry.fields {
        if !braces_balanced(value) {
            return Err(FormatError::UnbalancedBraces {
                field: name.clone(),
            });
        }
        writeln!(raw, "  {:<width$} = {{{}}},", name, value, width = FIELD_WIDTH)?;
    }
    raw.push('}');
    Ok(raw)
}

/// Unescaped braces pair up and never close before they open.
fn braces_balanced(value: &str) -> bool {
    let mut depth: i32 = 0;
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
