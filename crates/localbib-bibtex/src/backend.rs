use std::collections::HashMap;

use localbib_core::{BibEntry, ParseError};
use once_cell::sync::Lazy;
use regex::Regex;

static ENTRY_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*@[a-zA-Z]").unwrap());

/// `@type{key,` as written in the source.
static ENTRY_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\s*([A-Za-z]+)\s*[{(]\s*([^,\s{}()]+)\s*,").unwrap());

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub(crate) fn parse(content: &str) -> Result<Vec<BibEntry>, ParseError> {
    let tags = type_tags(content);

    match biblatex::Bibliography::parse(content) {
        Ok(bibliography) => Ok(bibliography
            .iter()
            .map(|entry| convert_entry(entry, &tags))
            .collect()),
        Err(err) => {
            tracing::debug!(error = ?err, "whole-file parse failed, parsing entries one by one");
            parse_individually(content, &tags, &format!("{err:?}"))
        }
    }
}

/// Recover what we can from a file with syntax errors by parsing each
/// `@entry` on its own.
fn parse_individually(
    content: &str,
    tags: &HashMap<String, String>,
    first_error: &str,
) -> Result<Vec<BibEntry>, ParseError> {
    let positions: Vec<usize> = ENTRY_START_RE
        .find_iter(content)
        .map(|m| m.start())
        .collect();
    if positions.is_empty() {
        return Err(ParseError::Malformed(first_error.to_string()));
    }

    let mut entries = Vec::new();
    let mut failed = 0usize;
    for (i, &start) in positions.iter().enumerate() {
        let end = positions.get(i + 1).copied().unwrap_or(content.len());
        match biblatex::Bibliography::parse(&content[start..end]) {
            Ok(bib) => entries.extend(bib.iter().map(|entry| convert_entry(entry, tags))),
            Err(_) => failed += 1,
        }
    }

    tracing::debug!(
        recovered = entries.len(),
        skipped = failed,
        "per-entry BibTeX parse finished"
    );

    if entries.is_empty() {
        return Err(ParseError::Malformed(first_error.to_string()));
    }
    if failed > 0 {
        tracing::warn!(skipped = failed, "skipped unparsable BibTeX entries");
    }
    Ok(entries)
}

/// Map each citation key to the type tag it was written with.
///
/// `biblatex` normalizes some tags (`@phdthesis` becomes a thesis), so the
/// original spelling is read back from the source. First occurrence wins.
fn type_tags(content: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for cap in ENTRY_HEAD_RE.captures_iter(content) {
        tags.entry(cap[2].to_string())
            .or_insert_with(|| cap[1].to_lowercase());
    }
    tags
}

fn convert_entry(entry: &biblatex::Entry, tags: &HashMap<String, String>) -> BibEntry {
    let entry_type = tags
        .get(&entry.key)
        .cloned()
        .unwrap_or_else(|| entry.entry_type.to_string().to_lowercase());

    let mut fields: Vec<(&String, &Vec<biblatex::Spanned<biblatex::Chunk>>)> =
        entry.fields.iter().collect();
    fields.sort_by(|(a_name, a), (b_name, b)| {
        span_start(a)
            .cmp(&span_start(b))
            .then_with(|| a_name.cmp(b_name))
    });

    let mut record = BibEntry::new(entry_type, entry.key.clone());
    for (name, chunks) in fields {
        record = record.with_field(name.to_lowercase(), chunks_to_string(chunks));
    }
    record
}

fn span_start(chunks: &[biblatex::Spanned<biblatex::Chunk>]) -> usize {
    chunks.first().map(|c| c.span.start).unwrap_or(usize::MAX)
}

/// Convert biblatex chunks to a plain string with runs of whitespace
/// collapsed.
fn chunks_to_string(chunks: &[biblatex::Spanned<biblatex::Chunk>]) -> String {
    let joined = chunks
        .iter()
        .map(|c| match &c.v {
            biblatex::Chunk::Normal(s) => s.as_str(),
            biblatex::Chunk::Verbatim(s) => s.as_str(),
            biblatex::Chunk::Math(s) => s.as_str(),
        })
        .collect::<Vec<_>>()
        .join("");
    WS_RE.replace_all(joined.trim(), " ").into_owned()
}
