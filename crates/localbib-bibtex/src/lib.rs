use std::sync::Arc;

use localbib_core::{BibEntry, BibParser, ParseError};

#[cfg(feature = "biblatex")]
mod backend;

/// [`BibParser`] backed by the `biblatex` crate.
///
/// Without the `biblatex` feature every parse fails with
/// [`ParseError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BibtexParser;

impl BibParser for BibtexParser {
    fn name(&self) -> &str {
        "biblatex"
    }

    fn parse(&self, text: &str) -> Result<Vec<BibEntry>, ParseError> {
        parse_bibtex(text)
    }
}

/// The parser to hand to a [`localbib_core::Loader`].
pub fn default_parser() -> Arc<dyn BibParser> {
    Arc::new(BibtexParser)
}

/// Parse BibTeX text into records in source order.
///
/// Blank input yields no records. Text without a single `@` is rejected,
/// since it is almost certainly not a bibliography (an error page, say).
/// If the whole file fails to parse, each `@entry` is parsed on its own and
/// whatever parses is kept.
#[cfg(feature = "biblatex")]
pub fn parse_bibtex(content: &str) -> Result<Vec<BibEntry>, ParseError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !content.contains('@') {
        return Err(ParseError::Malformed("no BibTeX entries found".to_string()));
    }
    backend::parse(content)
}

#[cfg(not(feature = "biblatex"))]
pub fn parse_bibtex(_content: &str) -> Result<Vec<BibEntry>, ParseError> {
    Err(ParseError::Unavailable(
        "BibTeX support not compiled in (enable the `biblatex` feature of localbib-bibtex)"
            .to_string(),
    ))
}

#[cfg(all(test, feature = "biblatex"))]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
@article{lovelace1843,
  year = {1843},
  title = {Notes on the Analytical Engine},
  author = {Ada Lovelace},
  journal = {Scientific Memoirs}
}

@phdthesis{hopper1934,
  author = {Grace Murray Hopper},
  title = {New Types of Irreducibility Criteria},
  school = {Yale University},
  year = {1934}
}
"#;

    #[test]
    fn parses_records_in_source_order() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.citation_key.as_str()).collect();
        assert_eq!(keys, ["lovelace1843", "hopper1934"]);
    }

    #[test]
    fn keeps_the_written_type_tag() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        assert_eq!(entries[0].entry_type, "article");
        assert_eq!(entries[1].entry_type, "phdthesis");
    }

    #[test]
    fn keeps_field_order_from_source() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        let names: Vec<_> = entries[0].fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["year", "title", "author", "journal"]);
        assert_eq!(entries[0].title(), Some("Notes on the Analytical Engine"));
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_bibtex("  \n").unwrap().is_empty());
    }

    #[test]
    fn text_without_entries_is_malformed() {
        assert!(matches!(
            parse_bibtex("<html><body>Not Found</body></html>"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn parser_reports_its_name() {
        assert_eq!(default_parser().name(), "biblatex");
    }
}

#[cfg(all(test, not(feature = "biblatex")))]
mod tests {
    use super::*;

    #[test]
    fn parse_is_unavailable_without_backend() {
        assert!(matches!(
            BibtexParser.parse("@misc{k, title = {T}}"),
            Err(ParseError::Unavailable(_))
        ));
    }
}
