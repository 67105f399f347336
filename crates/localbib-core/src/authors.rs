use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `" and "` in any case, or a semicolon.
static AUTHOR_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+|;").unwrap());

/// Same as [`AUTHOR_SEP`] but also splitting on commas.
static AUTHOR_SEP_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+|[;,]").unwrap());

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// How author strings are split and which names are emphasized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorOptions {
    /// Spellings of the name to emphasize (alternate orderings, initials, ...).
    pub highlight: Vec<String>,
    /// Treat `,` as a name separator. Off by default since BibTeX uses
    /// `Last, First` inside a single name.
    pub split_on_comma: bool,
}

/// One actionable author name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub name: String,
    /// `name` with backslashes and single quotes escaped, for use inside a quoted handler argument.
    pub handler_arg: String,
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorList {
    Names(Vec<AuthorName>),
    /// Splitting produced nothing usable; the input is passed through untouched.
    Verbatim(String),
}

impl AuthorList {
    /// Plain `A, B, C` rendering.
    pub fn display(&self) -> String {
        match self {
            AuthorList::Names(names) => names
                .iter()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            AuthorList::Verbatim(raw) => raw.clone(),
        }
    }
}

/// Split a raw BibTeX author string into trimmed, non-empty names.
pub fn split_authors(raw: &str, split_on_comma: bool) -> Vec<String> {
    let sep: &Regex = if split_on_comma {
        &AUTHOR_SEP_COMMA
    } else {
        &AUTHOR_SEP
    };
    sep.split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split `raw` into names and mark the ones matching a highlight variant.
pub fn format_authors(raw: &str, options: &AuthorOptions) -> AuthorList {
    let names = split_authors(raw, options.split_on_comma);
    if names.is_empty() {
        return AuthorList::Verbatim(raw.to_string());
    }

    AuthorList::Names(
        names
            .into_iter()
            .map(|name| AuthorName {
                handler_arg: escape_single_quotes(&name),
                emphasized: matches_highlight(&name, &options.highlight),
                name,
            })
            .collect(),
    )
}

/// Escape `s` for a single-quoted handler argument. Backslashes go first so
/// an escaped quote already in the name cannot close the string.
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// True if `name` equals or contains any of `variants`, ignoring case,
/// braces, periods and spacing differences.
pub fn matches_highlight(name: &str, variants: &[String]) -> bool {
    let name = normalize_name(name);
    if name.is_empty() {
        return false;
    }
    variants
        .iter()
        .map(|v| normalize_name(v))
        .filter(|v| !v.is_empty())
        .any(|v| name == v || name.contains(&v))
}

fn normalize_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .map(|c| if c == '.' { ' ' } else { c })
        .collect();
    WS_RE
        .replace_all(stripped.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &AuthorList) -> Vec<&str> {
        match list {
            AuthorList::Names(n) => n.iter().map(|a| a.name.as_str()).collect(),
            AuthorList::Verbatim(_) => panic!("expected names"),
        }
    }

    #[test]
    fn splits_on_and_in_any_case() {
        let list = format_authors(
            "Ada Lovelace and  Charles Babbage AND Alan Turing",
            &AuthorOptions::default(),
        );
        assert_eq!(names(&list), ["Ada Lovelace", "Charles Babbage", "Alan Turing"]);
    }

    #[test]
    fn splits_on_semicolons_and_drops_empty_segments() {
        let list = format_authors("Doe, J.; ; Roe, R.", &AuthorOptions::default());
        assert_eq!(names(&list), ["Doe, J.", "Roe, R."]);
    }

    #[test]
    fn comma_splitting_is_opt_in() {
        let opts = AuthorOptions {
            split_on_comma: true,
            ..Default::default()
        };
        let list = format_authors("Ada Lovelace, Charles Babbage", &opts);
        assert_eq!(names(&list), ["Ada Lovelace", "Charles Babbage"]);
    }

    #[test]
    fn does_not_split_inside_words() {
        let list = format_authors("Anderson Brandt and Sandy Mandel", &AuthorOptions::default());
        assert_eq!(names(&list), ["Anderson Brandt", "Sandy Mandel"]);
    }

    #[test]
    fn escapes_single_quotes_for_handlers() {
        let list = format_authors("Conan O'Brien", &AuthorOptions::default());
        match list {
            AuthorList::Names(n) => assert_eq!(n[0].handler_arg, "Conan O\\'Brien"),
            AuthorList::Verbatim(_) => panic!("expected names"),
        }
    }

    #[test]
    fn escapes_backslashes_before_quotes() {
        assert_eq!(escape_single_quotes(r"D\'Arcy"), r"D\\\'Arcy");
        assert_eq!(escape_single_quotes(r"a\b"), r"a\\b");
    }

    #[test]
    fn separator_only_input_is_passed_through() {
        let list = format_authors(" and ; ", &AuthorOptions::default());
        assert_eq!(list, AuthorList::Verbatim(" and ; ".to_string()));
        assert_eq!(list.display(), " and ; ");
    }

    #[test]
    fn highlight_matches_variants() {
        let variants = vec!["Lovelace, Ada".to_string(), "A. Lovelace".to_string()];
        assert!(matches_highlight("Lovelace, Ada", &variants));
        assert!(matches_highlight("{A.} Lovelace", &variants));
        assert!(matches_highlight("lovelace, ada augusta", &variants));
        assert!(!matches_highlight("Charles Babbage", &variants));
        assert!(!matches_highlight("Anything", &[String::new()]));
    }

    #[test]
    fn emphasized_flag_set_per_name() {
        let opts = AuthorOptions {
            highlight: vec!["Babbage".to_string()],
            ..Default::default()
        };
        match format_authors("Ada Lovelace and Charles Babbage", &opts) {
            AuthorList::Names(n) => {
                assert!(!n[0].emphasized);
                assert!(n[1].emphasized);
            }
            AuthorList::Verbatim(_) => panic!("expected names"),
        }
    }
}
