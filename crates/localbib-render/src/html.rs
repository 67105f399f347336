use localbib_core::{
    Accordion, AuthorList, AuthorOptions, BibEntry, BibView, Group, GroupMode, Presentation,
    format_authors, generate_raw,
};

use crate::{RenderOptions, html_escape};

pub const STYLE: &str = r#":root {
  --bg: #1a1a2e;
  --surface: #16213e;
  --card: #0f3460;
  --text: #e0e0e0;
  --dim: #888;
  --green: #4ecca3;
  --red: #e74c3c;
  --blue: #3498db;
  --border: #2a2a4a;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  background: var(--bg);
  color: var(--text);
  line-height: 1.6;
  padding: 2rem;
}
h1 { color: var(--green); margin-bottom: 1rem; font-size: 1.8rem; }
h2 { color: var(--text); margin-bottom: 0.5rem; font-size: 1.2rem; }
.toolbar {
  display: flex;
  gap: 1.5rem;
  flex-wrap: wrap;
  align-items: center;
  margin-bottom: 1.5rem;
}
.toolbar input[type=search] {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 0.4rem 0.6rem;
  min-width: 18rem;
}
.group-switch .active { font-weight: 700; color: var(--green); }
details.group {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 8px;
  margin-bottom: 1rem;
}
details.group > summary {
  padding: 0.8rem 1rem;
  cursor: pointer;
  font-weight: 600;
}
details.group > summary:hover { background: var(--card); border-radius: 8px; }
.group-content { padding: 0 1rem 1rem; }
.entry {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 1rem;
  margin-bottom: 0.75rem;
}
.entry-title { font-weight: 600; }
.entry-note { font-size: 0.85rem; color: var(--green); }
.entry-authors, .entry-meta { font-size: 0.9rem; color: var(--dim); }
.entry-authors strong { color: var(--text); }
.bibtex summary { font-size: 0.85rem; cursor: pointer; color: var(--dim); }
.citation-block {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 0.5rem 0.75rem;
  margin-top: 0.5rem;
  font-size: 0.85rem;
  white-space: pre-wrap;
  word-break: break-word;
}
.panel {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 8px;
  padding: 1rem 1.5rem;
}
.panel.error { border-color: var(--red); }
.panel.error h2 { color: var(--red); }
a { color: var(--blue); text-decoration: none; }
a:hover { text-decoration: underline; }
.links { margin-top: 0.4rem; }
.links a { margin-right: 1rem; }
"#;

/// Fills the search box with an author name and submits it.
const SEARCH_SCRIPT: &str = r#"<script>
function localbibSearch(name) {
  var form = document.getElementById('localbib-search');
  form.elements['q'].value = name;
  form.submit();
  return false;
}
</script>
"#;

pub(crate) fn page(view: &BibView, accordion: &Accordion, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(16384);
    let title = html_escape(&options.title);

    out.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
{STYLE}</style>
</head>
<body>
<h1>{title}</h1>
"#
    ));

    out.push_str("<div class=\"toolbar\">\n");
    if options.interactive {
        write_search_form(&mut out, view, options);
    } else if !view.query().is_empty() {
        out.push_str(&format!(
            "<span class=\"query\">Filtered by &quot;{}&quot;</span>\n",
            html_escape(view.query())
        ));
    }
    write_group_switch(&mut out, view, options);
    out.push_str("</div>\n");

    write_body(&mut out, view, accordion, options);

    if options.interactive {
        out.push_str(SEARCH_SCRIPT);
    }
    out.push_str("</body>\n</html>\n");

    tracing::debug!(
        mode = %view.mode(),
        query = view.query(),
        entries = view.filtered_len(),
        "rendered page"
    );
    out
}

fn write_search_form(out: &mut String, view: &BibView, options: &RenderOptions) {
    out.push_str(&format!(
        "<form id=\"localbib-search\" method=\"get\" action=\"{}\">\n",
        html_escape(&options.base_path)
    ));
    out.push_str(&format!(
        "<input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search titles, authors, venues\">\n",
        html_escape(view.query())
    ));
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"group\" value=\"{}\">\n",
        view.mode()
    ));
    out.push_str("</form>\n");
}

fn write_group_switch(out: &mut String, view: &BibView, options: &RenderOptions) {
    out.push_str("<div class=\"group-switch\">Group by: ");
    let links: Vec<String> = [(GroupMode::Year, "Year"), (GroupMode::Type, "Type")]
        .into_iter()
        .map(|(mode, label)| {
            let class = if mode == view.mode() { " class=\"active\"" } else { "" };
            if options.interactive {
                format!(
                    "<a{class} href=\"{}\">{label}</a>",
                    page_href(&options.base_path, view.query(), mode)
                )
            } else {
                format!("<span{class}>{label}</span>")
            }
        })
        .collect();
    out.push_str(&links.join(" | "));
    out.push_str("</div>\n");
}

pub(crate) fn write_body(
    out: &mut String,
    view: &BibView,
    accordion: &Accordion,
    options: &RenderOptions,
) {
    match view.presentation() {
        Presentation::Empty => {
            out.push_str("<div class=\"panel\">No bibliography loaded.</div>\n");
        }
        Presentation::Loading => {
            out.push_str("<div class=\"panel loading\">Loading bibliography...</div>\n");
        }
        Presentation::Failed(message) => {
            out.push_str("<div class=\"panel error\">\n<h2>Loading Error</h2>\n");
            out.push_str(&format!("<p>{}</p>\n</div>\n", html_escape(message)));
        }
        Presentation::NoResults { query } => {
            out.push_str("<div class=\"panel no-results\">\n<h2>No results</h2>\n");
            if query.is_empty() {
                out.push_str("<p>The bibliography has no entries.</p>\n</div>\n");
            } else {
                out.push_str(&format!(
                    "<p>No entries match &quot;{}&quot;.</p>\n</div>\n",
                    html_escape(query)
                ));
            }
        }
        Presentation::Groups(groups) => {
            out.push_str("<div class=\"accordion\">\n");
            for group in &groups {
                write_group(out, view, group, accordion.is_expanded(&group.key), options);
            }
            out.push_str("</div>\n");
        }
    }
}

fn write_group(
    out: &mut String,
    view: &BibView,
    group: &Group<'_>,
    open: bool,
    options: &RenderOptions,
) {
    out.push_str(&format!(
        "<details class=\"group\"{}>\n<summary>{} ({})</summary>\n<div class=\"group-content\">\n",
        if open { " open" } else { "" },
        html_escape(group.label()),
        group.len()
    ));
    for entry in &group.entries {
        write_entry(out, view, entry, options);
    }
    out.push_str("</div>\n</details>\n");
}

fn write_entry(out: &mut String, view: &BibView, entry: &BibEntry, options: &RenderOptions) {
    out.push_str(&format!(
        "<div class=\"entry\" id=\"{}\">\n",
        html_escape(&entry.citation_key)
    ));
    out.push_str(&format!(
        "<div class=\"entry-title\">{}</div>\n",
        html_escape(entry.title().unwrap_or("Untitled"))
    ));

    if let Some(note) = entry.bibbase_note() {
        let note = if options.allow_note_markup {
            note.to_string()
        } else {
            html_escape(note)
        };
        out.push_str(&format!("<div class=\"entry-note\">{note}</div>\n"));
    }

    out.push_str(&format!(
        "<div class=\"entry-authors\">{}</div>\n",
        authors_html(entry, view, &view.options().authors, options)
    ));

    let venue = html_escape(entry.venue().unwrap_or("Preprint"));
    match entry.year() {
        Some(year) => out.push_str(&format!(
            "<div class=\"entry-meta\"><em>{venue}</em>, {}</div>\n",
            html_escape(year)
        )),
        None => out.push_str(&format!("<div class=\"entry-meta\"><em>{venue}</em></div>\n")),
    }

    if let Some(url) = entry.url() {
        out.push_str(&format!(
            "<div class=\"links\"><a href=\"{}\">PDF</a></div>\n",
            html_escape(url)
        ));
    }

    out.push_str(&format!(
        "<details class=\"bibtex\"><summary>BibTeX</summary><pre class=\"citation-block\">{}</pre></details>\n",
        html_escape(&generate_raw(entry))
    ));
    out.push_str("</div>\n");
}

fn authors_html(
    entry: &BibEntry,
    view: &BibView,
    authors: &AuthorOptions,
    options: &RenderOptions,
) -> String {
    let Some(raw) = entry.author() else {
        return "Unknown".to_string();
    };
    match format_authors(raw, authors) {
        AuthorList::Verbatim(text) => html_escape(&text),
        AuthorList::Names(names) => names
            .iter()
            .map(|author| {
                let name = html_escape(&author.name);
                let name = if author.emphasized {
                    format!("<strong>{name}</strong>")
                } else {
                    name
                };
                if options.interactive {
                    format!(
                        "<a class=\"author\" href=\"{}\" onclick=\"return localbibSearch('{}')\">{name}</a>",
                        page_href(&options.base_path, &author.name, view.mode()),
                        html_escape(&author.handler_arg)
                    )
                } else {
                    format!("<span class=\"author\">{name}</span>")
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Link back to the page with a query and group mode, escaped for use
/// inside a double-quoted attribute.
fn page_href(base_path: &str, query: &str, mode: GroupMode) -> String {
    let href = if query.is_empty() {
        format!("{base_path}?group={mode}")
    } else {
        format!("{base_path}?q={}&group={mode}", urlencoding::encode(query))
    };
    html_escape(&href)
}
