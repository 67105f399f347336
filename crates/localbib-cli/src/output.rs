use std::io::Write;

use localbib_core::{AuthorList, BibEntry, BibView, Presentation, format_authors};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the view as plain text, one block per group.
pub fn print_view(w: &mut dyn Write, view: &BibView, color: ColorMode) -> std::io::Result<()> {
    match view.presentation() {
        Presentation::Empty => writeln!(w, "No bibliography loaded.")?,
        Presentation::Loading => writeln!(w, "Loading bibliography...")?,
        Presentation::Failed(message) => {
            if color.enabled() {
                writeln!(w, "{} {}", "Loading Error:".red().bold(), message)?;
            } else {
                writeln!(w, "Loading Error: {}", message)?;
            }
        }
        Presentation::NoResults { query } if query.is_empty() => {
            writeln!(w, "No entries")?;
        }
        Presentation::NoResults { query } => {
            if color.enabled() {
                writeln!(w, "{} \"{}\"", "No results for".yellow(), query)?;
            } else {
                writeln!(w, "No results for \"{}\"", query)?;
            }
        }
        Presentation::Groups(groups) => {
            for group in &groups {
                let header = format!("== {} ({}) ==", group.label(), group.len());
                if color.enabled() {
                    writeln!(w, "{}", header.bold().green())?;
                } else {
                    writeln!(w, "{}", header)?;
                }
                for entry in &group.entries {
                    print_entry(w, view, entry, color)?;
                }
                writeln!(w)?;
            }
            writeln!(
                w,
                "{} of {} entries",
                view.filtered_len(),
                view.raw_entries().len()
            )?;
        }
    }
    Ok(())
}

fn print_entry(
    w: &mut dyn Write,
    view: &BibView,
    entry: &BibEntry,
    color: ColorMode,
) -> std::io::Result<()> {
    let title = entry.title().unwrap_or("Untitled");
    if color.enabled() {
        writeln!(w, "  {}", title.bold())?;
    } else {
        writeln!(w, "  {}", title)?;
    }

    let authors = match entry.author() {
        None => "Unknown".to_string(),
        Some(raw) => match format_authors(raw, &view.options().authors) {
            AuthorList::Verbatim(text) => text,
            AuthorList::Names(names) => names
                .iter()
                .map(|n| {
                    if n.emphasized && color.enabled() {
                        n.name.bold().yellow().to_string()
                    } else if n.emphasized {
                        format!("*{}*", n.name)
                    } else {
                        n.name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        },
    };
    writeln!(w, "    {}", authors)?;

    let venue = entry.venue().unwrap_or("Preprint");
    match entry.year() {
        Some(year) => writeln!(w, "    {}, {}", venue, year)?,
        None => writeln!(w, "    {}", venue)?,
    }

    if let Some(url) = entry.url() {
        if color.enabled() {
            writeln!(w, "    {}", url.dimmed())?;
        } else {
            writeln!(w, "    {}", url)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use localbib_core::{AuthorOptions, ViewOptions};

    fn view() -> BibView {
        let mut view = BibView::new(ViewOptions {
            authors: AuthorOptions {
                highlight: vec!["Grace Hopper".into()],
                split_on_comma: false,
            },
            ..Default::default()
        });
        view.set_entries(vec![
            BibEntry::new("inproceedings", "hopper1952")
                .with_field("title", "The Education of a Computer")
                .with_field("author", "Grace Hopper and Someone Else")
                .with_field("booktitle", "ACM National Meeting")
                .with_field("year", "1952"),
            BibEntry::new("misc", "notes"),
        ]);
        view
    }

    fn render(view: &BibView) -> String {
        let mut buf = Vec::new();
        print_view(&mut buf, view, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn groups_and_entries_are_listed() {
        let out = render(&view());
        assert!(out.contains("== 1952 (1) =="));
        assert!(out.contains("== Others (1) =="));
        assert!(out.contains("    *Grace Hopper*, Someone Else\n"));
        assert!(out.contains("    ACM National Meeting, 1952\n"));
        assert!(out.contains("  Untitled\n    Unknown\n    Preprint\n"));
        assert!(out.ends_with("2 of 2 entries\n"));
    }

    #[test]
    fn no_results_names_the_query() {
        let mut view = view();
        view.handle_search("zebra");
        assert_eq!(render(&view), "No results for \"zebra\"\n");
    }

    #[test]
    fn empty_bibliography_says_no_entries() {
        let mut view = BibView::default();
        view.set_entries(Vec::new());
        assert_eq!(render(&view), "No entries\n");
    }
}
