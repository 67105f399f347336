use std::sync::Arc;

use localbib_bibtex::default_parser;
use localbib_core::{
    BibView, GroupMode, LoadError, Loader, MemoryFetcher, Presentation, generate_raw,
};

const BIB: &str = r#"
@string{cacm = "Communications of the ACM"}

@article{turing1950,
  author  = {Alan Turing},
  title   = {Computing Machinery and Intelligence},
  journal = {Mind},
  year    = {1950}
}

@inproceedings{hopper1952,
  author    = {Grace Hopper},
  title     = {The Education of a Computer},
  booktitle = {Proceedings of the ACM National Meeting},
  year      = {1952},
  url       = {https://example.org/hopper.pdf}
}

@article{dijkstra1968,
  author  = {Edsger W. Dijkstra},
  title   = {Go To Statement Considered Harmful},
  journal = cacm,
  year    = {1968}
}

@misc{undated,
  author = {Anonymous},
  title  = {Folklore}
}
"#;

fn loader(text: &str) -> Loader {
    let fetcher = Arc::new(MemoryFetcher::new().with_source("mem://refs.bib", text));
    Loader::new(fetcher, Some(default_parser()))
}

async fn loaded(text: &str) -> BibView {
    let mut view = BibView::default();
    view.load(&loader(text), "mem://refs.bib")
        .await
        .expect("bibliography loads");
    view
}

fn labels(view: &BibView) -> Vec<String> {
    view.groups().iter().map(|g| g.label().to_string()).collect()
}

#[tokio::test]
async fn year_groups_newest_first_with_undated_last() {
    let view = loaded(BIB).await;
    assert_eq!(labels(&view), ["1968", "1952", "1950", "Others"]);
}

#[tokio::test]
async fn type_groups_use_category_labels() {
    let mut view = loaded(BIB).await;
    view.set_group_mode(GroupMode::Type);
    let got = labels(&view);
    let mut sorted = got.clone();
    sorted.sort();
    assert_eq!(got, sorted);
    assert_eq!(view.groups().iter().map(|g| g.len()).sum::<usize>(), 4);
}

#[tokio::test]
async fn string_macros_are_expanded() {
    let view = loaded(BIB).await;
    let entry = view.find("dijkstra1968").expect("entry present");
    assert_eq!(entry.venue(), Some("Communications of the ACM"));
}

#[tokio::test]
async fn search_spans_author_and_venue() {
    let mut view = loaded(BIB).await;
    assert_eq!(view.handle_search("HOPPER"), 1);
    assert_eq!(view.handle_search("mind"), 1);
    assert_eq!(view.handle_search("no such words"), 0);
    assert!(matches!(view.presentation(), Presentation::NoResults { .. }));
}

#[tokio::test]
async fn raw_output_is_regenerated_from_fields() {
    let view = loaded(BIB).await;
    let raw = generate_raw(view.find("hopper1952").expect("entry present"));
    assert!(raw.starts_with("@inproceedings{hopper1952,\n"));
    assert!(raw.contains("The Education of a Computer"));
    assert!(raw.ends_with('}'));
}

#[tokio::test]
async fn broken_entry_does_not_sink_the_file() {
    let text = "@article{ok, title = {Still Here}, year = {2001}}\n\
                @article{bad, title = {Never closed}\n\
                @misc{ok2, title = {Also Here}, year = {2002}}\n";
    let view = loaded(text).await;
    assert!(view.find("ok2").is_some());
    assert!(view.find("bad").is_none());
}

#[tokio::test]
async fn html_error_page_fails_to_load() {
    let mut view = BibView::default();
    let err = view
        .load(&loader("<html>404 Not Found</html>"), "mem://refs.bib")
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
    assert!(matches!(view.presentation(), Presentation::Failed(_)));
}
