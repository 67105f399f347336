//! HTML rendering for bibliography views.
//!
//! The renderer is a pure function of a [`BibView`] snapshot: it never
//! mutates the view and never reaches for global state. Interactive pages
//! link author names and group switches back to the page with `?q=` and
//! `?group=` parameters; static pages (file output) render them as spans.

mod html;

use localbib_core::{Accordion, BibView};

pub use html::STYLE;

/// Options controlling page output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub title: String,
    /// Render author names and group switches as links back to the page.
    pub interactive: bool,
    /// Emit `bibbase_note` markup as-is instead of escaping it.
    pub allow_note_markup: bool,
    /// Path the page is served from; links are built against it.
    pub base_path: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Publications".to_string(),
            interactive: true,
            allow_note_markup: true,
            base_path: "/".to_string(),
        }
    }
}

/// Render a complete HTML document for the view.
pub fn render_page(view: &BibView, options: &RenderOptions) -> String {
    render_page_with(view, &view.accordion(), options)
}

/// Like [`render_page`] but with an explicit accordion state.
pub fn render_page_with(view: &BibView, accordion: &Accordion, options: &RenderOptions) -> String {
    html::page(view, accordion, options)
}

/// Render only the body fragment (state panel or accordion).
pub fn render_body(view: &BibView, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(8192);
    html::write_body(&mut out, view, &view.accordion(), options);
    out
}

/// Escape text for HTML element content and quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
