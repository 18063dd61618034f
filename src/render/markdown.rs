//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Event, Options, Parser, html};

/// Convert a markdown document to an HTML fragment.
///
/// Tables are enabled and soft line breaks are promoted to hard breaks, so a
/// single newline inside a paragraph becomes `<br>`. Fenced code blocks are
/// core CommonMark and need no extension flag.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
