//! HTML directory listings.

use crate::utils::html;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::io;
use std::path::Path;

/// Characters percent-encoded inside a link target path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?');

/// Render a directory listing page.
///
/// Entries are name-sorted; directories get a trailing slash. Link targets
/// are percent-encoded, display names HTML-escaped. Propagates the
/// underlying I/O error so the caller can map it to a 404.
pub fn render(dir: &Path, url: &str) -> io::Result<String> {
    let mut entries: Vec<(String, bool)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((name, is_dir));
    }
    entries.sort();

    let mut items = String::new();
    for (name, is_dir) in &entries {
        let suffix = if *is_dir { "/" } else { "" };
        let href = format!("{}{suffix}", utf8_percent_encode(name, SEGMENT));
        let display = format!("{name}{suffix}");
        let label = html::escape(&display);
        items.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>\n"));
    }

    let title = html::escape(url);
    Ok(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <title>Directory listing for {title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>Directory listing for {title}</h1>\n\
         <hr>\n\
         <ul>\n{items}</ul>\n\
         <hr>\n\
         </body>\n\
         </html>\n"
    ))
}
