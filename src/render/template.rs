//! Fixed page template wrapping rendered fragments.

use crate::utils::html;

/// Inline stylesheet: centered reading column, light code blocks with rounded
/// corners and horizontal scroll for overflow.
const STYLE: &str = "\
body {
    max-width: 800px;
    margin: 40px auto;
    padding: 0 20px;
    font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif;
    line-height: 1.6;
}
pre {
    background-color: #f6f8fa;
    padding: 16px;
    border-radius: 6px;
    overflow-x: auto;
}
code {
    font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
}";

/// Build a complete HTML document around a rendered fragment.
///
/// The title is the source file's base name, extension included. The fragment
/// goes into the body verbatim; it is already HTML.
pub fn page(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n\
         <style>\n{STYLE}\n</style>\n\
         </head>\n\
         <body>\n\
         {fragment}\
         </body>\n\
         </html>\n",
        title = html::escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_structure() {
        let doc = page("hello.md", "<h1>Hi</h1>\n");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>hello.md</title>"));
        assert!(doc.contains("name=\"viewport\""));
        assert!(doc.contains("max-width: 800px"));
        assert!(doc.contains("<h1>Hi</h1>"));
        assert!(doc.ends_with("</html>\n"));
    }

    #[test]
    fn test_title_is_escaped() {
        let doc = page("<weird>.md", "");
        assert!(doc.contains("<title>&lt;weird&gt;.md</title>"));
    }

    #[test]
    fn test_fragment_is_verbatim() {
        let doc = page("t.md", "<p>a &amp; b</p>\n");
        assert!(doc.contains("<p>a &amp; b</p>"));
    }
}
