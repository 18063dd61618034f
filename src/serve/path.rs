//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Result of resolving a request URL under the serve root.
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
}

/// Resolve a URL to a file or directory under `serve_root`.
///
/// Directories containing an `index.html` resolve to that file; others are
/// returned as directories for listing.
pub fn resolve(url: &str, serve_root: &Path) -> Option<Resolved> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(Resolved::File(canonical));
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(Resolved::File(index));
        }
        return Some(Resolved::Directory(canonical));
    }

    None
}

/// Normalize URL: strip query string, decode, trim slashes
///
/// The query split happens before decoding, so an encoded `%3F` in a file
/// name survives as part of the path.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}
