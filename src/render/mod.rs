//! Rendering of markdown source files into styled standalone HTML documents.
//!
//! Each source file maps to exactly one derived file in the output directory;
//! the mapping is recomputed from the file name on every event, never stored.
//! Two sources that map to the same derived name are last-write-wins.

mod markdown;
mod template;

use crate::config::{Config, TARGET_EXTENSION};
use crate::{debug, log};
use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while rendering a single source file.
///
/// These are per-event recoverable: callers log them and keep going.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Decode { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no usable file name")]
    NoFileName { path: PathBuf },
}

/// Check whether a path names a source file, by extension suffix.
pub fn is_source(path: &Path, config: &Config) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&config.watch.extension))
}

/// Check if path is a temp/backup file (editor artifacts)
///
/// Shared between the backfill and the watch loop: a file the watch loop
/// would never process must not be rendered at startup either, or its
/// derived file could never be updated or removed.
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Compute the derived file path for a source path.
///
/// The source extension is replaced textually at its first occurrence in the
/// base name: `notes.md` maps to `notes.html`, `a.b.md` to `a.b.html`. Returns
/// `None` for paths without a UTF-8 file name.
pub fn derived_path(source: &Path, config: &Config) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    let derived = name.replacen(&config.watch.extension, TARGET_EXTENSION, 1);
    Some(config.output_dir().join(derived))
}

/// Render one source file, overwriting any previous output.
///
/// Reads the source as UTF-8, converts it to an HTML fragment, wraps it in
/// the page template (title = source base name), and writes the whole
/// document to the derived path. Returns that path.
pub fn render(source: &Path, config: &Config) -> Result<PathBuf, RenderError> {
    let derived = derived_path(source, config).ok_or_else(|| RenderError::NoFileName {
        path: source.to_path_buf(),
    })?;

    let bytes = std::fs::read(source).map_err(|e| RenderError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let content = String::from_utf8(bytes).map_err(|_| RenderError::Decode {
        path: source.to_path_buf(),
    })?;

    let fragment = markdown::to_html(&content);
    let title = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let document = template::page(title, &fragment);

    std::fs::write(&derived, document).map_err(|e| RenderError::Write {
        path: derived.clone(),
        source: e,
    })?;

    debug!("render"; "{} -> {}", source.display(), derived.display());
    Ok(derived)
}

/// Remove the derived file for a deleted source.
///
/// A missing derived file is a no-op, not an error.
pub fn remove(source: &Path, config: &Config) -> std::io::Result<()> {
    let Some(derived) = derived_path(source, config) else {
        return Ok(());
    };
    match std::fs::remove_file(&derived) {
        Ok(()) => {
            log!("render"; "deleted {}", derived.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Render every existing source file in the watched directory.
///
/// Runs once at startup before the watch loop begins. Enumeration is
/// non-recursive and in whatever order the filesystem provides. Per-file
/// failures are logged and do not abort the pass; returns the count of
/// successfully rendered files.
pub fn render_all(config: &Config) -> anyhow::Result<usize> {
    let entries = std::fs::read_dir(&config.watch.dir)
        .with_context(|| format!("failed to list {}", config.watch.dir.display()))?;

    let mut rendered = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || is_temp_file(&path) || !is_source(&path, config) {
            continue;
        }
        match render(&path, config) {
            Ok(_) => rendered += 1,
            Err(e) => log!("render"; "{e}"),
        }
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServeConfig, WatchConfig};

    fn test_config(dir: &Path) -> Config {
        Config {
            watch: WatchConfig {
                dir: dir.to_path_buf(),
                extension: ".md".to_string(),
            },
            serve: ServeConfig::default(),
        }
    }

    fn setup() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(config.output_dir()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_is_source() {
        let (_dir, config) = setup();
        assert!(is_source(Path::new("notes.md"), &config));
        assert!(is_source(Path::new("/abs/a.b.md"), &config));
        assert!(!is_source(Path::new("notes.txt"), &config));
        assert!(!is_source(Path::new("notes.md.bak"), &config));
    }

    #[test]
    fn test_derived_path_simple() {
        let (_dir, config) = setup();
        let derived = derived_path(Path::new("notes.md"), &config).unwrap();
        assert!(derived.ends_with("notes.html"));
        assert!(derived.starts_with(config.output_dir()));
    }

    #[test]
    fn test_derived_path_multiple_dots() {
        let (_dir, config) = setup();
        let derived = derived_path(Path::new("a.b.md"), &config).unwrap();
        assert!(derived.ends_with("a.b.html"));
    }

    #[test]
    fn test_derived_path_first_occurrence_only() {
        // Textual substitution at the first occurrence, not an extension swap
        let (_dir, config) = setup();
        let derived = derived_path(Path::new("a.md.md"), &config).unwrap();
        assert!(derived.ends_with("a.html.md"));
    }

    #[test]
    fn test_render_hello_scenario() {
        let (dir, config) = setup();
        let source = dir.path().join("hello.md");
        std::fs::write(&source, "# Hi\n").unwrap();

        let derived = render(&source, &config).unwrap();
        assert_eq!(derived, config.output_dir().join("hello.html"));

        let html = std::fs::read_to_string(&derived).unwrap();
        assert!(html.contains("<title>hello.md</title>"));
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let (dir, config) = setup();
        let source = dir.path().join("stable.md");
        std::fs::write(&source, "Some *text* here.\n").unwrap();

        let derived = render(&source, &config).unwrap();
        let first = std::fs::read(&derived).unwrap();
        render(&source, &config).unwrap();
        let second = std::fs::read(&derived).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_overwrites_stale_output() {
        let (dir, config) = setup();
        let source = dir.path().join("draft.md");
        std::fs::write(&source, "first\n").unwrap();
        let derived = render(&source, &config).unwrap();

        std::fs::write(&source, "second\n").unwrap();
        render(&source, &config).unwrap();
        let html = std::fs::read_to_string(&derived).unwrap();
        assert!(html.contains("second"));
        assert!(!html.contains("first"));
    }

    #[test]
    fn test_render_missing_source_fails() {
        let (dir, config) = setup();
        let err = render(&dir.path().join("ghost.md"), &config).unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
    }

    #[test]
    fn test_render_non_utf8_fails() {
        let (dir, config) = setup();
        let source = dir.path().join("binary.md");
        std::fs::write(&source, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = render(&source, &config).unwrap_err();
        assert!(matches!(err, RenderError::Decode { .. }));
    }

    #[test]
    fn test_remove_deletes_derived_file() {
        let (dir, config) = setup();
        let source = dir.path().join("hello.md");
        std::fs::write(&source, "# Hi\n").unwrap();
        let derived = render(&source, &config).unwrap();
        assert!(derived.exists());

        remove(&source, &config).unwrap();
        assert!(!derived.exists());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (dir, config) = setup();
        remove(&dir.path().join("never-rendered.md"), &config).unwrap();
    }

    #[test]
    fn test_render_all_backfill() {
        let (dir, config) = setup();
        std::fs::write(dir.path().join("one.md"), "# One\n").unwrap();
        std::fs::write(dir.path().join("two.md"), "# Two\n").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "not markdown\n").unwrap();
        std::fs::create_dir(dir.path().join("nested.md")).unwrap(); // directory, skipped

        let rendered = render_all(&config).unwrap();
        assert_eq!(rendered, 2);
        assert!(config.output_dir().join("one.html").exists());
        assert!(config.output_dir().join("two.html").exists());
        assert!(!config.output_dir().join("skip.html").exists());
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/tmp/.notes.md.swp")));
        assert!(is_temp_file(Path::new("/tmp/notes.md.bak")));
        assert!(is_temp_file(Path::new("/tmp/notes.md~")));
        assert!(is_temp_file(Path::new("/tmp/.hidden.md")));
        assert!(!is_temp_file(Path::new("/tmp/notes.md")));
    }

    #[test]
    fn test_render_all_skips_editor_artifacts() {
        // The watch loop never processes these paths, so the backfill must
        // not render them either: a derived file with an unwatchable source
        // could never be updated or removed afterwards.
        let (dir, config) = setup();
        std::fs::write(dir.path().join("real.md"), "# Real\n").unwrap();
        std::fs::write(dir.path().join(".hidden.md"), "# Hidden\n").unwrap();
        std::fs::write(dir.path().join("swap.md~"), "# Swap\n").unwrap();

        let rendered = render_all(&config).unwrap();
        assert_eq!(rendered, 1);
        assert!(config.output_dir().join("real.html").exists());
        assert!(!config.output_dir().join(".hidden.html").exists());
        assert!(!config.output_dir().join("swap.html~").exists());
    }

    #[test]
    fn test_render_all_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("absent"));
        assert!(render_all(&config).is_err());
    }

    #[test]
    fn test_render_all_continues_past_bad_file() {
        let (dir, config) = setup();
        std::fs::write(dir.path().join("good.md"), "fine\n").unwrap();
        std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe]).unwrap();

        let rendered = render_all(&config).unwrap();
        assert_eq!(rendered, 1);
        assert!(config.output_dir().join("good.html").exists());
    }
}
