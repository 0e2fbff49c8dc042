//! Build output harvesting
//!
//! Collects the text files of a build's output directory into an
//! `ArtifactSet` for upload.
//!
//! Binary assets (images, fonts) are skipped because the hosting upload only
//! carries text content. Pages that reference them will deploy with broken
//! links until the upload contract accepts binary payloads.

use siteforge_core::domain::site::ArtifactSet;
use std::path::{Component, Path};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::HarvestError;

/// Extensions never included in a harvest (compared case-insensitively)
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "woff", "woff2", "ttf", "eot",
];

/// Whether a file is skipped as binary based on its extension
pub fn is_binary_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|binary| binary.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Walks `output_dir` and returns its text files keyed by relative path
///
/// Paths use `/` separators regardless of platform. Files with a binary
/// extension and files that are not valid UTF-8 are left out.
pub fn harvest(output_dir: &Path) -> Result<ArtifactSet, HarvestError> {
    if !output_dir.is_dir() {
        return Err(HarvestError::MissingOutput(output_dir.to_path_buf()));
    }

    let mut artifacts = ArtifactSet::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if is_binary_path(path) {
            skipped += 1;
            continue;
        }

        let bytes = std::fs::read(path).map_err(|source| HarvestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let Ok(content) = String::from_utf8(bytes) else {
            debug!("Skipping non-UTF-8 file {}", path.display());
            skipped += 1;
            continue;
        };

        let relative = path.strip_prefix(output_dir).unwrap_or(path);
        artifacts.insert(to_forward_slashes(relative), content);
    }

    debug!(
        "Harvested {} file(s), skipped {} binary file(s)",
        artifacts.len(),
        skipped
    );

    Ok(artifacts)
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_is_binary_path() {
        assert!(is_binary_path(Path::new("logo.png")));
        assert!(is_binary_path(Path::new("img/Photo.JPG")));
        assert!(is_binary_path(Path::new("fonts/inter.woff2")));
        assert!(!is_binary_path(Path::new("index.html")));
        assert!(!is_binary_path(Path::new("icon.svg")));
        assert!(!is_binary_path(Path::new("LICENSE")));
    }

    #[test]
    fn test_mixed_tree_excludes_binary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", b"<html></html>");
        write(dir.path(), "_next/static/chunks/main.js", b"console.log(1)");
        write(dir.path(), "_next/static/css/app.css", b"body{}");
        write(dir.path(), "logo.png", b"\x89PNG\r\n\x1a\n");
        write(dir.path(), "images/hero.PNG", b"not really a png");
        write(dir.path(), "favicon.ico", b"\x00\x00\x01\x00");

        let artifacts = harvest(dir.path()).unwrap();

        let keys: Vec<&str> = artifacts.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "_next/static/chunks/main.js",
                "_next/static/css/app.css",
                "index.html"
            ]
        );
        assert!(artifacts.keys().all(|k| !is_binary_path(Path::new(k))));
        assert_eq!(artifacts["index.html"], "<html></html>");
    }

    #[test]
    fn test_skips_undecodable_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", b"ok");
        write(dir.path(), "data.bin", &[0xff, 0xfe, 0x00, 0x80]);

        let artifacts = harvest(dir.path()).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts.contains_key("index.html"));
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let err = harvest(&dir.path().join("out")).unwrap_err();
        assert!(matches!(err, HarvestError::MissingOutput(_)));
    }

    #[test]
    fn test_empty_output_dir() {
        let dir = TempDir::new().unwrap();
        assert!(harvest(dir.path()).unwrap().is_empty());
    }
}
