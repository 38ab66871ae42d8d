//! URL to filesystem path resolution.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve URL to a file under `serve_root`, handling index.html for directories
///
/// Returns `None` for missing files and for anything resolving outside the
/// root, including through symlinks.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Decode, strip query string and fragment, trim slashes.
///
/// Invalid UTF-8 after decoding yields `None`.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/hello")).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("posts/hello/index.html"), "hello").unwrap();
        fs::write(root.join("feed.xml"), "<rss/>").unwrap();
        fs::write(root.join("a b.html"), "spaced").unwrap();
        dir
    }

    fn read(path: Option<PathBuf>) -> String {
        fs::read_to_string(path.expect("path should resolve")).unwrap()
    }

    #[test]
    fn test_root_and_directories_map_to_index() {
        let dir = site();
        assert_eq!(read(resolve_path("/", dir.path())), "home");
        assert_eq!(read(resolve_path("/posts/hello/", dir.path())), "hello");
        assert_eq!(read(resolve_path("/posts/hello", dir.path())), "hello");
    }

    #[test]
    fn test_plain_file_with_query() {
        let dir = site();
        assert_eq!(read(resolve_path("/feed.xml?v=2", dir.path())), "<rss/>");
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        assert_eq!(read(resolve_path("/a%20b.html", dir.path())), "spaced");
    }

    #[test]
    fn test_missing_paths() {
        let dir = site();
        assert_eq!(resolve_path("/nope.html", dir.path()), None);
        // directory without index
        assert_eq!(resolve_path("/posts/", dir.path()), None);
    }

    #[test]
    fn test_traversal_rejected() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("output");
        fs::create_dir(&root).unwrap();

        assert_eq!(resolve_path("/../secret.txt", &root), None);
        assert_eq!(resolve_path("/%2e%2e/secret.txt", &root), None);
        assert_eq!(resolve_path("/..%2fsecret.txt", &root), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("output");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt"))
            .unwrap();

        assert_eq!(resolve_path("/link.txt", &root), None);
    }
}
