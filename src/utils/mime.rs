//! Content-Type lookup for files served from the output directory.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extensions a generated blog ships, grouped by content type.
const TABLE: &[(&[&str], &str)] = &[
    (&["html", "htm"], types::HTML),
    (&["txt", "md", "rst"], types::PLAIN),
    (&["css"], "text/css; charset=utf-8"),
    (&["js", "mjs"], "text/javascript; charset=utf-8"),
    (&["json", "map"], "application/json"),
    // pelican names feeds `*.atom.xml` / `*.rss.xml`
    (&["xml", "xsl"], "application/xml"),
    (&["rss"], "application/rss+xml"),
    (&["atom"], "application/atom+xml"),
    (&["pdf"], "application/pdf"),
    (&["png"], "image/png"),
    (&["jpg", "jpeg"], "image/jpeg"),
    (&["gif"], "image/gif"),
    (&["webp"], "image/webp"),
    (&["avif"], "image/avif"),
    (&["svg"], "image/svg+xml"),
    (&["ico"], "image/x-icon"),
    (&["woff"], "font/woff"),
    (&["woff2"], "font/woff2"),
    (&["ttf"], "font/ttf"),
    (&["otf"], "font/otf"),
    (&["eot"], "application/vnd.ms-fontobject"),
    (&["mp4"], "video/mp4"),
    (&["webm"], "video/webm"),
    (&["mp3"], "audio/mpeg"),
];

/// Guess the content type from the file extension (case-insensitive).
///
/// Unknown or missing extensions (`CNAME`) are served as octet streams.
pub fn from_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return types::OCTET_STREAM;
    };

    TABLE
        .iter()
        .find(|(exts, _)| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .map_or(types::OCTET_STREAM, |&(_, mime)| mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(
            from_path(Path::new("theme/css/style.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(from_path(Path::new("feeds/all.atom.xml")), "application/xml");
        assert_eq!(from_path(Path::new("images/Photo.JPG")), "image/jpeg");
    }

    #[test]
    fn test_unknown_is_octet_stream() {
        assert_eq!(from_path(Path::new("CNAME")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new(".nojekyll")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("unknown.xyz")), types::OCTET_STREAM);
    }
}
