use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use percent_encoding::percent_decode_str;
use regex::Regex;
use ureq::http::HeaderValue;
use url::Url;

use crate::error::DownloadError;

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("unable to compile name separator regex"));

/// Normalises a project name for index lookups (`Foo_Bar.baz` → `foo-bar-baz`).
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

/// Reduces an untrusted file name to its last path segment.
///
/// Returns `None` when nothing usable is left (`""`, `"."`, `".."`, `"dir/"`).
pub fn bare_filename(name: &str) -> Option<&str> {
    name.split(['/', '\\'])
        .next_back()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Extract filename from URL path
pub fn filename_from_url(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut s| s.next_back())
            .and_then(|s| percent_decode_str(s).decode_utf8().ok())
            .and_then(|name| bare_filename(&name).map(String::from))
    })
}

/// Extract filename from Content-Disposition header
pub fn filename_from_header(value: &HeaderValue) -> Option<String> {
    value
        .to_str()
        .ok()?
        .split(';')
        .find_map(|p| p.trim().strip_prefix("filename="))
        .and_then(|s| bare_filename(s.trim_matches('"')).map(String::from))
}

/// Determine output path
///
/// A directory output receives the header file name, else the URL file name.
pub fn resolve_output_path(
    output: Option<&Path>,
    url_filename: Option<String>,
    header_filename: Option<String>,
) -> Result<PathBuf, DownloadError> {
    let filename = || {
        header_filename
            .or(url_filename)
            .ok_or(DownloadError::NoFilename)
    };

    match output {
        Some(path) if path.is_dir() => Ok(path.join(filename()?)),
        Some(path) => Ok(path.to_path_buf()),
        None => filename().map(PathBuf::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Django"), "django");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("Foo__Bar-.baz"), "foo-bar-baz");
    }

    #[test]
    fn test_bare_filename() {
        assert_eq!(bare_filename("foo-1.0.tar.gz"), Some("foo-1.0.tar.gz"));
        assert_eq!(bare_filename("../x.tar.gz"), Some("x.tar.gz"));
        assert_eq!(bare_filename("/abs/path/x.zip"), Some("x.zip"));
        assert_eq!(bare_filename("..\\..\\x.whl"), Some("x.whl"));
        assert_eq!(bare_filename(".."), None);
        assert_eq!(bare_filename("dir/"), None);
        assert_eq!(bare_filename(""), None);
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://files.example.com/p/foo/foo-1.0.tar.gz"),
            Some("foo-1.0.tar.gz".to_string())
        );
        assert_eq!(
            filename_from_url("https://example.com/dl/foo%2B1.0.zip?x=1"),
            Some("foo+1.0.zip".to_string())
        );
        assert_eq!(
            filename_from_url("https://example.com/dl/..%2F..%2Fx.zip"),
            Some("x.zip".to_string())
        );
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("not a url"), None);
    }

    #[test]
    fn test_filename_from_header() {
        let value = HeaderValue::from_static("attachment; filename=\"foo-1.0.tar.gz\"");
        assert_eq!(
            filename_from_header(&value),
            Some("foo-1.0.tar.gz".to_string())
        );

        let traversal = HeaderValue::from_static("attachment; filename=\"../../etc/foo.zip\"");
        assert_eq!(filename_from_header(&traversal), Some("foo.zip".to_string()));

        let dots = HeaderValue::from_static("attachment; filename=\"..\"");
        assert_eq!(filename_from_header(&dots), None);

        let inline = HeaderValue::from_static("inline");
        assert_eq!(filename_from_header(&inline), None);
    }

    #[test]
    fn test_resolve_output_path() {
        let dir = tempfile::tempdir().unwrap();

        let path = resolve_output_path(
            Some(dir.path()),
            Some("from-url.tar.gz".into()),
            Some("from-header.tar.gz".into()),
        )
        .unwrap();
        assert_eq!(path, dir.path().join("from-header.tar.gz"));

        let path =
            resolve_output_path(Some(dir.path()), Some("from-url.tar.gz".into()), None).unwrap();
        assert_eq!(path, dir.path().join("from-url.tar.gz"));

        let explicit = dir.path().join("explicit.zip");
        assert_eq!(
            resolve_output_path(Some(&explicit), None, None).unwrap(),
            explicit
        );

        assert!(matches!(
            resolve_output_path(Some(dir.path()), None, None),
            Err(DownloadError::NoFilename)
        ));
    }
}
