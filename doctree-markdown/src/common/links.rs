//! Relative-link path algebra between generated pages.
//!
//! Page identifiers are path-shaped (`docs/api/widget`) and every page
//! renders into its own directory, so a link from one page to another is
//! always written path-relative to the *rendering* page, never absolute.
//! Absolute URLs pass through untouched.

use std::path::Path;

use url::Url;

/// Resolves a link destination from the page currently being rendered to a
/// target page id, with an optional `#anchor` fragment.
///
/// The rendering page acts as the base directory, so a link from page
/// `docs/a/b` to page `docs/a/c` yields `../c`, and `docs/a/b` to `docs/x`
/// yields `../../x`. A self-link collapses to the bare fragment (or `./`
/// when there is none).
pub fn resolve_page_path(from_page: &str, to_page: &str, anchor: Option<&str>) -> String {
    if is_absolute_url(to_page) {
        return with_fragment(to_page.to_string(), anchor);
    }

    let relative = pathdiff::diff_paths(Path::new(to_page), Path::new(from_page))
        .unwrap_or_else(|| Path::new(to_page).to_path_buf());

    let path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if path.is_empty() {
        return match anchor {
            Some(fragment) => format!("#{fragment}"),
            None => "./".to_string(),
        };
    }

    with_fragment(path, anchor)
}

/// Whether a destination is already an absolute URL (scheme included).
pub fn is_absolute_url(destination: &str) -> bool {
    Url::parse(destination).is_ok()
}

fn with_fragment(path: String, anchor: Option<&str>) -> String {
    match anchor {
        Some(fragment) => format!("{path}#{fragment}"),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_page_goes_up_once() {
        assert_eq!(
            resolve_page_path("docs/a/b", "docs/a/c", Some("frag")),
            "../c#frag"
        );
    }

    #[test]
    fn distant_page_goes_up_per_level() {
        assert_eq!(resolve_page_path("docs/a/b", "docs/x", None), "../../x");
    }

    #[test]
    fn self_link_is_fragment_only() {
        assert_eq!(
            resolve_page_path("docs/a/b", "docs/a/b", Some("section")),
            "#section"
        );
        assert_eq!(resolve_page_path("docs/a/b", "docs/a/b", None), "./");
    }

    #[test]
    fn descent_into_child_directory() {
        assert_eq!(
            resolve_page_path("docs", "docs/api/widget", None),
            "api/widget"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            resolve_page_path("docs/a", "https://example.com/x", None),
            "https://example.com/x"
        );
        assert!(is_absolute_url("mailto:docs@example.com"));
        assert!(!is_absolute_url("docs/a/b"));
    }
}
