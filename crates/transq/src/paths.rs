//! String-level path helpers.
//!
//! Queue entries keep a path exactly as the file dialog or the watcher
//! reported it, so persisted documents mix `\` and `/` separators. These
//! helpers treat both as separators regardless of the host, which
//! `std::path` does not.

use serde::{Deserialize, Serialize};

/// Case sensitivity of the filesystem that owns the queued paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCase {
    Sensitive,
    Insensitive,
}

impl PathCase {
    /// The default for the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }
}

impl Default for PathCase {
    fn default() -> Self {
        Self::host()
    }
}

pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Final component of `path`, ignoring trailing separators.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Splits a file name at its final dot. Leading-dot names have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
    }
}

/// File name of `path` without its extension.
pub fn base_name(path: &str) -> &str {
    split_extension(file_name(path)).0
}

/// Directory portion of `path`, or `None` for a bare file name.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(0) => Some(&trimmed[..1]),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}

/// Separator to use when extending `dir`, following the style it already uses.
pub fn separator_for(dir: &str) -> char {
    let has_back = dir.contains('\\');
    let has_forward = dir.contains('/');
    if has_back && !has_forward {
        '\\'
    } else if has_forward {
        '/'
    } else if dir.len() == 2 && dir.ends_with(':') {
        '\\'
    } else {
        std::path::MAIN_SEPARATOR
    }
}

pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        return name.to_string();
    }
    if dir.ends_with(is_separator) {
        return format!("{}{}", dir, name);
    }
    format!("{}{}{}", dir, separator_for(dir), name)
}

/// Comparison key for a path: one separator style, lower-cased only when
/// the filesystem ignores case.
pub fn normalize_for_compare(path: &str, case: PathCase) -> String {
    let unified = path.trim().replace('\\', "/");
    match case {
        PathCase::Sensitive => unified,
        PathCase::Insensitive => unified.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_both_separators() {
        assert_eq!(file_name(r"C:\books\novel.txt"), "novel.txt");
        assert_eq!(file_name("/home/me/novel.epub"), "novel.epub");
        assert_eq!(file_name(r"D:\mixed/dir\sub.srt"), "sub.srt");
        assert_eq!(file_name("plain.ass"), "plain.ass");
        assert_eq!(file_name("/dir/"), "dir");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.b.txt"), ("a.b", Some("txt")));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing", Some("")));
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent(r"C:\books\novel.txt"), Some(r"C:\books"));
        assert_eq!(parent(r"C:\novel.txt"), Some("C:"));
        assert_eq!(parent("/novel.txt"), Some("/"));
        assert_eq!(parent("novel.txt"), None);
    }

    #[test]
    fn test_join_keeps_separator_style() {
        assert_eq!(join(r"D:\out", "a.txt"), r"D:\out\a.txt");
        assert_eq!(join("/out", "a.txt"), "/out/a.txt");
        assert_eq!(join("/out/", "a.txt"), "/out/a.txt");
        assert_eq!(join("C:", "a.txt"), r"C:\a.txt");
        assert_eq!(join("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_normalize_for_compare() {
        assert_eq!(
            normalize_for_compare(r"C:\Books\N.TXT", PathCase::Insensitive),
            "c:/books/n.txt"
        );
        assert_eq!(
            normalize_for_compare(r"C:\Books\N.TXT", PathCase::Sensitive),
            "C:/Books/N.TXT"
        );
    }
}
