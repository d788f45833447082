use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Extensions collected when the user does not pass `--extensions`.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".cpp", ".c", ".h", ".hpp", ".html", ".css", ".java",
    ".go", ".rs", ".php", ".rb", ".md", ".json", ".yml", ".yaml", ".sh", ".sql", ".xml",
];

pub fn default_extensions() -> HashSet<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Trims an extension and gives it a leading dot. Returns `None` for blanks.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim();
    if ext.is_empty() {
        None
    } else if ext.starts_with('.') {
        Some(ext.to_string())
    } else {
        Some(format!(".{ext}"))
    }
}

/// Parses a comma-separated extension list (`"rs, .py,toml"`).
pub fn parse_extension_list(list: &str) -> HashSet<String> {
    list.split(',').filter_map(normalize_extension).collect()
}

/// Resolves `path` against `root` into an absolute path.
///
/// Existing paths are canonicalized so they compare equal to what the walker
/// yields under a canonical root; anything else is normalized lexically.
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    std::fs::canonicalize(&joined).unwrap_or_else(|_| normalize_lexically(&joined))
}

/// Collapses `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute path of the running executable, if the platform can tell us.
pub fn own_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(std::fs::canonicalize(&exe).unwrap_or(exe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension_adds_dot() {
        assert_eq!(normalize_extension("rs").as_deref(), Some(".rs"));
        assert_eq!(normalize_extension(" .py ").as_deref(), Some(".py"));
        assert_eq!(normalize_extension("  "), None);
    }

    #[test]
    fn test_parse_extension_list() {
        let exts = parse_extension_list("rs, .py,,toml ");
        assert_eq!(exts.len(), 3);
        assert!(exts.contains(".rs"));
        assert!(exts.contains(".py"));
        assert!(exts.contains(".toml"));
    }

    #[test]
    fn test_default_extensions_all_dotted() {
        let exts = default_extensions();
        assert_eq!(exts.len(), DEFAULT_EXTENSIONS.len());
        assert!(exts.iter().all(|e| e.starts_with('.')));
        assert!(exts.contains(".rs"));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./c/../d.rs")),
            PathBuf::from("/a/b/d.rs")
        );
    }

    #[test]
    fn test_resolve_against_relative_missing_path() {
        let resolved = resolve_against(Path::new("/no/such/root"), Path::new("src/../x.rs"));
        assert_eq!(resolved, PathBuf::from("/no/such/root/x.rs"));
    }

    #[test]
    fn test_resolve_against_keeps_absolute() {
        let resolved = resolve_against(Path::new("/no/such/root"), Path::new("/elsewhere/y.rs"));
        assert_eq!(resolved, PathBuf::from("/elsewhere/y.rs"));
    }
}
