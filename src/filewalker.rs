use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A file selected for the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
}

/// Collects every file under `project_root` whose name ends with one of
/// `extensions`, minus anything listed in `exclusions`.
///
/// Entries inside each directory are visited in file-name order, so two runs
/// over an unchanged tree return the same sequence. Unreadable entries are
/// logged and skipped. Symlinks to regular files are collected; directory
/// symlinks are not descended into.
pub fn collect_files(
    project_root: &Path,
    extensions: &HashSet<String>,
    exclusions: &HashSet<PathBuf>,
) -> Result<Vec<FileEntry>> {
    let root = std::fs::canonicalize(project_root)
        .or_else(|_| std::path::absolute(project_root))
        .with_context(|| format!("Failed to resolve {}", project_root.display()))?;
    let mut builder = WalkBuilder::new(&root);

    // Full traversal: no gitignore, no hidden-file filtering.
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let walker = builder.build();
    let mut entries = Vec::new();

    for result in walker {
        match result {
            Ok(entry) => {
                // `Path::is_file` follows the link, so dangling links drop out.
                let is_file = entry
                    .file_type()
                    .is_some_and(|t| t.is_file() || (t.is_symlink() && entry.path().is_file()));
                if !is_file || !has_extension(entry.path(), extensions) {
                    continue;
                }

                let path = entry.path();
                if is_excluded(path, exclusions) {
                    debug!("Skipping excluded file: {}", path.display());
                    continue;
                }

                let relative_path = path.strip_prefix(&root).unwrap_or(path);
                entries.push(FileEntry {
                    absolute_path: path.to_path_buf(),
                    relative_path: relative_path.to_path_buf(),
                });
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    Ok(entries)
}

/// Case-sensitive suffix match on the file name.
fn has_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| extensions.iter().any(|ext| name.ends_with(ext.as_str())))
}

fn is_excluded(path: &Path, exclusions: &HashSet<PathBuf>) -> bool {
    if exclusions.is_empty() {
        return false;
    }
    if exclusions.contains(path) {
        return true;
    }
    // Symlinked roots or components still match their resolved form.
    std::fs::canonicalize(path).is_ok_and(|resolved| exclusions.contains(&resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::default_extensions;
    use std::fs;
    use tempfile::tempdir;

    fn exts(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rel_paths(entries: &[FileEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_filters_by_extension() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::write(root.join("a.py"), "print('a')\n").unwrap();
        fs::write(root.join("b.txt"), "not code").unwrap();

        let entries = collect_files(&root, &default_extensions(), &HashSet::new()).unwrap();

        assert_eq!(rel_paths(&entries), vec!["a.py"]);
        assert_eq!(entries[0].absolute_path, root.join("a.py"));
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::write(root.join("upper.RS"), "").unwrap();
        fs::write(root.join("lower.rs"), "").unwrap();

        let entries = collect_files(&root, &exts(&[".rs"]), &HashSet::new()).unwrap();

        assert_eq!(rel_paths(&entries), vec!["lower.rs"]);
    }

    #[test]
    fn test_orders_by_name_and_includes_hidden() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join(".config")).unwrap();
        fs::write(root.join("zeta.rs"), "").unwrap();
        fs::write(root.join("alpha.rs"), "").unwrap();
        fs::write(root.join("src/main.rs"), "").unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "").unwrap();
        fs::write(root.join(".config/settings.rs"), "").unwrap();

        let first = collect_files(&root, &exts(&[".rs"]), &HashSet::new()).unwrap();
        let second = collect_files(&root, &exts(&[".rs"]), &HashSet::new()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            rel_paths(&first),
            vec![
                ".config/settings.rs",
                "alpha.rs",
                "src/lib.rs",
                "src/main.rs",
                "src/nested/deep.rs",
                "zeta.rs",
            ]
        );
    }

    #[test]
    fn test_exclusions_win_over_extension_match() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir_all(root.join("gen")).unwrap();
        fs::write(root.join("keep.rs"), "").unwrap();
        fs::write(root.join("gen/skip.rs"), "").unwrap();

        let exclusions: HashSet<PathBuf> = [root.join("gen/skip.rs")].into_iter().collect();
        let entries = collect_files(&root, &exts(&[".rs"]), &exclusions).unwrap();

        assert_eq!(rel_paths(&entries), vec!["keep.rs"]);
    }

    #[test]
    fn test_relative_root_gives_absolute_paths() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::write(root.join("a.py"), "").unwrap();

        // Walk up from the working directory, then back down into the tempdir.
        let cwd = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
        let mut relative = PathBuf::new();
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        for component in root.components().skip(1) {
            relative.push(component);
        }
        assert!(relative.is_relative());

        let entries = collect_files(&relative, &exts(&[".py"]), &HashSet::new()).unwrap();

        assert_eq!(rel_paths(&entries), vec!["a.py"]);
        assert!(entries[0].absolute_path.is_absolute());
        assert_eq!(entries[0].absolute_path, root.join("a.py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_collected_and_dangling_ones_skipped() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("shared.rs"), "// shared").unwrap();
        fs::create_dir_all(outside.path().join("lib")).unwrap();
        fs::write(outside.path().join("lib/hidden.rs"), "").unwrap();

        fs::write(root.join("own.rs"), "").unwrap();
        symlink(outside.path().join("shared.rs"), root.join("linked.rs")).unwrap();
        symlink(root.join("missing.rs"), root.join("dangling.rs")).unwrap();
        symlink(outside.path().join("lib"), root.join("lib")).unwrap();

        let entries = collect_files(&root, &exts(&[".rs"]), &HashSet::new()).unwrap();

        assert_eq!(rel_paths(&entries), vec!["linked.rs", "own.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_stop_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("inner.rs"), "").unwrap();
        fs::write(root.join("ok.rs"), "").unwrap();
        fs::write(root.join("zz.rs"), "").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Permission bits are not enforced (running as root).
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = collect_files(&root, &exts(&[".rs"]), &HashSet::new());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(rel_paths(&result.unwrap()), vec!["ok.rs", "zz.rs"]);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let temp_dir = tempdir().unwrap();
        let entries =
            collect_files(temp_dir.path(), &default_extensions(), &HashSet::new()).unwrap();
        assert!(entries.is_empty());
    }
}
