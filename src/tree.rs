//! Plain-text folder tree for the optional overview page.
//!
//! The tree lists every file, not just the ones that end up in the document:
//! it is a structural overview of the scanned directory.

use anyhow::Result;
use ignore::WalkBuilder;
use log::warn;
use std::collections::BTreeMap;
use std::path::{Component, Path};

const INDENT: &str = "    ";

/// One directory level of the tree.
#[derive(Debug, Default)]
struct DirNode {
    files: Vec<String>,
    children: BTreeMap<String, DirNode>,
}

impl DirNode {
    /// Walks down (creating levels as needed) to the directory `components` names.
    fn dir_mut<'a, I>(&mut self, components: I) -> &mut DirNode
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for name in components {
            node = node.children.entry(name.to_string()).or_default();
        }
        node
    }

    fn render(&self, name: &str, depth: usize, out: &mut String) {
        out.push_str(&INDENT.repeat(depth));
        out.push_str(name);
        out.push_str("/\n");

        let file_indent = INDENT.repeat(depth + 1);
        for file in &self.files {
            out.push_str(&file_indent);
            out.push_str(file);
            out.push('\n');
        }

        for (child_name, child) in &self.children {
            child.render(child_name, depth + 1, out);
        }
    }
}

/// Renders the directory hierarchy under `root`.
///
/// The root is the top line; each directory is followed by its files and
/// then its subdirectories, all in name order, indented four spaces per level.
pub fn render_tree(root: &Path) -> Result<String> {
    let mut tree = DirNode::default();

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking path: {err}");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        let names: Vec<String> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((last, parents)) = names.split_last() else {
            continue;
        };

        let parent = tree.dir_mut(parents.iter().map(String::as_str));
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            parent.children.entry(last.clone()).or_default();
        } else {
            parent.files.push(last.clone());
        }
    }

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let mut out = String::new();
    tree.render(&root_name, 0, &mut out);
    Ok(out)
}
