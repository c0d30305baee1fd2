use crate::gather::{CompressedDir, FileInfo};
use crate::tokens::TokenCounter;
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";
pub const ELLIPSIS: &str = "[...]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub compressed: Option<CompressedDir>,
    pub tokens: Option<usize>,
}

impl TreeNode {
    fn new(name: &str, node_type: NodeType) -> Self {
        Self {
            name: name.to_string(),
            node_type,
            children: Vec::new(),
            compressed: None,
            tokens: None,
        }
    }

    /// Token total of this node, summing visible files below directories.
    pub fn total_tokens(&self) -> usize {
        match self.node_type {
            NodeType::File => self.tokens.unwrap_or(0),
            NodeType::Directory => self.children.iter().map(TreeNode::total_tokens).sum(),
        }
    }

    fn label(&self, with_tokens: bool) -> String {
        if !with_tokens || self.compressed.is_some() {
            return self.name.clone();
        }
        match self.node_type {
            NodeType::File => match self.tokens {
                Some(tokens) => format!("{} ({} tokens)", self.name, tokens),
                None => self.name.clone(),
            },
            NodeType::Directory => format!("{} ({} tokens)", self.name, self.total_tokens()),
        }
    }
}

/// Builds the name-sorted hierarchy described by the walker's records.
pub fn build_tree(file_infos: &[FileInfo], counter: Option<&TokenCounter>) -> Vec<TreeNode> {
    let mut roots: Vec<TreeNode> = Vec::new();
    for info in file_infos {
        let components: Vec<&str> = info
            .relative_path
            .split('/')
            .filter(|c| !c.is_empty())
            .collect();
        let Some((name, rest)) = components.split_first() else {
            continue;
        };
        let node = insert_node(&mut roots, name, rest, info.is_directory);
        if info.is_directory {
            node.compressed = info.compressed.clone();
        } else if let Some(counter) = counter {
            node.tokens = counter.count_file(&info.path);
        }
    }
    roots
}

/// Inserts the path below `level`, creating missing directories, and
/// returns the node for its last component.
fn insert_node<'a>(
    level: &'a mut Vec<TreeNode>,
    name: &str,
    rest: &[&str],
    is_dir_at_end: bool,
) -> &'a mut TreeNode {
    let is_last = rest.is_empty();

    let index = match level.binary_search_by(|node| node.name.as_str().cmp(name)) {
        Ok(index) => {
            if !is_last || is_dir_at_end {
                level[index].node_type = NodeType::Directory;
            }
            index
        }
        Err(insertion_point) => {
            let node_type = if is_last && !is_dir_at_end {
                NodeType::File
            } else {
                NodeType::Directory
            };
            level.insert(insertion_point, TreeNode::new(name, node_type));
            insertion_point
        }
    };

    let node = &mut level[index];
    match rest.split_first() {
        Some((next, remaining)) => insert_node(&mut node.children, next, remaining, is_dir_at_end),
        None => node,
    }
}

/// Renders the folder-structure diagram for `root`.
///
/// With `with_tokens`, files are annotated with their token counts and
/// directories with their totals; adding `top_n` replaces the diagram with
/// a ranking of the largest files.
pub fn generate_tree(
    root: &Path,
    file_infos: &[FileInfo],
    with_tokens: bool,
    top_n: Option<usize>,
) -> String {
    let counter = with_tokens.then(TokenCounter::new);
    if let Some(counter) = &counter {
        log::info!("Counting tokens with {}", counter.encoding());
        if let Some(n) = top_n {
            return render_top_files(file_infos, counter, n);
        }
    }

    let nodes = build_tree(file_infos, counter.as_ref());
    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let mut lines = Vec::new();
    if with_tokens {
        let total: usize = nodes.iter().map(TreeNode::total_tokens).sum();
        lines.push(format!("{} ({} tokens total)", root_name, total));
    } else {
        lines.push(root_name);
    }
    render_level(&nodes, "", with_tokens, &mut lines);
    lines.join("\n")
}

fn render_level(nodes: &[TreeNode], prefix: &str, with_tokens: bool, lines: &mut Vec<String>) {
    for (idx, node) in nodes.iter().enumerate() {
        let is_last = idx + 1 == nodes.len();
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{connector}{}", node.label(with_tokens)));

        let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
        match &node.compressed {
            Some(preview) => render_preview(preview, &child_prefix, lines),
            None => render_level(&node.children, &child_prefix, with_tokens, lines),
        }
    }
}

fn render_preview(preview: &CompressedDir, prefix: &str, lines: &mut Vec<String>) {
    let mut names: Vec<&str> = preview.entries.iter().map(String::as_str).collect();
    if preview.truncated {
        names.push(ELLIPSIS);
    }
    for (idx, name) in names.iter().enumerate() {
        let connector = if idx + 1 == names.len() { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{connector}{name}"));
    }
}

fn render_top_files(file_infos: &[FileInfo], counter: &TokenCounter, n: usize) -> String {
    let mut ranked: Vec<(&str, usize)> = file_infos
        .iter()
        .filter(|info| info.is_file())
        .filter_map(|info| {
            counter
                .count_file(&info.path)
                .map(|tokens| (info.relative_path.as_str(), tokens))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut lines = vec![format!("Showing top {} files by token count:", n)];
    for (rank, (path, tokens)) in ranked.into_iter().take(n).enumerate() {
        lines.push(format!("  {}. {} ({} tokens)", rank + 1, path, tokens));
    }
    lines.join("\n")
}
