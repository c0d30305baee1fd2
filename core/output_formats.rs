use crate::content::number_lines;
use crate::context::{FileSection, ProjectContext};

pub const TREE_HEADING: &str = "# Folder Structure";
pub const UNRECOGNIZED_HEADING: &str = "# Unrecognized Files";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub line_numbers: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { line_numbers: true }
    }
}

/// Full document: diagram, one section per text file, then the list of
/// skipped binary files if there were any.
pub fn render_markdown(context: &ProjectContext, options: &MarkdownOptions) -> String {
    let mut out = render_tree_block(&context.tree);
    for section in &context.sections {
        out.push_str(&render_file_section(section, options.line_numbers));
    }
    if !context.unrecognized.is_empty() {
        out.push_str(&render_unrecognized(&context.unrecognized));
    }
    out
}

pub fn render_tree_block(tree: &str) -> String {
    format!("{TREE_HEADING}\n\n```\n{tree}\n```\n\n")
}

pub fn render_file_section(section: &FileSection, line_numbers: bool) -> String {
    let body = if line_numbers {
        number_lines(&section.content)
    } else {
        section.content.trim_end_matches('\n').to_string()
    };
    let fence = fence_for(&body);
    format!(
        "## File: `{path}`\n*(Relative Path: `{path}`)*\n\n{fence}{lang}\n{body}\n{fence}\n\n---\n\n",
        path = section.relative_path,
        lang = section.language,
    )
}

pub fn render_unrecognized(paths: &[String]) -> String {
    let mut out = format!(
        "{UNRECOGNIZED_HEADING}\n\nThe following files were not recognized as text and their content was skipped:\n\n"
    );
    for path in paths {
        out.push_str(&format!("- `{path}`\n"));
    }
    out
}

/// A backtick fence longer than any backtick run in the body.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for ch in body.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
