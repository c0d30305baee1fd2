use crate::content::{self, FileText};
use crate::error::AppError;
use crate::gather::{self, FileInfo};
use crate::language::infer_language;

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    pub relative_path: String,
    pub language: &'static str,
    pub content: String,
}

/// Everything the markdown renderer needs: the diagram, the text files
/// and the files that were skipped as binary.
#[derive(Debug, Default)]
pub struct ProjectContext {
    pub tree: String,
    pub sections: Vec<FileSection>,
    pub unrecognized: Vec<String>,
    /// Read failures; reported by the caller, never fatal.
    pub read_errors: Vec<AppError>,
}

impl ProjectContext {
    pub fn tree_only(tree: String) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    /// Reads every visible file in walk order.
    pub fn build(file_infos: &[FileInfo], tree: String) -> Self {
        let mut context = Self::tree_only(tree);
        log::debug!("Reading content of visible files...");

        for info in gather::emitted_files(file_infos) {
            match content::read_text_lossy(&info.path) {
                Ok(FileText::Text(text)) => {
                    log::trace!("Read {} ({} bytes)", info.relative_path, text.len());
                    context.sections.push(FileSection {
                        relative_path: info.relative_path.clone(),
                        language: infer_language(&info.path),
                        content: text,
                    });
                }
                Ok(FileText::Binary) => {
                    log::debug!("Skipping binary file: {}", info.relative_path);
                    context.unrecognized.push(info.relative_path.clone());
                }
                Err(e) => {
                    log::warn!("{}", e);
                    context.read_errors.push(e);
                }
            }
        }

        log::info!(
            "Collected {} text files, {} binary files skipped, {} read errors",
            context.sections.len(),
            context.unrecognized.len(),
            context.read_errors.len()
        );
        context
    }
}
